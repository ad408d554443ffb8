//! HTTP error responses.
//!
//! Domain errors become a status code plus a JSON body
//! `{"code": ..., "message": ..., "field": ...}`. Server-side failures are
//! logged here and reported to the client without internal detail.

use crate::errors::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
    field: Option<String>,
    /// Logged for 5xx responses, never sent to the client
    source: Option<Error>,
}

impl AppError {
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            field: None,
            source: None,
        }
    }

    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        let (status, code) = match &err {
            Error::FlightNotFound { .. }
            | Error::PassengerNotFound { .. }
            | Error::BookingNotFound { .. }
            | Error::BoardingPassNotFound { .. }
            | Error::RecordNotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Error::Duplicate { .. } => (StatusCode::CONFLICT, "DUPLICATE"),
            Error::SoldOut { .. } => (StatusCode::CONFLICT, "SOLD_OUT"),
            Error::SeatTaken { .. } => (StatusCode::CONFLICT, "SEAT_TAKEN"),
            Error::FlightNotBookable { .. } => (StatusCode::CONFLICT, "NOT_BOOKABLE"),
            Error::InvalidTransition { .. } => (StatusCode::CONFLICT, "INVALID_TRANSITION"),
            Error::CheckInNotAvailable { .. } => (StatusCode::CONFLICT, "CHECK_IN_UNAVAILABLE"),
            Error::AlreadyAssigned { .. } => (StatusCode::CONFLICT, "ALREADY_ASSIGNED"),
            Error::Config { .. }
            | Error::Database(_)
            | Error::Io(_)
            | Error::IntConversion(_)
            | Error::ReferenceExhausted => {
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "INTERNAL_SERVER_ERROR",
                    message: "An internal error occurred".to_string(),
                    field: None,
                    source: Some(err),
                };
            }
        };

        let field = match &err {
            Error::Validation { field, .. } | Error::Duplicate { field, .. } => Some(field.clone()),
            _ => None,
        };
        let message = match &err {
            Error::Validation { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self {
            status,
            code,
            message,
            field,
            source: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = self.code,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(status = %self.status, code = self.code, "Internal server error"),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
            field: self.field,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Handler result type.
pub type ApiResult<T> = std::result::Result<T, AppError>;
