//! Unified error type for the SkyPort service.
//!
//! Business functions return [`Result`]; the web layer maps each variant to an
//! HTTP status in [`crate::web::error`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Value '{value}' for {field} is already in use")]
    Duplicate { field: String, value: String },

    #[error("Flight '{id}' not found")]
    FlightNotFound { id: String },

    #[error("Passenger {id} not found")]
    PassengerNotFound { id: i64 },

    #[error("Booking '{reference}' not found")]
    BookingNotFound { reference: String },

    #[error("{entity} {id} not found")]
    RecordNotFound { entity: &'static str, id: i64 },

    #[error("Flight {flight_number} has no available seats")]
    SoldOut { flight_number: String },

    #[error("Flight {flight_number} is {status} and cannot be booked")]
    FlightNotBookable {
        flight_number: String,
        status: String,
    },

    #[error("Seat {seat_number} on flight {flight_number} is already taken")]
    SeatTaken {
        flight_number: String,
        seat_number: String,
    },

    #[error("Could not generate a unique booking reference")]
    ReferenceExhausted,

    #[error("{entity} cannot move from {from} to {to}")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Check-in is not available for booking '{reference}'")]
    CheckInNotAvailable { reference: String },

    #[error("Boarding pass for booking '{reference}' not found")]
    BoardingPassNotFound { reference: String },

    #[error("Staff {staff_id} is already assigned to flight {flight_id}")]
    AlreadyAssigned { staff_id: i64, flight_id: i64 },
}

impl Error {
    /// Shorthand for a field-level validation failure.
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
