//! HTTP surface.
//!
//! Each portal is a router nested under its own prefix: `/customer`,
//! `/airline`, `/crew` and `/admin`. POST bodies are
//! `application/x-www-form-urlencoded`; every response is JSON.

pub mod admin;
pub mod airline;
pub mod crew;
pub mod customer;
pub mod error;

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode},
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

impl AppState {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// `?page=` on listing endpoints.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u64,
}

const fn first_page() -> u64 {
    1
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/customer", customer::routes())
        .nest("/airline", airline::routes())
        .nest("/crew", crew::routes())
        .nest("/admin", admin::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    database: &'static str,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    match state.db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Health {
                status: "ok",
                database: "up",
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "Health check failed to reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "degraded",
                    database: "down",
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{get_json, setup_test_app};

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _db) = setup_test_app().await.unwrap();
        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let (app, _db) = setup_test_app().await.unwrap();
        let (status, _) = get_json(&app, "/nowhere").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
