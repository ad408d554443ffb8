//! Admin portal: system overview and metrics, staff records, the fleet and
//! the audit trail.

use super::{AppState, error::ApiResult};
use crate::{
    core::{
        Page,
        aircraft::{self, AircraftForm},
        audit,
        report::{self, AdminOverview, SystemMetrics},
        staff::{self, StaffForm},
    },
    entities::{
        ActionType, AircraftStatus, StaffRole, aircraft as aircraft_entity, audit_log,
        staff as staff_entity,
    },
};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(overview))
        .route("/metrics", get(metrics))
        .route("/staff", get(list_staff).post(create_staff))
        .route("/staff/:id/training", post(record_training))
        .route("/aircraft", get(list_aircraft).post(create_aircraft))
        .route("/aircraft/maintenance-due", get(maintenance_due))
        .route("/aircraft/:id/status", post(set_aircraft_status))
        .route("/audit", get(audit_trail))
}

/// Default metrics range, ending today.
const METRICS_DAYS: i64 = 30;

async fn overview(State(state): State<AppState>) -> ApiResult<Json<AdminOverview>> {
    Ok(Json(report::admin_overview(&state.db, Utc::now()).await?))
}

#[derive(Debug, Deserialize)]
struct MetricsQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

async fn metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> ApiResult<Json<SystemMetrics>> {
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start = query
        .start_date
        .unwrap_or_else(|| end - Duration::days(METRICS_DAYS));
    Ok(Json(report::system_metrics(&state.db, start, end).await?))
}

#[derive(Debug, Deserialize)]
struct StaffQuery {
    role: Option<StaffRole>,
}

async fn list_staff(
    State(state): State<AppState>,
    Query(query): Query<StaffQuery>,
) -> ApiResult<Json<Vec<staff_entity::Model>>> {
    Ok(Json(staff::list_active_staff(&state.db, query.role).await?))
}

async fn create_staff(
    State(state): State<AppState>,
    Form(form): Form<StaffForm>,
) -> ApiResult<(StatusCode, Json<staff_entity::Model>)> {
    let created = staff::create_staff(&state.db, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Deserialize)]
struct TrainingForm {
    completed_on: NaiveDate,
    next_due: NaiveDate,
}

async fn record_training(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<TrainingForm>,
) -> ApiResult<Json<staff_entity::Model>> {
    let updated = staff::record_training(&state.db, id, form.completed_on, form.next_due).await?;
    Ok(Json(updated))
}

#[derive(Debug, Deserialize)]
struct FleetQuery {
    /// Include aircraft that are not flying
    #[serde(default)]
    all: bool,
}

async fn list_aircraft(
    State(state): State<AppState>,
    Query(query): Query<FleetQuery>,
) -> ApiResult<Json<Vec<aircraft_entity::Model>>> {
    let fleet = if query.all {
        aircraft::list_aircraft(&state.db).await?
    } else {
        aircraft::list_active_aircraft(&state.db).await?
    };
    Ok(Json(fleet))
}

async fn create_aircraft(
    State(state): State<AppState>,
    Form(form): Form<AircraftForm>,
) -> ApiResult<(StatusCode, Json<aircraft_entity::Model>)> {
    let created = aircraft::create_aircraft(&state.db, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

const fn default_maintenance_window() -> i64 {
    30
}

/// Upper bound on the look-ahead, keeps the date arithmetic in range.
const MAX_MAINTENANCE_WINDOW: i64 = 3650;

#[derive(Debug, Deserialize)]
struct MaintenanceQuery {
    #[serde(default = "default_maintenance_window")]
    days: i64,
}

async fn maintenance_due(
    State(state): State<AppState>,
    Query(query): Query<MaintenanceQuery>,
) -> ApiResult<Json<Vec<aircraft_entity::Model>>> {
    let today = Utc::now().date_naive();
    Ok(Json(
        aircraft::maintenance_due(&state.db, today, query.days.clamp(0, MAX_MAINTENANCE_WINDOW))
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
struct AircraftStatusForm {
    status: AircraftStatus,
}

async fn set_aircraft_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<AircraftStatusForm>,
) -> ApiResult<Json<aircraft_entity::Model>> {
    Ok(Json(
        aircraft::set_aircraft_status(&state.db, id, form.status).await?,
    ))
}

#[derive(Debug, Deserialize)]
struct AuditQuery {
    action_type: Option<ActionType>,
    page: Option<u64>,
}

async fn audit_trail(
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<Page<audit_log::Model>>> {
    let page = audit::list_entries(&state.db, query.action_type, query.page.unwrap_or(1)).await?;
    Ok(Json(page))
}
