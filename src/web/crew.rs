//! Crew portal: rosters, briefings, post-flight reports and qualifications.

use super::{AppState, error::ApiResult};
use crate::{
    core::{
        crew::{self, AssignmentRequest, Roster},
        staff::{self, Qualification},
    },
    entities::crew_assignment,
};
use axum::{
    Form, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/:staff_id/roster", get(roster))
        .route("/:staff_id/qualifications", get(qualifications))
        .route("/assignments", post(assign))
        .route("/assignments/:id/briefing", post(briefing))
        .route("/assignments/:id/report", post(report))
}

async fn roster(
    State(state): State<AppState>,
    Path(staff_id): Path<i64>,
) -> ApiResult<Json<Roster>> {
    Ok(Json(crew::roster_for_staff(&state.db, staff_id, Utc::now()).await?))
}

#[derive(Serialize)]
struct Qualifications {
    staff_id: i64,
    employee_id: String,
    flight_hours: i32,
    items: Vec<Qualification>,
}

async fn qualifications(
    State(state): State<AppState>,
    Path(staff_id): Path<i64>,
) -> ApiResult<Json<Qualifications>> {
    let member = staff::require_staff(&state.db, staff_id).await?;
    let items = staff::qualifications(&member, Utc::now().date_naive());
    Ok(Json(Qualifications {
        staff_id: member.id,
        employee_id: member.employee_id,
        flight_hours: member.flight_hours,
        items,
    }))
}

async fn assign(
    State(state): State<AppState>,
    Form(request): Form<AssignmentRequest>,
) -> ApiResult<(StatusCode, Json<crew_assignment::Model>)> {
    let assignment = crew::assign_crew(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn briefing(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<crew_assignment::Model>> {
    Ok(Json(crew::complete_briefing(&state.db, id, Utc::now()).await?))
}

#[derive(Debug, Deserialize)]
struct ReportForm {
    report: String,
}

async fn report(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ReportForm>,
) -> ApiResult<Json<crew_assignment::Model>> {
    Ok(Json(crew::file_post_flight_report(&state.db, id, form.report).await?))
}
