//! Airline operations portal: the operations dashboard, flight and gate
//! control, passenger services, analytics and alerts.

use super::{AppState, error::ApiResult};
use crate::{
    core::{
        Page, alert,
        alert::AlertForm,
        booking, check_in, crew, flight,
        flight::NewFlight,
        gate::{self, GateForm},
        passenger::{self, PassengerForm},
        report::{self, Analytics, FlightLoad, FlightPosition, OperationsSummary, TurnaroundBoard},
    },
    entities::{
        BookingStatus, CheckInStatus, FlightStatus, GateStatus, crew_assignment, booking as booking_entity,
        check_in as check_in_entity, flight as flight_entity, gate as gate_entity,
        passenger as passenger_entity, system_alert,
    },
};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Window of the dashboard's upcoming departures list.
const UPCOMING_HOURS: i64 = 2;
const UPCOMING_LIMIT: u64 = 10;
const RECENT_ALERTS: usize = 5;
/// Default analytics range, ending today.
const ANALYTICS_DAYS: i64 = 30;
const OPERATIONS_ACTOR: &str = "operations";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/flights", post(create_flight))
        .route("/flights/:id/status", post(update_status))
        .route("/flights/:id/departure", post(record_departure))
        .route("/flights/:id/arrival", post(record_arrival))
        .route("/flights/:id/load", get(flight_load))
        .route("/flights/:id/boarding", post(set_boarding_time))
        .route("/flights/:id/seats", post(update_seat_inventory))
        .route("/flights/:id/crew", get(flight_crew))
        .route("/check-ins/:id/status", post(update_check_in_status))
        .route("/gates", get(list_gates).post(create_gate))
        .route("/gates/:id/assign", post(assign_gate))
        .route("/gates/:id/release", post(release_gate))
        .route("/gates/:id/status", post(set_gate_status))
        .route("/passenger-assistance", get(passenger_assistance))
        .route("/turnaround", get(turnaround))
        .route("/analytics", get(analytics))
        .route("/flight-map", get(flight_map))
        .route("/alerts", get(list_alerts).post(raise_alert))
        .route("/alerts/:id/resolve", post(resolve_alert))
        .route("/passengers", get(list_passengers).post(create_passenger))
        .route("/passengers/:id", post(update_passenger))
        .route("/bookings", get(list_bookings))
}

#[derive(Serialize)]
struct Dashboard {
    summary: OperationsSummary,
    active_flights: Vec<flight_entity::Model>,
    upcoming_departures: Vec<flight_entity::Model>,
    recent_alerts: Vec<system_alert::Model>,
}

async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<Dashboard>> {
    let now = Utc::now();
    let summary = report::operations_summary(&state.db, now.date_naive()).await?;
    let active_flights = flight::flights_with_status(
        &state.db,
        &[FlightStatus::Boarding, FlightStatus::Departed],
    )
    .await?
    .into_iter()
    .filter(|f| f.departure_time <= now && f.arrival_time >= now)
    .collect();
    let upcoming_departures = flight::departing_soon(&state.db, now, UPCOMING_HOURS, UPCOMING_LIMIT)
        .await?
        .into_iter()
        .filter(|f| f.status == FlightStatus::Scheduled)
        .collect();
    let mut recent_alerts = alert::list_alerts(&state.db, Some(false)).await?;
    recent_alerts.truncate(RECENT_ALERTS);

    Ok(Json(Dashboard {
        summary,
        active_flights,
        upcoming_departures,
        recent_alerts,
    }))
}

async fn create_flight(
    State(state): State<AppState>,
    Form(input): Form<NewFlight>,
) -> ApiResult<(StatusCode, Json<flight_entity::Model>)> {
    let flight = flight::create_flight(&state.db, input).await?;
    Ok((StatusCode::CREATED, Json(flight)))
}

#[derive(Debug, Deserialize)]
struct StatusForm {
    status: FlightStatus,
    #[serde(default)]
    delay_reason: String,
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> ApiResult<Json<flight_entity::Model>> {
    let updated = if form.status == FlightStatus::Delayed {
        flight::mark_delayed(&state.db, id, form.delay_reason.trim().to_string()).await?
    } else {
        flight::update_flight_status(&state.db, id, form.status).await?
    };
    Ok(Json(updated))
}

/// Actual movement time, defaulting to now.
#[derive(Debug, Deserialize)]
struct MovementForm {
    #[serde(default)]
    at: Option<DateTime<Utc>>,
}

async fn record_departure(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<MovementForm>,
) -> ApiResult<Json<flight_entity::Model>> {
    let at = form.at.unwrap_or_else(Utc::now);
    Ok(Json(flight::record_departure(&state.db, id, at).await?))
}

async fn record_arrival(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<MovementForm>,
) -> ApiResult<Json<flight_entity::Model>> {
    let at = form.at.unwrap_or_else(Utc::now);
    Ok(Json(flight::record_arrival(&state.db, id, at).await?))
}

async fn flight_load(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<FlightLoad>> {
    let flight = flight::require_flight(&state.db, id).await?;
    Ok(Json(report::flight_load(&state.db, &flight).await?))
}

/// Omitting `boarding_time` clears it.
#[derive(Debug, Deserialize)]
struct BoardingForm {
    #[serde(default)]
    boarding_time: Option<DateTime<Utc>>,
}

async fn set_boarding_time(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<BoardingForm>,
) -> ApiResult<Json<flight_entity::Model>> {
    Ok(Json(
        flight::set_boarding_time(&state.db, id, form.boarding_time).await?,
    ))
}

#[derive(Debug, Deserialize)]
struct SeatsForm {
    total_seats: i32,
    available_seats: i32,
}

async fn update_seat_inventory(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<SeatsForm>,
) -> ApiResult<Json<flight_entity::Model>> {
    let updated =
        flight::update_seat_inventory(&state.db, id, form.total_seats, form.available_seats)
            .await?;
    Ok(Json(updated))
}

async fn flight_crew(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<crew_assignment::Model>>> {
    flight::require_flight(&state.db, id).await?;
    Ok(Json(crew::crew_for_flight(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
struct CheckInStatusForm {
    status: CheckInStatus,
}

async fn update_check_in_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<CheckInStatusForm>,
) -> ApiResult<Json<check_in_entity::Model>> {
    let updated =
        check_in::update_check_in_status(&state.db, id, form.status, Utc::now()).await?;
    Ok(Json(updated))
}

async fn list_gates(State(state): State<AppState>) -> ApiResult<Json<Vec<gate_entity::Model>>> {
    Ok(Json(gate::list_gates(&state.db).await?))
}

async fn create_gate(
    State(state): State<AppState>,
    Form(form): Form<GateForm>,
) -> ApiResult<(StatusCode, Json<gate_entity::Model>)> {
    let gate = gate::create_gate(&state.db, form).await?;
    Ok((StatusCode::CREATED, Json(gate)))
}

#[derive(Debug, Deserialize)]
struct AssignGateForm {
    flight_id: i64,
}

#[derive(Serialize)]
struct GateAssignment {
    gate: gate_entity::Model,
    flight: flight_entity::Model,
}

async fn assign_gate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<AssignGateForm>,
) -> ApiResult<Json<GateAssignment>> {
    let (gate, flight) = gate::assign_gate(&state.db, id, form.flight_id).await?;
    Ok(Json(GateAssignment { gate, flight }))
}

async fn release_gate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<gate_entity::Model>> {
    Ok(Json(gate::release_gate(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
struct GateStatusForm {
    status: GateStatus,
}

async fn set_gate_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<GateStatusForm>,
) -> ApiResult<Json<gate_entity::Model>> {
    Ok(Json(gate::set_gate_status(&state.db, id, form.status).await?))
}

#[derive(Serialize)]
struct PendingCheckIn {
    booking: booking_entity::Model,
    flight: flight_entity::Model,
}

#[derive(Serialize)]
struct Assistance {
    special_assistance: Vec<check_in_entity::Model>,
    pending_check_ins: Vec<PendingCheckIn>,
}

async fn passenger_assistance(State(state): State<AppState>) -> ApiResult<Json<Assistance>> {
    let special_assistance = check_in::special_assistance_check_ins(&state.db).await?;
    let pending_check_ins = check_in::pending_check_ins(&state.db, Utc::now())
        .await?
        .into_iter()
        .map(|(booking, flight)| PendingCheckIn { booking, flight })
        .collect();
    Ok(Json(Assistance {
        special_assistance,
        pending_check_ins,
    }))
}

async fn turnaround(State(state): State<AppState>) -> ApiResult<Json<TurnaroundBoard>> {
    Ok(Json(report::turnaround_board(&state.db, Utc::now()).await?))
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

async fn analytics(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Analytics>> {
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());
    let start = query
        .start_date
        .unwrap_or_else(|| end - Duration::days(ANALYTICS_DAYS));
    if start > end {
        return Err(
            crate::errors::Error::validation("start_date", "Start date must not be after end date")
                .into(),
        );
    }
    Ok(Json(report::analytics(&state.db, start, end).await?))
}

async fn flight_map(State(state): State<AppState>) -> ApiResult<Json<Vec<FlightPosition>>> {
    Ok(Json(report::flight_map(&state.db, Utc::now()).await?))
}

#[derive(Debug, Deserialize)]
struct AlertQuery {
    resolved: Option<bool>,
}

async fn list_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertQuery>,
) -> ApiResult<Json<Vec<system_alert::Model>>> {
    Ok(Json(alert::list_alerts(&state.db, query.resolved).await?))
}

async fn raise_alert(
    State(state): State<AppState>,
    Form(form): Form<AlertForm>,
) -> ApiResult<(StatusCode, Json<system_alert::Model>)> {
    let raised = alert::raise_alert(&state.db, form, OPERATIONS_ACTOR, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(raised)))
}

fn default_actor() -> String {
    OPERATIONS_ACTOR.to_string()
}

#[derive(Debug, Deserialize)]
struct ResolveForm {
    #[serde(default = "default_actor")]
    resolved_by: String,
}

async fn resolve_alert(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<ResolveForm>,
) -> ApiResult<Json<system_alert::Model>> {
    let resolved = alert::resolve_alert(&state.db, id, &form.resolved_by, Utc::now()).await?;
    info!(alert_id = id, by = %form.resolved_by, "Alert resolved");
    Ok(Json(resolved))
}

#[derive(Debug, Deserialize)]
struct PassengerQuery {
    search: Option<String>,
    page: Option<u64>,
}

async fn list_passengers(
    State(state): State<AppState>,
    Query(query): Query<PassengerQuery>,
) -> ApiResult<Json<Page<passenger_entity::Model>>> {
    let page =
        passenger::list_passengers(&state.db, query.search.as_deref(), query.page.unwrap_or(1)).await?;
    Ok(Json(page))
}

async fn create_passenger(
    State(state): State<AppState>,
    Form(form): Form<PassengerForm>,
) -> ApiResult<(StatusCode, Json<passenger_entity::Model>)> {
    let created = passenger::create_passenger(&state.db, form).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_passenger(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<PassengerForm>,
) -> ApiResult<Json<passenger_entity::Model>> {
    Ok(Json(passenger::update_passenger(&state.db, id, form).await?))
}

#[derive(Debug, Deserialize)]
struct BookingQuery {
    status: Option<BookingStatus>,
    page: Option<u64>,
}

async fn list_bookings(
    State(state): State<AppState>,
    Query(query): Query<BookingQuery>,
) -> ApiResult<Json<Page<booking_entity::Model>>> {
    Ok(Json(
        booking::list_bookings(&state.db, query.status, query.page.unwrap_or(1)).await?,
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::core::{booking::confirm_booking, check_in, crew::assign_crew, flight::create_flight};
    use crate::entities::StaffRole;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use chrono::{Duration, SecondsFormat, Utc};

    fn form_time(t: chrono::DateTime<Utc>) -> String {
        // `+` would decode as a space in a form body.
        t.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    #[tokio::test]
    async fn test_create_flight_via_form() {
        let (app, _db) = setup_test_app().await.unwrap();
        let departure = Utc::now() + Duration::days(2);
        let body = format!(
            "flight_number=sk500&airline=SkyPort+Air&departure_city=London&arrival_city=Rome\
             &departure_time={}&arrival_time={}&aircraft_type=A320&total_seats=150\
             &economy_price=99.5&business_price=400",
            form_time(departure),
            form_time(departure + Duration::hours(2)),
        );
        let (status, flight) = post_form(&app, "/airline/flights", &body).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(flight["flight_number"], "SK500");
        assert_eq!(flight["available_seats"], 150);
        assert_eq!(flight["departure_airport"], "UNK");

        let (status, body) = post_form(&app, "/airline/flights", &body).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["field"], "flight_number");
    }

    #[tokio::test]
    async fn test_status_departure_and_map() {
        let (app, db) = setup_test_app().await.unwrap();
        let flight = create_flight(&db, new_flight_input("SK501", Utc::now() - Duration::minutes(30)))
            .await
            .unwrap();

        let (status, delayed) = post_form(
            &app,
            &format!("/airline/flights/{}/status", flight.id),
            "status=delayed&delay_reason=Weather",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(delayed["status"], "delayed");
        assert_eq!(delayed["delay_reason"], "Weather");

        let (status, departed) =
            post_form(&app, &format!("/airline/flights/{}/departure", flight.id), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(departed["status"], "departed");

        let (_, map) = get_json(&app, "/airline/flight-map").await;
        assert_eq!(map.as_array().unwrap().len(), 1);
        assert_eq!(map[0]["flight_number"], "SK501");

        let (_, dashboard) = get_json(&app, "/airline").await;
        assert_eq!(dashboard["active_flights"].as_array().unwrap().len(), 1);

        let (status, arrived) =
            post_form(&app, &format!("/airline/flights/{}/arrival", flight.id), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(arrived["status"], "arrived");
    }

    #[tokio::test]
    async fn test_gates_and_assignment() {
        let (app, db) = setup_test_app().await.unwrap();
        let flight = create_flight(&db, new_flight_input("SK502", Utc::now() + Duration::hours(3)))
            .await
            .unwrap();

        let (status, gate) =
            post_form(&app, "/airline/gates", "gate_number=a7&terminal=A&capacity=180").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(gate["gate_number"], "A7");
        let gate_id = gate["id"].as_i64().unwrap();

        let (status, assigned) = post_form(
            &app,
            &format!("/airline/gates/{gate_id}/assign"),
            &format!("flight_id={}", flight.id),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(assigned["gate"]["status"], "occupied");
        assert_eq!(assigned["flight"]["gate_number"], "A7");

        let (_, gates) = get_json(&app, "/airline/gates").await;
        assert_eq!(gates[0]["current_flight_id"], flight.id);

        let (status, released) =
            post_form(&app, &format!("/airline/gates/{gate_id}/release"), "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(released["status"], "available");

        let (status, _) = post_form(&app, "/airline/gates/999/assign", "flight_id=1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_alerts_round_trip() {
        let (app, _db) = setup_test_app().await.unwrap();
        let (status, alert) = post_form(
            &app,
            "/airline/alerts",
            "title=Radar+outage&message=Secondary+radar+down&alert_type=critical",
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(alert["created_by"], "operations");
        let id = alert["id"].as_i64().unwrap();

        let (_, open) = get_json(&app, "/airline/alerts?resolved=false").await;
        assert_eq!(open.as_array().unwrap().len(), 1);

        let (status, resolved) = post_form(
            &app,
            &format!("/airline/alerts/{id}/resolve"),
            "resolved_by=duty+manager",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resolved["is_resolved"], true);

        let (_, open) = get_json(&app, "/airline/alerts?resolved=false").await;
        assert!(open.as_array().unwrap().is_empty());
        let (status, _) = post_form(&app, &format!("/airline/alerts/{id}/resolve"), "").await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_passenger_management_and_bookings() {
        let (app, db) = setup_test_app().await.unwrap();
        let body = "first_name=Grace&last_name=Hopper&email=grace%40example.com\
                    &phone_number=%2B15551234567&date_of_birth=1985-12-09&gender=F\
                    &passport_number=X123&nationality=American&address=Arlington\
                    &mobility_assistance=on";
        let (status, created) = post_form(&app, "/airline/passengers", body).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["title"], "Mr");
        assert_eq!(created["mobility_assistance"], true);
        let id = created["id"].as_i64().unwrap();

        let (status, body) = post_form(&app, "/airline/passengers", body).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "DUPLICATE");

        let updated_body = "title=Dr&first_name=Grace&last_name=Hopper&email=grace%40example.com\
                    &phone_number=%2B15551234567&date_of_birth=1985-12-09&gender=F\
                    &passport_number=X123&nationality=American&address=Arlington";
        let (status, updated) =
            post_form(&app, &format!("/airline/passengers/{id}"), updated_body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["title"], "Dr");

        let (_, found) = get_json(&app, "/airline/passengers?search=hopp").await;
        assert_eq!(found["total_items"], 1);

        let flight = create_flight(&db, new_flight_input("SK503", Utc::now() + Duration::hours(10)))
            .await
            .unwrap();
        let booking = create_test_booking(&db, id, flight.id, "3A").await.unwrap();
        confirm_booking(&db, &booking.booking_reference, "card", "PAY").await.unwrap();

        let (_, confirmed) = get_json(&app, "/airline/bookings?status=confirmed").await;
        assert_eq!(confirmed["total_items"], 1);
        let (_, pending) = get_json(&app, "/airline/bookings?status=pending&page=1").await;
        assert_eq!(pending["total_items"], 0);

        let (_, assistance) = get_json(&app, "/airline/passenger-assistance").await;
        assert_eq!(assistance["pending_check_ins"].as_array().unwrap().len(), 1);

        let mut request = check_in::CheckInRequest::online();
        request.special_assistance = "Wheelchair".to_string();
        check_in::check_in(&db, &booking.booking_reference, request, Utc::now())
            .await
            .unwrap();
        let (_, assistance) = get_json(&app, "/airline/passenger-assistance").await;
        assert_eq!(assistance["special_assistance"].as_array().unwrap().len(), 1);
        assert!(assistance["pending_check_ins"].as_array().unwrap().is_empty());

        let (_, load) = get_json(&app, &format!("/airline/flights/{}/load", flight.id)).await;
        assert_eq!(load["booked_seats"], 1);
    }

    #[tokio::test]
    async fn test_boarding_crew_and_check_in_progress() {
        let (app, db) = setup_test_app().await.unwrap();
        let flight = create_flight(&db, new_flight_input("SK504", Utc::now() + Duration::hours(6)))
            .await
            .unwrap();
        let passenger = crate::core::passenger::create_passenger(
            &db,
            passenger_form("Katherine", "Johnson", "kj@example.com", "P5040"),
        )
        .await
        .unwrap();

        let boarding = form_time(Utc::now() + Duration::hours(5));
        let (status, updated) = post_form(
            &app,
            &format!("/airline/flights/{}/boarding", flight.id),
            &format!("boarding_time={boarding}"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(updated["boarding_time"].is_string());

        let (status, body) = post_form(
            &app,
            &format!("/airline/flights/{}/seats", flight.id),
            "total_seats=100&available_seats=120",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let pilot = create_test_staff(&db, "P504", StaffRole::Pilot).await.unwrap();
        assign_crew(&db, assignment_request(pilot.id, flight.id)).await.unwrap();
        let (_, crew) = get_json(&app, &format!("/airline/flights/{}/crew", flight.id)).await;
        assert_eq!(crew[0]["staff_id"], pilot.id);

        let booking = create_test_booking(&db, passenger.id, flight.id, "4C").await.unwrap();
        confirm_booking(&db, &booking.booking_reference, "card", "PAY").await.unwrap();
        let record = check_in::check_in(
            &db,
            &booking.booking_reference,
            check_in::CheckInRequest::online(),
            Utc::now(),
        )
        .await
        .unwrap();

        let (status, boarded) = post_form(
            &app,
            &format!("/airline/check-ins/{}/status", record.id),
            "status=boarded",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(boarded["status"], "boarded");
        assert!(boarded["boarding_time"].is_string());
    }

    #[tokio::test]
    async fn test_turnaround_endpoint() {
        let (app, db) = setup_test_app().await.unwrap();
        create_flight(&db, new_flight_input("SK505", Utc::now() + Duration::hours(1)))
            .await
            .unwrap();

        let (status, board) = get_json(&app, "/airline/turnaround").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(board["departing"][0]["flight_number"], "SK505");
        assert!(board["arriving"].as_array().unwrap().is_empty());
        assert_eq!(board["tasks"][0]["task"], "Passenger Disembarkation");
        assert_eq!(board["total_task_minutes"], 180);
    }

    #[tokio::test]
    async fn test_analytics_range_validation() {
        let (app, _db) = setup_test_app().await.unwrap();
        let (status, body) = get_json(&app, "/airline/analytics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_flights"], 0);

        let (status, _) =
            get_json(&app, "/airline/analytics?start_date=2026-10-10&end_date=2026-10-01").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
