//! Customer portal: flight search, booking management, check-in and
//! boarding passes.

use super::{AppState, PageQuery, error::ApiResult};
use crate::{
    core::{
        Page,
        booking::{self, BookingRequest, Fare, price_seat},
        check_in::{self, BoardingPass, CheckInRequest, check_in_opens},
        derive::{BoardingStatus, boarding_status, delay_minutes, is_delayed},
        flight::{self, FlightSearch},
        report::{self, LoyaltySummary},
    },
    entities::{SeatClass, booking as booking_entity, check_in as check_in_entity, flight as flight_entity},
    errors::Error,
};
use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Hours ahead covered by the dashboard's departure list.
const DASHBOARD_HOURS: i64 = 6;
const DASHBOARD_FLIGHTS: u64 = 10;
const DASHBOARD_BOOKINGS: u64 = 3;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/flights", get(search))
        .route("/flights/:id", get(flight_detail))
        .route("/book/:flight_id", post(book))
        .route("/passengers/:id/bookings", get(passenger_bookings))
        .route("/passengers/:id/loyalty", get(loyalty))
        .route("/booking/:reference", get(booking_detail))
        .route("/booking/:reference/confirm", post(confirm))
        .route("/booking/:reference/cancel", post(cancel))
        .route("/checkin/:reference", post(do_check_in))
        .route("/boarding-pass/:reference", get(boarding_pass))
        .route("/flight-status", get(flight_status))
}

/// Optional passenger scoping used by several customer pages.
#[derive(Debug, Default, Deserialize)]
struct PassengerQuery {
    passenger_id: Option<i64>,
}

#[derive(Serialize)]
struct BookingWithFlight {
    booking: booking_entity::Model,
    flight: flight_entity::Model,
}

#[derive(Serialize)]
struct Dashboard {
    departing_soon: Vec<flight_entity::Model>,
    upcoming_bookings: Vec<BookingWithFlight>,
}

async fn dashboard(
    State(state): State<AppState>,
    Query(query): Query<PassengerQuery>,
) -> ApiResult<Json<Dashboard>> {
    let now = Utc::now();
    let departing_soon =
        flight::departing_soon(&state.db, now, DASHBOARD_HOURS, DASHBOARD_FLIGHTS).await?;
    let upcoming_bookings = match query.passenger_id {
        Some(passenger_id) => {
            booking::upcoming_bookings_for_passenger(&state.db, passenger_id, now, DASHBOARD_BOOKINGS)
                .await?
                .into_iter()
                .map(|(booking, flight)| BookingWithFlight { booking, flight })
                .collect()
        }
        None => Vec::new(),
    };
    Ok(Json(Dashboard {
        departing_soon,
        upcoming_bookings,
    }))
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    departure_city: Option<String>,
    arrival_city: Option<String>,
    departure_date: Option<NaiveDate>,
    airline: Option<String>,
    page: Option<u64>,
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Page<flight_entity::Model>>> {
    let criteria = FlightSearch {
        departure_city: query.departure_city,
        arrival_city: query.arrival_city,
        departure_date: query.departure_date,
        airline: query.airline,
    };
    let page = flight::search_flights(&state.db, &criteria, Utc::now(), query.page.unwrap_or(1)).await?;
    Ok(Json(page))
}

/// A flight with the figures shown beside it on the detail page.
#[derive(Serialize)]
struct FlightView {
    flight: flight_entity::Model,
    is_delayed: bool,
    delay_minutes: i64,
    boarding_status: BoardingStatus,
    check_in_opens: DateTime<Utc>,
    economy_fare: Fare,
    business_fare: Fare,
}

impl FlightView {
    fn new(flight: flight_entity::Model, now: DateTime<Utc>) -> Self {
        Self {
            is_delayed: is_delayed(&flight),
            delay_minutes: delay_minutes(&flight),
            boarding_status: boarding_status(&flight, now),
            check_in_opens: check_in_opens(&flight),
            economy_fare: price_seat(&flight, SeatClass::Economy),
            business_fare: price_seat(&flight, SeatClass::Business),
            flight,
        }
    }
}

async fn flight_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<FlightView>> {
    let flight = flight::require_flight(&state.db, id).await?;
    Ok(Json(FlightView::new(flight, Utc::now())))
}

#[derive(Debug, Deserialize)]
struct FlightStatusQuery {
    flight_number: String,
}

async fn flight_status(
    State(state): State<AppState>,
    Query(query): Query<FlightStatusQuery>,
) -> ApiResult<Json<FlightView>> {
    let flight = flight::get_flight_by_number(&state.db, &query.flight_number)
        .await?
        .ok_or_else(|| Error::FlightNotFound {
            id: query.flight_number.clone(),
        })?;
    Ok(Json(FlightView::new(flight, Utc::now())))
}

async fn book(
    State(state): State<AppState>,
    Path(flight_id): Path<i64>,
    Form(mut request): Form<BookingRequest>,
) -> ApiResult<(StatusCode, Json<booking_entity::Model>)> {
    request.flight_id = flight_id;
    request.special_requests = request.special_requests.filter(|s| !s.trim().is_empty());
    let booking = booking::create_booking(&state.db, request).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

async fn passenger_bookings(
    State(state): State<AppState>,
    Path(passenger_id): Path<i64>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Page<booking_entity::Model>>> {
    crate::core::passenger::require_passenger(&state.db, passenger_id).await?;
    let page = booking::list_bookings_for_passenger(&state.db, passenger_id, query.page).await?;
    Ok(Json(page))
}

async fn loyalty(
    State(state): State<AppState>,
    Path(passenger_id): Path<i64>,
) -> ApiResult<Json<LoyaltySummary>> {
    Ok(Json(report::loyalty_summary(&state.db, passenger_id).await?))
}

#[derive(Serialize)]
struct BookingView {
    booking: booking_entity::Model,
    flight: flight_entity::Model,
    check_in: Option<check_in_entity::Model>,
    check_in_status: &'static str,
    can_check_in: bool,
}

async fn booking_detail(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Query(query): Query<PassengerQuery>,
) -> ApiResult<Json<BookingView>> {
    let booking = match query.passenger_id {
        Some(passenger_id) => {
            booking::get_booking_for_passenger(&state.db, &reference, passenger_id).await?
        }
        None => booking::require_booking(&state.db, &reference).await?,
    };
    let flight = flight::require_flight(&state.db, booking.flight_id).await?;
    let record = check_in::get_check_in_for_booking(&state.db, booking.id).await?;
    Ok(Json(BookingView {
        check_in_status: check_in::check_in_status_label(record.as_ref()),
        can_check_in: check_in::can_check_in(&booking, &flight, Utc::now()),
        check_in: record,
        booking,
        flight,
    }))
}

#[derive(Debug, Deserialize)]
struct PaymentForm {
    payment_method: String,
    #[serde(default)]
    payment_reference: String,
}

async fn confirm(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Form(form): Form<PaymentForm>,
) -> ApiResult<Json<booking_entity::Model>> {
    if form.payment_method.trim().is_empty() {
        return Err(Error::validation("payment_method", "This field is required").into());
    }
    let booking = booking::confirm_booking(
        &state.db,
        &reference,
        form.payment_method.trim(),
        form.payment_reference.trim(),
    )
    .await?;
    Ok(Json(booking))
}

async fn cancel(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> ApiResult<Json<booking_entity::Model>> {
    Ok(Json(booking::cancel_booking(&state.db, &reference).await?))
}

async fn do_check_in(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Form(request): Form<CheckInRequest>,
) -> ApiResult<(StatusCode, Json<check_in_entity::Model>)> {
    let record = check_in::check_in(&state.db, &reference, request, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn boarding_pass(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    Query(query): Query<PassengerQuery>,
) -> ApiResult<Json<BoardingPass>> {
    let pass = check_in::boarding_pass(&state.db, &reference, query.passenger_id).await?;
    Ok(Json(pass))
}
