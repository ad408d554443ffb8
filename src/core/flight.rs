//! Flight business logic - scheduling, search and operational status.
//!
//! Flight numbers are stored upper-cased so lookups are case-insensitive.
//! The seat counters change only through the conditional updates in
//! [`crate::core::booking`] and through [`update_seat_inventory`], both of
//! which keep `0 <= available <= total`.

use crate::{
    core::{Page, booking, fetch_page},
    entities::{Flight, FlightStatus, flight},
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// Flights per page in search results.
pub const SEARCH_PAGE_SIZE: u64 = 10;

/// Input for scheduling a new flight.
#[derive(Debug, Clone, Deserialize)]
pub struct NewFlight {
    pub flight_number: String,
    pub airline: String,
    pub aircraft_id: Option<i64>,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_airport: Option<String>,
    pub arrival_airport: Option<String>,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
    pub aircraft_type: String,
    pub total_seats: i32,
    /// Defaults to `total_seats`
    pub available_seats: Option<i32>,
    pub economy_price: f64,
    pub business_price: f64,
}

/// Optional filters for [`search_flights`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlightSearch {
    pub departure_city: Option<String>,
    pub arrival_city: Option<String>,
    pub departure_date: Option<NaiveDate>,
    pub airline: Option<String>,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "This field is required"));
    }
    Ok(())
}

fn validate_price(field: &str, price: f64) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(Error::validation(field, "Price must be a non-negative amount"));
    }
    Ok(())
}

/// Checks `0 <= available <= total` with a positive total.
pub fn validate_seat_counts(total_seats: i32, available_seats: i32) -> Result<()> {
    if total_seats <= 0 {
        return Err(Error::validation("total_seats", "Total seats must be positive"));
    }
    if available_seats < 0 {
        return Err(Error::validation(
            "available_seats",
            "Available seats cannot be negative",
        ));
    }
    if available_seats > total_seats {
        return Err(Error::validation(
            "available_seats",
            "Available seats cannot exceed total seats",
        ));
    }
    Ok(())
}

fn normalize_airport(code: Option<String>) -> String {
    code.map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| "UNK".to_string())
}

/// Schedules a new flight after validating the form input.
#[instrument(skip(db, input), fields(flight_number = %input.flight_number))]
pub async fn create_flight(db: &DatabaseConnection, input: NewFlight) -> Result<flight::Model> {
    let flight_number = input.flight_number.trim().to_uppercase();
    require("flight_number", &flight_number)?;
    if flight_number.len() > 10 {
        return Err(Error::validation(
            "flight_number",
            "Flight number is at most 10 characters",
        ));
    }
    require("airline", &input.airline)?;
    require("departure_city", &input.departure_city)?;
    require("arrival_city", &input.arrival_city)?;
    if input.arrival_time <= input.departure_time {
        return Err(Error::validation(
            "arrival_time",
            "Arrival must be after departure",
        ));
    }
    let available_seats = input.available_seats.unwrap_or(input.total_seats);
    validate_seat_counts(input.total_seats, available_seats)?;
    validate_price("economy_price", input.economy_price)?;
    validate_price("business_price", input.business_price)?;

    if get_flight_by_number(db, &flight_number).await?.is_some() {
        return Err(Error::Duplicate {
            field: "flight_number".to_string(),
            value: flight_number,
        });
    }

    let now = Utc::now();
    let flight = flight::ActiveModel {
        flight_number: Set(flight_number),
        airline: Set(input.airline.trim().to_string()),
        aircraft_id: Set(input.aircraft_id),
        departure_city: Set(input.departure_city.trim().to_string()),
        arrival_city: Set(input.arrival_city.trim().to_string()),
        departure_airport: Set(normalize_airport(input.departure_airport)),
        arrival_airport: Set(normalize_airport(input.arrival_airport)),
        departure_time: Set(input.departure_time),
        arrival_time: Set(input.arrival_time),
        actual_departure: Set(None),
        actual_arrival: Set(None),
        aircraft_type: Set(input.aircraft_type.trim().to_string()),
        total_seats: Set(input.total_seats),
        available_seats: Set(available_seats),
        economy_price: Set(input.economy_price),
        business_price: Set(input.business_price),
        status: Set(FlightStatus::Scheduled),
        gate_id: Set(None),
        gate_number: Set(None),
        boarding_time: Set(None),
        delay_reason: Set(String::new()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = flight.insert(db).await?;
    info!(flight_id = result.id, "Flight scheduled");
    Ok(result)
}

/// Finds a flight by primary key.
pub async fn get_flight_by_id<C>(db: &C, flight_id: i64) -> Result<Option<flight::Model>>
where
    C: ConnectionTrait,
{
    Flight::find_by_id(flight_id).one(db).await.map_err(Into::into)
}

/// Like [`get_flight_by_id`] but a missing flight is an error.
pub async fn require_flight<C>(db: &C, flight_id: i64) -> Result<flight::Model>
where
    C: ConnectionTrait,
{
    get_flight_by_id(db, flight_id)
        .await?
        .ok_or_else(|| Error::FlightNotFound {
            id: flight_id.to_string(),
        })
}

/// Finds a flight by its number, ignoring case.
pub async fn get_flight_by_number(
    db: &DatabaseConnection,
    flight_number: &str,
) -> Result<Option<flight::Model>> {
    Flight::find()
        .filter(flight::Column::FlightNumber.eq(flight_number.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Upcoming flights with free seats that match every given filter, soonest first.
///
/// City and airline filters are substring matches; the date filter selects
/// flights departing on that UTC calendar day.
pub async fn search_flights(
    db: &DatabaseConnection,
    criteria: &FlightSearch,
    now: DateTime<Utc>,
    page: u64,
) -> Result<Page<flight::Model>> {
    let mut query = Flight::find()
        .filter(flight::Column::DepartureTime.gte(now))
        .filter(flight::Column::AvailableSeats.gt(0));

    if let Some(city) = non_empty(criteria.departure_city.as_deref()) {
        query = query.filter(flight::Column::DepartureCity.contains(city));
    }
    if let Some(city) = non_empty(criteria.arrival_city.as_deref()) {
        query = query.filter(flight::Column::ArrivalCity.contains(city));
    }
    if let Some(airline) = non_empty(criteria.airline.as_deref()) {
        query = query.filter(flight::Column::Airline.contains(airline));
    }
    if let Some(date) = criteria.departure_date {
        let (start, end) = day_bounds(date);
        query = query
            .filter(flight::Column::DepartureTime.gte(start))
            .filter(flight::Column::DepartureTime.lt(end));
    }

    fetch_page(
        db,
        query.order_by_asc(flight::Column::DepartureTime),
        page,
        SEARCH_PAGE_SIZE,
    )
    .await
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Start and end (exclusive) of a UTC calendar day.
#[must_use]
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

/// Flights departing within the next `hours` hours, soonest first.
pub async fn departing_soon(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
    hours: i64,
    limit: u64,
) -> Result<Vec<flight::Model>> {
    Flight::find()
        .filter(flight::Column::DepartureTime.gte(now))
        .filter(flight::Column::DepartureTime.lte(now + Duration::hours(hours)))
        .order_by_asc(flight::Column::DepartureTime)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All flights scheduled to depart on `date`.
pub async fn flights_on_date(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> Result<Vec<flight::Model>> {
    let (start, end) = day_bounds(date);
    Flight::find()
        .filter(flight::Column::DepartureTime.gte(start))
        .filter(flight::Column::DepartureTime.lt(end))
        .order_by_asc(flight::Column::DepartureTime)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Flights currently in one of `statuses`, soonest departure first.
pub async fn flights_with_status(
    db: &DatabaseConnection,
    statuses: &[FlightStatus],
) -> Result<Vec<flight::Model>> {
    Flight::find()
        .filter(flight::Column::Status.is_in(statuses.iter().copied()))
        .order_by_asc(flight::Column::DepartureTime)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets the flight status. Marking a flight `arrived` completes its
/// checked-in bookings in the same transaction.
#[instrument(skip(db))]
pub async fn update_flight_status(
    db: &DatabaseConnection,
    flight_id: i64,
    status: FlightStatus,
) -> Result<flight::Model> {
    let txn = db.begin().await?;
    let flight = require_flight(&txn, flight_id).await?;

    let mut active: flight::ActiveModel = flight.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    if status == FlightStatus::Arrived {
        booking::complete_bookings_for_flight(&txn, flight_id).await?;
    }

    txn.commit().await?;
    info!(flight = %updated.flight_number, status = status.as_str(), "Flight status updated");
    Ok(updated)
}

/// Records the actual departure time and marks the flight departed, on time
/// or not. Lateness is read from the times through
/// [`crate::core::derive::is_delayed`].
pub async fn record_departure(
    db: &DatabaseConnection,
    flight_id: i64,
    actual_departure: DateTime<Utc>,
) -> Result<flight::Model> {
    let flight = require_flight(db, flight_id).await?;
    let mut active: flight::ActiveModel = flight.into();
    active.actual_departure = Set(Some(actual_departure));
    active.status = Set(FlightStatus::Departed);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Records the actual arrival time and marks the flight arrived, completing
/// its checked-in bookings.
pub async fn record_arrival(
    db: &DatabaseConnection,
    flight_id: i64,
    actual_arrival: DateTime<Utc>,
) -> Result<flight::Model> {
    let txn = db.begin().await?;
    let flight = require_flight(&txn, flight_id).await?;
    let mut active: flight::ActiveModel = flight.into();
    active.actual_arrival = Set(Some(actual_arrival));
    active.status = Set(FlightStatus::Arrived);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    booking::complete_bookings_for_flight(&txn, flight_id).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Marks the flight delayed with a reason for the departure board.
pub async fn mark_delayed(
    db: &DatabaseConnection,
    flight_id: i64,
    reason: String,
) -> Result<flight::Model> {
    let flight = require_flight(db, flight_id).await?;
    let mut active: flight::ActiveModel = flight.into();
    active.status = Set(FlightStatus::Delayed);
    active.delay_reason = Set(reason);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Sets or clears the boarding time.
pub async fn set_boarding_time(
    db: &DatabaseConnection,
    flight_id: i64,
    boarding_time: Option<DateTime<Utc>>,
) -> Result<flight::Model> {
    let flight = require_flight(db, flight_id).await?;
    let mut active: flight::ActiveModel = flight.into();
    active.boarding_time = Set(boarding_time);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Replaces both seat counters after checking the inventory invariant.
pub async fn update_seat_inventory(
    db: &DatabaseConnection,
    flight_id: i64,
    total_seats: i32,
    available_seats: i32,
) -> Result<flight::Model> {
    validate_seat_counts(total_seats, available_seats)?;
    let flight = require_flight(db, flight_id).await?;
    let mut active: flight::ActiveModel = flight.into();
    active.total_seats = Set(total_seats);
    active.available_seats = Set(available_seats);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}
