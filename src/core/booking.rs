//! Booking business logic - seat inventory and the booking lifecycle.
//!
//! A booking takes exactly one seat from its flight. The decrement is a single
//! conditional `UPDATE ... WHERE available_seats > 0 AND status = 'scheduled'`
//! executed in the same database transaction as the insert, so concurrent
//! requests for the last seat cannot both succeed and the counter never goes
//! negative. Cancelling gives the seat back with the mirror-image update.
//!
//! Status flow: `pending` → `confirmed` (payment) → `checked_in` (see
//! [`crate::core::check_in`]) → `completed` (flight arrived). Pending and
//! confirmed bookings can be cancelled.

use crate::{
    core::{Page, audit, fetch_page, flight::require_flight, passenger::require_passenger},
    entities::{
        ActionType, Booking, BookingStatus, Flight, FlightStatus, SeatClass, booking, flight,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rand::Rng;
use sea_orm::{
    PaginatorTrait, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Fixed tax and fee rate applied on top of the fare.
pub const TAX_RATE: f64 = 0.15;
/// Length of a booking reference.
pub const REFERENCE_LENGTH: usize = 8;
const REFERENCE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const MAX_REFERENCE_ATTEMPTS: usize = 10;
const SEAT_LETTERS: &[u8] = b"ABCDEF";
const MAX_SEAT_LABEL_LEN: usize = 10;

/// Bookings per page in listings.
pub const LIST_PAGE_SIZE: u64 = 15;

const fn default_seat_class() -> SeatClass {
    SeatClass::Economy
}

/// Input for [`create_booking`].
#[derive(Debug, Clone, Deserialize)]
pub struct BookingRequest {
    pub passenger_id: i64,
    /// Taken from the route when the request arrives as a form
    #[serde(default)]
    pub flight_id: i64,
    #[serde(default = "default_seat_class")]
    pub seat_class: SeatClass,
    /// A free seat is assigned when absent
    #[serde(default)]
    pub seat_number: Option<String>,
    #[serde(default)]
    pub meal_preference: String,
    #[serde(default)]
    pub seat_preference: String,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default, deserialize_with = "super::deserialize_checkbox")]
    pub insurance_opted: bool,
}

impl BookingRequest {
    /// Economy booking with an automatically assigned seat.
    #[must_use]
    pub const fn new(passenger_id: i64, flight_id: i64) -> Self {
        Self {
            passenger_id,
            flight_id,
            seat_class: SeatClass::Economy,
            seat_number: None,
            meal_preference: String::new(),
            seat_preference: String::new(),
            special_requests: None,
            insurance_opted: false,
        }
    }
}

/// Price breakdown for one seat.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fare {
    pub base_price: f64,
    pub taxes_fees: f64,
    pub total_amount: f64,
}

fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Business and first class pay the business fare, everyone else economy.
/// Taxes are [`TAX_RATE`] of the base fare.
///
/// First class pays the business fare. Flights carry no separate
/// first-class price, and an economy fare for first would undercut business.
#[must_use]
pub fn price_seat(flight: &flight::Model, seat_class: SeatClass) -> Fare {
    let base_price = match seat_class {
        SeatClass::Business | SeatClass::First => flight.business_price,
        SeatClass::Economy => flight.economy_price,
    };
    Fare {
        base_price,
        taxes_fees: round_cents(base_price * TAX_RATE),
        total_amount: round_cents(base_price * (1.0 + TAX_RATE)),
    }
}

/// Checked baggage allowance in kg.
#[must_use]
pub const fn baggage_allowance(seat_class: SeatClass) -> i32 {
    match seat_class {
        SeatClass::Economy => 20,
        SeatClass::Business | SeatClass::First => 30,
    }
}

/// Draws a reference from `[A-Z0-9]` using the supplied generator.
pub fn generate_reference_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..REFERENCE_LENGTH)
        .map(|_| char::from(REFERENCE_CHARSET[rng.gen_range(0..REFERENCE_CHARSET.len())]))
        .collect()
}

/// Draws a random booking reference.
#[must_use]
pub fn generate_reference() -> String {
    generate_reference_with(&mut rand::thread_rng())
}

/// Returns a reference not yet used by any booking.
async fn unique_reference<C>(db: &C) -> Result<String>
where
    C: ConnectionTrait,
{
    for attempt in 1..=MAX_REFERENCE_ATTEMPTS {
        let candidate = generate_reference();
        let taken = Booking::find()
            .filter(booking::Column::BookingReference.eq(candidate.as_str()))
            .one(db)
            .await?
            .is_some();
        if !taken {
            return Ok(candidate);
        }
        warn!(attempt, "Booking reference collision, retrying");
    }
    Err(Error::ReferenceExhausted)
}

/// Seat label for the `index`-th seat, walking rows of six: 1A..1F, 2A, ...
#[must_use]
pub fn seat_label(index: usize) -> String {
    let row = index / SEAT_LETTERS.len() + 1;
    let letter = char::from(SEAT_LETTERS[index % SEAT_LETTERS.len()]);
    format!("{row}{letter}")
}

async fn taken_seats<C>(db: &C, flight_id: i64) -> Result<HashSet<String>>
where
    C: ConnectionTrait,
{
    let seats: Vec<String> = Booking::find()
        .select_only()
        .column(booking::Column::SeatNumber)
        .filter(booking::Column::FlightId.eq(flight_id))
        .into_tuple()
        .all(db)
        .await?;
    Ok(seats.into_iter().collect())
}

/// First seat label, in [`seat_label`] order, not held by any booking on the flight.
async fn next_free_seat<C>(db: &C, flight_id: i64) -> Result<String>
where
    C: ConnectionTrait,
{
    let taken = taken_seats(db, flight_id).await?;
    Ok((0..=taken.len())
        .map(seat_label)
        .find(|label| !taken.contains(label))
        .unwrap_or_else(|| seat_label(taken.len())))
}

fn normalize_seat(seat: &str) -> Result<String> {
    let seat = seat.trim().to_uppercase();
    if seat.len() > MAX_SEAT_LABEL_LEN {
        return Err(Error::validation(
            "seat_number",
            "Seat number is at most 10 characters",
        ));
    }
    Ok(seat)
}

/// Takes one seat from a scheduled flight. Returns false when no seat was
/// taken because the flight is full or no longer scheduled.
async fn take_seat<C>(db: &C, flight_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = Flight::update_many()
        .col_expr(
            flight::Column::AvailableSeats,
            Expr::col(flight::Column::AvailableSeats).sub(1),
        )
        .col_expr(flight::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(flight::Column::Id.eq(flight_id))
        .filter(flight::Column::AvailableSeats.gt(0))
        .filter(flight::Column::Status.eq(FlightStatus::Scheduled))
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Gives one seat back, never exceeding the flight's total.
async fn release_seat<C>(db: &C, flight_id: i64) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = Flight::update_many()
        .col_expr(
            flight::Column::AvailableSeats,
            Expr::col(flight::Column::AvailableSeats).add(1),
        )
        .col_expr(flight::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(flight::Column::Id.eq(flight_id))
        .filter(
            Expr::col(flight::Column::AvailableSeats).lt(Expr::col(flight::Column::TotalSeats)),
        )
        .exec(db)
        .await?;
    Ok(result.rows_affected == 1)
}

/// Books one seat for a passenger.
///
/// Fails with `FlightNotBookable` unless the flight is scheduled, `SoldOut`
/// when no seat is left, and `SeatTaken` when the requested seat is held by
/// another booking on the same flight. On success the flight has exactly one
/// seat fewer and the booking is `pending` with a fresh unique reference.
#[instrument(skip(db, request), fields(flight_id = request.flight_id, passenger_id = request.passenger_id))]
pub async fn create_booking(
    db: &DatabaseConnection,
    request: BookingRequest,
) -> Result<booking::Model> {
    let txn = db.begin().await?;

    let passenger = require_passenger(&txn, request.passenger_id).await?;
    let flight = require_flight(&txn, request.flight_id).await?;

    if flight.status != FlightStatus::Scheduled {
        return Err(Error::FlightNotBookable {
            flight_number: flight.flight_number,
            status: flight.status.as_str().to_string(),
        });
    }
    if flight.available_seats <= 0 {
        return Err(Error::SoldOut {
            flight_number: flight.flight_number,
        });
    }

    let seat_number = match request.seat_number.as_deref().map(str::trim) {
        Some(seat) if !seat.is_empty() => {
            let seat = normalize_seat(seat)?;
            if taken_seats(&txn, flight.id).await?.contains(&seat) {
                return Err(Error::SeatTaken {
                    flight_number: flight.flight_number,
                    seat_number: seat,
                });
            }
            seat
        }
        _ => next_free_seat(&txn, flight.id).await?,
    };

    let booking_reference = unique_reference(&txn).await?;

    // Re-checks the seat count and status atomically; the earlier checks only
    // produce the nicer error.
    if !take_seat(&txn, flight.id).await? {
        return Err(Error::SoldOut {
            flight_number: flight.flight_number,
        });
    }

    let fare = price_seat(&flight, request.seat_class);
    let booking = booking::ActiveModel {
        booking_reference: Set(booking_reference),
        passenger_id: Set(passenger.id),
        flight_id: Set(flight.id),
        seat_number: Set(seat_number.clone()),
        seat_class: Set(request.seat_class),
        booking_date: Set(Utc::now()),
        status: Set(BookingStatus::Pending),
        base_price: Set(fare.base_price),
        taxes_fees: Set(fare.taxes_fees),
        total_amount: Set(fare.total_amount),
        payment_status: Set(false),
        payment_method: Set(String::new()),
        payment_reference: Set(String::new()),
        special_requests: Set(request.special_requests),
        meal_preference: Set(request.meal_preference),
        seat_preference: Set(request.seat_preference),
        baggage_allowance: Set(baggage_allowance(request.seat_class)),
        extra_baggage: Set(0),
        insurance_opted: Set(request.insurance_opted),
        ..Default::default()
    };

    let booking = booking.insert(&txn).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::SeatTaken {
            flight_number: flight.flight_number.clone(),
            seat_number: seat_number.clone(),
        },
        _ => e.into(),
    })?;

    audit::record(
        &txn,
        audit::AuditEntry {
            actor: format!("passenger:{}", passenger.id),
            action_type: ActionType::Booking,
            model_name: "Booking",
            object_id: booking.booking_reference.clone(),
            description: format!(
                "Booked seat {} on {}",
                booking.seat_number, flight.flight_number
            ),
            portal: "customer",
        },
    )
    .await?;

    txn.commit().await?;
    info!(reference = %booking.booking_reference, seat = %booking.seat_number, "Booking created");
    Ok(booking)
}

pub async fn get_booking_by_reference<C>(db: &C, reference: &str) -> Result<Option<booking::Model>>
where
    C: ConnectionTrait,
{
    Booking::find()
        .filter(booking::Column::BookingReference.eq(reference.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_booking_by_reference`] but a missing booking is an error.
pub async fn require_booking<C>(db: &C, reference: &str) -> Result<booking::Model>
where
    C: ConnectionTrait,
{
    get_booking_by_reference(db, reference)
        .await?
        .ok_or_else(|| Error::BookingNotFound {
            reference: reference.to_string(),
        })
}

/// A booking as seen by its passenger: someone else's booking is reported
/// as not found.
pub async fn get_booking_for_passenger(
    db: &DatabaseConnection,
    reference: &str,
    passenger_id: i64,
) -> Result<booking::Model> {
    let booking = require_booking(db, reference).await?;
    if booking.passenger_id != passenger_id {
        return Err(Error::BookingNotFound {
            reference: reference.to_string(),
        });
    }
    Ok(booking)
}

/// Moves a pending booking to confirmed and records the payment.
#[instrument(skip(db))]
pub async fn confirm_booking(
    db: &DatabaseConnection,
    reference: &str,
    payment_method: &str,
    payment_reference: &str,
) -> Result<booking::Model> {
    let booking = require_booking(db, reference).await?;
    if booking.status != BookingStatus::Pending {
        return Err(Error::InvalidTransition {
            entity: "Booking",
            from: booking.status.as_str().to_string(),
            to: BookingStatus::Confirmed.as_str().to_string(),
        });
    }

    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(BookingStatus::Confirmed);
    active.payment_status = Set(true);
    active.payment_method = Set(payment_method.to_string());
    active.payment_reference = Set(payment_reference.to_string());
    let updated = active.update(db).await?;
    info!(reference = %updated.booking_reference, "Booking confirmed");
    Ok(updated)
}

/// Cancels a pending or confirmed booking and returns its seat to the flight.
///
/// The seat label stays on the cancelled booking.
#[instrument(skip(db))]
pub async fn cancel_booking(db: &DatabaseConnection, reference: &str) -> Result<booking::Model> {
    let txn = db.begin().await?;
    let booking = require_booking(&txn, reference).await?;
    if !matches!(
        booking.status,
        BookingStatus::Pending | BookingStatus::Confirmed
    ) {
        return Err(Error::InvalidTransition {
            entity: "Booking",
            from: booking.status.as_str().to_string(),
            to: BookingStatus::Cancelled.as_str().to_string(),
        });
    }

    let flight_id = booking.flight_id;
    let passenger_id = booking.passenger_id;
    let mut active: booking::ActiveModel = booking.into();
    active.status = Set(BookingStatus::Cancelled);
    let updated = active.update(&txn).await?;

    if !release_seat(&txn, flight_id).await? {
        warn!(flight_id, "Seat counter already at capacity, nothing to release");
    }

    audit::record(
        &txn,
        audit::AuditEntry {
            actor: format!("passenger:{passenger_id}"),
            action_type: ActionType::Booking,
            model_name: "Booking",
            object_id: updated.booking_reference.clone(),
            description: "Booking cancelled".to_string(),
            portal: "customer",
        },
    )
    .await?;

    txn.commit().await?;
    info!(reference = %updated.booking_reference, "Booking cancelled");
    Ok(updated)
}

/// Marks every checked-in booking on the flight as completed.
/// Returns the number of bookings updated.
pub async fn complete_bookings_for_flight<C>(db: &C, flight_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Booking::update_many()
        .col_expr(
            booking::Column::Status,
            Expr::value(BookingStatus::Completed),
        )
        .filter(booking::Column::FlightId.eq(flight_id))
        .filter(booking::Column::Status.eq(BookingStatus::CheckedIn))
        .exec(db)
        .await?;
    debug!(flight_id, completed = result.rows_affected, "Bookings completed");
    Ok(result.rows_affected)
}

/// All bookings, newest first, optionally restricted to one status.
pub async fn list_bookings(
    db: &DatabaseConnection,
    status: Option<BookingStatus>,
    page: u64,
) -> Result<Page<booking::Model>> {
    let mut query = Booking::find();
    if let Some(status) = status {
        query = query.filter(booking::Column::Status.eq(status));
    }
    fetch_page(
        db,
        query.order_by_desc(booking::Column::BookingDate),
        page,
        LIST_PAGE_SIZE,
    )
    .await
}

/// A passenger's bookings, newest first.
pub async fn list_bookings_for_passenger(
    db: &DatabaseConnection,
    passenger_id: i64,
    page: u64,
) -> Result<Page<booking::Model>> {
    let query = Booking::find()
        .filter(booking::Column::PassengerId.eq(passenger_id))
        .order_by_desc(booking::Column::BookingDate);
    fetch_page(db, query, page, 10).await
}

/// A passenger's confirmed or checked-in bookings on flights that have not
/// departed yet, soonest first.
pub async fn upcoming_bookings_for_passenger(
    db: &DatabaseConnection,
    passenger_id: i64,
    now: DateTime<Utc>,
    limit: u64,
) -> Result<Vec<(booking::Model, flight::Model)>> {
    let rows = Booking::find()
        .find_also_related(Flight)
        .filter(booking::Column::PassengerId.eq(passenger_id))
        .filter(
            booking::Column::Status.is_in([BookingStatus::Confirmed, BookingStatus::CheckedIn]),
        )
        .filter(flight::Column::DepartureTime.gte(now))
        .order_by_asc(flight::Column::DepartureTime)
        .limit(limit)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(booking, flight)| flight.map(|f| (booking, f)))
        .collect())
}

/// Seats held by confirmed or checked-in bookings on the flight.
pub async fn count_booked_seats(db: &DatabaseConnection, flight_id: i64) -> Result<u64> {
    Booking::find()
        .filter(booking::Column::FlightId.eq(flight_id))
        .filter(
            booking::Column::Status.is_in([BookingStatus::Confirmed, BookingStatus::CheckedIn]),
        )
        .count(db)
        .await
        .map_err(Into::into)
}
