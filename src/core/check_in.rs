//! Check-in business logic - the window rule, check-in creation and boarding passes.
//!
//! Check-in opens [`CHECK_IN_WINDOW_HOURS`] before scheduled departure and is only
//! open to confirmed bookings. Checking in creates the one [`check_in::Model`]
//! for the booking and moves the booking to `checked_in`; there is no undo.

use crate::{
    core::{
        audit,
        booking::require_booking,
        derive::{boarding_group, full_name},
        flight::require_flight,
        passenger::require_passenger,
    },
    entities::{
        ActionType, Booking, BookingStatus, CheckIn, CheckInMethod, CheckInStatus, Flight,
        SeatClass, Staff, booking, check_in, flight,
    },
    errors::{Error, Result},
};
use chrono::{DateTime, Duration, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Hours before departure at which check-in opens.
pub const CHECK_IN_WINDOW_HOURS: i64 = 24;
/// Charge per kg of checked baggage above the allowance.
pub const EXCESS_BAGGAGE_RATE: f64 = 15.0;

const fn default_method() -> CheckInMethod {
    CheckInMethod::Online
}

/// Details captured at the check-in desk or online form.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckInRequest {
    #[serde(default = "default_method")]
    pub method: CheckInMethod,
    /// Agent handling a counter check-in
    #[serde(default)]
    pub staff_id: Option<i64>,
    /// Checked baggage in kg
    #[serde(default)]
    pub baggage_weight: f64,
    #[serde(default)]
    pub special_assistance: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckInRequest {
    /// Online self check-in without checked baggage.
    #[must_use]
    pub const fn online() -> Self {
        Self {
            method: CheckInMethod::Online,
            staff_id: None,
            baggage_weight: 0.0,
            special_assistance: String::new(),
            notes: None,
        }
    }
}

/// Instant at which check-in opens for the flight.
#[must_use]
pub fn check_in_opens(flight: &flight::Model) -> DateTime<Utc> {
    flight.departure_time - Duration::hours(CHECK_IN_WINDOW_HOURS)
}

/// True when `now` is inside the check-in window and the booking is confirmed.
#[must_use]
pub fn can_check_in(booking: &booking::Model, flight: &flight::Model, now: DateTime<Utc>) -> bool {
    now >= check_in_opens(flight) && booking.status == BookingStatus::Confirmed
}

/// Fee for checked baggage beyond the booking's allowance plus purchased extra.
#[must_use]
pub fn excess_baggage_fee(booking: &booking::Model, baggage_weight: f64) -> f64 {
    let allowance = f64::from(booking.baggage_allowance + booking.extra_baggage);
    let excess = baggage_weight - allowance;
    if excess <= 0.0 {
        return 0.0;
    }
    (excess * EXCESS_BAGGAGE_RATE * 100.0).round() / 100.0
}

/// Checks in a confirmed booking whose flight departs within the window.
///
/// The gate is copied from the flight (`"TBD"` when none is assigned yet) and
/// the seat from the booking.
#[instrument(skip(db, request))]
pub async fn check_in(
    db: &DatabaseConnection,
    reference: &str,
    request: CheckInRequest,
    now: DateTime<Utc>,
) -> Result<check_in::Model> {
    if !request.baggage_weight.is_finite() || request.baggage_weight < 0.0 {
        return Err(Error::validation(
            "baggage_weight",
            "Baggage weight must be a non-negative number",
        ));
    }

    let txn = db.begin().await?;
    let booking = require_booking(&txn, reference).await?;
    let flight = require_flight(&txn, booking.flight_id).await?;

    if !can_check_in(&booking, &flight, now) {
        return Err(Error::CheckInNotAvailable {
            reference: booking.booking_reference,
        });
    }

    if let Some(staff_id) = request.staff_id {
        if Staff::find_by_id(staff_id).one(&txn).await?.is_none() {
            return Err(Error::RecordNotFound {
                entity: "Staff",
                id: staff_id,
            });
        }
    }

    // Guards against a second check-in racing this one
    let moved = Booking::update_many()
        .col_expr(
            booking::Column::Status,
            Expr::value(BookingStatus::CheckedIn),
        )
        .filter(booking::Column::Id.eq(booking.id))
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .exec(&txn)
        .await?;
    if moved.rows_affected != 1 {
        return Err(Error::CheckInNotAvailable {
            reference: booking.booking_reference,
        });
    }

    let record = check_in::ActiveModel {
        booking_id: Set(booking.id),
        check_in_time: Set(now),
        boarding_time: Set(None),
        gate_number: Set(flight
            .gate_number
            .clone()
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| "TBD".to_string())),
        seat_number: Set(booking.seat_number.clone()),
        baggage_weight: Set(request.baggage_weight),
        excess_baggage_fee: Set(excess_baggage_fee(&booking, request.baggage_weight)),
        status: Set(CheckInStatus::CheckedIn),
        staff_id: Set(request.staff_id),
        check_in_method: Set(request.method),
        special_assistance: Set(request.special_assistance),
        notes: Set(request.notes),
        ..Default::default()
    };
    let record = record.insert(&txn).await?;

    audit::record(
        &txn,
        audit::AuditEntry {
            actor: request.staff_id.map_or_else(
                || format!("passenger:{}", booking.passenger_id),
                |id| format!("staff:{id}"),
            ),
            action_type: ActionType::Checkin,
            model_name: "CheckIn",
            object_id: booking.booking_reference.clone(),
            description: format!("Checked in for {} seat {}", flight.flight_number, booking.seat_number),
            portal: if request.staff_id.is_some() { "airline" } else { "customer" },
        },
    )
    .await?;

    txn.commit().await?;
    info!(reference = %booking.booking_reference, gate = %record.gate_number, "Passenger checked in");
    Ok(record)
}

/// The check-in for a booking, if any.
pub async fn get_check_in_for_booking<C>(db: &C, booking_id: i64) -> Result<Option<check_in::Model>>
where
    C: ConnectionTrait,
{
    CheckIn::find()
        .filter(check_in::Column::BookingId.eq(booking_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Check-in status label shown on the booking page.
#[must_use]
pub fn check_in_status_label(record: Option<&check_in::Model>) -> &'static str {
    record.map_or("not_checked_in", |r| r.status.as_str())
}

/// Everything printed on a boarding pass.
#[derive(Debug, Clone, Serialize)]
pub struct BoardingPass {
    pub booking_reference: String,
    pub passenger_name: String,
    pub flight_number: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub departure_time: DateTime<Utc>,
    pub boarding_time: Option<DateTime<Utc>>,
    pub gate_number: String,
    pub seat_number: String,
    pub seat_class: SeatClass,
    pub boarding_group: char,
    pub check_in_status: CheckInStatus,
}

/// Builds the boarding pass for a checked-in booking.
///
/// When `passenger_id` is given, bookings belonging to someone else are
/// reported as not found.
pub async fn boarding_pass(
    db: &DatabaseConnection,
    reference: &str,
    passenger_id: Option<i64>,
) -> Result<BoardingPass> {
    let not_found = || Error::BoardingPassNotFound {
        reference: reference.to_string(),
    };

    let booking = crate::core::booking::get_booking_by_reference(db, reference)
        .await?
        .filter(|b| passenger_id.is_none_or(|id| b.passenger_id == id))
        .ok_or_else(not_found)?;
    let record = get_check_in_for_booking(db, booking.id)
        .await?
        .ok_or_else(not_found)?;
    let flight = require_flight(db, booking.flight_id).await?;
    let passenger = require_passenger(db, booking.passenger_id).await?;

    Ok(BoardingPass {
        booking_reference: booking.booking_reference,
        passenger_name: full_name(&passenger),
        flight_number: flight.flight_number,
        departure_city: flight.departure_city,
        arrival_city: flight.arrival_city,
        departure_time: flight.departure_time,
        boarding_time: record.boarding_time.or(flight.boarding_time),
        gate_number: record.gate_number,
        seat_number: record.seat_number,
        seat_class: booking.seat_class,
        boarding_group: boarding_group(booking.seat_class),
        check_in_status: record.status,
    })
}

/// Advances a check-in through the airport (security, gate, boarded, no-show).
/// Boarding stamps the boarding time.
pub async fn update_check_in_status(
    db: &DatabaseConnection,
    check_in_id: i64,
    status: CheckInStatus,
    now: DateTime<Utc>,
) -> Result<check_in::Model> {
    let record = CheckIn::find_by_id(check_in_id)
        .one(db)
        .await?
        .ok_or(Error::RecordNotFound {
            entity: "CheckIn",
            id: check_in_id,
        })?;

    let mut active: check_in::ActiveModel = record.into();
    active.status = Set(status);
    if status == CheckInStatus::Boarded {
        active.boarding_time = Set(Some(now));
    }
    active.update(db).await.map_err(Into::into)
}

/// Confirmed bookings whose check-in window is open but who have not checked in.
pub async fn pending_check_ins(
    db: &DatabaseConnection,
    now: DateTime<Utc>,
) -> Result<Vec<(booking::Model, flight::Model)>> {
    let rows = Booking::find()
        .find_also_related(Flight)
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .filter(flight::Column::DepartureTime.gte(now))
        .filter(flight::Column::DepartureTime.lte(now + Duration::hours(CHECK_IN_WINDOW_HOURS)))
        .order_by_asc(flight::Column::DepartureTime)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(booking, flight)| flight.map(|f| (booking, f)))
        .collect())
}

/// Check-ins that requested special assistance, most recent first.
pub async fn special_assistance_check_ins(
    db: &DatabaseConnection,
) -> Result<Vec<check_in::Model>> {
    CheckIn::find()
        .filter(check_in::Column::SpecialAssistance.ne(""))
        .order_by_desc(check_in::Column::CheckInTime)
        .all(db)
        .await
        .map_err(Into::into)
}
