//! Read-only projections computed from stored records.
//!
//! Every function here is pure: the reference instant or date is passed in,
//! so results are reproducible in tests and consistent within one request.

use crate::entities::{FlightStatus, SeatClass, flight, passenger, staff};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

/// Whether the flight left later than scheduled.
#[must_use]
pub fn is_delayed(flight: &flight::Model) -> bool {
    flight
        .actual_departure
        .is_some_and(|actual| actual > flight.departure_time)
}

/// Whole minutes between scheduled and actual departure, 0 when on time.
#[must_use]
pub fn delay_minutes(flight: &flight::Model) -> i64 {
    match flight.actual_departure {
        Some(actual) if actual > flight.departure_time => {
            (actual - flight.departure_time).num_minutes()
        }
        _ => 0,
    }
}

/// Boarding state shown on departure boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardingStatus {
    Boarding,
    Departed,
    NotBoarding,
}

/// `Boarding` once the boarding time has passed, `Departed` for departed
/// flights, otherwise `NotBoarding`.
#[must_use]
pub fn boarding_status(flight: &flight::Model, now: DateTime<Utc>) -> BoardingStatus {
    if flight.boarding_time.is_some_and(|t| now >= t) {
        BoardingStatus::Boarding
    } else if flight.status == FlightStatus::Departed {
        BoardingStatus::Departed
    } else {
        BoardingStatus::NotBoarding
    }
}

/// Boarding group letter: first class boards in A, business in B, the rest in C.
#[must_use]
pub const fn boarding_group(seat_class: SeatClass) -> char {
    match seat_class {
        SeatClass::First => 'A',
        SeatClass::Business => 'B',
        SeatClass::Economy => 'C',
    }
}

/// Age in completed years on `today`.
#[must_use]
pub fn age(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let had_birthday = (today.month(), today.day()) >= (date_of_birth.month(), date_of_birth.day());
    today.year() - date_of_birth.year() - i32::from(!had_birthday)
}

/// Title, given names and surname, skipping an empty middle name.
#[must_use]
pub fn full_name(passenger: &passenger::Model) -> String {
    if passenger.middle_name.is_empty() {
        format!(
            "{} {} {}",
            passenger.title, passenger.first_name, passenger.last_name
        )
    } else {
        format!(
            "{} {} {} {}",
            passenger.title, passenger.first_name, passenger.middle_name, passenger.last_name
        )
    }
}

/// A license with no expiry on file counts as valid.
#[must_use]
pub fn license_valid(staff: &staff::Model, today: NaiveDate) -> bool {
    staff.license_expiry.is_none_or(|expiry| today < expiry)
}

/// Same rule as [`license_valid`] for the medical certificate.
#[must_use]
pub fn medical_valid(staff: &staff::Model, today: NaiveDate) -> bool {
    staff.medical_expiry.is_none_or(|expiry| today < expiry)
}

/// Training is due on or after the due date; no due date means not due.
#[must_use]
pub fn needs_training(staff: &staff::Model, today: NaiveDate) -> bool {
    staff.next_training_due.is_some_and(|due| today >= due)
}

/// Percentage of departures that left on time, 0 when there were none.
#[must_use]
pub fn on_time_percentage(total_flights: u64, on_time: u64) -> f64 {
    if total_flights == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = (on_time as f64 / total_flights as f64) * 100.0;
    pct
}

/// Booked seats as a percentage of capacity.
#[must_use]
pub fn load_factor(booked: u64, total_seats: i32) -> f64 {
    if total_seats <= 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let pct = (booked as f64 / f64::from(total_seats)) * 100.0;
    pct
}
