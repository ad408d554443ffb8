//! Shared test utilities for SkyPort.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        aircraft::AircraftForm,
        booking::{BookingRequest, create_booking},
        crew::AssignmentRequest,
        flight::{NewFlight, create_flight},
        gate::GateForm,
        passenger::{PassengerForm, create_passenger},
        staff::{StaffForm, create_staff},
    },
    entities::{
        BookingStatus, FlightStatus, SeatClass, StaffRole, booking, flight, passenger, staff,
    },
    errors::Result,
    web::{AppState, router},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Full router over a fresh in-memory database. The connection is returned so
/// tests can arrange fixtures behind the handlers' backs.
pub async fn setup_test_app() -> Result<(Router, DatabaseConnection)> {
    let db = setup_test_db().await?;
    Ok((router(AppState::new(db.clone())), db))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap_or_else(|e| match e {});
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// GET `uri`; the body is `Value::Null` when it is not JSON.
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::get(uri).body(Body::empty()).unwrap_or_default();
    send(app, request).await
}

/// POST a url-encoded form body to `uri`.
pub async fn post_form(app: &Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap_or_default();
    send(app, request).await
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Flight form input departing at `departure_time`.
///
/// # Defaults
/// * route: London (LHR) to New York (JFK), three hours
/// * `total_seats`: 180, all available
/// * `economy_price`: 200.0, `business_price`: 800.0
pub fn new_flight_input(flight_number: &str, departure_time: DateTime<Utc>) -> NewFlight {
    NewFlight {
        flight_number: flight_number.to_string(),
        airline: "SkyPort Air".to_string(),
        aircraft_id: None,
        departure_city: "London".to_string(),
        arrival_city: "New York".to_string(),
        departure_airport: Some("LHR".to_string()),
        arrival_airport: Some("JFK".to_string()),
        departure_time,
        arrival_time: departure_time + Duration::hours(3),
        aircraft_type: "Boeing 737".to_string(),
        total_seats: 180,
        available_seats: None,
        economy_price: 200.0,
        business_price: 800.0,
    }
}

/// Passenger form with valid defaults for everything but the identifying fields.
pub fn passenger_form(first_name: &str, last_name: &str, email: &str, passport: &str) -> PassengerForm {
    PassengerForm {
        title: "Mr".to_string(),
        first_name: first_name.to_string(),
        middle_name: String::new(),
        last_name: last_name.to_string(),
        email: email.to_string(),
        phone_number: "+447700900123".to_string(),
        date_of_birth: date(1990, 5, 17),
        gender: "M".to_string(),
        passport_number: passport.to_string(),
        passport_expiry: date(2032, 1, 1),
        nationality: "British".to_string(),
        address: "1 Runway Road, London".to_string(),
        emergency_contact_name: String::new(),
        emergency_contact_phone: String::new(),
        dietary_preferences: String::new(),
        mobility_assistance: false,
        frequent_flyer_number: String::new(),
    }
}

/// Staff form for an active employee with no expiry dates on file.
pub fn staff_form(employee_id: &str, role: StaffRole) -> StaffForm {
    StaffForm {
        employee_id: employee_id.to_string(),
        first_name: "Amelia".to_string(),
        last_name: format!("Crew{employee_id}"),
        role,
        department: "Flight Operations".to_string(),
        hire_date: date(2020, 3, 1),
        salary: 85_000.0,
        phone_number: "+15551234567".to_string(),
        address: String::new(),
        emergency_contact: String::new(),
        emergency_phone: String::new(),
        license_number: format!("LIC-{employee_id}"),
        license_expiry: None,
        medical_certificate: String::new(),
        medical_expiry: None,
        next_training_due: None,
    }
}

pub async fn create_test_staff(
    db: &DatabaseConnection,
    employee_id: &str,
    role: StaffRole,
) -> Result<staff::Model> {
    create_staff(db, staff_form(employee_id, role)).await
}

pub fn assignment_request(staff_id: i64, flight_id: i64) -> AssignmentRequest {
    AssignmentRequest {
        staff_id,
        flight_id,
        role_on_flight: "Captain".to_string(),
    }
}

pub fn gate_form(gate_number: &str, terminal: &str) -> GateForm {
    GateForm {
        gate_number: gate_number.to_string(),
        terminal: terminal.to_string(),
        gate_type: "Standard".to_string(),
        capacity: 200,
    }
}

pub fn aircraft_form(registration: &str) -> AircraftForm {
    AircraftForm {
        registration: registration.to_string(),
        aircraft_type: "Boeing 737".to_string(),
        manufacturer: "Boeing".to_string(),
        model: "737-800".to_string(),
        business_seats: 16,
        economy_seats: 150,
        year_manufactured: 2015,
        last_maintenance: date(2026, 1, 1),
        next_maintenance: date(2027, 1, 1),
        current_location: "LHR".to_string(),
    }
}

/// Books `seat_number` in economy for the passenger.
pub async fn create_test_booking(
    db: &DatabaseConnection,
    passenger_id: i64,
    flight_id: i64,
    seat_number: &str,
) -> Result<booking::Model> {
    let mut request = BookingRequest::new(passenger_id, flight_id);
    request.seat_number = Some(seat_number.to_string());
    create_booking(db, request).await
}

/// Sets up a database with one flight departing in three days.
pub async fn setup_with_flight() -> Result<(DatabaseConnection, flight::Model)> {
    let db = setup_test_db().await?;
    let flight = create_flight(&db, new_flight_input("SK100", Utc::now() + Duration::days(3))).await?;
    Ok((db, flight))
}

/// Sets up a flight departing in three days and a passenger to book on it.
pub async fn setup_with_flight_and_passenger()
-> Result<(DatabaseConnection, flight::Model, passenger::Model)> {
    let (db, flight) = setup_with_flight().await?;
    let passenger = create_passenger(
        &db,
        passenger_form("Ada", "Lovelace", "ada@example.com", "P1000"),
    )
    .await?;
    Ok((db, flight, passenger))
}

/// Like [`setup_with_flight_and_passenger`] with only `seats` seats on the flight.
pub async fn setup_with_small_flight(
    seats: i32,
) -> Result<(DatabaseConnection, flight::Model, passenger::Model)> {
    let db = setup_test_db().await?;
    let mut input = new_flight_input("SK200", Utc::now() + Duration::days(3));
    input.total_seats = seats;
    let flight = create_flight(&db, input).await?;
    let passenger = create_passenger(
        &db,
        passenger_form("Grace", "Hopper", "grace@example.com", "P2000"),
    )
    .await?;
    Ok((db, flight, passenger))
}

/// Unsaved flight model for pure-function tests. Departs 2026-11-01 10:00 UTC.
pub fn sample_flight_model() -> flight::Model {
    let departure = Utc
        .with_ymd_and_hms(2026, 11, 1, 10, 0, 0)
        .single()
        .unwrap_or_default();
    flight::Model {
        id: 1,
        flight_number: "SK100".to_string(),
        airline: "SkyPort Air".to_string(),
        aircraft_id: None,
        departure_city: "London".to_string(),
        arrival_city: "New York".to_string(),
        departure_airport: "LHR".to_string(),
        arrival_airport: "JFK".to_string(),
        departure_time: departure,
        arrival_time: departure + Duration::hours(3),
        actual_departure: None,
        actual_arrival: None,
        aircraft_type: "Boeing 737".to_string(),
        total_seats: 180,
        available_seats: 180,
        economy_price: 200.0,
        business_price: 800.0,
        status: FlightStatus::Scheduled,
        gate_id: None,
        gate_number: None,
        boarding_time: None,
        delay_reason: String::new(),
        created_at: departure - Duration::days(30),
        updated_at: departure - Duration::days(30),
    }
}

/// Unsaved pending economy booking on `flight_id`.
pub fn sample_booking_model(flight_id: i64) -> booking::Model {
    booking::Model {
        id: 1,
        booking_reference: "ABCD1234".to_string(),
        passenger_id: 1,
        flight_id,
        seat_number: "1A".to_string(),
        seat_class: SeatClass::Economy,
        booking_date: Utc::now(),
        status: BookingStatus::Pending,
        base_price: 200.0,
        taxes_fees: 30.0,
        total_amount: 230.0,
        payment_status: false,
        payment_method: String::new(),
        payment_reference: String::new(),
        special_requests: None,
        meal_preference: String::new(),
        seat_preference: String::new(),
        baggage_allowance: 20,
        extra_baggage: 0,
        insurance_opted: false,
    }
}

/// Unsaved active pilot with no expiry dates on file.
pub fn sample_staff_model() -> staff::Model {
    staff::Model {
        id: 1,
        employee_id: "E001".to_string(),
        first_name: "Amelia".to_string(),
        last_name: "Earhart".to_string(),
        role: StaffRole::Pilot,
        department: "Flight Operations".to_string(),
        hire_date: date(2020, 3, 1),
        salary: 85_000.0,
        phone_number: "+15551234567".to_string(),
        address: String::new(),
        emergency_contact: String::new(),
        emergency_phone: String::new(),
        license_number: "LIC-E001".to_string(),
        license_expiry: None,
        medical_certificate: String::new(),
        medical_expiry: None,
        qualification_status: "current".to_string(),
        flight_hours: 1200,
        last_training: None,
        next_training_due: None,
        is_active: true,
    }
}
