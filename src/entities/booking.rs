//! Booking entity - A passenger's reservation of one seat on one flight.
//!
//! Each booking carries a random 8-character `booking_reference` that is unique
//! across all bookings, and `(flight_id, seat_number)` is unique per flight.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    /// Awaiting payment
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "checked_in")]
    CheckedIn,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// The flight has arrived
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl BookingStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::CheckedIn => "checked_in",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

/// Cabin the seat was sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum SeatClass {
    #[sea_orm(string_value = "economy")]
    Economy,
    #[sea_orm(string_value = "business")]
    Business,
    #[sea_orm(string_value = "first")]
    First,
}

/// Booking database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub booking_reference: String,
    pub passenger_id: i64,
    pub flight_id: i64,
    pub seat_number: String,
    pub seat_class: SeatClass,
    pub booking_date: DateTimeUtc,
    pub status: BookingStatus,
    pub base_price: f64,
    pub taxes_fees: f64,
    pub total_amount: f64,
    /// True once the booking has been paid for
    pub payment_status: bool,
    pub payment_method: String,
    pub payment_reference: String,
    pub special_requests: Option<String>,
    pub meal_preference: String,
    pub seat_preference: String,
    /// Checked baggage allowance in kg
    pub baggage_allowance: i32,
    /// Extra baggage purchased in kg
    pub extra_baggage: i32,
    pub insurance_opted: bool,
}

/// Defines relationships between Booking and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::passenger::Entity",
        from = "Column::PassengerId",
        to = "super::passenger::Column::Id"
    )]
    Passenger,
    #[sea_orm(
        belongs_to = "super::flight::Entity",
        from = "Column::FlightId",
        to = "super::flight::Column::Id"
    )]
    Flight,
    /// At most one check-in per booking
    #[sea_orm(has_one = "super::check_in::Entity")]
    CheckIn,
}

impl Related<super::passenger::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Passenger.def()
    }
}

impl Related<super::flight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flight.def()
    }
}

impl Related<super::check_in::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckIn.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
