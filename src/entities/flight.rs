//! Flight entity - A scheduled flight and its seat inventory.
//!
//! `available_seats` is decremented by every booking and restored by every
//! cancellation; it always stays within `0..=total_seats`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Operational status of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    /// Open for booking
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "boarding")]
    Boarding,
    #[sea_orm(string_value = "departed")]
    Departed,
    #[sea_orm(string_value = "arrived")]
    Arrived,
    #[sea_orm(string_value = "delayed")]
    Delayed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl FlightStatus {
    /// Lowercase name as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Boarding => "boarding",
            Self::Departed => "departed",
            Self::Arrived => "arrived",
            Self::Delayed => "delayed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Flight database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "flights")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Carrier flight number (e.g., "BA117"), unique
    #[sea_orm(unique)]
    pub flight_number: String,
    pub airline: String,
    /// Aircraft operating this flight, if one has been allocated
    pub aircraft_id: Option<i64>,
    pub departure_city: String,
    pub arrival_city: String,
    /// IATA code, `"UNK"` when not known
    pub departure_airport: String,
    /// IATA code, `"UNK"` when not known
    pub arrival_airport: String,
    /// Scheduled departure
    pub departure_time: DateTimeUtc,
    /// Scheduled arrival
    pub arrival_time: DateTimeUtc,
    pub actual_departure: Option<DateTimeUtc>,
    pub actual_arrival: Option<DateTimeUtc>,
    pub aircraft_type: String,
    pub total_seats: i32,
    pub available_seats: i32,
    pub economy_price: f64,
    pub business_price: f64,
    pub status: FlightStatus,
    pub gate_id: Option<i64>,
    /// Denormalized gate label shown on boarding passes
    pub gate_number: Option<String>,
    pub boarding_time: Option<DateTimeUtc>,
    pub delay_reason: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Flight and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One flight has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    /// One flight has many crew assignments
    #[sea_orm(has_many = "super::crew_assignment::Entity")]
    CrewAssignments,
    #[sea_orm(
        belongs_to = "super::aircraft::Entity",
        from = "Column::AircraftId",
        to = "super::aircraft::Column::Id"
    )]
    Aircraft,
    #[sea_orm(
        belongs_to = "super::gate::Entity",
        from = "Column::GateId",
        to = "super::gate::Column::Id"
    )]
    Gate,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::crew_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrewAssignments.def()
    }
}

impl Related<super::aircraft::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Aircraft.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
