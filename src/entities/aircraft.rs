//! Aircraft entity - The airline's fleet.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AircraftStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "grounded")]
    Grounded,
    #[sea_orm(string_value = "retired")]
    Retired,
}

impl AircraftStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::Grounded => "grounded",
            Self::Retired => "retired",
        }
    }
}

/// Aircraft database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "aircraft")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tail number, unique
    #[sea_orm(unique)]
    pub registration: String,
    pub aircraft_type: String,
    pub manufacturer: String,
    pub model: String,
    pub total_seats: i32,
    pub business_seats: i32,
    pub economy_seats: i32,
    pub year_manufactured: i32,
    pub last_maintenance: Date,
    pub next_maintenance: Date,
    pub status: AircraftStatus,
    pub current_location: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::flight::Entity")]
    Flights,
}

impl Related<super::flight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flights.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
