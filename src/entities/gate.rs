//! Gate entity - Terminal gates and the flight currently occupying them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "occupied")]
    Occupied,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "cleaning")]
    Cleaning,
}

impl GateStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Occupied => "occupied",
            Self::Maintenance => "maintenance",
            Self::Cleaning => "cleaning",
        }
    }
}

/// Gate database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub gate_number: String,
    pub terminal: String,
    /// Standard, Wide-body or Regional
    pub gate_type: String,
    pub capacity: i32,
    pub status: GateStatus,
    pub current_flight_id: Option<i64>,
    pub next_available: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::flight::Entity",
        from = "Column::CurrentFlightId",
        to = "super::flight::Column::Id"
    )]
    CurrentFlight,
}

impl Related<super::flight::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CurrentFlight.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
