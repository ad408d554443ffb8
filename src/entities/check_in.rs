//! Check-in entity - One-to-one with a confirmed booking.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Progress of a passenger from check-in to boarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    #[sea_orm(string_value = "checked_in")]
    CheckedIn,
    #[sea_orm(string_value = "boarding_pass_issued")]
    BoardingPassIssued,
    #[sea_orm(string_value = "security_cleared")]
    SecurityCleared,
    #[sea_orm(string_value = "at_gate")]
    AtGate,
    #[sea_orm(string_value = "boarded")]
    Boarded,
    #[sea_orm(string_value = "no_show")]
    NoShow,
}

impl CheckInStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CheckedIn => "checked_in",
            Self::BoardingPassIssued => "boarding_pass_issued",
            Self::SecurityCleared => "security_cleared",
            Self::AtGate => "at_gate",
            Self::Boarded => "boarded",
            Self::NoShow => "no_show",
        }
    }
}

/// Where the passenger checked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum CheckInMethod {
    #[sea_orm(string_value = "online")]
    Online,
    #[sea_orm(string_value = "kiosk")]
    Kiosk,
    #[sea_orm(string_value = "counter")]
    Counter,
}

/// Check-in database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "check_ins")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub booking_id: i64,
    pub check_in_time: DateTimeUtc,
    pub boarding_time: Option<DateTimeUtc>,
    /// Gate at check-in time, `"TBD"` when the flight has none yet
    pub gate_number: String,
    pub seat_number: String,
    /// Checked baggage in kg
    pub baggage_weight: f64,
    pub excess_baggage_fee: f64,
    pub status: CheckInStatus,
    /// Staff member who handled a counter check-in
    pub staff_id: Option<i64>,
    pub check_in_method: CheckInMethod,
    pub special_assistance: String,
    pub notes: Option<String>,
}

/// Defines relationships between CheckIn and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::StaffId",
        to = "super::staff::Column::Id"
    )]
    Staff,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
