//! Staff entity - Employees, including flight crew with license and training dates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Job role of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    #[sea_orm(string_value = "pilot")]
    Pilot,
    #[sea_orm(string_value = "copilot")]
    Copilot,
    #[sea_orm(string_value = "cabin_crew")]
    CabinCrew,
    #[sea_orm(string_value = "ground_staff")]
    GroundStaff,
    #[sea_orm(string_value = "security")]
    Security,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "dispatcher")]
    Dispatcher,
    #[sea_orm(string_value = "gate_agent")]
    GateAgent,
    #[sea_orm(string_value = "customer_service")]
    CustomerService,
    #[sea_orm(string_value = "baggage_handler")]
    BaggageHandler,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Staff database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "staff")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    pub department: String,
    pub hire_date: Date,
    pub salary: f64,
    pub phone_number: String,
    pub address: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub license_number: String,
    pub license_expiry: Option<Date>,
    pub medical_certificate: String,
    pub medical_expiry: Option<Date>,
    /// current, expired or pending
    pub qualification_status: String,
    pub flight_hours: i32,
    pub last_training: Option<Date>,
    pub next_training_due: Option<Date>,
    pub is_active: bool,
}

/// Defines relationships between Staff and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::crew_assignment::Entity")]
    CrewAssignments,
}

impl Related<super::crew_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CrewAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
