//! Audit log entity - Append-only record of significant actions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    #[sea_orm(string_value = "create")]
    Create,
    #[sea_orm(string_value = "update")]
    Update,
    #[sea_orm(string_value = "delete")]
    Delete,
    #[sea_orm(string_value = "login")]
    Login,
    #[sea_orm(string_value = "logout")]
    Logout,
    #[sea_orm(string_value = "booking")]
    Booking,
    #[sea_orm(string_value = "checkin")]
    Checkin,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Audit log database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Who performed the action
    pub actor: String,
    pub action_type: ActionType,
    pub model_name: String,
    pub object_id: String,
    pub description: String,
    pub timestamp: DateTimeUtc,
    /// customer, airline, crew or admin
    pub portal_used: String,
}

/// `AuditLog` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
