//! Passenger entity - Personal, contact and travel document details.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Passenger database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "passengers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Mr, Mrs, Ms, Dr or Prof
    pub title: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: Date,
    /// M, F or O
    pub gender: String,
    #[sea_orm(unique)]
    pub passport_number: String,
    pub passport_expiry: Date,
    pub nationality: String,
    pub address: String,
    pub emergency_contact_name: String,
    pub emergency_contact_phone: String,
    pub dietary_preferences: String,
    pub mobility_assistance: bool,
    pub frequent_flyer_number: String,
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Passenger and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One passenger has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
