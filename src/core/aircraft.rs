//! Fleet management.

use crate::{
    entities::{Aircraft, AircraftStatus, aircraft},
    errors::{Error, Result},
};
use chrono::{Duration, NaiveDate};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Aircraft form fields. Total seats are the sum of both cabins.
#[derive(Debug, Clone, Deserialize)]
pub struct AircraftForm {
    pub registration: String,
    pub aircraft_type: String,
    pub manufacturer: String,
    pub model: String,
    pub business_seats: i32,
    pub economy_seats: i32,
    pub year_manufactured: i32,
    pub last_maintenance: NaiveDate,
    pub next_maintenance: NaiveDate,
    #[serde(default)]
    pub current_location: String,
}

fn validate_aircraft_form(form: &AircraftForm) -> Result<()> {
    for (field, value) in [
        ("registration", form.registration.trim()),
        ("aircraft_type", form.aircraft_type.trim()),
        ("manufacturer", form.manufacturer.trim()),
        ("model", form.model.trim()),
    ] {
        if value.is_empty() {
            return Err(Error::validation(field, "This field is required"));
        }
    }
    if form.business_seats < 0 || form.economy_seats < 0 {
        return Err(Error::validation("economy_seats", "Seat counts cannot be negative"));
    }
    if form.business_seats + form.economy_seats == 0 {
        return Err(Error::validation("economy_seats", "Aircraft must have seats"));
    }
    if form.next_maintenance <= form.last_maintenance {
        return Err(Error::validation(
            "next_maintenance",
            "Next maintenance must be after the last one",
        ));
    }
    Ok(())
}

/// Registers an aircraft. Registrations are stored upper-case and unique.
pub async fn create_aircraft(db: &DatabaseConnection, form: AircraftForm) -> Result<aircraft::Model> {
    validate_aircraft_form(&form)?;
    let registration = form.registration.trim().to_uppercase();
    if find_aircraft_by_registration(db, &registration).await?.is_some() {
        return Err(Error::Duplicate {
            field: "registration".to_string(),
            value: registration,
        });
    }

    let model = aircraft::ActiveModel {
        registration: Set(registration),
        aircraft_type: Set(form.aircraft_type.trim().to_string()),
        manufacturer: Set(form.manufacturer.trim().to_string()),
        model: Set(form.model.trim().to_string()),
        total_seats: Set(form.business_seats + form.economy_seats),
        business_seats: Set(form.business_seats),
        economy_seats: Set(form.economy_seats),
        year_manufactured: Set(form.year_manufactured),
        last_maintenance: Set(form.last_maintenance),
        next_maintenance: Set(form.next_maintenance),
        status: Set(AircraftStatus::Active),
        current_location: Set(form.current_location),
        ..Default::default()
    };
    let result = model.insert(db).await?;
    info!(registration = %result.registration, "Aircraft registered");
    Ok(result)
}

pub async fn find_aircraft_by_registration(
    db: &DatabaseConnection,
    registration: &str,
) -> Result<Option<aircraft::Model>> {
    Aircraft::find()
        .filter(aircraft::Column::Registration.eq(registration.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn require_aircraft(db: &DatabaseConnection, aircraft_id: i64) -> Result<aircraft::Model> {
    Aircraft::find_by_id(aircraft_id)
        .one(db)
        .await?
        .ok_or(Error::RecordNotFound {
            entity: "Aircraft",
            id: aircraft_id,
        })
}

/// The flying fleet, ordered by registration.
pub async fn list_active_aircraft(db: &DatabaseConnection) -> Result<Vec<aircraft::Model>> {
    Aircraft::find()
        .filter(aircraft::Column::Status.eq(AircraftStatus::Active))
        .order_by_asc(aircraft::Column::Registration)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Every aircraft regardless of status.
pub async fn list_aircraft(db: &DatabaseConnection) -> Result<Vec<aircraft::Model>> {
    Aircraft::find()
        .order_by_asc(aircraft::Column::Registration)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retired aircraft stay retired.
pub async fn set_aircraft_status(
    db: &DatabaseConnection,
    aircraft_id: i64,
    status: AircraftStatus,
) -> Result<aircraft::Model> {
    let current = require_aircraft(db, aircraft_id).await?;
    if current.status == AircraftStatus::Retired && status != AircraftStatus::Retired {
        return Err(Error::InvalidTransition {
            entity: "Aircraft",
            from: current.status.as_str().to_string(),
            to: status.as_str().to_string(),
        });
    }

    let mut active: aircraft::ActiveModel = current.into();
    active.status = Set(status);
    let updated = active.update(db).await?;
    info!(registration = %updated.registration, status = status.as_str(), "Aircraft status changed");
    Ok(updated)
}

/// Active aircraft whose next maintenance falls within `days` of `today`.
pub async fn maintenance_due(
    db: &DatabaseConnection,
    today: NaiveDate,
    days: i64,
) -> Result<Vec<aircraft::Model>> {
    Aircraft::find()
        .filter(aircraft::Column::Status.eq(AircraftStatus::Active))
        .filter(aircraft::Column::NextMaintenance.lte(today + Duration::days(days)))
        .order_by_asc(aircraft::Column::NextMaintenance)
        .all(db)
        .await
        .map_err(Into::into)
}
