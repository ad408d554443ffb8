//! Staff business logic - employee records and qualification checks.

use crate::{
    core::{
        derive::{license_valid, medical_valid, needs_training},
        passenger::is_valid_phone,
    },
    entities::{Staff, StaffRole, staff},
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Staff form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct StaffForm {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    pub department: String,
    pub hire_date: NaiveDate,
    pub salary: f64,
    pub phone_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub emergency_contact: String,
    #[serde(default)]
    pub emergency_phone: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub license_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub medical_certificate: String,
    #[serde(default)]
    pub medical_expiry: Option<NaiveDate>,
    #[serde(default)]
    pub next_training_due: Option<NaiveDate>,
}

/// Adds an employee. Employee ids are unique.
pub async fn create_staff(db: &DatabaseConnection, form: StaffForm) -> Result<staff::Model> {
    let employee_id = form.employee_id.trim().to_string();
    for (field, value) in [
        ("employee_id", employee_id.as_str()),
        ("first_name", form.first_name.trim()),
        ("last_name", form.last_name.trim()),
        ("department", form.department.trim()),
    ] {
        if value.is_empty() {
            return Err(Error::validation(field, "This field is required"));
        }
    }
    if !form.salary.is_finite() || form.salary < 0.0 {
        return Err(Error::validation("salary", "Salary must be a non-negative amount"));
    }
    if !is_valid_phone(&form.phone_number) {
        return Err(Error::validation(
            "phone_number",
            "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed.",
        ));
    }

    let existing = Staff::find()
        .filter(staff::Column::EmployeeId.eq(employee_id.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Duplicate {
            field: "employee_id".to_string(),
            value: employee_id,
        });
    }

    let model = staff::ActiveModel {
        employee_id: Set(employee_id),
        first_name: Set(form.first_name.trim().to_string()),
        last_name: Set(form.last_name.trim().to_string()),
        role: Set(form.role),
        department: Set(form.department.trim().to_string()),
        hire_date: Set(form.hire_date),
        salary: Set(form.salary),
        phone_number: Set(form.phone_number.trim().to_string()),
        address: Set(form.address),
        emergency_contact: Set(form.emergency_contact),
        emergency_phone: Set(form.emergency_phone),
        license_number: Set(form.license_number),
        license_expiry: Set(form.license_expiry),
        medical_certificate: Set(form.medical_certificate),
        medical_expiry: Set(form.medical_expiry),
        qualification_status: Set("current".to_string()),
        flight_hours: Set(0),
        last_training: Set(None),
        next_training_due: Set(form.next_training_due),
        is_active: Set(true),
        ..Default::default()
    };
    let result = model.insert(db).await?;
    info!(staff_id = result.id, employee_id = %result.employee_id, "Staff member added");
    Ok(result)
}

pub async fn get_staff_by_id<C>(db: &C, staff_id: i64) -> Result<Option<staff::Model>>
where
    C: ConnectionTrait,
{
    Staff::find_by_id(staff_id).one(db).await.map_err(Into::into)
}

/// Like [`get_staff_by_id`] but a missing staff member is an error.
pub async fn require_staff<C>(db: &C, staff_id: i64) -> Result<staff::Model>
where
    C: ConnectionTrait,
{
    get_staff_by_id(db, staff_id)
        .await?
        .ok_or(Error::RecordNotFound {
            entity: "Staff",
            id: staff_id,
        })
}

/// Active staff ordered by surname, optionally one role only.
pub async fn list_active_staff(
    db: &DatabaseConnection,
    role: Option<StaffRole>,
) -> Result<Vec<staff::Model>> {
    let mut query = Staff::find().filter(staff::Column::IsActive.eq(true));
    if let Some(role) = role {
        query = query.filter(staff::Column::Role.eq(role));
    }
    query
        .order_by_asc(staff::Column::LastName)
        .order_by_asc(staff::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Records completed training and the next due date.
pub async fn record_training(
    db: &DatabaseConnection,
    staff_id: i64,
    completed_on: NaiveDate,
    next_due: NaiveDate,
) -> Result<staff::Model> {
    if next_due <= completed_on {
        return Err(Error::validation(
            "next_training_due",
            "Next training must be after the completed session",
        ));
    }
    let member = require_staff(db, staff_id).await?;
    let mut active: staff::ActiveModel = member.into();
    active.last_training = Set(Some(completed_on));
    active.next_training_due = Set(Some(next_due));
    active.update(db).await.map_err(Into::into)
}

/// Adds block hours after a completed flight.
pub async fn add_flight_hours<C>(db: &C, staff_id: i64, hours: i32) -> Result<staff::Model>
where
    C: ConnectionTrait,
{
    let member = require_staff(db, staff_id).await?;
    let total = member.flight_hours.saturating_add(hours.max(0));
    let mut active: staff::ActiveModel = member.into();
    active.flight_hours = Set(total);
    active.update(db).await.map_err(Into::into)
}

/// Days ahead of an expiry date at which it is flagged on the crew dashboard.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

/// One line of the qualifications page.
#[derive(Debug, Clone, Serialize)]
pub struct Qualification {
    pub name: &'static str,
    pub reference: String,
    pub expires: Option<NaiveDate>,
    pub valid: bool,
    /// Expires within [`EXPIRY_WARNING_DAYS`], or already has
    pub expires_soon: bool,
}

/// True when `expiry` is set and no more than [`EXPIRY_WARNING_DAYS`] away.
#[must_use]
pub fn expires_soon(expiry: Option<NaiveDate>, today: NaiveDate) -> bool {
    expiry.is_some_and(|date| (date - today).num_days() <= EXPIRY_WARNING_DAYS)
}

/// License, medical and training standing of a staff member on `today`.
#[must_use]
pub fn qualifications(member: &staff::Model, today: NaiveDate) -> Vec<Qualification> {
    vec![
        Qualification {
            name: "license",
            reference: member.license_number.clone(),
            expires: member.license_expiry,
            valid: license_valid(member, today),
            expires_soon: expires_soon(member.license_expiry, today),
        },
        Qualification {
            name: "medical",
            reference: member.medical_certificate.clone(),
            expires: member.medical_expiry,
            valid: medical_valid(member, today),
            expires_soon: expires_soon(member.medical_expiry, today),
        },
        Qualification {
            name: "training",
            reference: String::new(),
            expires: member.next_training_due,
            valid: !needs_training(member, today),
            expires_soon: expires_soon(member.next_training_due, today),
        },
    ]
}
