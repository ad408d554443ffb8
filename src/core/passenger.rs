//! Passenger business logic - registration, updates and staff-side search.

use crate::{
    core::{Page, fetch_page},
    entities::{Passenger, passenger},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use regex::Regex;
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::info;

/// Passengers per page in the staff listing.
pub const LIST_PAGE_SIZE: u64 = 15;

#[allow(clippy::expect_used)]
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?1?\d{9,15}$").expect("valid phone pattern"));
#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));

const TITLES: [&str; 5] = ["Mr", "Mrs", "Ms", "Dr", "Prof"];
const GENDERS: [&str; 3] = ["M", "F", "O"];

fn default_title() -> String {
    "Mr".to_string()
}

fn default_passport_expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 1).unwrap_or_default()
}

/// Passenger form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct PassengerForm {
    #[serde(default = "default_title")]
    pub title: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub passport_number: String,
    #[serde(default = "default_passport_expiry")]
    pub passport_expiry: NaiveDate,
    pub nationality: String,
    pub address: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
    #[serde(default)]
    pub dietary_preferences: String,
    #[serde(default, deserialize_with = "super::deserialize_checkbox")]
    pub mobility_assistance: bool,
    #[serde(default)]
    pub frequent_flyer_number: String,
}

/// Optional `+`, optional leading 1, then 9 to 15 digits.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone.trim())
}

/// Field-level checks shared by create and update.
pub fn validate_passenger_form(form: &PassengerForm) -> Result<()> {
    for (field, value) in [
        ("first_name", &form.first_name),
        ("last_name", &form.last_name),
        ("nationality", &form.nationality),
        ("address", &form.address),
        ("passport_number", &form.passport_number),
    ] {
        if value.trim().is_empty() {
            return Err(Error::validation(field, "This field is required"));
        }
    }
    if !TITLES.contains(&form.title.as_str()) {
        return Err(Error::validation("title", "Select a valid title"));
    }
    if !GENDERS.contains(&form.gender.as_str()) {
        return Err(Error::validation("gender", "Select a valid gender"));
    }
    if !EMAIL_RE.is_match(form.email.trim()) {
        return Err(Error::validation("email", "Enter a valid email address"));
    }
    if !is_valid_phone(&form.phone_number) {
        return Err(Error::validation(
            "phone_number",
            "Phone number must be entered in the format: '+999999999'. Up to 15 digits allowed.",
        ));
    }
    if form.date_of_birth > Utc::now().date_naive() {
        return Err(Error::validation(
            "date_of_birth",
            "Date of birth cannot be in the future",
        ));
    }
    Ok(())
}

async fn ensure_unique(
    db: &DatabaseConnection,
    form: &PassengerForm,
    exclude_id: Option<i64>,
) -> Result<()> {
    let checks = [
        ("email", passenger::Column::Email, form.email.trim()),
        (
            "passport_number",
            passenger::Column::PassportNumber,
            form.passport_number.trim(),
        ),
    ];
    for (field, column, value) in checks {
        let mut query = Passenger::find().filter(column.eq(value));
        if let Some(id) = exclude_id {
            query = query.filter(passenger::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(Error::Duplicate {
                field: field.to_string(),
                value: value.to_string(),
            });
        }
    }
    Ok(())
}

fn apply_form(active: &mut passenger::ActiveModel, form: PassengerForm) {
    active.title = Set(form.title);
    active.first_name = Set(form.first_name.trim().to_string());
    active.middle_name = Set(form.middle_name.trim().to_string());
    active.last_name = Set(form.last_name.trim().to_string());
    active.email = Set(form.email.trim().to_string());
    active.phone_number = Set(form.phone_number.trim().to_string());
    active.date_of_birth = Set(form.date_of_birth);
    active.gender = Set(form.gender);
    active.passport_number = Set(form.passport_number.trim().to_string());
    active.passport_expiry = Set(form.passport_expiry);
    active.nationality = Set(form.nationality);
    active.address = Set(form.address);
    active.emergency_contact_name = Set(form.emergency_contact_name);
    active.emergency_contact_phone = Set(form.emergency_contact_phone);
    active.dietary_preferences = Set(form.dietary_preferences);
    active.mobility_assistance = Set(form.mobility_assistance);
    active.frequent_flyer_number = Set(form.frequent_flyer_number);
}

/// Registers a passenger. Email and passport number must be unused.
pub async fn create_passenger(
    db: &DatabaseConnection,
    form: PassengerForm,
) -> Result<passenger::Model> {
    validate_passenger_form(&form)?;
    ensure_unique(db, &form, None).await?;

    let mut active = passenger::ActiveModel {
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    apply_form(&mut active, form);

    let result = active.insert(db).await?;
    info!(passenger_id = result.id, "Passenger created");
    Ok(result)
}

/// Replaces a passenger's details.
pub async fn update_passenger(
    db: &DatabaseConnection,
    passenger_id: i64,
    form: PassengerForm,
) -> Result<passenger::Model> {
    validate_passenger_form(&form)?;
    let existing = require_passenger(db, passenger_id).await?;
    ensure_unique(db, &form, Some(passenger_id)).await?;

    let mut active: passenger::ActiveModel = existing.into();
    apply_form(&mut active, form);
    active.update(db).await.map_err(Into::into)
}

pub async fn get_passenger_by_id<C>(db: &C, passenger_id: i64) -> Result<Option<passenger::Model>>
where
    C: ConnectionTrait,
{
    Passenger::find_by_id(passenger_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`get_passenger_by_id`] but a missing passenger is an error.
pub async fn require_passenger<C>(db: &C, passenger_id: i64) -> Result<passenger::Model>
where
    C: ConnectionTrait,
{
    get_passenger_by_id(db, passenger_id)
        .await?
        .ok_or(Error::PassengerNotFound { id: passenger_id })
}

/// Passengers ordered by surname then given name, optionally filtered by
/// a substring of the name, email or passport number.
pub async fn list_passengers(
    db: &DatabaseConnection,
    search: Option<&str>,
    page: u64,
) -> Result<Page<passenger::Model>> {
    let mut query = Passenger::find();
    if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(passenger::Column::FirstName.contains(term))
                .add(passenger::Column::LastName.contains(term))
                .add(passenger::Column::Email.contains(term))
                .add(passenger::Column::PassportNumber.contains(term)),
        );
    }
    let query = query
        .order_by_asc(passenger::Column::LastName)
        .order_by_asc(passenger::Column::FirstName);
    fetch_page(db, query, page, LIST_PAGE_SIZE).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn test_phone_validation() {
        let mut form = passenger_form("Ada", "Lovelace", "ada@example.com", "P1000");
        for ok in ["+441234567890", "123456789", "+1123456789012345"] {
            form.phone_number = ok.to_string();
            assert!(validate_passenger_form(&form).is_ok(), "{ok}");
        }
        for bad in ["12345", "+44 1234 567890", "phone", "+12345678901234567"] {
            form.phone_number = bad.to_string();
            assert!(validate_passenger_form(&form).is_err(), "{bad}");
        }
    }

    #[test]
    fn test_choice_and_email_validation() {
        let mut form = passenger_form("Ada", "Lovelace", "ada@example.com", "P1000");
        form.title = "Sir".to_string();
        assert!(matches!(
            validate_passenger_form(&form),
            Err(Error::Validation { ref field, .. }) if field == "title"
        ));

        let mut form = passenger_form("Ada", "Lovelace", "not-an-email", "P1000");
        form.gender = "F".to_string();
        assert!(matches!(
            validate_passenger_form(&form),
            Err(Error::Validation { ref field, .. }) if field == "email"
        ));
    }

    #[tokio::test]
    async fn test_create_passenger_uniqueness() -> Result<()> {
        let db = setup_test_db().await?;
        create_passenger(&db, passenger_form("Ada", "Lovelace", "ada@example.com", "P1"))
            .await?;

        let same_email =
            create_passenger(&db, passenger_form("Bob", "Smith", "ada@example.com", "P2")).await;
        assert!(matches!(
            same_email,
            Err(Error::Duplicate { ref field, .. }) if field == "email"
        ));

        let same_passport =
            create_passenger(&db, passenger_form("Bob", "Smith", "bob@example.com", "P1")).await;
        assert!(matches!(
            same_passport,
            Err(Error::Duplicate { ref field, .. }) if field == "passport_number"
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_passenger_keeps_own_email() -> Result<()> {
        let db = setup_test_db().await?;
        let created =
            create_passenger(&db, passenger_form("Ada", "Lovelace", "ada@example.com", "P1"))
                .await?;

        let mut form = passenger_form("Ada", "King", "ada@example.com", "P1");
        form.middle_name = "Augusta".to_string();
        let updated = update_passenger(&db, created.id, form).await?;
        assert_eq!(updated.last_name, "King");
        assert_eq!(
            crate::core::derive::full_name(&updated),
            "Mr Ada Augusta King"
        );

        let missing = update_passenger(
            &db,
            999,
            passenger_form("X", "Y", "x@example.com", "P9"),
        )
        .await;
        assert!(matches!(missing, Err(Error::PassengerNotFound { id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_passengers_search_and_order() -> Result<()> {
        let db = setup_test_db().await?;
        create_passenger(&db, passenger_form("Zoe", "Adams", "zoe@example.com", "P1")).await?;
        create_passenger(&db, passenger_form("Amy", "Adams", "amy@example.com", "P2")).await?;
        create_passenger(&db, passenger_form("Carl", "Brown", "carl@example.com", "X3")).await?;

        let all = list_passengers(&db, None, 1).await?;
        let names: Vec<_> = all.items.iter().map(|p| p.first_name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "Zoe", "Carl"]);

        let found = list_passengers(&db, Some("x3"), 1).await?;
        assert_eq!(found.items.len(), 1);
        assert_eq!(found.items[0].last_name, "Brown");
        Ok(())
    }
}
