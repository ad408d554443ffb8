//! Core business logic - framework-agnostic operations over the entities.
//!
//! Every operation takes a database connection (or transaction) and returns
//! [`crate::errors::Result`]; the web layer only parses input and shapes output.

pub mod aircraft;
pub mod alert;
pub mod audit;
pub mod booking;
pub mod check_in;
pub mod crew;
pub mod derive;
pub mod flight;
pub mod gate;
pub mod passenger;
pub mod report;
pub mod seed;
pub mod staff;

use crate::errors::Result;
use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, Select};
use serde::{Deserialize, Deserializer, Serialize, de};

/// One page of a listing. Pages are numbered from 1.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

/// Fetches page `page` of `query`, clamping out-of-range page numbers to the
/// nearest existing page.
pub async fn fetch_page<C, E>(
    db: &C,
    query: Select<E>,
    page: u64,
    per_page: u64,
) -> Result<Page<E::Model>>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: Sync,
{
    let paginator = query.paginate(db, per_page);
    let totals = paginator.num_items_and_pages().await?;
    let page = page.clamp(1, totals.number_of_pages.max(1));
    let items = paginator.fetch_page(page - 1).await?;

    Ok(Page {
        items,
        page,
        per_page,
        total_items: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

/// Reads a form checkbox. Browsers submit `on` for a ticked box and omit the
/// field otherwise, so pair this with `#[serde(default)]`.
pub fn deserialize_checkbox<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    match value.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" | "" => Ok(false),
        other => Err(de::Error::invalid_value(
            de::Unexpected::Str(other),
            &"a checkbox value",
        )),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Ticked {
        #[serde(default, deserialize_with = "deserialize_checkbox")]
        flag: bool,
    }

    fn parse(body: &str) -> serde_json::Result<Ticked> {
        serde_json::from_str(body)
    }

    #[test]
    fn test_checkbox_values() {
        assert!(parse(r#"{"flag":"on"}"#).unwrap().flag);
        assert!(parse(r#"{"flag":"true"}"#).unwrap().flag);
        assert!(!parse(r#"{"flag":"off"}"#).unwrap().flag);
        assert!(!parse("{}").unwrap().flag);
        assert!(parse(r#"{"flag":"maybe"}"#).is_err());
    }
}
