//! Audit trail - records who did what, for the admin portal.

use crate::{
    core::{Page, fetch_page},
    entities::{ActionType, AuditLog, audit_log},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};

/// One action to record.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub actor: String,
    pub action_type: ActionType,
    pub model_name: &'static str,
    pub object_id: String,
    pub description: String,
    pub portal: &'static str,
}

/// Appends an entry. Runs on whatever connection or transaction the caller
/// is using so the entry commits or rolls back with the action.
pub async fn record<C>(db: &C, entry: AuditEntry) -> Result<audit_log::Model>
where
    C: ConnectionTrait,
{
    let model = audit_log::ActiveModel {
        actor: Set(entry.actor),
        action_type: Set(entry.action_type),
        model_name: Set(entry.model_name.to_string()),
        object_id: Set(entry.object_id),
        description: Set(entry.description),
        timestamp: Set(Utc::now()),
        portal_used: Set(entry.portal.to_string()),
        ..Default::default()
    };
    model.insert(db).await.map_err(Into::into)
}

/// Most recent entries first, optionally only one action type.
pub async fn list_entries(
    db: &DatabaseConnection,
    action_type: Option<ActionType>,
    page: u64,
) -> Result<Page<audit_log::Model>> {
    let mut query = AuditLog::find();
    if let Some(action_type) = action_type {
        query = query.filter(audit_log::Column::ActionType.eq(action_type));
    }
    fetch_page(
        db,
        query
            .order_by_desc(audit_log::Column::Timestamp)
            .order_by_desc(audit_log::Column::Id),
        page,
        25,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_booking_actions_are_audited() -> Result<()> {
        let (db, flight, passenger) = setup_with_flight_and_passenger().await?;
        let booking = create_test_booking(&db, passenger.id, flight.id, "9A").await?;
        crate::core::booking::cancel_booking(&db, &booking.booking_reference).await?;

        let entries = list_entries(&db, Some(ActionType::Booking), 1).await?;
        assert_eq!(entries.total_items, 2);
        assert_eq!(entries.items[0].description, "Booking cancelled");
        assert_eq!(entries.items[0].object_id, booking.booking_reference);
        assert_eq!(entries.items[0].actor, format!("passenger:{}", passenger.id));

        let none = list_entries(&db, Some(ActionType::Login), 1).await?;
        assert_eq!(none.total_items, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_booking_leaves_no_audit_entry() -> Result<()> {
        let (db, flight, passenger) = setup_with_small_flight(1).await?;
        create_test_booking(&db, passenger.id, flight.id, "1A").await?;
        let _ = create_test_booking(&db, passenger.id, flight.id, "1B").await;

        let entries = list_entries(&db, None, 1).await?;
        assert_eq!(entries.total_items, 1);
        Ok(())
    }
}
