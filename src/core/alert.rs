//! System alerts for the operations portal.

use crate::{
    core::{audit, staff::require_staff},
    entities::{ActionType, AlertType, SystemAlert, system_alert},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, warn};

const fn default_alert_type() -> AlertType {
    AlertType::Info
}

/// Alert form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertForm {
    pub title: String,
    pub message: String,
    #[serde(default = "default_alert_type")]
    pub alert_type: AlertType,
    #[serde(default)]
    pub affected_system: String,
    #[serde(default)]
    pub assigned_to: Option<i64>,
}

/// Raises a new unresolved alert.
pub async fn raise_alert(
    db: &DatabaseConnection,
    form: AlertForm,
    created_by: &str,
    now: DateTime<Utc>,
) -> Result<system_alert::Model> {
    if form.title.trim().is_empty() {
        return Err(Error::validation("title", "This field is required"));
    }
    if let Some(staff_id) = form.assigned_to {
        require_staff(db, staff_id).await?;
    }

    let model = system_alert::ActiveModel {
        title: Set(form.title.trim().to_string()),
        message: Set(form.message),
        alert_type: Set(form.alert_type),
        affected_system: Set(form.affected_system),
        created_at: Set(now),
        resolved_at: Set(None),
        is_resolved: Set(false),
        created_by: Set(created_by.to_string()),
        assigned_to: Set(form.assigned_to),
        ..Default::default()
    };
    let alert = model.insert(db).await?;
    match alert.alert_type {
        AlertType::Error | AlertType::Critical => {
            warn!(alert_id = alert.id, title = %alert.title, "Alert raised");
        }
        AlertType::Info | AlertType::Warning => {
            info!(alert_id = alert.id, title = %alert.title, "Alert raised");
        }
    }
    Ok(alert)
}

/// Newest first. `None` lists every alert.
pub async fn list_alerts(
    db: &DatabaseConnection,
    resolved: Option<bool>,
) -> Result<Vec<system_alert::Model>> {
    let mut query = SystemAlert::find();
    if let Some(resolved) = resolved {
        query = query.filter(system_alert::Column::IsResolved.eq(resolved));
    }
    query
        .order_by_desc(system_alert::Column::CreatedAt)
        .order_by_desc(system_alert::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Marks an alert resolved and records who resolved it.
pub async fn resolve_alert(
    db: &DatabaseConnection,
    alert_id: i64,
    actor: &str,
    now: DateTime<Utc>,
) -> Result<system_alert::Model> {
    let txn = db.begin().await?;
    let alert = SystemAlert::find_by_id(alert_id)
        .one(&txn)
        .await?
        .ok_or(Error::RecordNotFound {
            entity: "SystemAlert",
            id: alert_id,
        })?;
    if alert.is_resolved {
        return Err(Error::InvalidTransition {
            entity: "SystemAlert",
            from: "resolved".to_string(),
            to: "resolved".to_string(),
        });
    }

    let mut active: system_alert::ActiveModel = alert.into();
    active.is_resolved = Set(true);
    active.resolved_at = Set(Some(now));
    let resolved = active.update(&txn).await?;

    audit::record(
        &txn,
        audit::AuditEntry {
            actor: actor.to_string(),
            action_type: ActionType::Update,
            model_name: "SystemAlert",
            object_id: resolved.id.to_string(),
            description: format!("Resolved alert: {}", resolved.title),
            portal: "airline",
        },
    )
    .await?;

    txn.commit().await?;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::audit::list_entries;
    use crate::test_utils::*;

    fn alert_form(title: &str, alert_type: AlertType) -> AlertForm {
        AlertForm {
            title: title.to_string(),
            message: "Baggage belt 3 stopped".to_string(),
            alert_type,
            affected_system: "baggage".to_string(),
            assigned_to: None,
        }
    }

    #[tokio::test]
    async fn test_raise_list_and_resolve() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let first = raise_alert(&db, alert_form("Belt down", AlertType::Critical), "ops", now).await?;
        raise_alert(&db, alert_form("Slow wifi", AlertType::Info), "ops", now).await?;
        assert!(!first.is_resolved);

        assert_eq!(list_alerts(&db, Some(false)).await?.len(), 2);
        let resolved = resolve_alert(&db, first.id, "supervisor", now).await?;
        assert!(resolved.is_resolved);
        assert!(resolved.resolved_at.is_some());

        assert_eq!(list_alerts(&db, Some(false)).await?.len(), 1);
        assert_eq!(list_alerts(&db, Some(true)).await?.len(), 1);
        assert_eq!(list_alerts(&db, None).await?.len(), 2);

        let audit = list_entries(&db, Some(ActionType::Update), 1).await?;
        assert_eq!(audit.total_items, 1);
        assert_eq!(audit.items[0].actor, "supervisor");

        assert!(matches!(
            resolve_alert(&db, first.id, "supervisor", now).await,
            Err(Error::InvalidTransition { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_alert_validation() -> Result<()> {
        let db = setup_test_db().await?;
        assert!(raise_alert(&db, alert_form(" ", AlertType::Info), "ops", Utc::now()).await.is_err());

        let mut form = alert_form("Gate fault", AlertType::Warning);
        form.assigned_to = Some(42);
        assert!(matches!(
            raise_alert(&db, form, "ops", Utc::now()).await,
            Err(Error::RecordNotFound { entity: "Staff", .. })
        ));
        Ok(())
    }
}
