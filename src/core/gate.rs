//! Gate management - terminal gates and which flight occupies them.

use crate::{
    core::{audit, flight::require_flight},
    entities::{ActionType, Gate, GateStatus, flight, gate},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

fn default_gate_type() -> String {
    "Standard".to_string()
}

const fn default_capacity() -> i32 {
    200
}

/// Gate form fields.
#[derive(Debug, Clone, Deserialize)]
pub struct GateForm {
    pub gate_number: String,
    pub terminal: String,
    #[serde(default = "default_gate_type")]
    pub gate_type: String,
    #[serde(default = "default_capacity")]
    pub capacity: i32,
}

pub async fn create_gate(db: &DatabaseConnection, form: GateForm) -> Result<gate::Model> {
    let gate_number = form.gate_number.trim().to_uppercase();
    if gate_number.is_empty() {
        return Err(Error::validation("gate_number", "This field is required"));
    }
    if form.terminal.trim().is_empty() {
        return Err(Error::validation("terminal", "This field is required"));
    }
    if form.capacity <= 0 {
        return Err(Error::validation("capacity", "Capacity must be positive"));
    }
    if find_gate_by_number(db, &gate_number).await?.is_some() {
        return Err(Error::Duplicate {
            field: "gate_number".to_string(),
            value: gate_number,
        });
    }

    let model = gate::ActiveModel {
        gate_number: Set(gate_number),
        terminal: Set(form.terminal.trim().to_string()),
        gate_type: Set(form.gate_type),
        capacity: Set(form.capacity),
        status: Set(GateStatus::Available),
        current_flight_id: Set(None),
        next_available: Set(None),
        ..Default::default()
    };
    let result = model.insert(db).await?;
    info!(gate = %result.gate_number, "Gate created");
    Ok(result)
}

pub async fn find_gate_by_number<C>(db: &C, gate_number: &str) -> Result<Option<gate::Model>>
where
    C: ConnectionTrait,
{
    Gate::find()
        .filter(gate::Column::GateNumber.eq(gate_number.trim().to_uppercase()))
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn require_gate<C>(db: &C, gate_id: i64) -> Result<gate::Model>
where
    C: ConnectionTrait,
{
    Gate::find_by_id(gate_id)
        .one(db)
        .await?
        .ok_or(Error::RecordNotFound {
            entity: "Gate",
            id: gate_id,
        })
}

/// All gates by terminal then number.
pub async fn list_gates(db: &DatabaseConnection) -> Result<Vec<gate::Model>> {
    Gate::find()
        .order_by_asc(gate::Column::Terminal)
        .order_by_asc(gate::Column::GateNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sets a gate's status by hand. `occupied` is only reached through
/// [`assign_gate`]; any other status frees the gate of its flight.
pub async fn set_gate_status(
    db: &DatabaseConnection,
    gate_id: i64,
    status: GateStatus,
) -> Result<gate::Model> {
    let gate = require_gate(db, gate_id).await?;
    if status == GateStatus::Occupied {
        return Err(Error::InvalidTransition {
            entity: "Gate",
            from: gate.status.as_str().to_string(),
            to: status.as_str().to_string(),
        });
    }

    let mut active: gate::ActiveModel = gate.into();
    active.status = Set(status);
    active.current_flight_id = Set(None);
    active.update(db).await.map_err(Into::into)
}

/// Puts a flight at an available gate. The gate becomes occupied and the
/// flight records the gate id and number. A gate the flight held before is
/// freed for cleaning.
#[instrument(skip(db))]
pub async fn assign_gate(
    db: &DatabaseConnection,
    gate_id: i64,
    flight_id: i64,
) -> Result<(gate::Model, flight::Model)> {
    let txn = db.begin().await?;
    let gate = require_gate(&txn, gate_id).await?;
    let flight = require_flight(&txn, flight_id).await?;

    if gate.status != GateStatus::Available {
        return Err(Error::InvalidTransition {
            entity: "Gate",
            from: gate.status.as_str().to_string(),
            to: GateStatus::Occupied.as_str().to_string(),
        });
    }

    if let Some(previous_id) = flight.gate_id.filter(|id| *id != gate_id) {
        let previous = require_gate(&txn, previous_id).await?;
        if previous.current_flight_id == Some(flight_id) {
            let mut previous: gate::ActiveModel = previous.into();
            previous.status = Set(GateStatus::Cleaning);
            previous.current_flight_id = Set(None);
            previous.update(&txn).await?;
        }
    }

    let gate_number = gate.gate_number.clone();
    let departure = flight.departure_time;
    let mut active_gate: gate::ActiveModel = gate.into();
    active_gate.status = Set(GateStatus::Occupied);
    active_gate.current_flight_id = Set(Some(flight_id));
    active_gate.next_available = Set(Some(departure));
    let gate = active_gate.update(&txn).await?;

    let mut active_flight: flight::ActiveModel = flight.into();
    active_flight.gate_id = Set(Some(gate_id));
    active_flight.gate_number = Set(Some(gate_number));
    active_flight.updated_at = Set(Utc::now());
    let flight = active_flight.update(&txn).await?;

    audit::record(
        &txn,
        audit::AuditEntry {
            actor: "operations".to_string(),
            action_type: ActionType::Update,
            model_name: "Gate",
            object_id: gate.id.to_string(),
            description: format!("Assigned flight {} to gate {}", flight.flight_number, gate.gate_number),
            portal: "airline",
        },
    )
    .await?;

    txn.commit().await?;
    info!(gate = %gate.gate_number, flight = %flight.flight_number, "Gate assigned");
    Ok((gate, flight))
}

/// Frees an occupied gate. The flight keeps its gate number for the record.
pub async fn release_gate(db: &DatabaseConnection, gate_id: i64) -> Result<gate::Model> {
    let gate = require_gate(db, gate_id).await?;
    let mut active: gate::ActiveModel = gate.into();
    active.status = Set(GateStatus::Available);
    active.current_flight_id = Set(None);
    active.next_available = Set(None);
    active.update(db).await.map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::flight::{create_flight, get_flight_by_id};
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_create_gate_normalizes_and_rejects_duplicates() -> Result<()> {
        let db = setup_test_db().await?;
        let gate = create_gate(&db, gate_form("a1", "A")).await?;
        assert_eq!(gate.gate_number, "A1");
        assert_eq!(gate.status, GateStatus::Available);

        let again = create_gate(&db, gate_form("A1", "A")).await;
        assert!(matches!(again, Err(Error::Duplicate { .. })));
        assert!(find_gate_by_number(&db, "a1").await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_assign_gate_links_flight_and_gate() -> Result<()> {
        let (db, flight) = setup_with_flight().await?;
        let gate = create_gate(&db, gate_form("B2", "B")).await?;

        let (gate, updated) = assign_gate(&db, gate.id, flight.id).await?;
        assert_eq!(gate.status, GateStatus::Occupied);
        assert_eq!(gate.current_flight_id, Some(flight.id));
        assert_eq!(updated.gate_id, Some(gate.id));
        assert_eq!(updated.gate_number.as_deref(), Some("B2"));

        // Occupied gates take no second flight.
        let other = create_flight(&db, new_flight_input("SK999", Utc::now() + Duration::days(1))).await?;
        assert!(matches!(
            assign_gate(&db, gate.id, other.id).await,
            Err(Error::InvalidTransition { .. })
        ));

        let released = release_gate(&db, gate.id).await?;
        assert_eq!(released.status, GateStatus::Available);
        assert_eq!(released.current_flight_id, None);
        let kept = get_flight_by_id(&db, flight.id).await?.unwrap();
        assert_eq!(kept.gate_number.as_deref(), Some("B2"));
        Ok(())
    }

    #[tokio::test]
    async fn test_reassigning_flight_frees_previous_gate() -> Result<()> {
        let (db, flight) = setup_with_flight().await?;
        let first = create_gate(&db, gate_form("C1", "C")).await?;
        let second = create_gate(&db, gate_form("C2", "C")).await?;

        assign_gate(&db, first.id, flight.id).await?;
        let (_, moved) = assign_gate(&db, second.id, flight.id).await?;
        assert_eq!(moved.gate_number.as_deref(), Some("C2"));

        let first = require_gate(&db, first.id).await?;
        assert_eq!(first.status, GateStatus::Cleaning);
        assert_eq!(first.current_flight_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_gate_status() -> Result<()> {
        let db = setup_test_db().await?;
        let gate = create_gate(&db, gate_form("D1", "D")).await?;

        let gate = set_gate_status(&db, gate.id, GateStatus::Maintenance).await?;
        assert_eq!(gate.status, GateStatus::Maintenance);
        assert!(set_gate_status(&db, gate.id, GateStatus::Occupied).await.is_err());
        assert!(matches!(
            set_gate_status(&db, 999, GateStatus::Available).await,
            Err(Error::RecordNotFound { entity: "Gate", .. })
        ));
        Ok(())
    }
}
