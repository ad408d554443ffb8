//! Crew rostering - puts staff on flights and tracks each assignment from
//! briefing to the post-flight report.

use crate::{
    core::{flight::require_flight, staff},
    entities::{AssignmentStatus, CrewAssignment, Flight, crew_assignment, flight},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Input for [`assign_crew`].
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentRequest {
    pub staff_id: i64,
    pub flight_id: i64,
    pub role_on_flight: String,
}

/// An assignment with its flight.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntry {
    pub assignment: crew_assignment::Model,
    pub flight: flight::Model,
}

/// A staff member's duties split around `now`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Roster {
    pub today: Vec<RosterEntry>,
    pub upcoming: Vec<RosterEntry>,
    pub completed: Vec<RosterEntry>,
}

/// Rosters a staff member onto a flight. Each staff member appears at most
/// once per flight.
#[instrument(skip(db, request), fields(staff_id = request.staff_id, flight_id = request.flight_id))]
pub async fn assign_crew(
    db: &DatabaseConnection,
    request: AssignmentRequest,
) -> Result<crew_assignment::Model> {
    let role_on_flight = request.role_on_flight.trim().to_string();
    if role_on_flight.is_empty() {
        return Err(Error::validation("role_on_flight", "This field is required"));
    }

    let member = staff::require_staff(db, request.staff_id).await?;
    if !member.is_active {
        return Err(Error::validation("staff_id", "Staff member is not active"));
    }
    require_flight(db, request.flight_id).await?;

    let already_assigned = Error::AlreadyAssigned {
        staff_id: request.staff_id,
        flight_id: request.flight_id,
    };
    let existing = CrewAssignment::find()
        .filter(crew_assignment::Column::StaffId.eq(request.staff_id))
        .filter(crew_assignment::Column::FlightId.eq(request.flight_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(already_assigned);
    }

    let model = crew_assignment::ActiveModel {
        staff_id: Set(request.staff_id),
        flight_id: Set(request.flight_id),
        role_on_flight: Set(role_on_flight),
        assignment_date: Set(Utc::now()),
        status: Set(AssignmentStatus::Scheduled),
        check_in_time: Set(None),
        briefing_completed: Set(false),
        post_flight_report: Set(String::new()),
        ..Default::default()
    };
    match model.insert(db).await {
        Ok(assignment) => {
            info!(assignment_id = assignment.id, "Crew assigned");
            Ok(assignment)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(already_assigned)
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn require_assignment<C>(db: &C, assignment_id: i64) -> Result<crew_assignment::Model>
where
    C: ConnectionTrait,
{
    CrewAssignment::find_by_id(assignment_id)
        .one(db)
        .await?
        .ok_or(Error::RecordNotFound {
            entity: "CrewAssignment",
            id: assignment_id,
        })
}

/// Every assignment of a staff member with its flight, split into today's
/// duties, later ones and completed ones. Cancelled assignments are left out.
pub async fn roster_for_staff(
    db: &DatabaseConnection,
    staff_id: i64,
    now: DateTime<Utc>,
) -> Result<Roster> {
    staff::require_staff(db, staff_id).await?;
    let rows = CrewAssignment::find()
        .find_also_related(Flight)
        .filter(crew_assignment::Column::StaffId.eq(staff_id))
        .filter(crew_assignment::Column::Status.ne(AssignmentStatus::Cancelled))
        .order_by_asc(flight::Column::DepartureTime)
        .all(db)
        .await?;

    let today = now.date_naive();
    let mut roster = Roster::default();
    for (assignment, flight) in rows {
        let Some(flight) = flight else { continue };
        let entry = RosterEntry { assignment, flight };
        if entry.assignment.status == AssignmentStatus::Completed {
            roster.completed.push(entry);
        } else if entry.flight.departure_time.date_naive() == today {
            roster.today.push(entry);
        } else if entry.flight.departure_time > now {
            roster.upcoming.push(entry);
        }
    }
    // Most recent first for the history column.
    roster.completed.reverse();
    Ok(roster)
}

/// Marks the pre-flight briefing done, confirming the assignment and
/// stamping the crew check-in time.
pub async fn complete_briefing(
    db: &DatabaseConnection,
    assignment_id: i64,
    now: DateTime<Utc>,
) -> Result<crew_assignment::Model> {
    let assignment = require_assignment(db, assignment_id).await?;
    if !matches!(
        assignment.status,
        AssignmentStatus::Scheduled | AssignmentStatus::Confirmed
    ) {
        return Err(Error::InvalidTransition {
            entity: "CrewAssignment",
            from: assignment.status.as_str().to_string(),
            to: AssignmentStatus::Confirmed.as_str().to_string(),
        });
    }

    let mut active: crew_assignment::ActiveModel = assignment.into();
    active.briefing_completed = Set(true);
    active.status = Set(AssignmentStatus::Confirmed);
    active.check_in_time = Set(Some(now));
    active.update(db).await.map_err(Into::into)
}

/// Files the post-flight report, completing the assignment and crediting the
/// scheduled block time to the staff member's flight hours.
#[instrument(skip(db, report))]
pub async fn file_post_flight_report(
    db: &DatabaseConnection,
    assignment_id: i64,
    report: String,
) -> Result<crew_assignment::Model> {
    if report.trim().is_empty() {
        return Err(Error::validation("post_flight_report", "Report cannot be empty"));
    }

    let txn = db.begin().await?;
    let assignment = require_assignment(&txn, assignment_id).await?;
    if matches!(
        assignment.status,
        AssignmentStatus::Completed | AssignmentStatus::Cancelled
    ) {
        return Err(Error::InvalidTransition {
            entity: "CrewAssignment",
            from: assignment.status.as_str().to_string(),
            to: AssignmentStatus::Completed.as_str().to_string(),
        });
    }

    let flight = require_flight(&txn, assignment.flight_id).await?;
    let block_hours = (flight.arrival_time - flight.departure_time).num_hours();
    staff::add_flight_hours(&txn, assignment.staff_id, i32::try_from(block_hours)?).await?;

    let mut active: crew_assignment::ActiveModel = assignment.into();
    active.post_flight_report = Set(report.trim().to_string());
    active.status = Set(AssignmentStatus::Completed);
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    info!(assignment_id, "Post-flight report filed");
    Ok(updated)
}

/// Crew list for a flight, for the operations view.
pub async fn crew_for_flight(
    db: &DatabaseConnection,
    flight_id: i64,
) -> Result<Vec<crew_assignment::Model>> {
    CrewAssignment::find()
        .filter(crew_assignment::Column::FlightId.eq(flight_id))
        .order_by_asc(crew_assignment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::StaffRole;
    use crate::test_utils::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_assign_crew_rejects_duplicates() -> Result<()> {
        let (db, flight) = setup_with_flight().await?;
        let pilot = create_test_staff(&db, "P1", StaffRole::Pilot).await?;

        let assignment = assign_crew(&db, assignment_request(pilot.id, flight.id)).await?;
        assert_eq!(assignment.status, AssignmentStatus::Scheduled);
        assert!(!assignment.briefing_completed);

        let again = assign_crew(&db, assignment_request(pilot.id, flight.id)).await;
        assert!(matches!(
            again,
            Err(Error::AlreadyAssigned { staff_id, flight_id })
                if staff_id == pilot.id && flight_id == flight.id
        ));
        assert_eq!(crew_for_flight(&db, flight.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_assign_crew_requires_known_staff_and_flight() -> Result<()> {
        let (db, flight) = setup_with_flight().await?;
        let pilot = create_test_staff(&db, "P1", StaffRole::Pilot).await?;

        assert!(matches!(
            assign_crew(&db, assignment_request(999, flight.id)).await,
            Err(Error::RecordNotFound { entity: "Staff", .. })
        ));
        assert!(matches!(
            assign_crew(&db, assignment_request(pilot.id, 999)).await,
            Err(Error::FlightNotFound { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_briefing_then_report_completes_assignment() -> Result<()> {
        let (db, flight) = setup_with_flight().await?;
        let pilot = create_test_staff(&db, "P1", StaffRole::Pilot).await?;
        let assignment = assign_crew(&db, assignment_request(pilot.id, flight.id)).await?;

        let briefed = complete_briefing(&db, assignment.id, Utc::now()).await?;
        assert!(briefed.briefing_completed);
        assert_eq!(briefed.status, AssignmentStatus::Confirmed);
        assert!(briefed.check_in_time.is_some());

        assert!(file_post_flight_report(&db, assignment.id, "  ".to_string()).await.is_err());
        let done = file_post_flight_report(&db, assignment.id, "Smooth flight".to_string()).await?;
        assert_eq!(done.status, AssignmentStatus::Completed);
        assert_eq!(done.post_flight_report, "Smooth flight");

        // Test flights are scheduled for three hours.
        let pilot = staff::require_staff(&db, pilot.id).await?;
        assert_eq!(pilot.flight_hours, 3);

        let again = file_post_flight_report(&db, assignment.id, "Again".to_string()).await;
        assert!(matches!(again, Err(Error::InvalidTransition { .. })));
        assert!(matches!(
            complete_briefing(&db, assignment.id, Utc::now()).await,
            Err(Error::InvalidTransition { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_roster_groups_duties() -> Result<()> {
        let db = setup_test_db().await?;
        let now = Utc::now();
        let later = crate::core::flight::create_flight(
            &db,
            new_flight_input("SK200", now + Duration::days(5)),
        )
        .await?;
        let finished = crate::core::flight::create_flight(
            &db,
            new_flight_input("SK201", now + Duration::days(2)),
        )
        .await?;
        let pilot = create_test_staff(&db, "P1", StaffRole::Pilot).await?;

        assign_crew(&db, assignment_request(pilot.id, later.id)).await?;
        let done = assign_crew(&db, assignment_request(pilot.id, finished.id)).await?;
        file_post_flight_report(&db, done.id, "ok".to_string()).await?;

        let roster = roster_for_staff(&db, pilot.id, now).await?;
        assert!(roster.today.is_empty());
        assert_eq!(roster.upcoming.len(), 1);
        assert_eq!(roster.upcoming[0].flight.flight_number, "SK200");
        assert_eq!(roster.completed.len(), 1);
        assert_eq!(roster.completed[0].flight.flight_number, "SK201");
        Ok(())
    }
}
