//! Database configuration module for SkyPort.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`; the multi-column unique constraints that
//! the entity derive cannot express are added as explicit indexes.

use crate::entities::{
    Aircraft, AuditLog, Booking, CheckIn, CrewAssignment, Flight, Gate, Passenger, Staff,
    SystemAlert, booking, crew_assignment,
};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityTrait, Schema};
use tracing::{debug, info};

/// Default database location when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://skyport.sqlite?mode=rwc";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {database_url}");
    Database::connect(database_url).await.map_err(Into::into)
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<()>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    Ok(())
}

/// Creates all tables and composite indexes if they don't exist yet.
///
/// Parent tables are created before the tables that reference them.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    create_table(db, Aircraft).await?;
    create_table(db, Gate).await?;
    create_table(db, Flight).await?;
    create_table(db, Passenger).await?;
    create_table(db, Staff).await?;
    create_table(db, Booking).await?;
    create_table(db, CheckIn).await?;
    create_table(db, CrewAssignment).await?;
    create_table(db, SystemAlert).await?;
    create_table(db, AuditLog).await?;

    let builder = db.get_database_backend();

    // One passenger per seat per flight
    let seat_index = Index::create()
        .if_not_exists()
        .name("idx_bookings_flight_seat")
        .table(Booking)
        .col(booking::Column::FlightId)
        .col(booking::Column::SeatNumber)
        .unique()
        .to_owned();
    db.execute(builder.build(&seat_index)).await?;

    let crew_index = Index::create()
        .if_not_exists()
        .name("idx_crew_assignments_staff_flight")
        .table(CrewAssignment)
        .col(crew_assignment::Column::StaffId)
        .col(crew_assignment::Column::FlightId)
        .unique()
        .to_owned();
    db.execute(builder.build(&crew_index)).await?;

    info!("Database schema is up to date");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{BookingModel, FlightModel, GateModel, PassengerModel};
    use sea_orm::QuerySelect;

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Test that tables exist by querying them
        let _: Vec<FlightModel> = Flight::find().limit(1).all(&db).await?;
        let _: Vec<PassengerModel> = Passenger::find().limit(1).all(&db).await?;
        let _: Vec<BookingModel> = Booking::find().limit(1).all(&db).await?;
        let _: Vec<GateModel> = Gate::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
