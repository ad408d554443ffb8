//! Start-up seeding of gates and aircraft listed in config.toml.
//!
//! Records that already exist are left untouched, so seeding on every start
//! is safe.

use crate::{
    config::settings::AppConfig,
    core::{
        aircraft::{AircraftForm, create_aircraft, find_aircraft_by_registration},
        gate::{GateForm, create_gate, find_gate_by_number},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::{debug, info, instrument};

/// How many records a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub gates_created: usize,
    pub aircraft_created: usize,
}

#[instrument(skip(db, config))]
pub async fn seed_from_config(db: &DatabaseConnection, config: &AppConfig) -> Result<SeedReport> {
    info!(
        "Seeding {} gates and {} aircraft from configuration",
        config.gates.len(),
        config.aircraft.len()
    );
    let mut report = SeedReport::default();

    for gate in &config.gates {
        if find_gate_by_number(db, &gate.gate_number).await?.is_some() {
            debug!(gate = %gate.gate_number, "Gate already exists, skipping");
            continue;
        }
        create_gate(
            db,
            GateForm {
                gate_number: gate.gate_number.clone(),
                terminal: gate.terminal.clone(),
                gate_type: gate.gate_type.clone(),
                capacity: gate.capacity,
            },
        )
        .await?;
        report.gates_created += 1;
    }

    for plane in &config.aircraft {
        if find_aircraft_by_registration(db, &plane.registration).await?.is_some() {
            debug!(registration = %plane.registration, "Aircraft already exists, skipping");
            continue;
        }
        create_aircraft(
            db,
            AircraftForm {
                registration: plane.registration.clone(),
                aircraft_type: plane.aircraft_type.clone(),
                manufacturer: plane.manufacturer.clone(),
                model: plane.model.clone(),
                business_seats: plane.business_seats,
                economy_seats: plane.economy_seats,
                year_manufactured: plane.year_manufactured,
                last_maintenance: plane.last_maintenance,
                next_maintenance: plane.next_maintenance,
                current_location: plane.current_location.clone(),
            },
        )
        .await?;
        report.aircraft_created += 1;
    }

    info!(
        gates = report.gates_created,
        aircraft = report.aircraft_created,
        "Seeding finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::load_config;
    use crate::core::{aircraft::list_aircraft, gate::list_gates};
    use crate::test_utils::setup_test_db;

    fn seed_config() -> AppConfig {
        let toml_str = r#"
            [[gates]]
            gate_number = "A1"
            terminal = "A"

            [[gates]]
            gate_number = "B7"
            terminal = "B"
            gate_type = "Wide-body"
            capacity = 350

            [[aircraft]]
            registration = "N301SK"
            aircraft_type = "Narrow-body"
            manufacturer = "Airbus"
            model = "A320neo"
            business_seats = 12
            economy_seats = 150
            year_manufactured = 2019
            last_maintenance = "2026-05-01"
            next_maintenance = "2026-11-01"
        "#;
        toml::from_str(toml_str).unwrap()
    }

    #[tokio::test]
    async fn test_seed_inserts_missing_records() -> Result<()> {
        let db = setup_test_db().await?;
        let report = seed_from_config(&db, &seed_config()).await?;
        assert_eq!(
            report,
            SeedReport {
                gates_created: 2,
                aircraft_created: 1
            }
        );

        let gates = list_gates(&db).await?;
        assert_eq!(gates.len(), 2);
        assert_eq!(gates[1].capacity, 350);
        let fleet = list_aircraft(&db).await?;
        assert_eq!(fleet[0].total_seats, 162);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        seed_from_config(&db, &seed_config()).await?;
        let second = seed_from_config(&db, &seed_config()).await?;
        assert_eq!(second, SeedReport::default());
        assert_eq!(list_gates(&db).await?.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_from_bundled_config() -> Result<()> {
        let db = setup_test_db().await?;
        let config = load_config(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml"))?;
        let report = seed_from_config(&db, &config).await?;
        assert_eq!(report.gates_created, config.gates.len());
        assert_eq!(report.aircraft_created, config.aircraft.len());
        Ok(())
    }
}
