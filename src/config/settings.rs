//! Application settings loaded from config.toml
//!
//! The file configures the HTTP listener and lists the gates and aircraft that
//! are seeded into the database on first run or when they are missing.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

/// Default listen address when neither config.toml nor `SKYPORT_BIND` set one.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    /// Gates to seed
    #[serde(default)]
    pub gates: Vec<GateConfig>,
    /// Aircraft to seed
    #[serde(default)]
    pub aircraft: Vec<AircraftConfig>,
}

/// HTTP listener settings
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    DEFAULT_BIND_ADDRESS.to_string()
}

/// Configuration for a single gate
#[derive(Debug, Deserialize, Clone)]
pub struct GateConfig {
    pub gate_number: String,
    pub terminal: String,
    #[serde(default = "default_gate_type")]
    pub gate_type: String,
    #[serde(default = "default_gate_capacity")]
    pub capacity: i32,
}

fn default_gate_type() -> String {
    "Standard".to_string()
}

const fn default_gate_capacity() -> i32 {
    200
}

/// Configuration for a single aircraft
#[derive(Debug, Deserialize, Clone)]
pub struct AircraftConfig {
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

/// Loads application settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads settings from `SKYPORT_CONFIG` or ./config.toml, then applies the
/// `SKYPORT_BIND` override.
///
/// A missing file is not an error: the defaults are used and nothing is seeded.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var("SKYPORT_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

    let mut config = if Path::new(&path).exists() {
        load_config(&path)?
    } else {
        tracing::warn!("No configuration file at {path}, using defaults");
        AppConfig::default()
    };

    if let Ok(bind) = std::env::var("SKYPORT_BIND") {
        config.server.bind_address = bind;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_app_config() {
        let toml_str = r#"
            [server]
            bind_address = "0.0.0.0:9000"

            [[gates]]
            gate_number = "A1"
            terminal = "1"

            [[gates]]
            gate_number = "B7"
            terminal = "2"
            gate_type = "Wide-body"
            capacity = 350

            [[aircraft]]
            registration = "G-XLEA"
            aircraft_type = "A380"
            manufacturer = "Airbus"
            model = "A380-841"
            business_seats = 97
            economy_seats = 372
            year_manufactured = 2013
            last_maintenance = "2026-01-10"
            next_maintenance = "2026-07-10"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.gates.len(), 2);
        assert_eq!(config.gates[0].gate_type, "Standard");
        assert_eq!(config.gates[0].capacity, 200);
        assert_eq!(config.gates[1].capacity, 350);
        assert_eq!(config.aircraft[0].business_seats, 97);
        assert_eq!(
            config.aircraft[0].next_maintenance,
            NaiveDate::from_ymd_opt(2026, 7, 10).unwrap()
        );
        assert!(config.aircraft[0].current_location.is_empty());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.bind_address, DEFAULT_BIND_ADDRESS);
        assert!(config.gates.is_empty());
        assert!(config.aircraft.is_empty());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config("/nonexistent/skyport.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
