/// Database configuration and connection management
pub mod database;

/// Server settings and seed data from config.toml
pub mod settings;
