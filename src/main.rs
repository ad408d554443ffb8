#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use skyport::{
    config::{
        database::{create_connection, create_tables, get_database_url},
        settings::load_app_configuration,
    },
    core::seed::seed_from_config,
    errors::Result,
    web::{AppState, router},
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = load_app_configuration()?;
    info!("Successfully processed application configuration.");

    // 4. Connect and make sure the schema exists
    let db = create_connection(&get_database_url())
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed gates and aircraft listed in config.toml
    seed_from_config(&db, &app_config)
        .await
        .inspect(|report| {
            info!(
                gates = report.gates_created,
                aircraft = report.aircraft_created,
                "Seed data applied."
            );
        })
        .inspect_err(|e| error!("Failed to seed reference data: {}", e))?;

    // 6. Serve the portals
    let listener = TcpListener::bind(&app_config.server.bind_address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", app_config.server.bind_address, e))?;
    info!("Listening on {}", app_config.server.bind_address);
    axum::serve(listener, router(AppState::new(db))).await?;

    Ok(())
}
