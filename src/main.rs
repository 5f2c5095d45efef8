//! gridclip - clip PostGIS tables to a map-grid region and serve
//! GeoJSON downloads over HTTP.

mod cli;
mod config;
mod db;
mod error;
mod export;
mod http;

use cli::Cli;
use config::{Config, ConnectionConfig};
use error::{GridclipError, Result};
use http::AppState;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Internal Error: failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run()) {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Load configuration file
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;

    // CLI overrides for the service surface
    if let Some(dir) = &cli.output_dir {
        config.export.output_dir = dir.clone();
    }
    let listen_addr = cli
        .listen
        .clone()
        .unwrap_or_else(|| config.server.listen_addr());

    // Select the spatial client
    let db: Arc<dyn db::SpatialClient> = if cli.mock_db {
        info!("Using in-memory mock spatial client");
        Arc::new(db::MockSpatialClient::with_demo_data())
    } else {
        // Build connection config with precedence:
        // 1. CLI arguments (highest)
        // 2. Named connection from config
        // 3. Default connection from config
        // 4. Environment variables
        let connection = resolve_connection(&cli, &config)?.ok_or_else(|| {
            GridclipError::config(
                "No database connection configured. Pass a connection string or set one in the config file.",
            )
        })?;

        info!("Connection: {}", connection.display_string());
        Arc::from(db::connect(&connection, &config.export).await?)
    };

    // Install the stored clip function once at startup
    db.install_clip_function().await?;
    info!("Stored clip function installed");

    let state = Arc::new(AppState::new(config, db));
    http::serve(&listen_addr, state).await
}

/// Resolves the final connection configuration from CLI args, config file, and environment.
fn resolve_connection(cli: &Cli, config: &Config) -> Result<Option<ConnectionConfig>> {
    // Start with CLI connection config if provided
    let mut connection = cli.to_connection_config()?;

    // If no CLI connection, try named connection from config
    if connection.is_none() {
        if let Some(name) = cli.connection_name() {
            connection = config.get_connection(Some(name)).cloned();
            if connection.is_none() {
                return Err(GridclipError::config(format!(
                    "Connection '{}' not found in config file",
                    name
                )));
            }
        }
    }

    // If still no connection, try default from config
    if connection.is_none() {
        connection = config.get_connection(None).cloned();
    }

    // If still nothing, fall back to a pure-environment connection
    if connection.is_none() {
        let mut env_conn = ConnectionConfig::default();
        env_conn.apply_env_defaults();
        if env_conn.host.is_some() || env_conn.database.is_some() {
            connection = Some(env_conn);
        }
    }

    // Apply environment variable defaults
    if let Some(ref mut conn) = connection {
        conn.apply_env_defaults();
    }

    Ok(connection)
}
