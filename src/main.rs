use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use dropshare::{Config, Database, StorageBackend, WebServer};

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = dropshare::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        dropshare::logging::init_console_only(&config.logging.level);
    }

    // Env overrides after logging so their warnings are recorded
    config.apply_env_overrides();

    info!("Dropshare - minimal file sharing backend");

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    config.validate()?;

    let db = Database::open(&config.database.path).await?;
    let storage = StorageBackend::from_config(&config.files, &config.cloud)?;
    match storage.local() {
        Some(local) => info!(path = %local.base_path().display(), "Local storage initialized"),
        None => info!(backend = storage.kind().as_str(), "Storage initialized"),
    }

    let server = WebServer::new(&config, Arc::new(db), storage)?;
    server.run().await?;

    Ok(())
}
