mod admin_actor;
mod app_system;
mod clients;
mod collection_actor;
mod console;
mod domain;
mod mirror;
mod notification_actor;
mod sync;
mod view;

#[cfg(test)]
mod mock_framework;

use tracing::{info, Instrument};

use crate::app_system::{load_seed, setup_tracing, AdminConfig, AdminSystem, AppError};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config = AdminConfig::from_env()?;
    info!(
        export_prefix = %config.export_prefix,
        export_dir = %config.export_dir.display(),
        "Starting order admin"
    );

    // Starts the collection, notifications, admin session, and live query
    let system = AdminSystem::new(&config);

    if let Some(path) = &config.seed_file {
        let documents = load_seed(path)?;
        let span = tracing::info_span!("seeding", path = %path.display());
        system.seed(documents).instrument(span).await?;
    }

    let result = console::run(&system, &config).await;

    // Shutdown system gracefully, even when the console failed
    system.shutdown().await?;
    result?;

    info!("Order admin stopped");
    Ok(())
}
