//! Seed binary — provisions the built-in roles, demo users and sample
//! products against a running SurrealDB instance.

use std::sync::Arc;

use stockgate_core::catalog::PermissionCatalog;
use stockgate_db::{DbConfig, DbManager, run_migrations, seed};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("stockgate=info".parse()?),
        )
        .init();

    let config = DbConfig::from_env();
    let manager = DbManager::connect(&config).await?;

    run_migrations(manager.client()).await?;

    let catalog = Arc::new(PermissionCatalog::builtin());
    seed::seed_all(manager.client(), catalog).await?;

    tracing::info!("Seeding complete");
    Ok(())
}
