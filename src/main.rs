#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wayfarer::{
    bot,
    catalog::Catalog,
    config::{database, settings},
    core::engine::{AdventureEngine, EngineConfig},
    errors::Result,
    store::SeaOrmStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing first, so everything after it is observable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // .env is optional; deployments can set everything externally.
    dotenv().ok();

    let settings = settings::AppSettings::load()?;
    info!(database_url = %settings.database_url, "loaded application settings");

    let db = database::create_connection(&settings.database_url).await?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    let catalog = match &settings.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };
    info!(
        adventures = catalog.adventures().len(),
        "Adventure catalog loaded."
    );

    let engine = Arc::new(AdventureEngine::new(
        Arc::new(catalog),
        SeaOrmStore::new(db, settings.default_gold),
        EngineConfig::default(),
    ));

    let token = settings::discord_token()?;
    bot::run_bot(token, engine).await?;

    Ok(())
}
