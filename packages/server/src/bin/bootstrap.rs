//! Provisions the relational schema and index set for every entity kind.
//!
//! Connects to both backends with bounded retry, then runs the idempotent
//! bootstrap pass. Safe to rerun against a live deployment.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use metacat_server::store::PostgresConnector;
use metacat_server::{connect_with_retry, Catalog, CatalogConfig, ElasticConnector};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "bootstrap failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = CatalogConfig::from_env();

    let store = connect_with_retry(PostgresConnector::new(config.store.clone()), &config.retry)
        .await?;
    let index = connect_with_retry(ElasticConnector::new(&config.index), &config.retry).await?;

    let catalog = Catalog::new(Arc::new(store), Arc::new(index));
    catalog.bootstrap().await?;
    info!("all entity kinds provisioned");
    Ok(())
}
