pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repositories;
pub mod services;

pub use config::{Config, ConfigError, Environment};
pub use db::{create_pool, DatabaseError};
pub use error::StoreError;
pub use services::{
    spawn_ingestion_actor, FeedOutcome, FeedStore, FetchFeed, IngestionError, IngestionHandle,
    IngestionService, PostReconciler, ReconcileStats, SqliteFeedStore, TickReport,
};

use feed::FeedClient;
use std::sync::Arc;

/// Open the store, start the ingestion scheduler and run until Ctrl+C.
pub async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    // Ensure data directory exists
    std::fs::create_dir_all(&config.data_path)?;

    let pool = create_pool(&config.database_url, config.max_connections).await?;
    let client = FeedClient::new(config.fetch_timeout)?;

    let service = IngestionService::new(
        Arc::new(SqliteFeedStore::new(pool.clone())),
        Arc::new(client),
        config.concurrency,
    );
    let handle = spawn_ingestion_actor(service, config.interval);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, waiting for in-flight feeds");

    handle.shutdown().await;
    pool.close().await;

    Ok(())
}
