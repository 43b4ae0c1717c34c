use std::sync::Arc;

use agdp_core::executor::SimulatedExecutor;
use agdp_core::store::{InMemoryStore, RecordStore};
use agdp_core::synth::TemplateSynthesizer;
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod service;

use config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "agdp_orchestrator=debug,agdp_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    config.validate()?;

    tracing::info!("Starting AGDP Orchestrator...");

    let store = open_store(&config).await?;

    let settings = service::settings_service::seed_defaults(&*store)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to seed settings: {:?}", e))?;

    let synthesizer = TemplateSynthesizer::new(settings);
    tracing::info!(
        "Template synthesizer ready (model setting: {})",
        synthesizer.settings().llm_model
    );

    let state = api::AppState {
        store,
        synthesizer: Arc::new(synthesizer),
        executor: Arc::new(SimulatedExecutor::new()),
    };

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    if config.in_memory {
        tracing::warn!("Using in-memory store; records are lost on shutdown");
        return Ok(Arc::new(InMemoryStore::new()));
    }

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(&config.database_url, config.max_connections)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    Ok(Arc::new(repository::PgStore::new(pool)))
}
