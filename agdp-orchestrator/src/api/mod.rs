//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain.

pub mod error;
pub mod execution;
pub mod health;
pub mod pipeline;
pub mod settings;

use std::sync::Arc;

use agdp_core::executor::Executor;
use agdp_core::store::RecordStore;
use agdp_core::synth::ArtifactSynthesizer;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub synthesizer: Arc<dyn ArtifactSynthesizer>,
    pub executor: Arc<dyn Executor>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/", get(health::health_check))
        .route("/health", get(health::health_check))
        // Pipeline endpoints
        .route(
            "/api/pipelines",
            get(pipeline::list_pipelines).post(pipeline::create_pipeline),
        )
        .route(
            "/api/pipelines/{id}",
            get(pipeline::get_pipeline)
                .put(pipeline::update_pipeline)
                .delete(pipeline::delete_pipeline),
        )
        .route(
            "/api/pipelines/{id}/generate",
            post(pipeline::generate_pipeline),
        )
        .route(
            "/api/pipelines/{id}/executions",
            get(execution::list_pipeline_executions),
        )
        // Execution endpoints
        .route("/api/executions", post(execution::start_execution))
        .route("/api/executions/{id}", get(execution::get_execution))
        // Settings endpoints
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
