//! Service Module
//!
//! Business logic layer for the orchestrator.
//! Services sit between the API handlers and the record store.

pub mod execution;
pub mod pipeline;
pub mod settings;

// Re-export for convenience
pub use execution as execution_service;
pub use pipeline as pipeline_service;
pub use settings as settings_service;
