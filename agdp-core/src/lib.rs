//! AGDP Core
//!
//! Core types and abstractions for AI-generated data pipelines.
//!
//! This crate contains:
//! - Domain types: pipelines, toggles, artifact bundles, executions, settings
//! - DTOs: request and summary shapes used by the HTTP layer
//! - Synthesis: deterministic generation of correlated pipeline artifacts
//! - Lifecycle: status transitions, synthesis and execution of a pipeline
//! - Store: the record-store contract and an in-memory implementation

pub mod domain;
pub mod dto;
pub mod error;
pub mod executor;
pub mod lifecycle;
pub mod store;
pub mod synth;

pub use error::{CoreError, Result};
