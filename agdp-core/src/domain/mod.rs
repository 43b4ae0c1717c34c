//! Core domain types
//!
//! This module contains the core domain structures used across AGDP services.
//! These types represent the fundamental business entities and are shared
//! between the synthesizer, the lifecycle rules and the record stores.

pub mod artifact;
pub mod execution;
pub mod log;
pub mod pipeline;
pub mod settings;
pub mod toggles;
