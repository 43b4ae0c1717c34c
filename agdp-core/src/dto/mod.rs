//! Data Transfer Objects
//!
//! Request and summary shapes exchanged with the HTTP layer. DTOs are
//! lightweight representations of domain entities.

pub mod execution;
pub mod pipeline;
pub mod settings;
