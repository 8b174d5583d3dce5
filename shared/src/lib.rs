//! Shared types and models for the Stock Control Platform
//!
//! This crate contains types shared between the backend, frontend (via WASM),
//! and other components of the system, plus the pure stock allocation engine
//! (capacity planning and provenance splitting) that both sides rely on.

pub mod allocation;
pub mod models;
pub mod types;
pub mod validation;

pub use allocation::*;
pub use models::*;
pub use types::*;
pub use validation::*;
