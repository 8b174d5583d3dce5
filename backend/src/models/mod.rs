//! Database models for the Stock Control Platform
//!
//! Re-exports models from the shared crate and adds backend-specific models

pub use shared::models::*;
