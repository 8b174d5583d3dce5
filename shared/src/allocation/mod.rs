//! Pure stock allocation engine
//!
//! Capacity planning and provenance splitting as pure functions over
//! in-memory snapshots of zones and intake records. No I/O happens here;
//! the backend fetches snapshots, plans with these functions, then applies
//! the plan inside a database transaction. The WASM bindings expose the
//! same functions for client-side previews.

mod capacity;
mod provenance;

pub use capacity::*;
pub use provenance::*;

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures the planning functions can report. All are detected before any
/// mutation would take place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("requested quantity {requested} exceeds available capacity {available}")]
    CapacityExceeded {
        requested: Decimal,
        available: Decimal,
    },

    #[error("requested quantity {requested} exceeds available stock {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },

    #[error("quantity must not be negative")]
    NegativeQuantity,
}
