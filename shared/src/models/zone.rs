//! Storage zone models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default `max_capacity` for newly created zones (box-storage units).
pub fn default_max_capacity() -> Decimal {
    Decimal::from(6)
}

/// A storage location inside a shed.
///
/// `total_quantity` is the cached running total of the zone's intake
/// records and is authoritative for capacity checks. It never goes
/// negative, and exceeds `max_capacity` only when a fill plan deliberately
/// overflows the last selected zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub id: Uuid,
    pub shed_id: Uuid,
    pub name: String,
    /// Position and size on the floor plan, in metres. Layout only.
    pub x: Decimal,
    pub y: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    pub total_quantity: Decimal,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: Decimal,
}

impl Zone {
    /// Remaining room before the zone hits its nominal capacity.
    /// Overfilled zones report zero, not a negative number.
    pub fn available_capacity(&self) -> Decimal {
        let available = self.max_capacity - self.total_quantity;
        if available > Decimal::ZERO {
            available
        } else {
            Decimal::ZERO
        }
    }
}
