//! Shed (storage building) models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A physical storage building containing zones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shed {
    pub id: Uuid,
    pub name: String,
    /// Outer dimensions in metres. Display only; capacity lives on zones.
    pub width: Decimal,
    pub height: Decimal,
    pub description: Option<String>,
    /// Door placements for floor-plan rendering. Never consumed by the
    /// allocation engine.
    pub doors: Option<Vec<DoorPlacement>>,
}

/// A door position on the shed perimeter (floor-plan metadata).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorPlacement {
    pub side: DoorSide,
    /// Offset along the side, in metres.
    pub position: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorSide {
    Top,
    Bottom,
    Left,
    Right,
}
