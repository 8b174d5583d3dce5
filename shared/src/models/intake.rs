//! Stock intake (provenance) models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A provenance record: "this much of field X, grade G, entered zone Z on
/// date D".
///
/// The sum of a zone's intake quantities tracks the zone's
/// `total_quantity`. Withdrawals reduce these records proportionally;
/// records that shrink below the dust threshold are deleted rather than
/// kept as near-zero rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockIntake {
    pub id: Uuid,
    pub field_id: Uuid,
    pub field_name: String,
    pub zone_id: Uuid,
    pub shed_id: Uuid,
    pub quantity: Decimal,
    pub grade: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
