//! Stock movement (audit) models

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Location;

/// Append-only audit record of a transfer.
///
/// Endpoints are [`Location`]s so that stock entering from outside
/// (`NO_LOCATION`) or leaving to a grader/customer is representable
/// without fake shed rows. Never mutated once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub from_zone: Location,
    pub to_zone: Location,
    pub from_shed: Location,
    pub to_shed: Location,
    pub quantity: Decimal,
    pub date: NaiveDate,
    pub employee_number: Option<String>,
    /// Present when the moved stock is attributable to a single field.
    pub field_id: Option<Uuid>,
    pub field_name: Option<String>,
    /// Present when the moved stock carries a single grade.
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
}
