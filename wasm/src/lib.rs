//! WebAssembly module for the Stock Control Platform
//!
//! Provides client-side computation for:
//! - Fill-plan previews while selecting zones for an intake
//! - Available-capacity summaries for a zone selection
//! - Withdrawal previews showing how a move splits provenance
//!
//! The backend recomputes every plan against fresh data before applying
//! it; these bindings only drive the floor-plan UI.

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::allocation::*;
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn parse_quantity(quantity: &str) -> Result<Decimal, JsValue> {
    quantity
        .parse()
        .map_err(|e| JsValue::from_str(&format!("Invalid quantity {:?}: {}", quantity, e)))
}

/// Summarize available capacity for a zone selection.
///
/// `zones_json` is a JSON array of zones; returns a JSON
/// `CapacitySummary`.
#[wasm_bindgen]
pub fn capacity_summary(zones_json: &str) -> Result<String, JsValue> {
    let zones: Vec<Zone> = serde_json::from_str(zones_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid zones JSON: {}", e)))?;

    let summary = compute_capacity(&zones);
    serde_json::to_string(&summary).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Preview the fill plan for an intake across the selected zones.
///
/// Returns a JSON array of `{zone_id, quantity}` entries, or an error
/// message when the selection cannot hold the quantity.
#[wasm_bindgen]
pub fn fill_plan_preview(zones_json: &str, quantity: &str) -> Result<String, JsValue> {
    let zones: Vec<Zone> = serde_json::from_str(zones_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid zones JSON: {}", e)))?;
    let quantity = parse_quantity(quantity)?;

    let plan = plan_fill(&zones, quantity).map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&plan).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Preview how a withdrawal splits a zone's provenance.
///
/// `field_id` restricts the withdrawal to one field; pass an empty string
/// for a whole-zone split. Returns a JSON `WithdrawalPlan`.
#[wasm_bindgen]
pub fn withdrawal_preview(
    intakes_json: &str,
    quantity: &str,
    field_id: &str,
) -> Result<String, JsValue> {
    let intakes: Vec<StockIntake> = serde_json::from_str(intakes_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid intakes JSON: {}", e)))?;
    let quantity = parse_quantity(quantity)?;
    let field_filter = if field_id.is_empty() {
        None
    } else {
        Some(
            field_id
                .parse()
                .map_err(|e| JsValue::from_str(&format!("Invalid field id: {}", e)))?,
        )
    };

    let plan = plan_withdrawal(&intakes, quantity, field_filter)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_json::to_string(&plan).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Stock available for withdrawal in a zone, optionally restricted to one
/// field. Drives the "From: Z1 (8 units)" line in the move dialog.
#[wasm_bindgen]
pub fn available_stock_preview(intakes_json: &str, field_id: &str) -> Result<String, JsValue> {
    let intakes: Vec<StockIntake> = serde_json::from_str(intakes_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid intakes JSON: {}", e)))?;
    let field_filter = if field_id.is_empty() {
        None
    } else {
        Some(
            field_id
                .parse()
                .map_err(|e| JsValue::from_str(&format!("Invalid field id: {}", e)))?,
        )
    };

    Ok(available_stock(&intakes, field_filter).to_string())
}

/// Whether a quantity string is a valid positive stock quantity.
#[wasm_bindgen]
pub fn is_valid_quantity(quantity: &str) -> bool {
    quantity
        .parse::<Decimal>()
        .map(|q| validate_positive_quantity(q).is_ok())
        .unwrap_or(false)
}
