//! HTTP handlers for capacity planning (dry-run, no mutation)

use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::ZoneService;
use crate::AppState;
use shared::allocation::{compute_capacity, plan_fill, ZoneFill};

/// Request for a fill-plan preview
#[derive(Debug, Deserialize)]
pub struct CapacityPlanRequest {
    /// Zones in fill order
    pub zone_ids: Vec<Uuid>,
    pub quantity: Decimal,
}

/// Fill-plan preview: where the quantity would land
#[derive(Debug, Serialize)]
pub struct CapacityPlanResponse {
    pub total_available: Decimal,
    pub fills: Vec<ZoneFill>,
}

/// Compute a fill plan without mutating anything.
///
/// The server-side twin of the client's WASM preview; the actual intake
/// recomputes the plan against fresh zone data.
pub async fn plan_capacity(
    State(state): State<AppState>,
    Json(request): Json<CapacityPlanRequest>,
) -> AppResult<Json<CapacityPlanResponse>> {
    let zones = ZoneService::new(state.db)
        .get_zones_in_order(&request.zone_ids)
        .await?;

    let summary = compute_capacity(&zones);
    let fills = plan_fill(&zones, request.quantity)?;

    Ok(Json(CapacityPlanResponse {
        total_available: summary.total_available,
        fills,
    }))
}
