//! HTTP handlers for zone management endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Zone;
use crate::services::zone::{CreateZoneInput, UpdateZoneInput, ZoneService};
use crate::AppState;
use shared::allocation::CapacitySummary;

/// Query parameters for listing zones
#[derive(Debug, Deserialize)]
pub struct ZoneQuery {
    pub shed_id: Option<Uuid>,
}

/// Zone update request.
///
/// A bare `quantity` performs the admin total override; the remaining
/// fields update geometry and capacity.
#[derive(Debug, Deserialize)]
pub struct UpdateZoneRequest {
    pub quantity: Option<Decimal>,
    #[serde(flatten)]
    pub zone: UpdateZoneInput,
}

/// Create a zone
pub async fn create_zone(
    State(state): State<AppState>,
    Json(input): Json<CreateZoneInput>,
) -> AppResult<Json<Zone>> {
    let service = ZoneService::new(state.db);
    let zone = service.create_zone(input).await?;
    Ok(Json(zone))
}

/// List zones, optionally filtered by shed
pub async fn list_zones(
    State(state): State<AppState>,
    Query(query): Query<ZoneQuery>,
) -> AppResult<Json<Vec<Zone>>> {
    let service = ZoneService::new(state.db);
    let zones = service.get_zones(query.shed_id).await?;
    Ok(Json(zones))
}

/// Get a zone by id
pub async fn get_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> AppResult<Json<Zone>> {
    let service = ZoneService::new(state.db);
    let zone = service.get_zone(zone_id).await?;
    Ok(Json(zone))
}

/// Available capacity for a zone
pub async fn get_zone_capacity(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> AppResult<Json<CapacitySummary>> {
    let service = ZoneService::new(state.db);
    let summary = service.get_capacity(zone_id).await?;
    Ok(Json(summary))
}

/// Update a zone: geometry/capacity, or an admin quantity override
pub async fn update_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
    Json(request): Json<UpdateZoneRequest>,
) -> AppResult<Json<Zone>> {
    let service = ZoneService::new(state.db);
    let zone = match request.quantity {
        Some(quantity) => service.override_quantity(zone_id, quantity).await?,
        None => service.update_zone(zone_id, request.zone).await?,
    };
    Ok(Json(zone))
}

/// Delete a zone
pub async fn delete_zone(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ZoneService::new(state.db);
    service.delete_zone(zone_id).await?;
    Ok(Json(()))
}
