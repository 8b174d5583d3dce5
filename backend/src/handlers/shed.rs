//! HTTP handlers for shed management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Shed;
use crate::services::shed::{CreateShedInput, ShedService};
use crate::AppState;

/// Create a shed
pub async fn create_shed(
    State(state): State<AppState>,
    Json(input): Json<CreateShedInput>,
) -> AppResult<Json<Shed>> {
    let service = ShedService::new(state.db);
    let shed = service.create_shed(input).await?;
    Ok(Json(shed))
}

/// List all sheds
pub async fn list_sheds(State(state): State<AppState>) -> AppResult<Json<Vec<Shed>>> {
    let service = ShedService::new(state.db);
    let sheds = service.get_sheds().await?;
    Ok(Json(sheds))
}

/// Get a shed by id
pub async fn get_shed(
    State(state): State<AppState>,
    Path(shed_id): Path<Uuid>,
) -> AppResult<Json<Shed>> {
    let service = ShedService::new(state.db);
    let shed = service.get_shed(shed_id).await?;
    Ok(Json(shed))
}

/// Delete a shed and its zones
pub async fn delete_shed(
    State(state): State<AppState>,
    Path(shed_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = ShedService::new(state.db);
    service.delete_shed(shed_id).await?;
    Ok(Json(()))
}
