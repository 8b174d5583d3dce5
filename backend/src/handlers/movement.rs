//! HTTP handlers for stock movement endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::models::StockMovement;
use crate::services::movement::{
    BulkMoveInput, ExternalMoveInput, MoveInput, MovementFilter, MovementService,
};
use crate::AppState;

fn movement_service(state: &AppState) -> MovementService {
    MovementService::new(state.db.clone(), state.config.ops.operation_timeout())
}

/// Move stock between two zones
pub async fn create_movement(
    State(state): State<AppState>,
    Json(input): Json<MoveInput>,
) -> AppResult<Json<StockMovement>> {
    let movement = movement_service(&state).move_to_zone(input).await?;
    Ok(Json(movement))
}

/// Move stock out of tracked storage (grader/customer)
pub async fn create_external_movement(
    State(state): State<AppState>,
    Json(input): Json<ExternalMoveInput>,
) -> AppResult<Json<StockMovement>> {
    let movement = movement_service(&state).move_to_external(input).await?;
    Ok(Json(movement))
}

/// Bulk move: positional source/destination pairing
pub async fn create_bulk_movement(
    State(state): State<AppState>,
    Json(input): Json<BulkMoveInput>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let movements = movement_service(&state).bulk_move(input).await?;
    Ok(Json(movements))
}

/// List movements, newest first, with optional filters
pub async fn list_movements(
    State(state): State<AppState>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let movements = movement_service(&state).list_movements(filter).await?;
    Ok(Json(movements))
}
