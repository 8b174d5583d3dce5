//! HTTP handlers for stock intake endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::StockIntake;
use crate::services::intake::{IntakeInput, IntakeService};
use crate::AppState;

/// Query parameters for listing intakes
#[derive(Debug, Deserialize)]
pub struct IntakeQuery {
    pub zone_id: Option<Uuid>,
}

/// Book a stock intake, distributing across the selected zones
pub async fn create_intake(
    State(state): State<AppState>,
    Json(input): Json<IntakeInput>,
) -> AppResult<Json<Vec<StockIntake>>> {
    let service = IntakeService::new(state.db, state.submissions.clone());
    let intakes = service.intake(input).await?;
    Ok(Json(intakes))
}

/// List intake records, optionally filtered by zone
pub async fn list_intakes(
    State(state): State<AppState>,
    Query(query): Query<IntakeQuery>,
) -> AppResult<Json<Vec<StockIntake>>> {
    let service = IntakeService::new(state.db, state.submissions.clone());
    let intakes = service.get_intakes(query.zone_id).await?;
    Ok(Json(intakes))
}

/// Intake records for one zone
pub async fn get_zone_intakes(
    State(state): State<AppState>,
    Path(zone_id): Path<Uuid>,
) -> AppResult<Json<Vec<StockIntake>>> {
    let service = IntakeService::new(state.db, state.submissions.clone());
    let intakes = service.get_zone_intakes(zone_id).await?;
    Ok(Json(intakes))
}
