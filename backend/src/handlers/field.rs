//! HTTP handlers for field management endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::Field;
use crate::services::field::{CreateFieldInput, FieldService};
use crate::AppState;

/// Create a field
pub async fn create_field(
    State(state): State<AppState>,
    Json(input): Json<CreateFieldInput>,
) -> AppResult<Json<Field>> {
    let service = FieldService::new(state.db);
    let field = service.create_field(input).await?;
    Ok(Json(field))
}

/// List all fields
pub async fn list_fields(State(state): State<AppState>) -> AppResult<Json<Vec<Field>>> {
    let service = FieldService::new(state.db);
    let fields = service.get_fields().await?;
    Ok(Json(fields))
}

/// Get a field by id
pub async fn get_field(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
) -> AppResult<Json<Field>> {
    let service = FieldService::new(state.db);
    let field = service.get_field(field_id).await?;
    Ok(Json(field))
}

/// Delete a field
pub async fn delete_field(
    State(state): State<AppState>,
    Path(field_id): Path<Uuid>,
) -> AppResult<Json<()>> {
    let service = FieldService::new(state.db);
    service.delete_field(field_id).await?;
    Ok(Json(()))
}
