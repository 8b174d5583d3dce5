//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::reporting::{CropClassSummary, ReportingService, ShedStockReport};
use crate::AppState;

/// Stock breakdown for every shed
pub async fn get_stock_overview(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<ShedStockReport>>> {
    let service = ReportingService::new(state.db);
    let reports = service.stock_overview().await?;
    Ok(Json(reports))
}

/// Stock breakdown for one shed
pub async fn get_shed_report(
    State(state): State<AppState>,
    Path(shed_id): Path<Uuid>,
) -> AppResult<Json<ShedStockReport>> {
    let service = ReportingService::new(state.db);
    let report = service.shed_stock_details(shed_id).await?;
    Ok(Json(report))
}

/// Totals per crop classification and grade
pub async fn get_crop_class_summary(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CropClassSummary>>> {
    let service = ReportingService::new(state.db);
    let summary = service.crop_class_summary().await?;
    Ok(Json(summary))
}
