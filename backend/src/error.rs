//! Error handling for the Stock Control Platform
//!
//! All stock-engine failures are detected before mutation and surfaced as
//! specific error codes; partial bulk failures carry enough detail for
//! manual reconciliation.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use shared::allocation::AllocationError;
use thiserror::Error;
use uuid::Uuid;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation error: {message}")]
    Validation { field: String, message: String },

    #[error("Field selection required for mixed zone {zone_id}")]
    FieldSelectionRequired { zone_id: Uuid },

    // Stock engine errors
    #[error("Requested quantity {requested} exceeds available capacity {available}")]
    CapacityExceeded {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Requested quantity {requested} exceeds available stock {available}")]
    InsufficientStock {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Operation timed out")]
    OperationTimedOut,

    // Bulk moves commit pair by pair; earlier pairs stay committed when a
    // later one fails.
    #[error("bulk move partially failed after {completed} completed transfers")]
    PartialFailure {
        completed: usize,
        failed: Vec<String>,
    },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::CapacityExceeded {
                requested,
                available,
            } => AppError::CapacityExceeded {
                requested,
                available,
            },
            AllocationError::InsufficientStock {
                requested,
                available,
            } => AppError::InsufficientStock {
                requested,
                available,
            },
            AllocationError::NegativeQuantity => AppError::Validation {
                field: "quantity".to_string(),
                message: "Quantity must not be negative".to_string(),
            },
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failures: Option<Vec<String>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                    failures: None,
                },
            ),
            AppError::FieldSelectionRequired { zone_id } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "FIELD_SELECTION_REQUIRED".to_string(),
                    message: format!(
                        "Zone {} holds stock from more than one field; a field selection is required",
                        zone_id
                    ),
                    field: Some("field_selections".to_string()),
                    failures: None,
                },
            ),
            AppError::CapacityExceeded {
                requested,
                available,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "CAPACITY_EXCEEDED".to_string(),
                    message: format!(
                        "Requested quantity {} exceeds available capacity {}",
                        requested, available
                    ),
                    field: None,
                    failures: None,
                },
            ),
            AppError::InsufficientStock {
                requested,
                available,
            } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INSUFFICIENT_STOCK".to_string(),
                    message: format!(
                        "Requested quantity {} exceeds available stock {}",
                        requested, available
                    ),
                    field: None,
                    failures: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message: format!("{} not found", resource),
                    field: None,
                    failures: None,
                },
            ),
            AppError::OperationTimedOut => (
                StatusCode::GATEWAY_TIMEOUT,
                ErrorDetail {
                    code: "OPERATION_TIMED_OUT".to_string(),
                    message: "The transfer did not complete in time".to_string(),
                    field: None,
                    failures: None,
                },
            ),
            AppError::PartialFailure { completed, failed } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "PARTIAL_FAILURE".to_string(),
                    message: format!(
                        "{} transfers completed, {} failed; completed transfers remain applied",
                        completed,
                        failed.len()
                    ),
                    field: None,
                    failures: Some(failed.clone()),
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message: "A database error occurred".to_string(),
                    field: None,
                    failures: None,
                },
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred".to_string(),
                    field: None,
                    failures: None,
                },
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
