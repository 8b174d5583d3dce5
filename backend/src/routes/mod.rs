//! Route definitions for the Stock Control Platform

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Field management
        .nest("/fields", field_routes())
        // Shed management
        .nest("/sheds", shed_routes())
        // Zone management
        .nest("/zones", zone_routes())
        // Stock intake
        .nest("/stock-intakes", intake_routes())
        // Stock movement
        .nest("/stock-movements", movement_routes())
        // Capacity planning (dry-run)
        .route("/capacity/plan", post(handlers::plan_capacity))
        // Reporting
        .nest("/reports", reporting_routes())
}

/// Field management routes
fn field_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_fields).post(handlers::create_field))
        .route(
            "/:field_id",
            get(handlers::get_field).delete(handlers::delete_field),
        )
}

/// Shed management routes
fn shed_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_sheds).post(handlers::create_shed))
        .route(
            "/:shed_id",
            get(handlers::get_shed).delete(handlers::delete_shed),
        )
}

/// Zone management routes
fn zone_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_zones).post(handlers::create_zone))
        .route(
            "/:zone_id",
            get(handlers::get_zone)
                .put(handlers::update_zone)
                .delete(handlers::delete_zone),
        )
        .route("/:zone_id/capacity", get(handlers::get_zone_capacity))
}

/// Stock intake routes
fn intake_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_intakes).post(handlers::create_intake),
        )
        .route("/zone/:zone_id", get(handlers::get_zone_intakes))
}

/// Stock movement routes
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_movements).post(handlers::create_movement),
        )
        .route("/external", post(handlers::create_external_movement))
        .route("/bulk", post(handlers::create_bulk_movement))
}

/// Reporting routes
fn reporting_routes() -> Router<AppState> {
    Router::new()
        .route("/overview", get(handlers::get_stock_overview))
        .route("/sheds/:shed_id", get(handlers::get_shed_report))
        .route("/crop-classes", get(handlers::get_crop_class_summary))
}
