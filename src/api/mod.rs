//! API handlers for the rental inventory REST endpoints

pub mod equipment_types;
pub mod health;
pub mod inventory;
pub mod openapi;
pub mod rental_points;
pub mod stats;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Rental points
        .route(
            "/rental-points",
            get(rental_points::list_rental_points).post(rental_points::create_rental_point),
        )
        .route(
            "/rental-points/:id",
            get(rental_points::get_rental_point)
                .put(rental_points::update_rental_point)
                .delete(rental_points::delete_rental_point),
        )
        .route(
            "/rental-points/:id/equipment",
            get(rental_points::list_rental_point_equipment),
        )
        // Equipment types
        .route(
            "/equipment-types",
            get(equipment_types::list_equipment_types).post(equipment_types::create_equipment_type),
        )
        .route(
            "/equipment-types/:id",
            get(equipment_types::get_equipment_type)
                .put(equipment_types::update_equipment_type)
                .delete(equipment_types::delete_equipment_type),
        )
        .route(
            "/equipment-types/:id/equipment",
            get(equipment_types::list_equipment_type_equipment),
        )
        // Available equipment
        .route(
            "/available-equipment",
            get(inventory::list_available_equipment).post(inventory::create_available_equipment),
        )
        .route(
            "/available-equipment/:id",
            get(inventory::get_available_equipment)
                .put(inventory::update_available_equipment)
                .delete(inventory::delete_available_equipment),
        )
        .route(
            "/available-equipment/:id/details",
            get(inventory::get_available_equipment_details),
        )
        .route(
            "/available-equipment/:id/availability",
            get(inventory::get_availability),
        )
        .route("/available-equipment/:id/rent", post(inventory::rent_equipment))
        .route("/available-equipment/:id/return", post(inventory::return_equipment))
        // Statistics
        .route("/stats", get(stats::get_stats))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
