//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{equipment_types, health, inventory, rental_points, stats};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rental Inventory API",
        version = "1.0.0",
        description = "Sports equipment rental inventory REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Rental points
        rental_points::list_rental_points,
        rental_points::get_rental_point,
        rental_points::create_rental_point,
        rental_points::update_rental_point,
        rental_points::delete_rental_point,
        rental_points::list_rental_point_equipment,
        // Equipment types
        equipment_types::list_equipment_types,
        equipment_types::get_equipment_type,
        equipment_types::create_equipment_type,
        equipment_types::update_equipment_type,
        equipment_types::delete_equipment_type,
        equipment_types::list_equipment_type_equipment,
        // Available equipment
        inventory::list_available_equipment,
        inventory::get_available_equipment,
        inventory::get_available_equipment_details,
        inventory::get_availability,
        inventory::create_available_equipment,
        inventory::update_available_equipment,
        inventory::delete_available_equipment,
        inventory::rent_equipment,
        inventory::return_equipment,
        // Statistics
        stats::get_stats,
    ),
    components(
        schemas(
            // Rental points
            crate::models::rental_point::RentalPoint,
            crate::models::rental_point::RentalPointInput,
            // Equipment types
            crate::models::equipment_type::EquipmentType,
            crate::models::equipment_type::EquipmentTypeInput,
            // Available equipment
            crate::models::available_equipment::AvailableEquipment,
            crate::models::available_equipment::AvailableEquipmentInput,
            crate::models::available_equipment::AvailableEquipmentDetails,
            crate::models::available_equipment::Availability,
            crate::models::available_equipment::StockChange,
            // Stats
            crate::services::stats::InventoryStats,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rental_points", description = "Rental point catalog"),
        (name = "equipment_types", description = "Equipment type catalog"),
        (name = "available_equipment", description = "Stock held at rental points"),
        (name = "stats", description = "Statistics")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
