//! Available equipment (inventory) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::available_equipment::{
        Availability, AvailableEquipment, AvailableEquipmentDetails, AvailableEquipmentInput,
        AvailableEquipmentQuery, StockChange,
    },
};

/// List inventory records
#[utoipa::path(
    get,
    path = "/available-equipment",
    tag = "available_equipment",
    params(AvailableEquipmentQuery),
    responses(
        (status = 200, description = "Inventory records", body = Vec<AvailableEquipment>)
    )
)]
pub async fn list_available_equipment(
    State(state): State<crate::AppState>,
    Query(query): Query<AvailableEquipmentQuery>,
) -> AppResult<Json<Vec<AvailableEquipment>>> {
    let records = state.services.inventory.search(&query).await?;
    Ok(Json(records))
}

/// Get inventory record by ID
#[utoipa::path(
    get,
    path = "/available-equipment/{id}",
    tag = "available_equipment",
    params(("id" = i64, Path, description = "Inventory record ID")),
    responses(
        (status = 200, description = "Inventory record", body = AvailableEquipment),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_available_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AvailableEquipment>> {
    let equipment = state.services.inventory.get(id).await?;
    Ok(Json(equipment))
}

/// Inventory record with its rental point, equipment type and cost unit
#[utoipa::path(
    get,
    path = "/available-equipment/{id}/details",
    tag = "available_equipment",
    params(("id" = i64, Path, description = "Inventory record ID")),
    responses(
        (status = 200, description = "Inventory record details", body = AvailableEquipmentDetails),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_available_equipment_details(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AvailableEquipmentDetails>> {
    let details = state.services.inventory.get_details(id).await?;
    Ok(Json(details))
}

/// Whether at least one unit can be rented; unknown ids report false
#[utoipa::path(
    get,
    path = "/available-equipment/{id}/availability",
    tag = "available_equipment",
    params(("id" = i64, Path, description = "Inventory record ID")),
    responses(
        (status = 200, description = "Availability", body = Availability)
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Availability>> {
    let available = state.services.inventory.is_available(id).await?;
    Ok(Json(Availability { id, available }))
}

/// Create inventory record
#[utoipa::path(
    post,
    path = "/available-equipment",
    tag = "available_equipment",
    request_body = AvailableEquipmentInput,
    responses(
        (status = 201, description = "Inventory record created", body = AvailableEquipment),
        (status = 409, description = "Pair already stocked", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid reference or counts", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_available_equipment(
    State(state): State<crate::AppState>,
    Json(data): Json<AvailableEquipmentInput>,
) -> AppResult<(StatusCode, Json<AvailableEquipment>)> {
    let equipment = state.services.inventory.create(&data).await?;
    Ok((StatusCode::CREATED, Json(equipment)))
}

/// Update inventory record
#[utoipa::path(
    put,
    path = "/available-equipment/{id}",
    tag = "available_equipment",
    params(("id" = i64, Path, description = "Inventory record ID")),
    request_body = AvailableEquipmentInput,
    responses(
        (status = 200, description = "Inventory record updated", body = AvailableEquipment),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Pair already stocked or concurrent write", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid reference or counts", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_available_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(data): Json<AvailableEquipmentInput>,
) -> AppResult<Json<AvailableEquipment>> {
    let equipment = state.services.inventory.update(id, &data).await?;
    Ok(Json(equipment))
}

/// Delete inventory record
#[utoipa::path(
    delete,
    path = "/available-equipment/{id}",
    tag = "available_equipment",
    params(("id" = i64, Path, description = "Inventory record ID")),
    responses(
        (status = 204, description = "Inventory record deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_available_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.inventory.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rent units
#[utoipa::path(
    post,
    path = "/available-equipment/{id}/rent",
    tag = "available_equipment",
    params(("id" = i64, Path, description = "Inventory record ID")),
    request_body = StockChange,
    responses(
        (status = 200, description = "Units rented", body = AvailableEquipment),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Concurrent write", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid quantity or insufficient stock", body = crate::error::ErrorResponse)
    )
)]
pub async fn rent_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(change): Json<StockChange>,
) -> AppResult<Json<AvailableEquipment>> {
    let equipment = state.services.inventory.rent(id, change.quantity).await?;
    Ok(Json(equipment))
}

/// Return units
#[utoipa::path(
    post,
    path = "/available-equipment/{id}/return",
    tag = "available_equipment",
    params(("id" = i64, Path, description = "Inventory record ID")),
    request_body = StockChange,
    responses(
        (status = 200, description = "Units returned", body = AvailableEquipment),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Concurrent write", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid quantity or exceeds total", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(change): Json<StockChange>,
) -> AppResult<Json<AvailableEquipment>> {
    let equipment = state.services.inventory.return_units(id, change.quantity).await?;
    Ok(Json(equipment))
}
