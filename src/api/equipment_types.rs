//! Equipment type endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        available_equipment::AvailableEquipment,
        equipment_type::{EquipmentType, EquipmentTypeInput, EquipmentTypeQuery},
    },
};

/// List equipment types, optionally filtered by name or category
#[utoipa::path(
    get,
    path = "/equipment-types",
    tag = "equipment_types",
    params(EquipmentTypeQuery),
    responses(
        (status = 200, description = "Equipment types", body = Vec<EquipmentType>)
    )
)]
pub async fn list_equipment_types(
    State(state): State<crate::AppState>,
    Query(query): Query<EquipmentTypeQuery>,
) -> AppResult<Json<Vec<EquipmentType>>> {
    let types = state.services.equipment_types.search(&query).await?;
    Ok(Json(types))
}

/// Get equipment type by ID
#[utoipa::path(
    get,
    path = "/equipment-types/{id}",
    tag = "equipment_types",
    params(("id" = i64, Path, description = "Equipment type ID")),
    responses(
        (status = 200, description = "Equipment type", body = EquipmentType),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_equipment_type(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<EquipmentType>> {
    let equipment_type = state.services.equipment_types.get(id).await?;
    Ok(Json(equipment_type))
}

/// Create equipment type
#[utoipa::path(
    post,
    path = "/equipment-types",
    tag = "equipment_types",
    request_body = EquipmentTypeInput,
    responses(
        (status = 201, description = "Equipment type created", body = EquipmentType),
        (status = 409, description = "Name already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_equipment_type(
    State(state): State<crate::AppState>,
    Json(data): Json<EquipmentTypeInput>,
) -> AppResult<(StatusCode, Json<EquipmentType>)> {
    let equipment_type = state.services.equipment_types.create(&data).await?;
    Ok((StatusCode::CREATED, Json(equipment_type)))
}

/// Update equipment type
#[utoipa::path(
    put,
    path = "/equipment-types/{id}",
    tag = "equipment_types",
    params(("id" = i64, Path, description = "Equipment type ID")),
    request_body = EquipmentTypeInput,
    responses(
        (status = 200, description = "Equipment type updated", body = EquipmentType),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Name already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_equipment_type(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(data): Json<EquipmentTypeInput>,
) -> AppResult<Json<EquipmentType>> {
    let equipment_type = state.services.equipment_types.update(id, &data).await?;
    Ok(Json(equipment_type))
}

/// Delete equipment type
#[utoipa::path(
    delete,
    path = "/equipment-types/{id}",
    tag = "equipment_types",
    params(("id" = i64, Path, description = "Equipment type ID")),
    responses(
        (status = 204, description = "Equipment type deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Still referenced by inventory", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_equipment_type(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.equipment_types.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Inventory records of an equipment type across rental points
#[utoipa::path(
    get,
    path = "/equipment-types/{id}/equipment",
    tag = "equipment_types",
    params(("id" = i64, Path, description = "Equipment type ID")),
    responses(
        (status = 200, description = "Inventory records", body = Vec<AvailableEquipment>),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_equipment_type_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<AvailableEquipment>>> {
    state.services.equipment_types.get(id).await?;
    let equipment = state.services.inventory.find_by_equipment_type(id).await?;
    Ok(Json(equipment))
}
