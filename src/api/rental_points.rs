//! Rental point endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        available_equipment::AvailableEquipment,
        rental_point::{RentalPoint, RentalPointInput, RentalPointQuery},
    },
};

/// List rental points, optionally filtered by one substring field
#[utoipa::path(
    get,
    path = "/rental-points",
    tag = "rental_points",
    params(RentalPointQuery),
    responses(
        (status = 200, description = "Rental points", body = Vec<RentalPoint>),
        (status = 400, description = "More than one filter given", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_rental_points(
    State(state): State<crate::AppState>,
    Query(query): Query<RentalPointQuery>,
) -> AppResult<Json<Vec<RentalPoint>>> {
    let points = state.services.rental_points.search(&query).await?;
    Ok(Json(points))
}

/// Get rental point by ID
#[utoipa::path(
    get,
    path = "/rental-points/{id}",
    tag = "rental_points",
    params(("id" = i64, Path, description = "Rental point ID")),
    responses(
        (status = 200, description = "Rental point", body = RentalPoint),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_rental_point(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RentalPoint>> {
    let point = state.services.rental_points.get(id).await?;
    Ok(Json(point))
}

/// Create rental point
#[utoipa::path(
    post,
    path = "/rental-points",
    tag = "rental_points",
    request_body = RentalPointInput,
    responses(
        (status = 201, description = "Rental point created", body = RentalPoint),
        (status = 409, description = "Address already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_rental_point(
    State(state): State<crate::AppState>,
    Json(data): Json<RentalPointInput>,
) -> AppResult<(StatusCode, Json<RentalPoint>)> {
    let point = state.services.rental_points.create(&data).await?;
    Ok((StatusCode::CREATED, Json(point)))
}

/// Update rental point
#[utoipa::path(
    put,
    path = "/rental-points/{id}",
    tag = "rental_points",
    params(("id" = i64, Path, description = "Rental point ID")),
    request_body = RentalPointInput,
    responses(
        (status = 200, description = "Rental point updated", body = RentalPoint),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Address already used", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_rental_point(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
    Json(data): Json<RentalPointInput>,
) -> AppResult<Json<RentalPoint>> {
    let point = state.services.rental_points.update(id, &data).await?;
    Ok(Json(point))
}

/// Delete rental point
#[utoipa::path(
    delete,
    path = "/rental-points/{id}",
    tag = "rental_points",
    params(("id" = i64, Path, description = "Rental point ID")),
    responses(
        (status = 204, description = "Rental point deleted"),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Still referenced by inventory", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_rental_point(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state.services.rental_points.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Inventory held at a rental point
#[utoipa::path(
    get,
    path = "/rental-points/{id}/equipment",
    tag = "rental_points",
    params(("id" = i64, Path, description = "Rental point ID")),
    responses(
        (status = 200, description = "Inventory records", body = Vec<AvailableEquipment>),
        (status = 404, description = "Not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_rental_point_equipment(
    State(state): State<crate::AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<AvailableEquipment>>> {
    state.services.rental_points.get(id).await?;
    let equipment = state.services.inventory.find_by_rental_point(id).await?;
    Ok(Json(equipment))
}
