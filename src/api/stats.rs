//! Statistics endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, services::stats::InventoryStats};

/// Dashboard counters
#[utoipa::path(
    get,
    path = "/stats",
    tag = "stats",
    responses(
        (status = 200, description = "Inventory statistics", body = InventoryStats)
    )
)]
pub async fn get_stats(State(state): State<crate::AppState>) -> AppResult<Json<InventoryStats>> {
    let stats = state.services.stats.get_stats().await?;
    Ok(Json(stats))
}
