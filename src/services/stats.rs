//! Inventory statistics service

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    repository::{AvailableEquipmentStore, EquipmentTypeStore, RentalPointStore, Repository},
};

/// Dashboard counters
#[derive(Debug, Serialize, ToSchema)]
pub struct InventoryStats {
    pub rental_points: i64,
    pub equipment_types: i64,
    /// Number of inventory records
    pub equipment_records: i64,
    /// Inventory records with at least one unit available
    pub equipment_records_in_stock: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_stats(&self) -> AppResult<InventoryStats> {
        Ok(InventoryStats {
            rental_points: self.repository.rental_points.count().await?,
            equipment_types: self.repository.equipment_types.count().await?,
            equipment_records: self.repository.available_equipment.count().await?,
            equipment_records_in_stock: self.repository.available_equipment.count_with_stock().await?,
        })
    }
}
