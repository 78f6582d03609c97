//! Business logic services

pub mod equipment_types;
pub mod inventory;
pub mod rental_points;
pub mod stats;

use crate::repository::{HealthCheckStore, Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub rental_points: rental_points::RentalPointService,
    pub equipment_types: equipment_types::EquipmentTypeService,
    pub inventory: inventory::InventoryService,
    pub stats: stats::StatsService,
    repository: Repository,
}

impl Services {
    /// Create all services over the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            rental_points: rental_points::RentalPointService::new(
                repository.rental_points.clone(),
                repository.available_equipment.clone(),
            ),
            equipment_types: equipment_types::EquipmentTypeService::new(
                repository.equipment_types.clone(),
                repository.available_equipment.clone(),
            ),
            inventory: inventory::InventoryService::new(
                repository.available_equipment.clone(),
                repository.rental_points.clone(),
                repository.equipment_types.clone(),
            ),
            stats: stats::StatsService::new(repository.clone()),
            repository,
        }
    }

    /// Check that the storage backend answers
    pub async fn ping(&self) -> crate::error::AppResult<()> {
        self.repository.health.ping().await
    }
}
