//! Storage layer: store traits and their PostgreSQL / in-memory backends

pub mod available_equipment;
pub mod equipment_types;
pub mod memory;
pub mod rental_points;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{
        AvailableEquipment, EquipmentType, EquipmentTypeInput, RentalPoint, RentalPointInput,
        StockFields,
    },
};

/// Rental point storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RentalPointStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<RentalPoint>>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<RentalPoint>>;
    async fn exists(&self, id: i64) -> AppResult<bool>;
    /// Exact, case-sensitive address match
    async fn exists_by_address(&self, address: &str) -> AppResult<bool>;
    async fn insert(&self, data: &RentalPointInput) -> AppResult<RentalPoint>;
    /// Overwrite all fields; `None` when the id does not exist
    async fn update(&self, id: i64, data: &RentalPointInput) -> AppResult<Option<RentalPoint>>;
    /// Returns false when nothing was deleted
    async fn delete(&self, id: i64) -> AppResult<bool>;
    async fn search_by_name(&self, fragment: &str) -> AppResult<Vec<RentalPoint>>;
    async fn search_by_address(&self, fragment: &str) -> AppResult<Vec<RentalPoint>>;
    /// Case-sensitive, unlike the other searches
    async fn search_by_opening_hours(&self, fragment: &str) -> AppResult<Vec<RentalPoint>>;
    async fn count(&self) -> AppResult<i64>;
}

/// Equipment type storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentTypeStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<EquipmentType>>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<EquipmentType>>;
    async fn exists(&self, id: i64) -> AppResult<bool>;
    /// Case-insensitive name match
    async fn exists_by_type_name(&self, type_name: &str) -> AppResult<bool>;
    async fn insert(&self, data: &EquipmentTypeInput) -> AppResult<EquipmentType>;
    async fn update(&self, id: i64, data: &EquipmentTypeInput) -> AppResult<Option<EquipmentType>>;
    async fn delete(&self, id: i64) -> AppResult<bool>;
    async fn search_by_type_name(&self, fragment: &str) -> AppResult<Vec<EquipmentType>>;
    async fn search_by_category(&self, fragment: &str) -> AppResult<Vec<EquipmentType>>;
    async fn count(&self) -> AppResult<i64>;
}

/// Inventory record storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AvailableEquipmentStore: Send + Sync {
    async fn list(&self) -> AppResult<Vec<AvailableEquipment>>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<AvailableEquipment>>;
    async fn exists_by_pair(&self, rental_point_id: i64, equipment_type_id: i64) -> AppResult<bool>;
    async fn insert(&self, data: &StockFields) -> AppResult<AvailableEquipment>;
    /// Overwrite all fields if the stored version still equals `expected_version`,
    /// otherwise fail with `ConcurrentModification`
    async fn update(
        &self,
        id: i64,
        expected_version: i32,
        data: &StockFields,
    ) -> AppResult<AvailableEquipment>;
    async fn delete(&self, id: i64) -> AppResult<bool>;
    async fn find_by_rental_point(&self, rental_point_id: i64) -> AppResult<Vec<AvailableEquipment>>;
    async fn find_by_equipment_type(&self, equipment_type_id: i64) -> AppResult<Vec<AvailableEquipment>>;
    async fn find_by_point_and_type(
        &self,
        rental_point_id: i64,
        equipment_type_id: i64,
    ) -> AppResult<Option<AvailableEquipment>>;
    /// Records whose available count is strictly greater than `threshold`
    async fn find_with_available_above(&self, threshold: i32) -> AppResult<Vec<AvailableEquipment>>;
    async fn count(&self) -> AppResult<i64>;
    async fn count_with_stock(&self) -> AppResult<i64>;
    async fn count_by_rental_point(&self, rental_point_id: i64) -> AppResult<i64>;
    async fn count_by_equipment_type(&self, equipment_type_id: i64) -> AppResult<i64>;
}

/// Backend liveness probe
#[async_trait]
pub trait HealthCheckStore: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

/// Bundle of all stores sharing one backend
#[derive(Clone)]
pub struct Repository {
    pub rental_points: Arc<dyn RentalPointStore>,
    pub equipment_types: Arc<dyn EquipmentTypeStore>,
    pub available_equipment: Arc<dyn AvailableEquipmentStore>,
    pub health: Arc<dyn HealthCheckStore>,
}

impl Repository {
    /// Create a repository backed by the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            rental_points: Arc::new(rental_points::RentalPointsRepository::new(pool.clone())),
            equipment_types: Arc::new(equipment_types::EquipmentTypesRepository::new(pool.clone())),
            available_equipment: Arc::new(
                available_equipment::AvailableEquipmentRepository::new(pool.clone()),
            ),
            health: Arc::new(PgHealthCheck { pool }),
        }
    }

    /// Create a repository keeping everything in process memory
    pub fn in_memory() -> Self {
        let store = Arc::new(memory::InMemoryStore::new());
        Self {
            rental_points: store.clone(),
            equipment_types: store.clone(),
            available_equipment: store.clone(),
            health: store,
        }
    }
}

struct PgHealthCheck {
    pool: Pool<Postgres>,
}

#[async_trait]
impl HealthCheckStore for PgHealthCheck {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Build a `LIKE` pattern matching `fragment` anywhere, with wildcards escaped
pub(crate) fn contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}
