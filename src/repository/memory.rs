//! In-memory storage backend.
//!
//! One lock guards all three tables, so every operation sees a consistent
//! snapshot and the same uniqueness and foreign-key rules as the database
//! schema are enforced on write.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use super::{AvailableEquipmentStore, EquipmentTypeStore, HealthCheckStore, RentalPointStore};
use crate::{
    error::{AppError, AppResult, EntityKind},
    models::{
        AvailableEquipment, EquipmentType, EquipmentTypeInput, RentalPoint, RentalPointInput,
        StockFields,
    },
};

#[derive(Debug, Default)]
struct Tables {
    rental_points: BTreeMap<i64, RentalPoint>,
    equipment_types: BTreeMap<i64, EquipmentType>,
    available_equipment: BTreeMap<i64, AvailableEquipment>,
    last_rental_point_id: i64,
    last_equipment_type_id: i64,
    last_available_equipment_id: i64,
}

/// Each table numbers its rows independently, like a BIGSERIAL sequence
fn next_id(last: &mut i64) -> i64 {
    *last += 1;
    *last
}

impl Tables {

    fn address_taken(&self, address: &str, except: Option<i64>) -> bool {
        self.rental_points
            .values()
            .any(|p| p.address == address && Some(p.id) != except)
    }

    fn type_name_taken(&self, type_name: &str, except: Option<i64>) -> bool {
        let wanted = type_name.to_lowercase();
        self.equipment_types
            .values()
            .any(|t| t.type_name.to_lowercase() == wanted && Some(t.id) != except)
    }

    fn check_stock_constraints(&self, data: &StockFields, except: Option<i64>) -> AppResult<()> {
        if !self.rental_points.contains_key(&data.rental_point_id) {
            return Err(AppError::InvalidReference {
                entity: EntityKind::RentalPoint,
                id: Some(data.rental_point_id),
            });
        }
        if !self.equipment_types.contains_key(&data.equipment_type_id) {
            return Err(AppError::InvalidReference {
                entity: EntityKind::EquipmentType,
                id: Some(data.equipment_type_id),
            });
        }
        let duplicate = self.available_equipment.values().any(|e| {
            e.rental_point_id == data.rental_point_id
                && e.equipment_type_id == data.equipment_type_id
                && Some(e.id) != except
        });
        if duplicate {
            return Err(AppError::DuplicatePair {
                rental_point_id: data.rental_point_id,
                equipment_type_id: data.equipment_type_id,
            });
        }
        if data.available_count > data.total_count {
            return Err(AppError::InvariantViolation {
                available: data.available_count,
                total: data.total_count,
            });
        }
        Ok(())
    }

    fn references(&self, matches: impl Fn(&AvailableEquipment) -> bool) -> i64 {
        self.available_equipment.values().filter(|e| matches(e)).count() as i64
    }
}

/// Store keeping every table in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| AppError::Internal("storage lock poisoned".to_string()))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| AppError::Internal("storage lock poisoned".to_string()))
    }

    fn filter_points(&self, keep: impl Fn(&RentalPoint) -> bool) -> AppResult<Vec<RentalPoint>> {
        Ok(self.read()?.rental_points.values().filter(|p| keep(p)).cloned().collect())
    }

    fn filter_types(&self, keep: impl Fn(&EquipmentType) -> bool) -> AppResult<Vec<EquipmentType>> {
        Ok(self.read()?.equipment_types.values().filter(|t| keep(t)).cloned().collect())
    }

    fn filter_equipment(
        &self,
        keep: impl Fn(&AvailableEquipment) -> bool,
    ) -> AppResult<Vec<AvailableEquipment>> {
        Ok(self.read()?.available_equipment.values().filter(|e| keep(e)).cloned().collect())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl RentalPointStore for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<RentalPoint>> {
        self.filter_points(|_| true)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<RentalPoint>> {
        Ok(self.read()?.rental_points.get(&id).cloned())
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.read()?.rental_points.contains_key(&id))
    }

    async fn exists_by_address(&self, address: &str) -> AppResult<bool> {
        Ok(self.read()?.address_taken(address, None))
    }

    async fn insert(&self, data: &RentalPointInput) -> AppResult<RentalPoint> {
        let mut tables = self.write()?;
        if tables.address_taken(&data.address, None) {
            return Err(AppError::DuplicateAddress(data.address.clone()));
        }
        let now = Utc::now();
        let point = RentalPoint {
            id: next_id(&mut tables.last_rental_point_id),
            name: data.name.clone(),
            address: data.address.clone(),
            opening_hours: data.opening_hours.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.rental_points.insert(point.id, point.clone());
        Ok(point)
    }

    async fn update(&self, id: i64, data: &RentalPointInput) -> AppResult<Option<RentalPoint>> {
        let mut tables = self.write()?;
        if !tables.rental_points.contains_key(&id) {
            return Ok(None);
        }
        if tables.address_taken(&data.address, Some(id)) {
            return Err(AppError::DuplicateAddress(data.address.clone()));
        }
        let point = tables.rental_points.get_mut(&id).map(|point| {
            point.name = data.name.clone();
            point.address = data.address.clone();
            point.opening_hours = data.opening_hours.clone();
            point.updated_at = Utc::now();
            point.clone()
        });
        Ok(point)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.write()?;
        let references = tables.references(|e| e.rental_point_id == id);
        if references > 0 {
            return Err(AppError::StillReferenced {
                entity: EntityKind::RentalPoint,
                id,
                references,
            });
        }
        Ok(tables.rental_points.remove(&id).is_some())
    }

    async fn search_by_name(&self, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        self.filter_points(|p| contains_ignore_case(&p.name, fragment))
    }

    async fn search_by_address(&self, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        self.filter_points(|p| contains_ignore_case(&p.address, fragment))
    }

    async fn search_by_opening_hours(&self, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        self.filter_points(|p| p.opening_hours.contains(fragment))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.read()?.rental_points.len() as i64)
    }
}

#[async_trait]
impl EquipmentTypeStore for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<EquipmentType>> {
        self.filter_types(|_| true)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<EquipmentType>> {
        Ok(self.read()?.equipment_types.get(&id).cloned())
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.read()?.equipment_types.contains_key(&id))
    }

    async fn exists_by_type_name(&self, type_name: &str) -> AppResult<bool> {
        Ok(self.read()?.type_name_taken(type_name, None))
    }

    async fn insert(&self, data: &EquipmentTypeInput) -> AppResult<EquipmentType> {
        let mut tables = self.write()?;
        if tables.type_name_taken(&data.type_name, None) {
            return Err(AppError::DuplicateName(data.type_name.clone()));
        }
        let now = Utc::now();
        let equipment_type = EquipmentType {
            id: next_id(&mut tables.last_equipment_type_id),
            type_name: data.type_name.clone(),
            category: data.category.clone(),
            description: data.description.clone(),
            created_at: now,
            updated_at: now,
        };
        tables
            .equipment_types
            .insert(equipment_type.id, equipment_type.clone());
        Ok(equipment_type)
    }

    async fn update(&self, id: i64, data: &EquipmentTypeInput) -> AppResult<Option<EquipmentType>> {
        let mut tables = self.write()?;
        if !tables.equipment_types.contains_key(&id) {
            return Ok(None);
        }
        if tables.type_name_taken(&data.type_name, Some(id)) {
            return Err(AppError::DuplicateName(data.type_name.clone()));
        }
        let equipment_type = tables.equipment_types.get_mut(&id).map(|t| {
            t.type_name = data.type_name.clone();
            t.category = data.category.clone();
            t.description = data.description.clone();
            t.updated_at = Utc::now();
            t.clone()
        });
        Ok(equipment_type)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut tables = self.write()?;
        let references = tables.references(|e| e.equipment_type_id == id);
        if references > 0 {
            return Err(AppError::StillReferenced {
                entity: EntityKind::EquipmentType,
                id,
                references,
            });
        }
        Ok(tables.equipment_types.remove(&id).is_some())
    }

    async fn search_by_type_name(&self, fragment: &str) -> AppResult<Vec<EquipmentType>> {
        self.filter_types(|t| contains_ignore_case(&t.type_name, fragment))
    }

    async fn search_by_category(&self, fragment: &str) -> AppResult<Vec<EquipmentType>> {
        self.filter_types(|t| contains_ignore_case(&t.category, fragment))
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.read()?.equipment_types.len() as i64)
    }
}

#[async_trait]
impl AvailableEquipmentStore for InMemoryStore {
    async fn list(&self) -> AppResult<Vec<AvailableEquipment>> {
        self.filter_equipment(|_| true)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<AvailableEquipment>> {
        Ok(self.read()?.available_equipment.get(&id).cloned())
    }

    async fn exists_by_pair(&self, rental_point_id: i64, equipment_type_id: i64) -> AppResult<bool> {
        Ok(self.read()?.available_equipment.values().any(|e| {
            e.rental_point_id == rental_point_id && e.equipment_type_id == equipment_type_id
        }))
    }

    async fn insert(&self, data: &StockFields) -> AppResult<AvailableEquipment> {
        let mut tables = self.write()?;
        tables.check_stock_constraints(data, None)?;
        let now = Utc::now();
        let equipment = AvailableEquipment {
            id: next_id(&mut tables.last_available_equipment_id),
            rental_point_id: data.rental_point_id,
            equipment_type_id: data.equipment_type_id,
            total_count: data.total_count,
            available_count: data.available_count,
            cost: data.cost,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        tables.available_equipment.insert(equipment.id, equipment.clone());
        Ok(equipment)
    }

    async fn update(
        &self,
        id: i64,
        expected_version: i32,
        data: &StockFields,
    ) -> AppResult<AvailableEquipment> {
        let mut tables = self.write()?;
        match tables.available_equipment.get(&id) {
            Some(current) if current.version == expected_version => {}
            Some(_) => return Err(AppError::ConcurrentModification { id }),
            None => return Err(AppError::not_found(EntityKind::AvailableEquipment, id)),
        }
        tables.check_stock_constraints(data, Some(id))?;
        let equipment = tables
            .available_equipment
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(EntityKind::AvailableEquipment, id))?;
        equipment.rental_point_id = data.rental_point_id;
        equipment.equipment_type_id = data.equipment_type_id;
        equipment.total_count = data.total_count;
        equipment.available_count = data.available_count;
        equipment.cost = data.cost;
        equipment.version += 1;
        equipment.updated_at = Utc::now();
        Ok(equipment.clone())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.write()?.available_equipment.remove(&id).is_some())
    }

    async fn find_by_rental_point(&self, rental_point_id: i64) -> AppResult<Vec<AvailableEquipment>> {
        self.filter_equipment(|e| e.rental_point_id == rental_point_id)
    }

    async fn find_by_equipment_type(&self, equipment_type_id: i64) -> AppResult<Vec<AvailableEquipment>> {
        self.filter_equipment(|e| e.equipment_type_id == equipment_type_id)
    }

    async fn find_by_point_and_type(
        &self,
        rental_point_id: i64,
        equipment_type_id: i64,
    ) -> AppResult<Option<AvailableEquipment>> {
        Ok(self
            .filter_equipment(|e| {
                e.rental_point_id == rental_point_id && e.equipment_type_id == equipment_type_id
            })?
            .into_iter()
            .next())
    }

    async fn find_with_available_above(&self, threshold: i32) -> AppResult<Vec<AvailableEquipment>> {
        self.filter_equipment(|e| e.available_count > threshold)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.read()?.available_equipment.len() as i64)
    }

    async fn count_with_stock(&self) -> AppResult<i64> {
        Ok(self.read()?.references(|e| e.available_count > 0))
    }

    async fn count_by_rental_point(&self, rental_point_id: i64) -> AppResult<i64> {
        Ok(self.read()?.references(|e| e.rental_point_id == rental_point_id))
    }

    async fn count_by_equipment_type(&self, equipment_type_id: i64) -> AppResult<i64> {
        Ok(self.read()?.references(|e| e.equipment_type_id == equipment_type_id))
    }
}

#[async_trait]
impl HealthCheckStore for InMemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.read().map(|_| ())
    }
}
