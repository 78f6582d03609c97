//! Equipment type catalog service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult, EntityKind},
    models::equipment_type::{EquipmentType, EquipmentTypeInput, EquipmentTypeQuery},
    repository::{AvailableEquipmentStore, EquipmentTypeStore},
};

#[derive(Clone)]
pub struct EquipmentTypeService {
    equipment_types: Arc<dyn EquipmentTypeStore>,
    inventory: Arc<dyn AvailableEquipmentStore>,
}

impl EquipmentTypeService {
    pub fn new(
        equipment_types: Arc<dyn EquipmentTypeStore>,
        inventory: Arc<dyn AvailableEquipmentStore>,
    ) -> Self {
        Self {
            equipment_types,
            inventory,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<EquipmentType>> {
        self.equipment_types.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<EquipmentType>> {
        self.equipment_types.get_by_id(id).await
    }

    pub async fn get(&self, id: i64) -> AppResult<EquipmentType> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::EquipmentType, id))
    }

    /// Create an equipment type; names are unique ignoring case
    pub async fn create(&self, data: &EquipmentTypeInput) -> AppResult<EquipmentType> {
        data.check()?;
        if self.equipment_types.exists_by_type_name(&data.type_name).await? {
            return Err(AppError::DuplicateName(data.type_name.clone()));
        }
        let equipment_type = self.equipment_types.insert(data).await?;
        tracing::info!(equipment_type_id = equipment_type.id, "Equipment type created");
        Ok(equipment_type)
    }

    pub async fn update(&self, id: i64, data: &EquipmentTypeInput) -> AppResult<EquipmentType> {
        data.check()?;
        let existing = self.get(id).await?;

        // The record itself is excluded so a case-only rename passes
        if existing.type_name != data.type_name
            && self.name_taken_by_other(id, &data.type_name).await?
        {
            return Err(AppError::DuplicateName(data.type_name.clone()));
        }

        let equipment_type = self
            .equipment_types
            .update(id, data)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::EquipmentType, id))?;
        tracing::info!(equipment_type_id = id, "Equipment type updated");
        Ok(equipment_type)
    }

    async fn name_taken_by_other(&self, id: i64, type_name: &str) -> AppResult<bool> {
        if !self.equipment_types.exists_by_type_name(type_name).await? {
            return Ok(false);
        }
        let wanted = type_name.to_lowercase();
        let holders = self.equipment_types.search_by_type_name(type_name).await?;
        Ok(holders
            .iter()
            .any(|t| t.id != id && t.type_name.to_lowercase() == wanted))
    }

    /// Delete an equipment type that no inventory record refers to
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.equipment_types.exists(id).await? {
            return Err(AppError::not_found(EntityKind::EquipmentType, id));
        }

        let references = self.inventory.count_by_equipment_type(id).await?;
        if references > 0 {
            return Err(AppError::StillReferenced {
                entity: EntityKind::EquipmentType,
                id,
                references,
            });
        }

        if !self.equipment_types.delete(id).await? {
            return Err(AppError::not_found(EntityKind::EquipmentType, id));
        }
        tracing::info!(equipment_type_id = id, "Equipment type deleted");
        Ok(())
    }

    pub async fn search_by_type_name(&self, fragment: &str) -> AppResult<Vec<EquipmentType>> {
        self.equipment_types.search_by_type_name(fragment).await
    }

    pub async fn search_by_category(&self, fragment: &str) -> AppResult<Vec<EquipmentType>> {
        self.equipment_types.search_by_category(fragment).await
    }

    pub async fn search(&self, query: &EquipmentTypeQuery) -> AppResult<Vec<EquipmentType>> {
        match (&query.type_name, &query.category) {
            (None, None) => self.list().await,
            (Some(type_name), None) => self.search_by_type_name(type_name).await,
            (None, Some(category)) => self.search_by_category(category).await,
            (Some(_), Some(_)) => Err(AppError::Validation(
                "Only one of type_name or category may be given".to_string(),
            )),
        }
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.equipment_types.count().await
    }
}
