//! Inventory ledger: stock of equipment types at rental points

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::{AppError, AppResult, EntityKind},
    models::available_equipment::{
        normalize_available, AvailableEquipment, AvailableEquipmentDetails,
        AvailableEquipmentInput, AvailableEquipmentQuery, StockFields, COST_UNIT,
    },
    repository::{AvailableEquipmentStore, EquipmentTypeStore, RentalPointStore},
};

#[derive(Clone)]
pub struct InventoryService {
    equipment: Arc<dyn AvailableEquipmentStore>,
    rental_points: Arc<dyn RentalPointStore>,
    equipment_types: Arc<dyn EquipmentTypeStore>,
}

impl InventoryService {
    pub fn new(
        equipment: Arc<dyn AvailableEquipmentStore>,
        rental_points: Arc<dyn RentalPointStore>,
        equipment_types: Arc<dyn EquipmentTypeStore>,
    ) -> Self {
        Self {
            equipment,
            rental_points,
            equipment_types,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<AvailableEquipment>> {
        self.equipment.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<AvailableEquipment>> {
        self.equipment.get_by_id(id).await
    }

    pub async fn get(&self, id: i64) -> AppResult<AvailableEquipment> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::AvailableEquipment, id))
    }

    /// Record with its rental point and equipment type resolved
    pub async fn get_details(&self, id: i64) -> AppResult<AvailableEquipmentDetails> {
        let equipment = self.get(id).await?;
        let rental_point = self
            .rental_points
            .get_by_id(equipment.rental_point_id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::RentalPoint, equipment.rental_point_id))?;
        let equipment_type = self
            .equipment_types
            .get_by_id(equipment.equipment_type_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(EntityKind::EquipmentType, equipment.equipment_type_id)
            })?;

        Ok(AvailableEquipmentDetails {
            equipment,
            cost_unit: COST_UNIT.to_string(),
            rental_point,
            equipment_type,
        })
    }

    /// Resolve both references, failing if either is absent or unknown
    async fn check_references(&self, data: &AvailableEquipmentInput) -> AppResult<(i64, i64)> {
        let rental_point_id = data.rental_point_id.ok_or(AppError::InvalidReference {
            entity: EntityKind::RentalPoint,
            id: None,
        })?;
        if !self.rental_points.exists(rental_point_id).await? {
            return Err(AppError::InvalidReference {
                entity: EntityKind::RentalPoint,
                id: Some(rental_point_id),
            });
        }

        let equipment_type_id = data.equipment_type_id.ok_or(AppError::InvalidReference {
            entity: EntityKind::EquipmentType,
            id: None,
        })?;
        if !self.equipment_types.exists(equipment_type_id).await? {
            return Err(AppError::InvalidReference {
                entity: EntityKind::EquipmentType,
                id: Some(equipment_type_id),
            });
        }

        Ok((rental_point_id, equipment_type_id))
    }

    /// Add an equipment type to a rental point's inventory
    pub async fn create(&self, data: &AvailableEquipmentInput) -> AppResult<AvailableEquipment> {
        data.validate()?;
        let (rental_point_id, equipment_type_id) = self.check_references(data).await?;

        if self
            .equipment
            .exists_by_pair(rental_point_id, equipment_type_id)
            .await?
        {
            return Err(AppError::DuplicatePair {
                rental_point_id,
                equipment_type_id,
            });
        }

        let fields = StockFields {
            rental_point_id,
            equipment_type_id,
            total_count: data.total_count,
            available_count: normalize_available(data.total_count, data.available_count)?,
            cost: data.cost,
        };
        let equipment = self.equipment.insert(&fields).await?;
        tracing::info!(
            available_equipment_id = equipment.id,
            rental_point_id,
            equipment_type_id,
            "Inventory record created"
        );
        Ok(equipment)
    }

    /// Overwrite references, counts and cost of an inventory record
    pub async fn update(
        &self,
        id: i64,
        data: &AvailableEquipmentInput,
    ) -> AppResult<AvailableEquipment> {
        let existing = self.get(id).await?;
        data.validate()?;
        let (rental_point_id, equipment_type_id) = self.check_references(data).await?;

        let pair_changed = existing.rental_point_id != rental_point_id
            || existing.equipment_type_id != equipment_type_id;
        if pair_changed
            && self
                .equipment
                .exists_by_pair(rental_point_id, equipment_type_id)
                .await?
        {
            return Err(AppError::DuplicatePair {
                rental_point_id,
                equipment_type_id,
            });
        }

        let fields = StockFields {
            rental_point_id,
            equipment_type_id,
            total_count: data.total_count,
            available_count: normalize_available(data.total_count, data.available_count)?,
            cost: data.cost,
        };
        let equipment = self.equipment.update(id, existing.version, &fields).await?;
        tracing::info!(available_equipment_id = id, "Inventory record updated");
        Ok(equipment)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.equipment.delete(id).await? {
            return Err(AppError::not_found(EntityKind::AvailableEquipment, id));
        }
        tracing::info!(available_equipment_id = id, "Inventory record deleted");
        Ok(())
    }

    pub async fn find_by_rental_point(&self, rental_point_id: i64) -> AppResult<Vec<AvailableEquipment>> {
        self.equipment.find_by_rental_point(rental_point_id).await
    }

    pub async fn find_by_equipment_type(
        &self,
        equipment_type_id: i64,
    ) -> AppResult<Vec<AvailableEquipment>> {
        self.equipment.find_by_equipment_type(equipment_type_id).await
    }

    pub async fn find_by_point_and_type(
        &self,
        rental_point_id: i64,
        equipment_type_id: i64,
    ) -> AppResult<Option<AvailableEquipment>> {
        self.equipment
            .find_by_point_and_type(rental_point_id, equipment_type_id)
            .await
    }

    /// Records with strictly more than `threshold` units available
    pub async fn find_with_available_above(&self, threshold: i32) -> AppResult<Vec<AvailableEquipment>> {
        self.equipment.find_with_available_above(threshold).await
    }

    /// Combine the lookup filters of a listing request
    pub async fn search(&self, query: &AvailableEquipmentQuery) -> AppResult<Vec<AvailableEquipment>> {
        let mut records = match (query.rental_point_id, query.equipment_type_id) {
            (Some(point), Some(equipment_type)) => self
                .find_by_point_and_type(point, equipment_type)
                .await?
                .into_iter()
                .collect(),
            (Some(point), None) => self.find_by_rental_point(point).await?,
            (None, Some(equipment_type)) => self.find_by_equipment_type(equipment_type).await?,
            (None, None) => match query.min_available {
                Some(threshold) => return self.find_with_available_above(threshold).await,
                None => self.list().await?,
            },
        };
        if let Some(threshold) = query.min_available {
            records.retain(|e| e.available_count > threshold);
        }
        Ok(records)
    }

    /// False for unknown ids rather than an error
    pub async fn is_available(&self, id: i64) -> AppResult<bool> {
        Ok(self
            .get_by_id(id)
            .await?
            .is_some_and(|equipment| equipment.is_available()))
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.equipment.count().await
    }

    /// Number of records with at least one unit available
    pub async fn count_with_stock(&self) -> AppResult<i64> {
        self.equipment.count_with_stock().await
    }

    /// Take units out of stock
    pub async fn rent(&self, id: i64, quantity: i32) -> AppResult<AvailableEquipment> {
        let mut equipment = self.get(id).await?;
        let version = equipment.version;
        equipment.rent(quantity)?;
        let equipment = self
            .equipment
            .update(id, version, &equipment.fields())
            .await?;
        tracing::info!(
            available_equipment_id = id,
            quantity,
            available_count = equipment.available_count,
            "Equipment rented"
        );
        Ok(equipment)
    }

    /// Put rented units back into stock
    pub async fn return_units(&self, id: i64, quantity: i32) -> AppResult<AvailableEquipment> {
        let mut equipment = self.get(id).await?;
        let version = equipment.version;
        equipment.return_units(quantity)?;
        let equipment = self
            .equipment
            .update(id, version, &equipment.fields())
            .await?;
        tracing::info!(
            available_equipment_id = id,
            quantity,
            available_count = equipment.available_count,
            "Equipment returned"
        );
        Ok(equipment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{EquipmentTypeInput, RentalPointInput},
        repository::{MockAvailableEquipmentStore, MockEquipmentTypeStore, MockRentalPointStore, Repository},
    };
    use chrono::Utc;

    struct Fixture {
        service: InventoryService,
        repository: Repository,
        point: i64,
        equipment_type: i64,
    }

    async fn fixture() -> Fixture {
        let repository = Repository::in_memory();
        let point = repository
            .rental_points
            .insert(&RentalPointInput::new("Absolut Sport", "123 Main St", "9-21"))
            .await
            .unwrap()
            .id;
        let equipment_type = repository
            .equipment_types
            .insert(&EquipmentTypeInput::new("Mountain Bike", "Bikes"))
            .await
            .unwrap()
            .id;
        let service = InventoryService::new(
            repository.available_equipment.clone(),
            repository.rental_points.clone(),
            repository.equipment_types.clone(),
        );
        Fixture {
            service,
            repository,
            point,
            equipment_type,
        }
    }

    #[tokio::test]
    async fn test_rental_scenario() {
        let f = fixture().await;
        let created = f
            .service
            .create(&AvailableEquipmentInput::new(f.point, f.equipment_type, 10, 100))
            .await
            .unwrap();
        assert_eq!((f.point, f.equipment_type, created.id), (1, 1, 1));
        assert_eq!(created.available_count, 10);

        assert_eq!(f.service.rent(created.id, 3).await.unwrap().available_count, 7);
        assert_eq!(f.service.return_units(created.id, 1).await.unwrap().available_count, 8);

        let over = f.service.rent(created.id, 9).await;
        assert!(matches!(over, Err(AppError::InsufficientStock { available: 8, requested: 9 })));
        assert_eq!(f.service.get(created.id).await.unwrap().available_count, 8);
    }

    #[tokio::test]
    async fn test_available_defaults_for_any_total() {
        let f = fixture().await;
        for (i, total) in [0, 1, 25, 1000].into_iter().enumerate() {
            let point = f
                .repository
                .rental_points
                .insert(&RentalPointInput::new("P", format!("{} Loop Rd", i), "9-21"))
                .await
                .unwrap();
            let created = f
                .service
                .create(&AvailableEquipmentInput::new(point.id, f.equipment_type, total, 1))
                .await
                .unwrap();
            assert_eq!(created.available_count, total);
        }
    }

    #[tokio::test]
    async fn test_rent_then_return_is_identity() {
        let f = fixture().await;
        let created = f
            .service
            .create(&AvailableEquipmentInput::new(f.point, f.equipment_type, 10, 100).with_available(6))
            .await
            .unwrap();
        for q in 1..=6 {
            f.service.rent(created.id, q).await.unwrap();
            let restored = f.service.return_units(created.id, q).await.unwrap();
            assert_eq!(restored.available_count, 6);
        }
    }

    #[tokio::test]
    async fn test_invalid_quantities_leave_stock_unchanged() {
        let f = fixture().await;
        let created = f
            .service
            .create(&AvailableEquipmentInput::new(f.point, f.equipment_type, 10, 100).with_available(8))
            .await
            .unwrap();
        for q in [0, -1, -100] {
            assert!(matches!(f.service.rent(created.id, q).await, Err(AppError::InvalidQuantity(_))));
            assert!(matches!(
                f.service.return_units(created.id, q).await,
                Err(AppError::InvalidQuantity(_))
            ));
        }
        let returned = f.service.return_units(created.id, 3).await;
        assert!(matches!(returned, Err(AppError::ExceedsTotal { total: 10, resulting: 11 })));
        assert_eq!(f.service.get(created.id).await.unwrap().available_count, 8);
    }

    #[tokio::test]
    async fn test_rent_unknown_record() {
        let f = fixture().await;
        // Missing id wins over a bad quantity
        let result = f.service.rent(77, 0).await;
        assert!(matches!(
            result,
            Err(AppError::NotFound { entity: EntityKind::AvailableEquipment, id: 77 })
        ));
        assert!(matches!(f.service.return_units(77, 1).await, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_unknown_record_before_payload_checks() {
        let f = fixture().await;
        let bad_cost = AvailableEquipmentInput::new(f.point, f.equipment_type, 10, 0);
        let result = f.service.update(999, &bad_cost).await;
        assert!(matches!(
            result,
            Err(AppError::NotFound { entity: EntityKind::AvailableEquipment, id: 999 })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_pair_rejected() {
        let f = fixture().await;
        let input = AvailableEquipmentInput::new(f.point, f.equipment_type, 10, 100);
        f.service.create(&input).await.unwrap();
        let second = f.service.create(&input).await;
        assert!(matches!(second, Err(AppError::DuplicatePair { .. })));
        assert_eq!(f.service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_references_validated() {
        let f = fixture().await;
        let mut missing_point = AvailableEquipmentInput::new(f.point, f.equipment_type, 1, 1);
        missing_point.rental_point_id = None;
        assert!(matches!(
            f.service.create(&missing_point).await,
            Err(AppError::InvalidReference { entity: EntityKind::RentalPoint, id: None })
        ));

        let unknown_type = AvailableEquipmentInput::new(f.point, 999, 1, 1);
        assert!(matches!(
            f.service.create(&unknown_type).await,
            Err(AppError::InvalidReference { entity: EntityKind::EquipmentType, id: Some(999) })
        ));
    }

    #[tokio::test]
    async fn test_invariant_checked_on_create_and_update() {
        let f = fixture().await;
        let too_many = AvailableEquipmentInput::new(f.point, f.equipment_type, 5, 10).with_available(6);
        assert!(matches!(
            f.service.create(&too_many).await,
            Err(AppError::InvariantViolation { available: 6, total: 5 })
        ));

        let created = f
            .service
            .create(&AvailableEquipmentInput::new(f.point, f.equipment_type, 5, 10))
            .await
            .unwrap();
        assert!(matches!(
            f.service.update(created.id, &too_many).await,
            Err(AppError::InvariantViolation { .. })
        ));

        // Omitted available count resets to the new total on update
        let shrunk = f
            .service
            .update(created.id, &AvailableEquipmentInput::new(f.point, f.equipment_type, 3, 20))
            .await
            .unwrap();
        assert_eq!((shrunk.total_count, shrunk.available_count, shrunk.cost), (3, 3, 20));
    }

    #[tokio::test]
    async fn test_update_moving_onto_existing_pair() {
        let f = fixture().await;
        let other_type = f
            .repository
            .equipment_types
            .insert(&EquipmentTypeInput::new("Kayak", "Water"))
            .await
            .unwrap()
            .id;
        f.service
            .create(&AvailableEquipmentInput::new(f.point, f.equipment_type, 1, 1))
            .await
            .unwrap();
        let kayaks = f
            .service
            .create(&AvailableEquipmentInput::new(f.point, other_type, 1, 1))
            .await
            .unwrap();

        let moved = f
            .service
            .update(kayaks.id, &AvailableEquipmentInput::new(f.point, f.equipment_type, 1, 1))
            .await;
        assert!(matches!(moved, Err(AppError::DuplicatePair { .. })));

        // Keeping its own pair is not a collision
        assert!(f
            .service
            .update(kayaks.id, &AvailableEquipmentInput::new(f.point, other_type, 4, 2))
            .await
            .is_ok());
        assert!(matches!(
            f.service
                .update(404, &AvailableEquipmentInput::new(f.point, other_type, 4, 2))
                .await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_lookups_and_counts() {
        let f = fixture().await;
        let created = f
            .service
            .create(&AvailableEquipmentInput::new(f.point, f.equipment_type, 2, 50))
            .await
            .unwrap();

        assert_eq!(f.service.find_by_rental_point(f.point).await.unwrap().len(), 1);
        assert_eq!(f.service.find_by_equipment_type(f.equipment_type).await.unwrap().len(), 1);
        assert!(f
            .service
            .find_by_point_and_type(f.point, f.equipment_type)
            .await
            .unwrap()
            .is_some());
        assert!(f.service.find_by_point_and_type(f.point, 999).await.unwrap().is_none());
        assert_eq!(f.service.find_with_available_above(1).await.unwrap().len(), 1);
        assert!(f.service.find_with_available_above(2).await.unwrap().is_empty());

        assert!(f.service.is_available(created.id).await.unwrap());
        assert_eq!(f.service.count_with_stock().await.unwrap(), 1);
        f.service.rent(created.id, 2).await.unwrap();
        assert!(!f.service.is_available(created.id).await.unwrap());
        assert!(!f.service.is_available(999).await.unwrap());
        assert_eq!(f.service.count_with_stock().await.unwrap(), 0);
        assert_eq!(f.service.count().await.unwrap(), 1);

        let query = AvailableEquipmentQuery {
            rental_point_id: Some(f.point),
            equipment_type_id: None,
            min_available: Some(0),
        };
        assert!(f.service.search(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_details_and_delete() {
        let f = fixture().await;
        let created = f
            .service
            .create(&AvailableEquipmentInput::new(f.point, f.equipment_type, 2, 50))
            .await
            .unwrap();
        let details = f.service.get_details(created.id).await.unwrap();
        assert_eq!(details.rental_point.name, "Absolut Sport");
        assert_eq!(details.equipment_type.type_name, "Mountain Bike");
        assert_eq!(details.cost_unit, COST_UNIT);

        f.service.delete(created.id).await.unwrap();
        assert!(matches!(f.service.delete(created.id).await, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_write_is_reported() {
        let now = Utc::now();
        let stored = AvailableEquipment {
            id: 1,
            rental_point_id: 1,
            equipment_type_id: 1,
            total_count: 10,
            available_count: 10,
            cost: 100,
            version: 4,
            created_at: now,
            updated_at: now,
        };
        let mut equipment = MockAvailableEquipmentStore::new();
        equipment
            .expect_get_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
        equipment
            .expect_update()
            .withf(|id, version, fields| *id == 1 && *version == 4 && fields.available_count == 7)
            .times(1)
            .returning(|id, _, _| Err(AppError::ConcurrentModification { id }));

        let service = InventoryService::new(
            Arc::new(equipment),
            Arc::new(MockRentalPointStore::new()),
            Arc::new(MockEquipmentTypeStore::new()),
        );
        let result = service.rent(1, 3).await;
        assert!(matches!(result, Err(AppError::ConcurrentModification { id: 1 })));
    }
}
