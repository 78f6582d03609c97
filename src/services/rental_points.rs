//! Rental point catalog service

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult, EntityKind},
    models::rental_point::{RentalPoint, RentalPointInput, RentalPointQuery},
    repository::{AvailableEquipmentStore, RentalPointStore},
};

#[derive(Clone)]
pub struct RentalPointService {
    rental_points: Arc<dyn RentalPointStore>,
    inventory: Arc<dyn AvailableEquipmentStore>,
}

impl RentalPointService {
    pub fn new(
        rental_points: Arc<dyn RentalPointStore>,
        inventory: Arc<dyn AvailableEquipmentStore>,
    ) -> Self {
        Self {
            rental_points,
            inventory,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<RentalPoint>> {
        self.rental_points.list().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<RentalPoint>> {
        self.rental_points.get_by_id(id).await
    }

    /// Like `get_by_id`, but a missing record is an error
    pub async fn get(&self, id: i64) -> AppResult<RentalPoint> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::RentalPoint, id))
    }

    /// Create a rental point (address must not be taken)
    pub async fn create(&self, data: &RentalPointInput) -> AppResult<RentalPoint> {
        data.check()?;
        if self.rental_points.exists_by_address(&data.address).await? {
            return Err(AppError::DuplicateAddress(data.address.clone()));
        }
        let point = self.rental_points.insert(data).await?;
        tracing::info!(rental_point_id = point.id, "Rental point created");
        Ok(point)
    }

    /// Overwrite name, address and opening hours
    pub async fn update(&self, id: i64, data: &RentalPointInput) -> AppResult<RentalPoint> {
        data.check()?;
        let existing = self.get(id).await?;

        if existing.address != data.address
            && self.rental_points.exists_by_address(&data.address).await?
        {
            return Err(AppError::DuplicateAddress(data.address.clone()));
        }

        let point = self
            .rental_points
            .update(id, data)
            .await?
            .ok_or_else(|| AppError::not_found(EntityKind::RentalPoint, id))?;
        tracing::info!(rental_point_id = id, "Rental point updated");
        Ok(point)
    }

    /// Delete a rental point that no inventory record refers to
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.rental_points.exists(id).await? {
            return Err(AppError::not_found(EntityKind::RentalPoint, id));
        }

        let references = self.inventory.count_by_rental_point(id).await?;
        if references > 0 {
            return Err(AppError::StillReferenced {
                entity: EntityKind::RentalPoint,
                id,
                references,
            });
        }

        if !self.rental_points.delete(id).await? {
            return Err(AppError::not_found(EntityKind::RentalPoint, id));
        }
        tracing::info!(rental_point_id = id, "Rental point deleted");
        Ok(())
    }

    pub async fn search_by_name(&self, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        self.rental_points.search_by_name(fragment).await
    }

    pub async fn search_by_address(&self, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        self.rental_points.search_by_address(fragment).await
    }

    pub async fn search_by_opening_hours(&self, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        self.rental_points.search_by_opening_hours(fragment).await
    }

    /// List, or search by the single filter given
    pub async fn search(&self, query: &RentalPointQuery) -> AppResult<Vec<RentalPoint>> {
        match (&query.name, &query.address, &query.opening_hours) {
            (None, None, None) => self.list().await,
            (Some(name), None, None) => self.search_by_name(name).await,
            (None, Some(address), None) => self.search_by_address(address).await,
            (None, None, Some(hours)) => self.search_by_opening_hours(hours).await,
            _ => Err(AppError::Validation(
                "Only one of name, address or opening_hours may be given".to_string(),
            )),
        }
    }

    pub async fn count(&self) -> AppResult<i64> {
        self.rental_points.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockAvailableEquipmentStore, MockRentalPointStore, Repository};

    fn service() -> RentalPointService {
        let repository = Repository::in_memory();
        RentalPointService::new(repository.rental_points, repository.available_equipment)
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let service = service();
        let point = service
            .create(&RentalPointInput::new("Absolut Sport", "123 Main St", "9-21"))
            .await
            .unwrap();
        assert!(point.id > 0);
        assert_eq!(service.get(point.id).await.unwrap(), point);
        assert_eq!(service.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_address_uniqueness_is_case_sensitive() {
        let service = service();
        service
            .create(&RentalPointInput::new("A", "X", "9-21"))
            .await
            .unwrap();

        let duplicate = service.create(&RentalPointInput::new("B", "X", "9-21")).await;
        assert!(matches!(duplicate, Err(AppError::DuplicateAddress(addr)) if addr == "X"));

        assert!(service.create(&RentalPointInput::new("C", "x", "9-21")).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_rechecks_changed_address() {
        let service = service();
        let first = service
            .create(&RentalPointInput::new("A", "1 First St", "9-21"))
            .await
            .unwrap();
        service
            .create(&RentalPointInput::new("B", "2 Second St", "9-21"))
            .await
            .unwrap();

        // Same address: no collision with itself
        let renamed = service
            .update(first.id, &RentalPointInput::new("A2", "1 First St", "10-20"))
            .await
            .unwrap();
        assert_eq!(renamed.name, "A2");
        assert_eq!(renamed.opening_hours, "10-20");

        let collision = service
            .update(first.id, &RentalPointInput::new("A2", "2 Second St", "10-20"))
            .await;
        assert!(matches!(collision, Err(AppError::DuplicateAddress(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let service = service();
        let update = service
            .update(42, &RentalPointInput::new("A", "X", "9-21"))
            .await;
        assert!(matches!(update, Err(AppError::NotFound { entity: EntityKind::RentalPoint, id: 42 })));
        assert!(matches!(service.delete(42).await, Err(AppError::NotFound { .. })));
        assert!(service.get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_by_field() {
        let service = service();
        service
            .create(&RentalPointInput::new("Absolut Sport", "123 Main St", "Mon-Sun 9-21"))
            .await
            .unwrap();
        service
            .create(&RentalPointInput::new("Velo City", "7 River Rd", "Sat 10-18"))
            .await
            .unwrap();

        assert_eq!(service.search_by_name("ABSOLUT").await.unwrap().len(), 1);
        assert_eq!(service.search_by_address("main").await.unwrap().len(), 1);
        assert_eq!(service.search_by_opening_hours("Sat").await.unwrap().len(), 1);
        assert!(service.search_by_opening_hours("sat").await.unwrap().is_empty());

        let query = RentalPointQuery {
            name: Some("velo".to_string()),
            ..Default::default()
        };
        assert_eq!(service.search(&query).await.unwrap()[0].name, "Velo City");

        let ambiguous = RentalPointQuery {
            name: Some("a".to_string()),
            address: Some("b".to_string()),
            opening_hours: None,
        };
        assert!(matches!(service.search(&ambiguous).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_duplicate_address_never_reaches_insert() {
        let mut points = MockRentalPointStore::new();
        points
            .expect_exists_by_address()
            .times(1)
            .returning(|_| Ok(true));
        points.expect_insert().never();

        let service = RentalPointService::new(
            Arc::new(points),
            Arc::new(MockAvailableEquipmentStore::new()),
        );
        let result = service
            .create(&RentalPointInput::new("A", "123 Main St", "9-21"))
            .await;
        assert!(matches!(result, Err(AppError::DuplicateAddress(_))));
    }

    #[tokio::test]
    async fn test_delete_referenced_point_is_refused() {
        let mut points = MockRentalPointStore::new();
        points.expect_exists().returning(|_| Ok(true));
        points.expect_delete().never();
        let mut inventory = MockAvailableEquipmentStore::new();
        inventory
            .expect_count_by_rental_point()
            .returning(|_| Ok(2));

        let service = RentalPointService::new(Arc::new(points), Arc::new(inventory));
        let result = service.delete(5).await;
        assert!(matches!(
            result,
            Err(AppError::StillReferenced { entity: EntityKind::RentalPoint, id: 5, references: 2 })
        ));
    }
}
