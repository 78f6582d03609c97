//! Available equipment repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{is_foreign_key_violation, is_unique_violation, AvailableEquipmentStore};
use crate::{
    error::{AppError, AppResult, EntityKind},
    models::available_equipment::{AvailableEquipment, StockFields},
};

#[derive(Clone)]
pub struct AvailableEquipmentRepository {
    pool: Pool<Postgres>,
}

impl AvailableEquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn count_where(&self, condition: &str, value: i64) -> AppResult<i64> {
        let query = format!("SELECT COUNT(*) FROM available_equipment WHERE {}", condition);
        let count: i64 = sqlx::query_scalar(&query)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Translate constraint violations raised by concurrent writers
    async fn map_write_error(&self, err: sqlx::Error, data: &StockFields) -> AppError {
        if is_unique_violation(&err) {
            return AppError::DuplicatePair {
                rental_point_id: data.rental_point_id,
                equipment_type_id: data.equipment_type_id,
            };
        }
        if is_foreign_key_violation(&err) {
            let point_exists: Result<bool, sqlx::Error> =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rental_points WHERE id = $1)")
                    .bind(data.rental_point_id)
                    .fetch_one(&self.pool)
                    .await;
            return match point_exists {
                Ok(false) => AppError::InvalidReference {
                    entity: EntityKind::RentalPoint,
                    id: Some(data.rental_point_id),
                },
                Ok(true) => AppError::InvalidReference {
                    entity: EntityKind::EquipmentType,
                    id: Some(data.equipment_type_id),
                },
                Err(e) => AppError::Database(e),
            };
        }
        AppError::Database(err)
    }
}

#[async_trait]
impl AvailableEquipmentStore for AvailableEquipmentRepository {
    async fn list(&self) -> AppResult<Vec<AvailableEquipment>> {
        let rows = sqlx::query_as::<_, AvailableEquipment>(
            "SELECT * FROM available_equipment ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<AvailableEquipment>> {
        let row = sqlx::query_as::<_, AvailableEquipment>(
            "SELECT * FROM available_equipment WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn exists_by_pair(&self, rental_point_id: i64, equipment_type_id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM available_equipment
                WHERE rental_point_id = $1 AND equipment_type_id = $2
            )
            "#,
        )
        .bind(rental_point_id)
        .bind(equipment_type_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, data: &StockFields) -> AppResult<AvailableEquipment> {
        let result = sqlx::query_as::<_, AvailableEquipment>(
            r#"
            INSERT INTO available_equipment
                (rental_point_id, equipment_type_id, total_count, available_count, cost)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(data.rental_point_id)
        .bind(data.equipment_type_id)
        .bind(data.total_count)
        .bind(data.available_count)
        .bind(data.cost)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(e) => Err(self.map_write_error(e, data).await),
        }
    }

    async fn update(
        &self,
        id: i64,
        expected_version: i32,
        data: &StockFields,
    ) -> AppResult<AvailableEquipment> {
        let result = sqlx::query_as::<_, AvailableEquipment>(
            r#"
            UPDATE available_equipment
            SET rental_point_id = $1,
                equipment_type_id = $2,
                total_count = $3,
                available_count = $4,
                cost = $5,
                version = version + 1,
                updated_at = NOW()
            WHERE id = $6 AND version = $7
            RETURNING *
            "#,
        )
        .bind(data.rental_point_id)
        .bind(data.equipment_type_id)
        .bind(data.total_count)
        .bind(data.available_count)
        .bind(data.cost)
        .bind(id)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await;

        match result {
            Ok(Some(row)) => Ok(row),
            // No row matched: either deleted meanwhile or the version moved on
            Ok(None) => match self.get_by_id(id).await? {
                Some(_) => Err(AppError::ConcurrentModification { id }),
                None => Err(AppError::not_found(EntityKind::AvailableEquipment, id)),
            },
            Err(e) => Err(self.map_write_error(e, data).await),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM available_equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_rental_point(&self, rental_point_id: i64) -> AppResult<Vec<AvailableEquipment>> {
        let rows = sqlx::query_as::<_, AvailableEquipment>(
            "SELECT * FROM available_equipment WHERE rental_point_id = $1 ORDER BY id",
        )
        .bind(rental_point_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_equipment_type(&self, equipment_type_id: i64) -> AppResult<Vec<AvailableEquipment>> {
        let rows = sqlx::query_as::<_, AvailableEquipment>(
            "SELECT * FROM available_equipment WHERE equipment_type_id = $1 ORDER BY id",
        )
        .bind(equipment_type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_by_point_and_type(
        &self,
        rental_point_id: i64,
        equipment_type_id: i64,
    ) -> AppResult<Option<AvailableEquipment>> {
        let row = sqlx::query_as::<_, AvailableEquipment>(
            r#"
            SELECT * FROM available_equipment
            WHERE rental_point_id = $1 AND equipment_type_id = $2
            "#,
        )
        .bind(rental_point_id)
        .bind(equipment_type_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_with_available_above(&self, threshold: i32) -> AppResult<Vec<AvailableEquipment>> {
        let rows = sqlx::query_as::<_, AvailableEquipment>(
            "SELECT * FROM available_equipment WHERE available_count > $1 ORDER BY id",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM available_equipment")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_with_stock(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM available_equipment WHERE available_count > 0")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn count_by_rental_point(&self, rental_point_id: i64) -> AppResult<i64> {
        self.count_where("rental_point_id = $1", rental_point_id).await
    }

    async fn count_by_equipment_type(&self, equipment_type_id: i64) -> AppResult<i64> {
        self.count_where("equipment_type_id = $1", equipment_type_id).await
    }
}
