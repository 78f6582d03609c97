//! Equipment types repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{contains_pattern, is_foreign_key_violation, is_unique_violation, EquipmentTypeStore};
use crate::{
    error::{AppError, AppResult, EntityKind},
    models::equipment_type::{EquipmentType, EquipmentTypeInput},
};

#[derive(Clone)]
pub struct EquipmentTypesRepository {
    pool: Pool<Postgres>,
}

impl EquipmentTypesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn search(&self, column: &str, fragment: &str) -> AppResult<Vec<EquipmentType>> {
        let query = format!(
            r"SELECT * FROM equipment_types WHERE {} ILIKE $1 ESCAPE '\' ORDER BY id",
            column
        );
        let rows = sqlx::query_as::<_, EquipmentType>(&query)
            .bind(contains_pattern(fragment))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

fn map_write_error(err: sqlx::Error, type_name: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::DuplicateName(type_name.to_string())
    } else {
        AppError::Database(err)
    }
}

#[async_trait]
impl EquipmentTypeStore for EquipmentTypesRepository {
    async fn list(&self) -> AppResult<Vec<EquipmentType>> {
        let rows = sqlx::query_as::<_, EquipmentType>("SELECT * FROM equipment_types ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<EquipmentType>> {
        let row = sqlx::query_as::<_, EquipmentType>("SELECT * FROM equipment_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM equipment_types WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_type_name(&self, type_name: &str) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM equipment_types WHERE LOWER(type_name) = LOWER($1))",
        )
        .bind(type_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, data: &EquipmentTypeInput) -> AppResult<EquipmentType> {
        sqlx::query_as::<_, EquipmentType>(
            r#"
            INSERT INTO equipment_types (type_name, category, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.type_name)
        .bind(&data.category)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &data.type_name))
    }

    async fn update(&self, id: i64, data: &EquipmentTypeInput) -> AppResult<Option<EquipmentType>> {
        sqlx::query_as::<_, EquipmentType>(
            r#"
            UPDATE equipment_types
            SET type_name = $1, category = $2, description = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&data.type_name)
        .bind(&data.category)
        .bind(&data.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &data.type_name))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM equipment_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(e) if is_foreign_key_violation(&e) => {
                let references: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM available_equipment WHERE equipment_type_id = $1",
                )
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
                Err(AppError::StillReferenced {
                    entity: EntityKind::EquipmentType,
                    id,
                    references,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn search_by_type_name(&self, fragment: &str) -> AppResult<Vec<EquipmentType>> {
        self.search("type_name", fragment).await
    }

    async fn search_by_category(&self, fragment: &str) -> AppResult<Vec<EquipmentType>> {
        self.search("category", fragment).await
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM equipment_types")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
