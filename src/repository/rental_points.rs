//! Rental points repository

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{contains_pattern, is_foreign_key_violation, is_unique_violation, RentalPointStore};
use crate::{
    error::{AppError, AppResult, EntityKind},
    models::rental_point::{RentalPoint, RentalPointInput},
};

#[derive(Clone)]
pub struct RentalPointsRepository {
    pool: Pool<Postgres>,
}

impl RentalPointsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn search(&self, condition: &str, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        let query = format!(
            r"SELECT * FROM rental_points WHERE {} ESCAPE '\' ORDER BY id",
            condition
        );
        let rows = sqlx::query_as::<_, RentalPoint>(&query)
            .bind(contains_pattern(fragment))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

fn map_write_error(err: sqlx::Error, address: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::DuplicateAddress(address.to_string())
    } else {
        AppError::Database(err)
    }
}

#[async_trait]
impl RentalPointStore for RentalPointsRepository {
    async fn list(&self) -> AppResult<Vec<RentalPoint>> {
        let rows = sqlx::query_as::<_, RentalPoint>("SELECT * FROM rental_points ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<RentalPoint>> {
        let row = sqlx::query_as::<_, RentalPoint>("SELECT * FROM rental_points WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rental_points WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists_by_address(&self, address: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rental_points WHERE address = $1)")
                .bind(address)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn insert(&self, data: &RentalPointInput) -> AppResult<RentalPoint> {
        sqlx::query_as::<_, RentalPoint>(
            r#"
            INSERT INTO rental_points (name, address, opening_hours)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.opening_hours)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &data.address))
    }

    async fn update(&self, id: i64, data: &RentalPointInput) -> AppResult<Option<RentalPoint>> {
        sqlx::query_as::<_, RentalPoint>(
            r#"
            UPDATE rental_points
            SET name = $1, address = $2, opening_hours = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(&data.name)
        .bind(&data.address)
        .bind(&data.opening_hours)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &data.address))
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM rental_points WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;
        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            // Inventory row inserted after the service checked for references
            Err(e) if is_foreign_key_violation(&e) => {
                let references: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM available_equipment WHERE rental_point_id = $1",
                )
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
                Err(AppError::StillReferenced {
                    entity: EntityKind::RentalPoint,
                    id,
                    references,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn search_by_name(&self, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        self.search("name ILIKE $1", fragment).await
    }

    async fn search_by_address(&self, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        self.search("address ILIKE $1", fragment).await
    }

    async fn search_by_opening_hours(&self, fragment: &str) -> AppResult<Vec<RentalPoint>> {
        self.search("opening_hours LIKE $1", fragment).await
    }

    async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rental_points")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
