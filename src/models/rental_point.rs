//! Rental point model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::require_not_blank;
use crate::error::AppResult;

/// A physical location renting out equipment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RentalPoint {
    pub id: i64,
    pub name: String,
    /// Street address, unique across rental points (case-sensitive)
    pub address: String,
    pub opening_hours: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full set of writable rental point fields, used for both create and update
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RentalPointInput {
    #[validate(length(min = 1, max = 200, message = "Name must be 1 to 200 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 300, message = "Address must be 1 to 300 characters"))]
    pub address: String,
    #[validate(length(min = 1, max = 500, message = "Opening hours must be 1 to 500 characters"))]
    pub opening_hours: String,
}

impl RentalPointInput {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        opening_hours: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            opening_hours: opening_hours.into(),
        }
    }

    /// Check field constraints
    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        require_not_blank("name", &self.name)?;
        require_not_blank("address", &self.address)?;
        require_not_blank("opening_hours", &self.opening_hours)
    }
}

/// Substring filters for listing rental points (at most one may be set)
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct RentalPointQuery {
    /// Case-insensitive match on name
    pub name: Option<String>,
    /// Case-insensitive match on address
    pub address: Option<String>,
    /// Case-sensitive match on opening hours
    pub opening_hours: Option<String>,
}
