//! Equipment type model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::require_not_blank;
use crate::error::AppResult;

/// A category of rentable item, e.g. "Mountain Bike"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EquipmentType {
    pub id: i64,
    /// Unique under case-insensitive comparison
    pub type_name: String,
    pub category: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Full set of writable equipment type fields
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EquipmentTypeInput {
    #[validate(length(min = 1, max = 100, message = "Type name must be 1 to 100 characters"))]
    pub type_name: String,
    #[validate(length(min = 1, max = 50, message = "Category must be 1 to 50 characters"))]
    pub category: String,
    #[validate(length(max = 500, message = "Description must not exceed 500 characters"))]
    pub description: Option<String>,
}

impl EquipmentTypeInput {
    pub fn new(type_name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            category: category.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn check(&self) -> AppResult<()> {
        self.validate()?;
        require_not_blank("type_name", &self.type_name)?;
        require_not_blank("category", &self.category)
    }
}

/// Substring filters for listing equipment types (at most one may be set)
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct EquipmentTypeQuery {
    /// Case-insensitive match on type name
    pub type_name: Option<String>,
    /// Case-insensitive match on category
    pub category: Option<String>,
}
