//! Available equipment model: stock of one equipment type at one rental point

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{equipment_type::EquipmentType, rental_point::RentalPoint};
use crate::error::{AppError, AppResult};

/// Unit the hourly cost is expressed in
pub const COST_UNIT: &str = "RUB/hour";

/// Inventory record linking a rental point and an equipment type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AvailableEquipment {
    pub id: i64,
    pub rental_point_id: i64,
    pub equipment_type_id: i64,
    /// Physical units owned
    pub total_count: i32,
    /// Units not currently rented out, never above `total_count`
    pub available_count: i32,
    /// Rental cost per hour
    pub cost: i32,
    /// Bumped on every write, used for optimistic concurrency
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AvailableEquipment {
    /// True when at least one unit can be rented
    pub fn is_available(&self) -> bool {
        self.available_count > 0
    }

    /// Take `quantity` units out of stock
    pub fn rent(&mut self, quantity: i32) -> AppResult<()> {
        if quantity <= 0 {
            return Err(AppError::InvalidQuantity(quantity));
        }
        if quantity > self.available_count {
            return Err(AppError::InsufficientStock {
                available: self.available_count,
                requested: quantity,
            });
        }
        self.available_count -= quantity;
        Ok(())
    }

    /// Put `quantity` rented units back into stock
    pub fn return_units(&mut self, quantity: i32) -> AppResult<()> {
        if quantity <= 0 {
            return Err(AppError::InvalidQuantity(quantity));
        }
        let resulting = self.available_count.saturating_add(quantity);
        if resulting > self.total_count {
            return Err(AppError::ExceedsTotal {
                total: self.total_count,
                resulting,
            });
        }
        self.available_count = resulting;
        Ok(())
    }

    /// Writable fields of this record as currently held
    pub fn fields(&self) -> StockFields {
        StockFields {
            rental_point_id: self.rental_point_id,
            equipment_type_id: self.equipment_type_id,
            total_count: self.total_count,
            available_count: self.available_count,
            cost: self.cost,
        }
    }
}

/// Resolve the stored available count: absent means "all units available".
///
/// The result always satisfies `0 <= available <= total` when the input
/// counts are non-negative.
pub fn normalize_available(total_count: i32, available_count: Option<i32>) -> AppResult<i32> {
    let available = available_count.unwrap_or(total_count);
    if available > total_count {
        return Err(AppError::InvariantViolation {
            available,
            total: total_count,
        });
    }
    Ok(available)
}

/// Create/update payload; references are optional so a missing one is
/// reported as an invalid reference rather than a malformed request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AvailableEquipmentInput {
    pub rental_point_id: Option<i64>,
    pub equipment_type_id: Option<i64>,
    #[validate(range(min = 0, message = "Total count cannot be negative"))]
    pub total_count: i32,
    /// Defaults to `total_count` when omitted
    #[validate(range(min = 0, message = "Available count cannot be negative"))]
    pub available_count: Option<i32>,
    #[validate(range(min = 1, message = "Cost must be at least 1"))]
    pub cost: i32,
}

impl AvailableEquipmentInput {
    pub fn new(rental_point_id: i64, equipment_type_id: i64, total_count: i32, cost: i32) -> Self {
        Self {
            rental_point_id: Some(rental_point_id),
            equipment_type_id: Some(equipment_type_id),
            total_count,
            available_count: None,
            cost,
        }
    }

    pub fn with_available(mut self, available_count: i32) -> Self {
        self.available_count = Some(available_count);
        self
    }
}

/// Validated, normalized values handed to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockFields {
    pub rental_point_id: i64,
    pub equipment_type_id: i64,
    pub total_count: i32,
    pub available_count: i32,
    pub cost: i32,
}

/// Inventory record together with the entities it references
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AvailableEquipmentDetails {
    #[serde(flatten)]
    pub equipment: AvailableEquipment,
    pub cost_unit: String,
    pub rental_point: RentalPoint,
    pub equipment_type: EquipmentType,
}

/// Availability of a single record
#[derive(Debug, Serialize, ToSchema)]
pub struct Availability {
    pub id: i64,
    pub available: bool,
}

/// Rent or return request
#[derive(Debug, Deserialize, ToSchema)]
pub struct StockChange {
    /// Number of units, must be positive
    pub quantity: i32,
}

/// Lookup filters for listing inventory records
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AvailableEquipmentQuery {
    pub rental_point_id: Option<i64>,
    pub equipment_type_id: Option<i64>,
    /// Only records with strictly more available units than this
    pub min_available: Option<i32>,
}
