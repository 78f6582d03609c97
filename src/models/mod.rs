//! Data models for rental inventory

pub mod available_equipment;
pub mod equipment_type;
pub mod rental_point;

use crate::error::{AppError, AppResult};

// Re-export commonly used types
pub use available_equipment::{AvailableEquipment, AvailableEquipmentInput, StockFields};
pub use equipment_type::{EquipmentType, EquipmentTypeInput};
pub use rental_point::{RentalPoint, RentalPointInput};

/// Reject strings made only of whitespace
pub(crate) fn require_not_blank(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} cannot be blank", field)));
    }
    Ok(())
}
