//! Error types for the rental inventory server

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Numeric error codes returned to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 2,
    NotFound = 3,
    BadValue = 4,
    DuplicateAddress = 5,
    DuplicateName = 6,
    DuplicatePair = 7,
    InvalidReference = 8,
    InvariantViolation = 9,
    InvalidQuantity = 10,
    InsufficientStock = 11,
    ExceedsTotal = 12,
    StillReferenced = 13,
    ConcurrentModification = 14,
}

/// Kind of stored entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    RentalPoint,
    EquipmentType,
    AvailableEquipment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::RentalPoint => "Rental point",
            EntityKind::EquipmentType => "Equipment type",
            EntityKind::AvailableEquipment => "Available equipment",
        };
        f.write_str(name)
    }
}

fn display_reference(id: &Option<i64>) -> String {
    id.map_or_else(|| "(none)".to_string(), |id| id.to_string())
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("A rental point with address '{0}' already exists")]
    DuplicateAddress(String),

    #[error("An equipment type named '{0}' already exists")]
    DuplicateName(String),

    #[error("Equipment type {equipment_type_id} is already listed at rental point {rental_point_id}")]
    DuplicatePair {
        rental_point_id: i64,
        equipment_type_id: i64,
    },

    #[error("{entity} reference {} is missing or does not exist", display_reference(.id))]
    InvalidReference {
        entity: EntityKind,
        id: Option<i64>,
    },

    #[error("Available count ({available}) cannot exceed total count ({total})")]
    InvariantViolation { available: i32, total: i32 },

    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    #[error("Not enough equipment to rent: available {available}, requested {requested}")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("Return exceeds total count: total {total}, would become {resulting}")]
    ExceedsTotal { total: i32, resulting: i32 },

    #[error("{entity} {id} is still referenced by {references} inventory record(s)")]
    StillReferenced {
        entity: EntityKind,
        id: i64,
        references: i64,
    },

    #[error("Available equipment {id} was modified concurrently")]
    ConcurrentModification { id: i64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }

    /// Error code and HTTP status for this error
    pub fn classify(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::DuplicateAddress(_) => (StatusCode::CONFLICT, ErrorCode::DuplicateAddress),
            AppError::DuplicateName(_) => (StatusCode::CONFLICT, ErrorCode::DuplicateName),
            AppError::DuplicatePair { .. } => (StatusCode::CONFLICT, ErrorCode::DuplicatePair),
            AppError::InvalidReference { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidReference)
            }
            AppError::InvariantViolation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvariantViolation)
            }
            AppError::InvalidQuantity(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InvalidQuantity)
            }
            AppError::InsufficientStock { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::InsufficientStock)
            }
            AppError::ExceedsTotal { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::ExceedsTotal)
            }
            AppError::StillReferenced { .. } => (StatusCode::CONFLICT, ErrorCode::StillReferenced),
            AppError::ConcurrentModification { .. } => {
                (StatusCode::CONFLICT, ErrorCode::ConcurrentModification)
            }
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.classify();

        let message = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
