//! Order domain errors
//!
//! Distinct variants for every way an order mutation can be refused, mapped
//! onto the API error envelope at the boundary.

use crate::db::repository::RepoError;
use crate::utils::AppError;

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Insufficient stock for {name} ({sku}): {available} available")]
    InsufficientStock {
        name: String,
        sku: String,
        available: i64,
    },

    #[error("Gift card not found or inactive")]
    InvalidGiftCard,

    #[error("Gift card has expired")]
    GiftCardExpired,

    #[error("Gift card has no remaining balance")]
    GiftCardEmpty,

    #[error("Order {0} can no longer be edited in its current status")]
    NotEditable(i64),

    #[error("{0}")]
    PlanRestricted(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<RepoError> for OrderError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => OrderError::NotFound(msg),
            RepoError::Duplicate(msg) => OrderError::Conflict(msg),
            RepoError::Database(msg) => OrderError::Database(msg),
        }
    }
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::from(RepoError::from(err))
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InsufficientStock { .. } => AppError::BusinessRule(err.to_string()),
            OrderError::InvalidGiftCard
            | OrderError::GiftCardExpired
            | OrderError::GiftCardEmpty => AppError::BusinessRule(err.to_string()),
            OrderError::NotEditable(_) => AppError::BusinessRule(err.to_string()),
            OrderError::PlanRestricted(msg) => AppError::PlanRestricted(msg),
            OrderError::NotFound(msg) => AppError::NotFound(msg),
            OrderError::Conflict(msg) => AppError::Conflict(msg),
            OrderError::Validation(msg) => AppError::Validation(msg),
            OrderError::Database(msg) => AppError::Database(msg),
        }
    }
}
