//! Repository Module
//!
//! CRUD operations over the SQLite pool, one module of free async functions
//! per table. Mutations that belong to the order transaction boundary take a
//! `&mut SqliteConnection` so they can run inside a caller-owned transaction.

pub mod customer;
pub mod gift_card;
pub mod order;
pub mod reminder;
pub mod segment;
pub mod stock_unit;
pub mod tenant;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return RepoError::Duplicate(db_err.to_string());
            }
        }
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => crate::utils::AppError::NotFound(msg),
            RepoError::Duplicate(msg) => crate::utils::AppError::Conflict(msg),
            RepoError::Database(msg) => crate::utils::AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
