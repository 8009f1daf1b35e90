//! Utility module - shared helpers and types
//!
//! - [`AppError`] / [`AppResult`] - application error type and handler result
//! - [`AppResponse`] - API response envelope
//! - logging and time helpers

pub mod error;
pub mod logger;
pub mod time;

pub use error::{ok, AppError, AppResponse, AppResult};
