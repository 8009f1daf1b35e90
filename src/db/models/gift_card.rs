//! Gift Card Model
//!
//! Balance only decreases, floor 0. Mutated exclusively by the order
//! redemption step; `used_at` is set on first redemption.

use serde::{Deserialize, Serialize};

/// Gift card entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GiftCard {
    pub id: i64,
    pub tenant_id: i64,
    pub code: String,
    pub initial_amount: f64,
    pub balance: f64,
    pub is_active: bool,
    pub expires_at: Option<i64>,
    pub used_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Issue gift card payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftCardCreate {
    pub code: String,
    pub initial_amount: f64,
    pub expires_at: Option<i64>,
}
