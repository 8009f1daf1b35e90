//! Customer Model
//!
//! `total_orders`, `total_spent`, `last_order_at` and `segment_id` are derived
//! fields owned by the statistics recalculator and the segmentation engine.
//! They are never writable through the API.

use serde::{Deserialize, Serialize};

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub total_orders: i64,
    pub total_spent: f64,
    pub last_order_at: Option<i64>,
    pub segment_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Update customer payload (derived fields deliberately absent)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub tags: Option<Vec<String>>,
}
