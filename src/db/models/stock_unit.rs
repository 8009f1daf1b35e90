//! Stock Unit Model
//!
//! Quantity-on-hand record for a product or a product variant (exactly one of
//! the two). Quantity is mutated only inside order transactions.

use serde::{Deserialize, Serialize};

/// Stock unit entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct StockUnit {
    pub id: i64,
    pub tenant_id: i64,
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub sku: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub tracks_stock: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create stock unit payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUnitCreate {
    pub product_id: Option<i64>,
    pub variant_id: Option<i64>,
    pub sku: String,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
    pub tracks_stock: Option<bool>,
}
