//! Order Model
//!
//! The order aggregate: order row plus line-item snapshots. Totals obey
//! `total = subtotal + tax_amount + shipping_cost - discount - gift_card_amount`.

use serde::{Deserialize, Serialize};

/// Order status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Draft,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    /// Items and totals may only change while the order is in one of these states
    pub fn is_editable(self) -> bool {
        matches!(self, OrderStatus::Draft | OrderStatus::Cancelled)
    }
}

/// Payment status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// Unpaid orders are the reminder scheduler's input set
    pub fn is_unpaid(self) -> bool {
        matches!(self, PaymentStatus::Pending | PaymentStatus::Partial)
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub tenant_id: i64,
    pub order_number: String,
    pub customer_id: Option<i64>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub subtotal: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub discount: f64,
    pub shipping_cost: f64,
    pub gift_card_id: Option<i64>,
    pub gift_card_amount: f64,
    pub total: f64,
    pub due_date: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Line item snapshot (name/sku/price captured at order time)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub stock_unit_id: Option<i64>,
    pub name: String,
    pub sku: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub total_price: f64,
}

/// Order with its line items (detail view)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Line item input for create/update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub stock_unit_id: Option<i64>,
    pub name: Option<String>,
    pub quantity: i64,
    /// Overrides the stock unit's price when provided
    pub unit_price: Option<f64>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderCreate {
    pub items: Vec<OrderItemInput>,
    pub customer_id: Option<i64>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub gift_card_code: Option<String>,
    #[serde(default)]
    pub tax_rate: f64,
    #[serde(default)]
    pub discount: f64,
    #[serde(default)]
    pub shipping_cost: f64,
    pub due_date: Option<i64>,
    pub notes: Option<String>,
    pub status: Option<OrderStatus>,
}

/// Update order payload (items are replaced wholesale when present)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderUpdate {
    pub items: Option<Vec<OrderItemInput>>,
    pub customer_id: Option<Option<i64>>,
    pub tax_rate: Option<f64>,
    pub discount: Option<f64>,
    pub shipping_cost: Option<f64>,
    pub due_date: Option<Option<i64>>,
    pub notes: Option<String>,
    pub status: Option<OrderStatus>,
}
