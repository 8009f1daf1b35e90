#![allow(dead_code)]

//! Shared test harness: in-memory database plus seed helpers.

use sqlx::SqlitePool;

use backoffice_server::db::models::{
    Customer, CustomerCreate, GiftCard, GiftCardCreate, OrderCreate, OrderItemInput, StockUnit,
    StockUnitCreate, Tenant, TenantCreate,
};
use backoffice_server::db::repository::{customer, gift_card, stock_unit, tenant};
use backoffice_server::db::DbService;
use backoffice_server::plan::PlanTier;

pub async fn setup_pool() -> SqlitePool {
    DbService::in_memory()
        .await
        .expect("in-memory database")
        .pool
}

pub async fn seed_tenant(pool: &SqlitePool, plan: PlanTier) -> Tenant {
    tenant::create(
        pool,
        TenantCreate {
            name: "Test Tenant".to_string(),
            plan: Some(plan),
        },
    )
    .await
    .expect("seed tenant")
}

pub async fn seed_stock(
    pool: &SqlitePool,
    tenant_id: i64,
    sku: &str,
    unit_price: f64,
    quantity: i64,
    tracks_stock: bool,
) -> StockUnit {
    stock_unit::create(
        pool,
        tenant_id,
        StockUnitCreate {
            product_id: Some(1),
            variant_id: None,
            sku: sku.to_string(),
            name: format!("Item {sku}"),
            unit_price,
            quantity,
            tracks_stock: Some(tracks_stock),
        },
    )
    .await
    .expect("seed stock unit")
}

pub async fn seed_customer(
    pool: &SqlitePool,
    tenant_id: i64,
    name: &str,
    email: Option<&str>,
) -> Customer {
    customer::create(
        pool,
        tenant_id,
        CustomerCreate {
            name: name.to_string(),
            email: email.map(String::from),
            phone: None,
            city: None,
            tags: None,
        },
    )
    .await
    .expect("seed customer")
}

pub async fn seed_gift_card(
    pool: &SqlitePool,
    tenant_id: i64,
    code: &str,
    amount: f64,
    expires_at: Option<i64>,
) -> GiftCard {
    gift_card::create(
        pool,
        tenant_id,
        GiftCardCreate {
            code: code.to_string(),
            initial_amount: amount,
            expires_at,
        },
    )
    .await
    .expect("seed gift card")
}

pub fn item(stock_unit_id: i64, quantity: i64) -> OrderItemInput {
    OrderItemInput {
        stock_unit_id: Some(stock_unit_id),
        name: None,
        quantity,
        unit_price: None,
    }
}

pub fn order_payload(items: Vec<OrderItemInput>) -> OrderCreate {
    OrderCreate {
        items,
        ..Default::default()
    }
}
