//! Order Repository
//!
//! Row-level reads and the write primitives used by the order service's
//! transaction. Totals and stock/gift-card coordination live in the service,
//! not here.

use super::{RepoError, RepoResult};
use crate::db::models::{Order, OrderItem, PaymentStatus};
use crate::utils::time;
use sqlx::{SqliteConnection, SqlitePool};

const ORDER_SELECT: &str = "SELECT id, tenant_id, order_number, customer_id, guest_name, guest_email, guest_phone, status, payment_status, subtotal, tax_rate, tax_amount, discount, shipping_cost, gift_card_id, gift_card_amount, total, due_date, notes, created_at, updated_at FROM orders";

const ITEM_SELECT: &str = "SELECT id, order_id, stock_unit_id, name, sku, quantity, unit_price, total_price FROM order_item";

pub async fn find_all(pool: &SqlitePool, tenant_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{} WHERE tenant_id = ? ORDER BY created_at DESC", ORDER_SELECT);
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, tenant_id: i64, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", ORDER_SELECT);
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_items(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("{} WHERE order_id = ? ORDER BY id", ITEM_SELECT);
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Next sequential order number within the tenant ("ORD-00042")
pub async fn next_order_number(conn: &mut SqliteConnection, tenant_id: i64) -> RepoResult<String> {
    let max_seq: i64 = sqlx::query_scalar(
        "SELECT COALESCE(MAX(CAST(SUBSTR(order_number, 5) AS INTEGER)), 0) FROM orders WHERE tenant_id = ?",
    )
    .bind(tenant_id)
    .fetch_one(conn)
    .await?;
    Ok(format!("ORD-{:05}", max_seq + 1))
}

pub async fn insert(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, tenant_id, order_number, customer_id, guest_name, guest_email, guest_phone, status, payment_status, subtotal, tax_rate, tax_amount, discount, shipping_cost, gift_card_id, gift_card_amount, total, due_date, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
    )
    .bind(order.id)
    .bind(order.tenant_id)
    .bind(&order.order_number)
    .bind(order.customer_id)
    .bind(&order.guest_name)
    .bind(&order.guest_email)
    .bind(&order.guest_phone)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.subtotal)
    .bind(order.tax_rate)
    .bind(order.tax_amount)
    .bind(order.discount)
    .bind(order.shipping_cost)
    .bind(order.gift_card_id)
    .bind(order.gift_card_amount)
    .bind(order.total)
    .bind(order.due_date)
    .bind(&order.notes)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn insert_items(conn: &mut SqliteConnection, items: &[OrderItem]) -> RepoResult<()> {
    for item in items {
        sqlx::query(
            "INSERT INTO order_item (id, order_id, stock_unit_id, name, sku, quantity, unit_price, total_price) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(item.id)
        .bind(item.order_id)
        .bind(item.stock_unit_id)
        .bind(&item.name)
        .bind(&item.sku)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.total_price)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}

/// Rewrite the order row after an edit (identity and creation fields untouched)
pub async fn update_row(conn: &mut SqliteConnection, order: &Order) -> RepoResult<()> {
    let rows = sqlx::query(
        "UPDATE orders SET customer_id = ?1, status = ?2, payment_status = ?3, subtotal = ?4, tax_rate = ?5, tax_amount = ?6, discount = ?7, shipping_cost = ?8, gift_card_amount = ?9, total = ?10, due_date = ?11, notes = ?12, updated_at = ?13 WHERE tenant_id = ?14 AND id = ?15",
    )
    .bind(order.customer_id)
    .bind(order.status)
    .bind(order.payment_status)
    .bind(order.subtotal)
    .bind(order.tax_rate)
    .bind(order.tax_amount)
    .bind(order.discount)
    .bind(order.shipping_cost)
    .bind(order.gift_card_amount)
    .bind(order.total)
    .bind(order.due_date)
    .bind(&order.notes)
    .bind(order.updated_at)
    .bind(order.tenant_id)
    .bind(order.id)
    .execute(conn)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {} not found", order.id)));
    }
    Ok(())
}

pub async fn delete_items(conn: &mut SqliteConnection, order_id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM order_item WHERE order_id = ?")
        .bind(order_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Delete the order row (line items cascade)
pub async fn delete(conn: &mut SqliteConnection, tenant_id: i64, id: i64) -> RepoResult<bool> {
    sqlx::query("DELETE FROM order_item WHERE order_id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    let rows = sqlx::query("DELETE FROM orders WHERE tenant_id = ? AND id = ?")
        .bind(tenant_id)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn set_payment_status(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
    payment_status: PaymentStatus,
) -> RepoResult<()> {
    let now = time::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = ?1, updated_at = ?2 WHERE tenant_id = ?3 AND id = ?4",
    )
    .bind(payment_status)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }
    Ok(())
}

/// Aggregate row for the statistics recalculator
#[derive(Debug, sqlx::FromRow)]
pub struct CustomerOrderStats {
    pub order_count: i64,
    pub spent_sum: f64,
    pub last_order_at: Option<i64>,
}

/// Aggregates over ALL stored orders for the customer (no status filter)
pub async fn customer_stats(
    pool: &SqlitePool,
    tenant_id: i64,
    customer_id: i64,
) -> RepoResult<CustomerOrderStats> {
    let row = sqlx::query_as::<_, CustomerOrderStats>(
        "SELECT COUNT(*) AS order_count, COALESCE(SUM(total), 0) AS spent_sum, MAX(created_at) AS last_order_at FROM orders WHERE tenant_id = ? AND customer_id = ?",
    )
    .bind(tenant_id)
    .bind(customer_id)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Orders due on or before `now` and still unpaid (reminder scheduler input)
pub async fn find_overdue_unpaid(
    pool: &SqlitePool,
    tenant_id: i64,
    now: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{} WHERE tenant_id = ? AND due_date IS NOT NULL AND due_date <= ? AND payment_status IN ('PENDING', 'PARTIAL') ORDER BY due_date",
        ORDER_SELECT
    );
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(tenant_id)
        .bind(now)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}
