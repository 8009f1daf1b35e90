//! Customer Repository
//!
//! Derived fields (total_orders, total_spent, last_order_at, segment_id) have
//! dedicated write paths used only by the statistics recalculator and the
//! segmentation engine.

use super::{RepoError, RepoResult};
use crate::db::models::{Customer, CustomerCreate, CustomerUpdate};
use crate::utils::time;
use sqlx::SqlitePool;

const CUSTOMER_SELECT: &str = "SELECT id, tenant_id, name, email, phone, city, tags, total_orders, total_spent, last_order_at, segment_id, created_at, updated_at FROM customer";

fn tags_json(tags: &[String]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

pub async fn find_all(pool: &SqlitePool, tenant_id: i64) -> RepoResult<Vec<Customer>> {
    let sql = format!("{} WHERE tenant_id = ? ORDER BY created_at DESC", CUSTOMER_SELECT);
    let rows = sqlx::query_as::<_, Customer>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
) -> RepoResult<Option<Customer>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", CUSTOMER_SELECT);
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Ids of every customer in the tenant (bulk segmentation input)
pub async fn find_ids(pool: &SqlitePool, tenant_id: i64) -> RepoResult<Vec<i64>> {
    let rows = sqlx::query_scalar::<_, i64>("SELECT id FROM customer WHERE tenant_id = ?")
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    tenant_id: i64,
    data: CustomerCreate,
) -> RepoResult<Customer> {
    let now = time::now_millis();
    let id = time::snowflake_id();
    let tags = tags_json(&data.tags.unwrap_or_default());
    sqlx::query(
        "INSERT INTO customer (id, tenant_id, name, email, phone, city, tags, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.city)
    .bind(&tags)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))
}

pub async fn update(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
    data: CustomerUpdate,
) -> RepoResult<Customer> {
    let now = time::now_millis();
    let tags = data.tags.as_deref().map(tags_json);
    let rows = sqlx::query(
        "UPDATE customer SET name = COALESCE(?1, name), email = COALESCE(?2, email), phone = COALESCE(?3, phone), city = COALESCE(?4, city), tags = COALESCE(?5, tags), updated_at = ?6 WHERE tenant_id = ?7 AND id = ?8",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(&data.phone)
    .bind(&data.city)
    .bind(&tags)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

/// Write the three derived aggregate fields (statistics recalculator only)
pub async fn write_stats(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
    total_orders: i64,
    total_spent: f64,
    last_order_at: Option<i64>,
) -> RepoResult<()> {
    let now = time::now_millis();
    let rows = sqlx::query(
        "UPDATE customer SET total_orders = ?1, total_spent = ?2, last_order_at = ?3, updated_at = ?4 WHERE tenant_id = ?5 AND id = ?6",
    )
    .bind(total_orders)
    .bind(total_spent)
    .bind(last_order_at)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Customer {id} not found")));
    }
    Ok(())
}

/// Write segment membership (segmentation engine only)
pub async fn write_segment(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
    segment_id: Option<i64>,
) -> RepoResult<()> {
    let now = time::now_millis();
    sqlx::query(
        "UPDATE customer SET segment_id = ?1, updated_at = ?2 WHERE tenant_id = ?3 AND id = ?4",
    )
    .bind(segment_id)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
