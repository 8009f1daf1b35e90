//! Stock Unit Repository
//!
//! Quantity mutations are conditional single statements (decrement-if-available),
//! never application-level read-modify-write, and run on the caller's
//! transaction connection.

use super::{RepoError, RepoResult};
use crate::db::models::{StockUnit, StockUnitCreate};
use crate::utils::time;
use sqlx::{SqliteConnection, SqlitePool};

const STOCK_UNIT_SELECT: &str = "SELECT id, tenant_id, product_id, variant_id, sku, name, unit_price, quantity, tracks_stock, created_at, updated_at FROM stock_unit";

pub async fn find_all(pool: &SqlitePool, tenant_id: i64) -> RepoResult<Vec<StockUnit>> {
    let sql = format!("{} WHERE tenant_id = ? ORDER BY created_at DESC", STOCK_UNIT_SELECT);
    let rows = sqlx::query_as::<_, StockUnit>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
) -> RepoResult<Option<StockUnit>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", STOCK_UNIT_SELECT);
    let row = sqlx::query_as::<_, StockUnit>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(
    pool: &SqlitePool,
    tenant_id: i64,
    data: StockUnitCreate,
) -> RepoResult<StockUnit> {
    if data.product_id.is_some() == data.variant_id.is_some() {
        return Err(RepoError::Database(
            "Stock unit must reference exactly one of product_id / variant_id".into(),
        ));
    }
    let now = time::now_millis();
    let id = time::snowflake_id();
    sqlx::query(
        "INSERT INTO stock_unit (id, tenant_id, product_id, variant_id, sku, name, unit_price, quantity, tracks_stock, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(data.product_id)
    .bind(data.variant_id)
    .bind(&data.sku)
    .bind(&data.name)
    .bind(data.unit_price)
    .bind(data.quantity)
    .bind(data.tracks_stock.unwrap_or(true))
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create stock unit".into()))
}

/// Atomically decrement quantity if available (no-op success for untracked units).
///
/// Returns `false` when the unit tracks stock and the quantity on hand is
/// insufficient; the caller must treat that as a transaction abort.
pub async fn decrement_if_available(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    id: i64,
    qty: i64,
) -> RepoResult<bool> {
    let now = time::now_millis();
    let rows = sqlx::query(
        "UPDATE stock_unit SET quantity = quantity - ?1, updated_at = ?2 WHERE tenant_id = ?3 AND id = ?4 AND tracks_stock = 1 AND quantity >= ?1",
    )
    .bind(qty)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    if rows.rows_affected() > 0 {
        return Ok(true);
    }
    // Distinguish "untracked" (fine) from "insufficient" (abort)
    let tracks: Option<bool> = sqlx::query_scalar(
        "SELECT tracks_stock FROM stock_unit WHERE tenant_id = ? AND id = ?",
    )
    .bind(tenant_id)
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    match tracks {
        Some(true) => Ok(false),
        Some(false) => Ok(true),
        None => Err(RepoError::NotFound(format!("Stock unit {id} not found"))),
    }
}

/// Restore quantity previously consumed by an order (untracked units are skipped)
pub async fn restore(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    id: i64,
    qty: i64,
) -> RepoResult<()> {
    let now = time::now_millis();
    sqlx::query(
        "UPDATE stock_unit SET quantity = quantity + ?1, updated_at = ?2 WHERE tenant_id = ?3 AND id = ?4 AND tracks_stock = 1",
    )
    .bind(qty)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}
