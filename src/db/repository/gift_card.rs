//! Gift Card Repository
//!
//! The balance debit is a conditional single statement, same discipline as the
//! stock decrement. Codes are stored uppercase, unique per tenant.

use super::{RepoError, RepoResult};
use crate::db::models::{GiftCard, GiftCardCreate};
use crate::utils::time;
use sqlx::{SqliteConnection, SqlitePool};

const GIFT_CARD_SELECT: &str = "SELECT id, tenant_id, code, initial_amount, balance, is_active, expires_at, used_at, created_at, updated_at FROM gift_card";

pub async fn find_all(pool: &SqlitePool, tenant_id: i64) -> RepoResult<Vec<GiftCard>> {
    let sql = format!("{} WHERE tenant_id = ? ORDER BY created_at DESC", GIFT_CARD_SELECT);
    let rows = sqlx::query_as::<_, GiftCard>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
) -> RepoResult<Option<GiftCard>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", GIFT_CARD_SELECT);
    let row = sqlx::query_as::<_, GiftCard>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_code(
    pool: &SqlitePool,
    tenant_id: i64,
    code: &str,
) -> RepoResult<Option<GiftCard>> {
    let sql = format!("{} WHERE tenant_id = ? AND code = ?", GIFT_CARD_SELECT);
    let row = sqlx::query_as::<_, GiftCard>(&sql)
        .bind(tenant_id)
        .bind(code.to_uppercase())
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(
    pool: &SqlitePool,
    tenant_id: i64,
    data: GiftCardCreate,
) -> RepoResult<GiftCard> {
    let now = time::now_millis();
    let id = time::snowflake_id();
    let code = data.code.trim().to_uppercase();
    if code.is_empty() {
        return Err(RepoError::Database("Gift card code must not be empty".into()));
    }
    sqlx::query(
        "INSERT INTO gift_card (id, tenant_id, code, initial_amount, balance, is_active, expires_at, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4, 1, ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(&code)
    .bind(data.initial_amount)
    .bind(data.expires_at)
    .bind(now)
    .execute(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => {
            RepoError::Duplicate(format!("Gift card code {code} already exists"))
        }
        other => other,
    })?;
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create gift card".into()))
}

/// Atomically debit the balance, setting `used_at` on first redemption.
///
/// Returns `false` when the remaining balance is below `amount`; the caller
/// must treat that as a transaction abort.
pub async fn debit_if_available(
    conn: &mut SqliteConnection,
    tenant_id: i64,
    id: i64,
    amount: f64,
) -> RepoResult<bool> {
    let now = time::now_millis();
    let rows = sqlx::query(
        "UPDATE gift_card SET balance = balance - ?1, used_at = COALESCE(used_at, ?2), updated_at = ?2 WHERE tenant_id = ?3 AND id = ?4 AND is_active = 1 AND balance >= ?1",
    )
    .bind(amount)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}
