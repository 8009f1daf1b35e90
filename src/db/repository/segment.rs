//! Segment Repository
//!
//! Segments are evaluated newest-first; `customer_count` is derived and
//! recomputed from actual membership rows.

use super::{RepoError, RepoResult};
use crate::db::models::{Segment, SegmentCreate, SegmentUpdate};
use crate::utils::time;
use sqlx::SqlitePool;

const SEGMENT_SELECT: &str = "SELECT id, tenant_id, name, criteria, customer_count, created_at, updated_at FROM segment";

fn criteria_json(criteria: &crate::segmentation::SegmentCriteria) -> RepoResult<String> {
    serde_json::to_string(criteria)
        .map_err(|e| RepoError::Database(format!("Failed to serialize criteria: {e}")))
}

/// All tenant segments, most recent first (evaluation order)
pub async fn find_all(pool: &SqlitePool, tenant_id: i64) -> RepoResult<Vec<Segment>> {
    let sql = format!(
        "{} WHERE tenant_id = ? ORDER BY created_at DESC, id DESC",
        SEGMENT_SELECT
    );
    let rows = sqlx::query_as::<_, Segment>(&sql)
        .bind(tenant_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
) -> RepoResult<Option<Segment>> {
    let sql = format!("{} WHERE tenant_id = ? AND id = ?", SEGMENT_SELECT);
    let row = sqlx::query_as::<_, Segment>(&sql)
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, tenant_id: i64, data: SegmentCreate) -> RepoResult<Segment> {
    let now = time::now_millis();
    let id = time::snowflake_id();
    let criteria = criteria_json(&data.criteria)?;
    sqlx::query(
        "INSERT INTO segment (id, tenant_id, name, criteria, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
    )
    .bind(id)
    .bind(tenant_id)
    .bind(&data.name)
    .bind(&criteria)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create segment".into()))
}

pub async fn update(
    pool: &SqlitePool,
    tenant_id: i64,
    id: i64,
    data: SegmentUpdate,
) -> RepoResult<Segment> {
    let now = time::now_millis();
    let criteria = match &data.criteria {
        Some(c) => Some(criteria_json(c)?),
        None => None,
    };
    let rows = sqlx::query(
        "UPDATE segment SET name = COALESCE(?1, name), criteria = COALESCE(?2, criteria), updated_at = ?3 WHERE tenant_id = ?4 AND id = ?5",
    )
    .bind(&data.name)
    .bind(&criteria)
    .bind(now)
    .bind(tenant_id)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Segment {id} not found")));
    }
    find_by_id(pool, tenant_id, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Segment {id} not found")))
}

/// Delete a segment; membership references are cleared by the engine first
pub async fn delete(pool: &SqlitePool, tenant_id: i64, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM segment WHERE tenant_id = ? AND id = ?")
        .bind(tenant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Recompute `customer_count` from the customers currently pointing at the segment
pub async fn recount(pool: &SqlitePool, tenant_id: i64, id: i64) -> RepoResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM customer WHERE tenant_id = ? AND segment_id = ?")
            .bind(tenant_id)
            .bind(id)
            .fetch_one(pool)
            .await?;
    let now = time::now_millis();
    sqlx::query("UPDATE segment SET customer_count = ?1, updated_at = ?2 WHERE tenant_id = ?3 AND id = ?4")
        .bind(count)
        .bind(now)
        .bind(tenant_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(count)
}
