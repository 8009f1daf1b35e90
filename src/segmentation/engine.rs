//! Segment assignment engine
//!
//! First-match-wins over segments in newest-first order. Assignment runs after
//! every statistics recalculation and in bulk after segment definitions change.

use sqlx::SqlitePool;
use tracing::debug;

use crate::db::repository::{customer, segment, RepoResult};

/// Re-evaluate one customer against every tenant segment and persist the
/// winning membership. Returns the assigned segment id, if any.
pub async fn assign_segment(
    pool: &SqlitePool,
    tenant_id: i64,
    customer_id: i64,
) -> RepoResult<Option<i64>> {
    let Some(record) = customer::find_by_id(pool, tenant_id, customer_id).await? else {
        return Ok(None);
    };
    let segments = segment::find_all(pool, tenant_id).await?;

    let winner = segments
        .iter()
        .find(|s| s.criteria.matches(&record))
        .map(|s| s.id);

    if winner != record.segment_id {
        customer::write_segment(pool, tenant_id, customer_id, winner).await?;
        // keep counts honest on both sides of the move
        if let Some(old_id) = record.segment_id {
            segment::recount(pool, tenant_id, old_id).await?;
        }
        if let Some(new_id) = winner {
            segment::recount(pool, tenant_id, new_id).await?;
        }
        debug!(
            customer_id,
            old = ?record.segment_id,
            new = ?winner,
            "customer segment changed"
        );
    }
    Ok(winner)
}

/// Re-evaluate every customer in the tenant. Used after a segment is created,
/// updated, or deleted.
pub async fn recalculate_all(pool: &SqlitePool, tenant_id: i64) -> RepoResult<u64> {
    let ids = customer::find_ids(pool, tenant_id).await?;
    let total = ids.len() as u64;
    for id in ids {
        assign_segment(pool, tenant_id, id).await?;
    }
    debug!(tenant_id, customers = total, "segment recalculation finished");
    Ok(total)
}
