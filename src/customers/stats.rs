//! Customer statistics recalculator
//!
//! Derived fields are always recomputed from stored orders, never adjusted
//! incrementally, so a lost update can never leave them permanently wrong.

use sqlx::SqlitePool;
use tracing::debug;

use crate::db::repository::{customer, order, RepoResult};
use crate::segmentation;

/// Recompute total_orders / total_spent / last_order_at from the order table
/// and re-run segment assignment for the customer.
pub async fn recalculate(pool: &SqlitePool, tenant_id: i64, customer_id: i64) -> RepoResult<()> {
    let stats = order::customer_stats(pool, tenant_id, customer_id).await?;
    customer::write_stats(
        pool,
        tenant_id,
        customer_id,
        stats.order_count,
        stats.spent_sum,
        stats.last_order_at,
    )
    .await?;
    debug!(
        customer_id,
        orders = stats.order_count,
        spent = stats.spent_sum,
        "customer statistics recalculated"
    );
    segmentation::assign_segment(pool, tenant_id, customer_id).await?;
    Ok(())
}
