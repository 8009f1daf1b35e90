//! Tenant Repository

use super::{RepoError, RepoResult};
use crate::db::models::{Tenant, TenantCreate};
use crate::plan::PlanTier;
use crate::utils::time;
use sqlx::SqlitePool;

const TENANT_SELECT: &str = "SELECT id, name, plan, created_at FROM tenant";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Tenant>> {
    let sql = format!("{} ORDER BY created_at", TENANT_SELECT);
    let rows = sqlx::query_as::<_, Tenant>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Tenant>> {
    let sql = format!("{} WHERE id = ?", TENANT_SELECT);
    let row = sqlx::query_as::<_, Tenant>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: TenantCreate) -> RepoResult<Tenant> {
    let now = time::now_millis();
    let id = time::snowflake_id();
    let plan = data.plan.unwrap_or(PlanTier::Free);
    sqlx::query("INSERT INTO tenant (id, name, plan, created_at) VALUES (?1, ?2, ?3, ?4)")
        .bind(id)
        .bind(&data.name)
        .bind(plan)
        .bind(now)
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create tenant".into()))
}
