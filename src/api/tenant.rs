//! Tenant resolution
//!
//! Every tenant-scoped endpoint extracts [`TenantContext`] from the
//! `X-Tenant-Id` header. The tenant row is loaded on every request so plan
//! changes take effect immediately.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::core::ServerState;
use crate::db::models::Tenant;
use crate::db::repository::tenant;
use crate::plan::PlanTier;
use crate::utils::AppError;

pub const TENANT_HEADER: &str = "x-tenant-id";

/// The resolved tenant for the current request
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant: Tenant,
}

impl TenantContext {
    pub fn id(&self) -> i64 {
        self.tenant.id
    }

    pub fn plan(&self) -> PlanTier {
        self.tenant.plan
    }
}

impl FromRequestParts<ServerState> for TenantContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Invalid("Missing X-Tenant-Id header".to_string()))?;
        let id: i64 = raw
            .parse()
            .map_err(|_| AppError::Invalid(format!("Invalid tenant id: {raw}")))?;
        let record = tenant::find_by_id(&state.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Tenant {id}")))?;
        Ok(TenantContext { tenant: record })
    }
}
