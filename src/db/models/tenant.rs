//! Tenant Model

use serde::{Deserialize, Serialize};

use crate::plan::PlanTier;

/// Tenant entity - every business row is scoped to one of these
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    pub plan: PlanTier,
    pub created_at: i64,
}

/// Create tenant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantCreate {
    pub name: String,
    pub plan: Option<PlanTier>,
}
