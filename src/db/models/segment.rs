//! Segment Model
//!
//! Rule-defined customer grouping. `customer_count` is derived and recomputed
//! whenever membership could have changed.

use serde::{Deserialize, Serialize};

use crate::segmentation::SegmentCriteria;

/// Segment entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Segment {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    #[sqlx(json)]
    pub criteria: SegmentCriteria,
    pub customer_count: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create segment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentCreate {
    pub name: String,
    #[serde(default)]
    pub criteria: SegmentCriteria,
}

/// Update segment payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SegmentUpdate {
    pub name: Option<String>,
    pub criteria: Option<SegmentCriteria>,
}
