//! Segment API handlers
//!
//! Any change to the segment set re-runs assignment for the whole tenant,
//! since other customers' membership may shift.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::api::tenant::TenantContext;
use crate::core::ServerState;
use crate::db::models::{Segment, SegmentCreate, SegmentUpdate};
use crate::db::repository::segment;
use crate::plan::Feature;
use crate::segmentation::{self, SegmentCriteria};
use crate::utils::{AppError, AppResult};

fn check_criteria_gate(ctx: &TenantContext, criteria: &SegmentCriteria) -> AppResult<()> {
    ctx.plan().require(Feature::Segmentation)?;
    if criteria.uses_tags() {
        ctx.plan().require(Feature::SegmentationTags)?;
    }
    Ok(())
}

/// GET /api/segments
pub async fn list(
    State(state): State<ServerState>,
    ctx: TenantContext,
) -> AppResult<Json<Vec<Segment>>> {
    let segments = segment::find_all(&state.pool, ctx.id()).await?;
    Ok(Json(segments))
}

/// GET /api/segments/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<Segment>> {
    let record = segment::find_by_id(&state.pool, ctx.id(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Segment {id}")))?;
    Ok(Json(record))
}

/// POST /api/segments
pub async fn create(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Json(payload): Json<SegmentCreate>,
) -> AppResult<Json<Segment>> {
    check_criteria_gate(&ctx, &payload.criteria)?;
    let record = segment::create(&state.pool, ctx.id(), payload).await?;
    segmentation::recalculate_all(&state.pool, ctx.id()).await?;
    let record = segment::find_by_id(&state.pool, ctx.id(), record.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Segment {}", record.id)))?;
    Ok(Json(record))
}

/// PUT /api/segments/:id
pub async fn update(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(payload): Json<SegmentUpdate>,
) -> AppResult<Json<Segment>> {
    if let Some(criteria) = &payload.criteria {
        check_criteria_gate(&ctx, criteria)?;
    } else {
        ctx.plan().require(Feature::Segmentation)?;
    }
    segment::update(&state.pool, ctx.id(), id, payload).await?;
    segmentation::recalculate_all(&state.pool, ctx.id()).await?;
    let record = segment::find_by_id(&state.pool, ctx.id(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Segment {id}")))?;
    Ok(Json(record))
}

/// DELETE /api/segments/:id
pub async fn delete(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<()>> {
    // clear memberships before the row goes away, then re-run assignment so
    // affected customers can land in another segment
    sqlx::query("UPDATE customer SET segment_id = NULL WHERE tenant_id = ? AND segment_id = ?")
        .bind(ctx.id())
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    if !segment::delete(&state.pool, ctx.id(), id).await? {
        return Err(AppError::not_found(format!("Segment {id}")));
    }
    segmentation::recalculate_all(&state.pool, ctx.id()).await?;
    Ok(Json(()))
}

#[derive(Serialize)]
pub struct RecalculateResponse {
    pub customers: u64,
}

/// POST /api/segments/recalculate - bulk re-assignment for the tenant
pub async fn recalculate(
    State(state): State<ServerState>,
    ctx: TenantContext,
) -> AppResult<Json<RecalculateResponse>> {
    ctx.plan().require(Feature::Segmentation)?;
    let customers = segmentation::recalculate_all(&state.pool, ctx.id()).await?;
    Ok(Json(RecalculateResponse { customers }))
}
