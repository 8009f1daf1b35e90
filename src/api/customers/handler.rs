//! Customer API handlers
//!
//! Derived fields (totals, segment) are read-only here; the recalculate
//! endpoint re-derives them from stored orders.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::tenant::TenantContext;
use crate::core::ServerState;
use crate::customers;
use crate::db::models::{Customer, CustomerCreate, CustomerUpdate};
use crate::db::repository::customer;
use crate::plan::Feature;
use crate::utils::{AppError, AppResult};

fn check_tags_gate(ctx: &TenantContext, tags: Option<&[String]>) -> AppResult<()> {
    if tags.is_some_and(|t| !t.is_empty()) {
        ctx.plan().require(Feature::CustomerTags)?;
    }
    Ok(())
}

/// GET /api/customers
pub async fn list(
    State(state): State<ServerState>,
    ctx: TenantContext,
) -> AppResult<Json<Vec<Customer>>> {
    let customers = customer::find_all(&state.pool, ctx.id()).await?;
    Ok(Json(customers))
}

/// GET /api/customers/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    let record = customer::find_by_id(&state.pool, ctx.id(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id}")))?;
    Ok(Json(record))
}

/// POST /api/customers
pub async fn create(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Json(payload): Json<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    check_tags_gate(&ctx, payload.tags.as_deref())?;
    let record = customer::create(&state.pool, ctx.id(), payload).await?;
    Ok(Json(record))
}

/// PUT /api/customers/:id
pub async fn update(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(payload): Json<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    check_tags_gate(&ctx, payload.tags.as_deref())?;
    let record = customer::update(&state.pool, ctx.id(), id, payload).await?;
    // tag edits can change segment membership
    crate::segmentation::assign_segment(&state.pool, ctx.id(), id).await?;
    let record = customer::find_by_id(&state.pool, ctx.id(), record.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id}")))?;
    Ok(Json(record))
}

/// POST /api/customers/:id/recalculate
pub async fn recalculate(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<Customer>> {
    customers::recalculate(&state.pool, ctx.id(), id).await?;
    let record = customer::find_by_id(&state.pool, ctx.id(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Customer {id}")))?;
    Ok(Json(record))
}
