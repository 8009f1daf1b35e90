//! Order API handlers
//!
//! Thin layer over the order aggregate; every business decision lives in
//! [`crate::orders`].

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::api::tenant::TenantContext;
use crate::core::ServerState;
use crate::db::models::{
    InvoiceReminder, Order, OrderCreate, OrderDetail, OrderUpdate, PaymentStatus,
};
use crate::db::repository::{order, reminder};
use crate::orders;
use crate::utils::{AppError, AppResult};

/// GET /api/orders
pub async fn list(
    State(state): State<ServerState>,
    ctx: TenantContext,
) -> AppResult<Json<Vec<Order>>> {
    let rows = orders::list(&state.pool, ctx.id()).await.map_err(AppError::from)?;
    Ok(Json(rows))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = orders::get_detail(&state.pool, ctx.id(), id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(detail))
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderDetail>> {
    let detail = orders::create(&state.pool, ctx.id(), ctx.plan(), payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(detail))
}

/// PUT /api/orders/:id
pub async fn update(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<OrderDetail>> {
    let detail = orders::update(&state.pool, ctx.id(), id, payload)
        .await
        .map_err(AppError::from)?;
    Ok(Json(detail))
}

/// DELETE /api/orders/:id
pub async fn delete(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<()>> {
    orders::delete(&state.pool, ctx.id(), id)
        .await
        .map_err(AppError::from)?;
    Ok(Json(()))
}

#[derive(Deserialize)]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
}

/// PUT /api/orders/:id/payment-status
pub async fn set_payment_status(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentStatusUpdate>,
) -> AppResult<Json<Order>> {
    let row = orders::set_payment_status(&state.pool, ctx.id(), id, payload.payment_status)
        .await
        .map_err(AppError::from)?;
    Ok(Json(row))
}

/// GET /api/orders/:id/reminders - reminder log for one order
pub async fn reminder_history(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<InvoiceReminder>>> {
    // scope check before exposing the log
    order::find_by_id(&state.pool, ctx.id(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {id}")))?;
    let rows = reminder::find_by_order(&state.pool, id).await?;
    Ok(Json(rows))
}
