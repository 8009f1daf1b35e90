//! Stock unit API handlers

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::tenant::TenantContext;
use crate::core::ServerState;
use crate::db::models::{StockUnit, StockUnitCreate};
use crate::db::repository::stock_unit;
use crate::utils::{AppError, AppResult};

/// GET /api/stock-units
pub async fn list(
    State(state): State<ServerState>,
    ctx: TenantContext,
) -> AppResult<Json<Vec<StockUnit>>> {
    let units = stock_unit::find_all(&state.pool, ctx.id()).await?;
    Ok(Json(units))
}

/// GET /api/stock-units/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<StockUnit>> {
    let unit = stock_unit::find_by_id(&state.pool, ctx.id(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Stock unit {id}")))?;
    Ok(Json(unit))
}

/// POST /api/stock-units
pub async fn create(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Json(payload): Json<StockUnitCreate>,
) -> AppResult<Json<StockUnit>> {
    let unit = stock_unit::create(&state.pool, ctx.id(), payload).await?;
    Ok(Json(unit))
}
