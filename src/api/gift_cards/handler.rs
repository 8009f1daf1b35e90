//! Gift card API handlers
//!
//! Issuance is plan-gated; redemption happens through the order aggregate.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::tenant::TenantContext;
use crate::core::ServerState;
use crate::db::models::{GiftCard, GiftCardCreate};
use crate::db::repository::gift_card;
use crate::plan::Feature;
use crate::utils::{AppError, AppResult};

/// GET /api/gift-cards
pub async fn list(
    State(state): State<ServerState>,
    ctx: TenantContext,
) -> AppResult<Json<Vec<GiftCard>>> {
    let cards = gift_card::find_all(&state.pool, ctx.id()).await?;
    Ok(Json(cards))
}

/// GET /api/gift-cards/:id
pub async fn get_by_id(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(id): Path<i64>,
) -> AppResult<Json<GiftCard>> {
    let card = gift_card::find_by_id(&state.pool, ctx.id(), id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Gift card {id}")))?;
    Ok(Json(card))
}

/// GET /api/gift-cards/code/:code - balance check by the code a customer holds
pub async fn get_by_code(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Path(code): Path<String>,
) -> AppResult<Json<GiftCard>> {
    let card = gift_card::find_by_code(&state.pool, ctx.id(), &code)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Gift card {code}")))?;
    Ok(Json(card))
}

/// POST /api/gift-cards
pub async fn create(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Json(payload): Json<GiftCardCreate>,
) -> AppResult<Json<GiftCard>> {
    ctx.plan().require(Feature::GiftCards)?;
    if !payload.initial_amount.is_finite() || payload.initial_amount <= 0.0 {
        return Err(AppError::validation("initial_amount must be positive"));
    }
    let card = gift_card::create(&state.pool, ctx.id(), payload).await?;
    Ok(Json(card))
}
