//! Reminder API handlers
//!
//! Settings are a per-tenant singleton. The run endpoint is the external cron
//! trigger and authenticates with the shared `X-Cron-Secret` header instead of
//! a tenant header, since it iterates every tenant.

use axum::{extract::State, http::HeaderMap, Json};

use crate::api::tenant::TenantContext;
use crate::core::ServerState;
use crate::db::models::{ReminderSettings, ReminderSettingsUpdate};
use crate::db::repository::reminder;
use crate::reminders::{self, TenantReminderReport};
use crate::utils::{AppError, AppResult};

pub const CRON_SECRET_HEADER: &str = "x-cron-secret";

/// GET /api/reminders/settings
pub async fn get_settings(
    State(state): State<ServerState>,
    ctx: TenantContext,
) -> AppResult<Json<Option<ReminderSettings>>> {
    let settings = reminder::find_settings(&state.pool, ctx.id()).await?;
    Ok(Json(settings))
}

/// PUT /api/reminders/settings
pub async fn put_settings(
    State(state): State<ServerState>,
    ctx: TenantContext,
    Json(payload): Json<ReminderSettingsUpdate>,
) -> AppResult<Json<ReminderSettings>> {
    if payload.first_reminder_days < 1 {
        return Err(AppError::validation("first_reminder_days must be at least 1"));
    }
    if !(payload.first_reminder_days < payload.second_reminder_days
        && payload.second_reminder_days < payload.final_reminder_days)
    {
        return Err(AppError::validation(
            "Reminder thresholds must be strictly increasing",
        ));
    }
    let settings = reminder::upsert_settings(&state.pool, ctx.id(), payload).await?;
    Ok(Json(settings))
}

/// POST /api/reminders/run - cron trigger, iterates all tenants
pub async fn run(
    State(state): State<ServerState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<TenantReminderReport>>> {
    let Some(expected) = &state.config.cron_secret else {
        return Err(AppError::Forbidden(
            "Reminder trigger is disabled (no CRON_SECRET configured)".to_string(),
        ));
    };
    let presented = headers
        .get(CRON_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if presented != expected {
        return Err(AppError::Forbidden("Invalid cron secret".to_string()));
    }
    let reports = reminders::run_all(&state.pool, state.sender.as_ref()).await?;
    Ok(Json(reports))
}
