//! Reminder Repository
//!
//! Settings singleton per tenant plus the append-only reminder log. The
//! UNIQUE(order_id, reminder_type) index is the scheduler's idempotency key.

use super::{RepoError, RepoResult};
use crate::db::models::{InvoiceReminder, ReminderSettings, ReminderSettingsUpdate, ReminderType};
use crate::utils::time;
use sqlx::SqlitePool;

const SETTINGS_SELECT: &str = "SELECT tenant_id, enabled, first_reminder_days, second_reminder_days, final_reminder_days, notify_customer, notify_admin, admin_email, custom_template, updated_at FROM reminder_settings";

const REMINDER_SELECT: &str =
    "SELECT id, order_id, reminder_type, sent_to, sent_at FROM invoice_reminder";

pub async fn find_settings(
    pool: &SqlitePool,
    tenant_id: i64,
) -> RepoResult<Option<ReminderSettings>> {
    let sql = format!("{} WHERE tenant_id = ?", SETTINGS_SELECT);
    let row = sqlx::query_as::<_, ReminderSettings>(&sql)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn upsert_settings(
    pool: &SqlitePool,
    tenant_id: i64,
    data: ReminderSettingsUpdate,
) -> RepoResult<ReminderSettings> {
    if !(data.first_reminder_days < data.second_reminder_days
        && data.second_reminder_days < data.final_reminder_days)
    {
        return Err(RepoError::Database(
            "Reminder thresholds must be strictly increasing".into(),
        ));
    }
    let now = time::now_millis();
    sqlx::query(
        "INSERT INTO reminder_settings (tenant_id, enabled, first_reminder_days, second_reminder_days, final_reminder_days, notify_customer, notify_admin, admin_email, custom_template, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10) \
         ON CONFLICT(tenant_id) DO UPDATE SET enabled = ?2, first_reminder_days = ?3, second_reminder_days = ?4, final_reminder_days = ?5, notify_customer = ?6, notify_admin = ?7, admin_email = ?8, custom_template = ?9, updated_at = ?10",
    )
    .bind(tenant_id)
    .bind(data.enabled)
    .bind(data.first_reminder_days)
    .bind(data.second_reminder_days)
    .bind(data.final_reminder_days)
    .bind(data.notify_customer)
    .bind(data.notify_admin)
    .bind(&data.admin_email)
    .bind(&data.custom_template)
    .bind(now)
    .execute(pool)
    .await?;
    find_settings(pool, tenant_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to write reminder settings".into()))
}

/// Reminder types already recorded for an order
pub async fn find_sent_types(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<ReminderType>> {
    let rows = sqlx::query_scalar::<_, ReminderType>(
        "SELECT reminder_type FROM invoice_reminder WHERE order_id = ?",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<InvoiceReminder>> {
    let sql = format!("{} WHERE order_id = ? ORDER BY sent_at", REMINDER_SELECT);
    let rows = sqlx::query_as::<_, InvoiceReminder>(&sql)
        .bind(order_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Record a sent reminder. The unique index rejects duplicates, which the
/// scheduler treats as "already sent by a concurrent run".
pub async fn record(
    pool: &SqlitePool,
    order_id: i64,
    reminder_type: ReminderType,
    sent_to: &[String],
) -> RepoResult<()> {
    let id = time::snowflake_id();
    let now = time::now_millis();
    let sent_to_json = serde_json::to_string(sent_to)
        .map_err(|e| RepoError::Database(format!("Failed to serialize recipients: {e}")))?;
    sqlx::query(
        "INSERT INTO invoice_reminder (id, order_id, reminder_type, sent_to, sent_at) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(order_id)
    .bind(reminder_type)
    .bind(&sent_to_json)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}
