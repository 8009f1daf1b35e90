//! Reminder Models
//!
//! Per-tenant cadence settings and the append-only reminder log. The
//! `(order_id, reminder_type)` pair is the idempotency key.

use serde::{Deserialize, Serialize};

/// Escalation step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ReminderType {
    First,
    Second,
    Final,
}

impl ReminderType {
    pub fn as_str(self) -> &'static str {
        match self {
            ReminderType::First => "first",
            ReminderType::Second => "second",
            ReminderType::Final => "final",
        }
    }
}

/// Per-tenant reminder cadence configuration (singleton row)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReminderSettings {
    pub tenant_id: i64,
    pub enabled: bool,
    pub first_reminder_days: i64,
    pub second_reminder_days: i64,
    pub final_reminder_days: i64,
    pub notify_customer: bool,
    pub notify_admin: bool,
    pub admin_email: Option<String>,
    pub custom_template: Option<String>,
    pub updated_at: i64,
}

/// Settings write payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderSettingsUpdate {
    pub enabled: bool,
    pub first_reminder_days: i64,
    pub second_reminder_days: i64,
    pub final_reminder_days: i64,
    pub notify_customer: bool,
    pub notify_admin: bool,
    pub admin_email: Option<String>,
    pub custom_template: Option<String>,
}

/// Append-only reminder log record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct InvoiceReminder {
    pub id: i64,
    pub order_id: i64,
    pub reminder_type: ReminderType,
    #[sqlx(json)]
    pub sent_to: Vec<String>,
    pub sent_at: i64,
}
