//! Overdue invoice reminder scheduler
//!
//! Per-order reminder state is implicit in the recorded `InvoiceReminder`
//! rows: none → first → second → final, strictly forward. A run selects the
//! tenant's overdue unpaid orders, decides the next escalation step for each,
//! sends, then records. Send-then-record means a failed send leaves no record
//! and the next run retries.

use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{error, info, warn};

use crate::db::models::{Order, ReminderSettings, ReminderType};
use crate::db::repository::{customer, order, reminder, tenant, RepoError, RepoResult};
use crate::reminders::sender::NotificationSender;
use crate::reminders::template;
use crate::utils::time;

/// Outcome counts for one tenant's run
#[derive(Debug, Clone, Serialize, Default)]
pub struct TenantReminderReport {
    pub tenant_id: i64,
    /// Overdue orders with an escalation step due
    pub attempted: u32,
    pub sent: u32,
    pub failed: u32,
    /// Overdue orders with no step due (or every due step already sent)
    pub skipped: u32,
}

/// Decide the escalation step for an order `days_past_due` days overdue.
///
/// Thresholds are checked highest-first, so an order that crossed several
/// thresholds while reminders were disabled gets only the highest step.
/// Steps never move backwards: once a step is recorded, that step and all
/// lower ones are suppressed.
pub fn next_step(
    days_past_due: i64,
    settings: &ReminderSettings,
    already_sent: &[ReminderType],
) -> Option<ReminderType> {
    let due = if days_past_due >= settings.final_reminder_days {
        ReminderType::Final
    } else if days_past_due >= settings.second_reminder_days {
        ReminderType::Second
    } else if days_past_due >= settings.first_reminder_days {
        ReminderType::First
    } else {
        return None;
    };
    match already_sent.iter().max() {
        Some(highest) if *highest >= due => None,
        _ => Some(due),
    }
}

async fn recipients_for(
    pool: &SqlitePool,
    settings: &ReminderSettings,
    row: &Order,
) -> RepoResult<(Vec<String>, String)> {
    let mut recipients = Vec::new();
    let mut customer_name = "customer".to_string();
    if let Some(customer_id) = row.customer_id {
        if let Some(record) = customer::find_by_id(pool, row.tenant_id, customer_id).await? {
            customer_name = record.name;
            if settings.notify_customer {
                if let Some(email) = record.email {
                    recipients.push(email);
                }
            }
        }
    } else {
        if let Some(name) = &row.guest_name {
            customer_name = name.clone();
        }
        if settings.notify_customer {
            if let Some(email) = &row.guest_email {
                recipients.push(email.clone());
            }
        }
    }
    if settings.notify_admin {
        if let Some(email) = &settings.admin_email {
            recipients.push(email.clone());
        }
    }
    Ok((recipients, customer_name))
}

async fn remind_order(
    pool: &SqlitePool,
    sender: &dyn NotificationSender,
    settings: &ReminderSettings,
    row: &Order,
    step: ReminderType,
    days_past_due: i64,
) -> anyhow::Result<Vec<String>> {
    let (recipients, customer_name) = recipients_for(pool, settings, row).await?;
    if recipients.is_empty() {
        anyhow::bail!("no valid recipient for order {}", row.order_number);
    }
    let subject = match step {
        ReminderType::First => format!("Payment reminder for order {}", row.order_number),
        ReminderType::Second => format!("Second reminder for order {}", row.order_number),
        ReminderType::Final => format!("Final notice for order {}", row.order_number),
    };
    let body = template::render(
        settings
            .custom_template
            .as_deref()
            .unwrap_or(template::DEFAULT_TEMPLATE),
        &[
            ("customer_name", customer_name),
            ("order_number", row.order_number.clone()),
            ("total", format!("{:.2}", row.total)),
            ("days_overdue", days_past_due.to_string()),
        ],
    );
    sender.send(&recipients, &subject, &body).await?;
    Ok(recipients)
}

/// Run the reminder pass for one tenant. Errors are isolated per order; the
/// report carries the counts back to the invoking trigger.
pub async fn check_overdue_invoices(
    pool: &SqlitePool,
    sender: &dyn NotificationSender,
    tenant_id: i64,
    now: i64,
) -> RepoResult<TenantReminderReport> {
    let mut report = TenantReminderReport {
        tenant_id,
        ..Default::default()
    };
    let Some(settings) = reminder::find_settings(pool, tenant_id).await? else {
        return Ok(report);
    };
    if !settings.enabled {
        return Ok(report);
    }

    let overdue = order::find_overdue_unpaid(pool, tenant_id, now).await?;
    for row in &overdue {
        let Some(due_date) = row.due_date else {
            continue;
        };
        let days_past_due = time::days_since(due_date, now);
        let already_sent = reminder::find_sent_types(pool, row.id).await?;
        let Some(step) = next_step(days_past_due, &settings, &already_sent) else {
            report.skipped += 1;
            continue;
        };
        report.attempted += 1;
        match remind_order(pool, sender, &settings, row, step, days_past_due).await {
            Ok(recipients) => {
                report.sent += 1;
                match reminder::record(pool, row.id, step, &recipients).await {
                    Ok(()) => {}
                    Err(RepoError::Duplicate(_)) => {
                        // a concurrent run recorded the same step first
                        warn!(order_id = row.id, step = step.as_str(), "reminder already recorded");
                    }
                    Err(e) => {
                        error!(order_id = row.id, error = %e, "failed to record sent reminder");
                    }
                }
            }
            Err(e) => {
                report.failed += 1;
                warn!(order_id = row.id, step = step.as_str(), error = %e, "reminder send failed");
            }
        }
    }
    info!(
        tenant_id,
        attempted = report.attempted,
        sent = report.sent,
        failed = report.failed,
        skipped = report.skipped,
        "reminder run finished"
    );
    Ok(report)
}

/// Run the reminder pass for every tenant. One tenant's failure does not
/// abort the others.
pub async fn run_all(
    pool: &SqlitePool,
    sender: &dyn NotificationSender,
) -> RepoResult<Vec<TenantReminderReport>> {
    let now = time::now_millis();
    let tenants = tenant::find_all(pool).await?;
    let mut reports = Vec::with_capacity(tenants.len());
    for t in tenants {
        match check_overdue_invoices(pool, sender, t.id, now).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                error!(tenant_id = t.id, error = %e, "reminder run failed for tenant");
            }
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(first: i64, second: i64, last: i64) -> ReminderSettings {
        ReminderSettings {
            tenant_id: 1,
            enabled: true,
            first_reminder_days: first,
            second_reminder_days: second,
            final_reminder_days: last,
            notify_customer: true,
            notify_admin: false,
            admin_email: None,
            custom_template: None,
            updated_at: 0,
        }
    }

    #[test]
    fn test_no_step_before_first_threshold() {
        let s = settings(3, 7, 14);
        assert_eq!(next_step(0, &s, &[]), None);
        assert_eq!(next_step(2, &s, &[]), None);
    }

    #[test]
    fn test_steps_at_thresholds() {
        let s = settings(3, 7, 14);
        assert_eq!(next_step(3, &s, &[]), Some(ReminderType::First));
        assert_eq!(next_step(7, &s, &[]), Some(ReminderType::Second));
        assert_eq!(next_step(14, &s, &[]), Some(ReminderType::Final));
        assert_eq!(next_step(100, &s, &[]), Some(ReminderType::Final));
    }

    #[test]
    fn test_highest_due_step_wins() {
        // reminders were off while the order aged; only the final step fires
        let s = settings(3, 7, 14);
        assert_eq!(next_step(20, &s, &[]), Some(ReminderType::Final));
    }

    #[test]
    fn test_sent_step_suppresses_itself() {
        let s = settings(3, 7, 14);
        assert_eq!(next_step(4, &s, &[ReminderType::First]), None);
        assert_eq!(
            next_step(8, &s, &[ReminderType::First]),
            Some(ReminderType::Second)
        );
    }

    #[test]
    fn test_steps_never_move_backwards() {
        // a recorded final suppresses every lower step regardless of days
        let s = settings(3, 7, 14);
        assert_eq!(next_step(5, &s, &[ReminderType::Final]), None);
        assert_eq!(
            next_step(9, &s, &[ReminderType::Second, ReminderType::First]),
            None
        );
    }

    #[test]
    fn test_escalation_sequence() {
        let s = settings(3, 7, 14);
        let mut sent = Vec::new();
        for day in [3, 7, 14] {
            let step = next_step(day, &s, &sent).unwrap();
            sent.push(step);
        }
        assert_eq!(
            sent,
            vec![ReminderType::First, ReminderType::Second, ReminderType::Final]
        );
    }
}
