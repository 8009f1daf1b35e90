//! Reminder scheduler integration tests: overdue selection, escalation,
//! idempotent re-runs and send-failure retry behavior.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use backoffice_server::db::models::{
    OrderCreate, PaymentStatus, ReminderSettingsUpdate, ReminderType,
};
use backoffice_server::db::repository::{reminder, RepoError};
use backoffice_server::orders;
use backoffice_server::plan::PlanTier;
use backoffice_server::reminders::{check_overdue_invoices, run_all, NotificationSender};
use backoffice_server::utils::time;

use common::{item, seed_customer, seed_stock, seed_tenant, setup_pool};

const DAY_MS: i64 = 86_400_000;

/// Captures every delivery; flips to failure mode on demand.
#[derive(Default)]
struct RecordingSender {
    mail: Mutex<Vec<(Vec<String>, String)>>,
    fail: AtomicBool,
}

impl RecordingSender {
    fn sent(&self) -> Vec<(Vec<String>, String)> {
        self.mail.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, recipients: &[String], subject: &str, _html_body: &str) -> anyhow::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("smtp unavailable");
        }
        self.mail
            .lock()
            .unwrap()
            .push((recipients.to_vec(), subject.to_string()));
        Ok(())
    }
}

fn default_settings() -> ReminderSettingsUpdate {
    ReminderSettingsUpdate {
        enabled: true,
        first_reminder_days: 3,
        second_reminder_days: 7,
        final_reminder_days: 14,
        notify_customer: true,
        notify_admin: false,
        admin_email: None,
        custom_template: None,
    }
}

/// Unpaid order for `customer_id`, due `days_overdue` days before `now`.
async fn seed_overdue_order(
    pool: &sqlx::SqlitePool,
    tenant_id: i64,
    unit_id: i64,
    customer_id: Option<i64>,
    now: i64,
    days_overdue: i64,
) -> i64 {
    let detail = orders::create(
        pool,
        tenant_id,
        PlanTier::Starter,
        OrderCreate {
            items: vec![item(unit_id, 1)],
            customer_id,
            due_date: Some(now - days_overdue * DAY_MS),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    detail.order.id
}

#[tokio::test]
async fn test_settings_thresholds_must_increase() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;

    let err = reminder::upsert_settings(
        &pool,
        tenant.id,
        ReminderSettingsUpdate {
            first_reminder_days: 7,
            second_reminder_days: 5,
            ..default_settings()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, RepoError::Database(_)));

    let saved = reminder::upsert_settings(&pool, tenant.id, default_settings())
        .await
        .unwrap();
    assert_eq!(saved.first_reminder_days, 3);

    // upsert replaces the singleton row
    let saved = reminder::upsert_settings(
        &pool,
        tenant.id,
        ReminderSettingsUpdate {
            first_reminder_days: 5,
            second_reminder_days: 10,
            final_reminder_days: 20,
            ..default_settings()
        },
    )
    .await
    .unwrap();
    assert_eq!(saved.first_reminder_days, 5);
    assert_eq!(saved.final_reminder_days, 20);
}

#[tokio::test]
async fn test_disabled_settings_send_nothing() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let unit = seed_stock(&pool, tenant.id, "SKU-1", 10.0, 10, true).await;
    let buyer = seed_customer(&pool, tenant.id, "Ana", Some("ana@example.com")).await;
    let now = time::now_millis();
    seed_overdue_order(&pool, tenant.id, unit.id, Some(buyer.id), now, 10).await;

    reminder::upsert_settings(
        &pool,
        tenant.id,
        ReminderSettingsUpdate {
            enabled: false,
            ..default_settings()
        },
    )
    .await
    .unwrap();

    let sender = RecordingSender::default();
    let report = check_overdue_invoices(&pool, &sender, tenant.id, now)
        .await
        .unwrap();
    assert_eq!(report.attempted, 0);
    assert!(sender.sent().is_empty());
}

#[tokio::test]
async fn test_highest_due_step_sent_once() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let unit = seed_stock(&pool, tenant.id, "SKU-1", 10.0, 10, true).await;
    let buyer = seed_customer(&pool, tenant.id, "Ana", Some("ana@example.com")).await;
    let now = time::now_millis();
    let order_id = seed_overdue_order(&pool, tenant.id, unit.id, Some(buyer.id), now, 8).await;
    reminder::upsert_settings(&pool, tenant.id, default_settings())
        .await
        .unwrap();

    // 8 days overdue crosses both the first and second thresholds;
    // only the second step fires
    let sender = RecordingSender::default();
    let report = check_overdue_invoices(&pool, &sender, tenant.id, now)
        .await
        .unwrap();
    assert_eq!(report.attempted, 1);
    assert_eq!(report.sent, 1);
    let mail = sender.sent();
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].0, vec!["ana@example.com".to_string()]);
    assert!(mail[0].1.starts_with("Second reminder"));
    assert_eq!(
        reminder::find_sent_types(&pool, order_id).await.unwrap(),
        vec![ReminderType::Second]
    );

    // a re-run the same day has nothing new to send
    let report = check_overdue_invoices(&pool, &sender, tenant.id, now)
        .await
        .unwrap();
    assert_eq!(report.sent, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(sender.sent().len(), 1);
}

#[tokio::test]
async fn test_escalation_over_time() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let unit = seed_stock(&pool, tenant.id, "SKU-1", 10.0, 10, true).await;
    let buyer = seed_customer(&pool, tenant.id, "Ana", Some("ana@example.com")).await;
    let now = time::now_millis();
    let order_id = seed_overdue_order(&pool, tenant.id, unit.id, Some(buyer.id), now, 3).await;
    reminder::upsert_settings(&pool, tenant.id, default_settings())
        .await
        .unwrap();

    let sender = RecordingSender::default();
    for (clock, expected) in [
        (now, ReminderType::First),
        (now + 4 * DAY_MS, ReminderType::Second),
        (now + 11 * DAY_MS, ReminderType::Final),
    ] {
        let report = check_overdue_invoices(&pool, &sender, tenant.id, clock)
            .await
            .unwrap();
        assert_eq!(report.sent, 1);
        let log = reminder::find_by_order(&pool, order_id).await.unwrap();
        assert_eq!(log.last().map(|r| r.reminder_type), Some(expected));
    }
    assert_eq!(
        reminder::find_sent_types(&pool, order_id).await.unwrap().len(),
        3
    );

    // past the final step there is nothing left to escalate to
    let report = check_overdue_invoices(&pool, &sender, tenant.id, now + 30 * DAY_MS)
        .await
        .unwrap();
    assert_eq!(report.sent, 0);
    assert_eq!(report.skipped, 1);
}

#[tokio::test]
async fn test_failed_send_leaves_no_record_and_retries() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let unit = seed_stock(&pool, tenant.id, "SKU-1", 10.0, 10, true).await;
    let buyer = seed_customer(&pool, tenant.id, "Ana", Some("ana@example.com")).await;
    let now = time::now_millis();
    let order_id = seed_overdue_order(&pool, tenant.id, unit.id, Some(buyer.id), now, 4).await;
    reminder::upsert_settings(&pool, tenant.id, default_settings())
        .await
        .unwrap();

    let sender = RecordingSender::default();
    sender.fail.store(true, Ordering::SeqCst);
    let report = check_overdue_invoices(&pool, &sender, tenant.id, now)
        .await
        .unwrap();
    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 0);
    assert!(reminder::find_sent_types(&pool, order_id)
        .await
        .unwrap()
        .is_empty());

    // delivery recovers; the next run retries the same step
    sender.fail.store(false, Ordering::SeqCst);
    let report = check_overdue_invoices(&pool, &sender, tenant.id, now)
        .await
        .unwrap();
    assert_eq!(report.sent, 1);
    assert_eq!(
        reminder::find_sent_types(&pool, order_id).await.unwrap(),
        vec![ReminderType::First]
    );
}

#[tokio::test]
async fn test_missing_recipient_counts_as_failed() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let unit = seed_stock(&pool, tenant.id, "SKU-1", 10.0, 10, true).await;
    let buyer = seed_customer(&pool, tenant.id, "NoMail", None).await;
    let now = time::now_millis();
    let order_id = seed_overdue_order(&pool, tenant.id, unit.id, Some(buyer.id), now, 4).await;
    reminder::upsert_settings(&pool, tenant.id, default_settings())
        .await
        .unwrap();

    let sender = RecordingSender::default();
    let report = check_overdue_invoices(&pool, &sender, tenant.id, now)
        .await
        .unwrap();
    assert_eq!(report.attempted, 1);
    assert_eq!(report.failed, 1);
    assert!(sender.sent().is_empty());
    assert!(reminder::find_sent_types(&pool, order_id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_admin_copy_and_guest_recipient() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let unit = seed_stock(&pool, tenant.id, "SKU-1", 10.0, 10, true).await;
    let now = time::now_millis();
    let detail = orders::create(
        &pool,
        tenant.id,
        PlanTier::Starter,
        OrderCreate {
            items: vec![item(unit.id, 1)],
            guest_name: Some("Walk-in".to_string()),
            guest_email: Some("guest@example.com".to_string()),
            due_date: Some(now - 4 * DAY_MS),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    reminder::upsert_settings(
        &pool,
        tenant.id,
        ReminderSettingsUpdate {
            notify_admin: true,
            admin_email: Some("owner@example.com".to_string()),
            ..default_settings()
        },
    )
    .await
    .unwrap();

    let sender = RecordingSender::default();
    check_overdue_invoices(&pool, &sender, tenant.id, now)
        .await
        .unwrap();
    let mail = sender.sent();
    assert_eq!(mail.len(), 1);
    assert_eq!(
        mail[0].0,
        vec!["guest@example.com".to_string(), "owner@example.com".to_string()]
    );

    let log = reminder::find_by_order(&pool, detail.order.id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].sent_to.len(), 2);
}

#[tokio::test]
async fn test_paid_and_future_orders_ignored() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let unit = seed_stock(&pool, tenant.id, "SKU-1", 10.0, 10, true).await;
    let buyer = seed_customer(&pool, tenant.id, "Ana", Some("ana@example.com")).await;
    let now = time::now_millis();

    let paid_id = seed_overdue_order(&pool, tenant.id, unit.id, Some(buyer.id), now, 10).await;
    orders::set_payment_status(&pool, tenant.id, paid_id, PaymentStatus::Paid)
        .await
        .unwrap();
    // due next week, not overdue yet
    seed_overdue_order(&pool, tenant.id, unit.id, Some(buyer.id), now, -7).await;
    reminder::upsert_settings(&pool, tenant.id, default_settings())
        .await
        .unwrap();

    let sender = RecordingSender::default();
    let report = check_overdue_invoices(&pool, &sender, tenant.id, now)
        .await
        .unwrap();
    assert_eq!(report.attempted, 0);
    assert_eq!(report.skipped, 0);
    assert!(sender.sent().is_empty());
}

#[tokio::test]
async fn test_partial_payment_still_reminded() {
    let pool = setup_pool().await;
    let tenant = seed_tenant(&pool, PlanTier::Starter).await;
    let unit = seed_stock(&pool, tenant.id, "SKU-1", 10.0, 10, true).await;
    let buyer = seed_customer(&pool, tenant.id, "Ana", Some("ana@example.com")).await;
    let now = time::now_millis();
    let order_id = seed_overdue_order(&pool, tenant.id, unit.id, Some(buyer.id), now, 4).await;
    orders::set_payment_status(&pool, tenant.id, order_id, PaymentStatus::Partial)
        .await
        .unwrap();
    reminder::upsert_settings(&pool, tenant.id, default_settings())
        .await
        .unwrap();

    let sender = RecordingSender::default();
    let report = check_overdue_invoices(&pool, &sender, tenant.id, now)
        .await
        .unwrap();
    assert_eq!(report.sent, 1);
}

#[tokio::test]
async fn test_run_all_reports_every_tenant() {
    let pool = setup_pool().await;
    let tenant_a = seed_tenant(&pool, PlanTier::Starter).await;
    let tenant_b = seed_tenant(&pool, PlanTier::Starter).await;
    let unit_a = seed_stock(&pool, tenant_a.id, "SKU-A", 10.0, 10, true).await;
    let buyer_a = seed_customer(&pool, tenant_a.id, "Ana", Some("ana@example.com")).await;
    let now = time::now_millis();
    seed_overdue_order(&pool, tenant_a.id, unit_a.id, Some(buyer_a.id), now, 4).await;
    reminder::upsert_settings(&pool, tenant_a.id, default_settings())
        .await
        .unwrap();
    // tenant B never configured reminders

    let sender = RecordingSender::default();
    let reports = run_all(&pool, &sender).await.unwrap();
    assert_eq!(reports.len(), 2);
    let by_tenant = |id: i64| reports.iter().find(|r| r.tenant_id == id).unwrap();
    assert_eq!(by_tenant(tenant_a.id).sent, 1);
    assert_eq!(by_tenant(tenant_b.id).attempted, 0);
}
