//! Background reminder loop
//!
//! Internal fallback trigger for deployments without an external cron: runs
//! the reminder pass over all tenants on a fixed interval. The HTTP trigger
//! endpoint and this loop share the same entry point and the same idempotency
//! guarantees, so double-firing is harmless.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::reminders::{self, NotificationSender};

pub struct ReminderTask {
    pool: SqlitePool,
    sender: Arc<dyn NotificationSender>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ReminderTask {
    pub fn new(
        pool: SqlitePool,
        sender: Arc<dyn NotificationSender>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            pool,
            sender,
            interval,
            shutdown,
        }
    }

    /// Main loop: sleep, run, repeat until shutdown
    pub async fn run(self) {
        info!(interval_secs = self.interval.as_secs(), "Reminder task started");
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = self.shutdown.cancelled() => {
                    info!("Reminder task received shutdown signal");
                    return;
                }
            }
            match reminders::run_all(&self.pool, self.sender.as_ref()).await {
                Ok(reports) => {
                    let sent: u32 = reports.iter().map(|r| r.sent).sum();
                    let failed: u32 = reports.iter().map(|r| r.failed).sum();
                    info!(tenants = reports.len(), sent, failed, "Scheduled reminder run finished");
                }
                Err(e) => {
                    error!(error = %e, "Scheduled reminder run failed");
                }
            }
        }
    }
}
