//! Notification sender seam
//!
//! The scheduler only knows this trait. Production wires an actual mail
//! transport; the default [`LogSender`] writes the outbound mail to the log,
//! which is also what keeps the scheduler testable.

use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Deliver one message to all recipients, all-or-nothing.
    async fn send(&self, recipients: &[String], subject: &str, html_body: &str)
        -> anyhow::Result<()>;
}

/// Sender that logs instead of delivering
#[derive(Debug, Default)]
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(
        &self,
        recipients: &[String],
        subject: &str,
        html_body: &str,
    ) -> anyhow::Result<()> {
        info!(
            recipients = recipients.join(", "),
            subject,
            body_bytes = html_body.len(),
            "outbound reminder (log sender)"
        );
        Ok(())
    }
}
