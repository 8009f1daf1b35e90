pub mod scheduler;
pub mod sender;
pub mod template;

pub use scheduler::{check_overdue_invoices, next_step, run_all, TenantReminderReport};
pub use sender::{LogSender, NotificationSender};
