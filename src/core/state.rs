use std::sync::Arc;

use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::reminders::{LogSender, NotificationSender};
use crate::utils::AppError;

/// Shared server state — configuration, connection pool and the notification
/// seam. Cheap to clone, handed to every router and background task.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub sender: Arc<dyn NotificationSender>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool, sender: Arc<dyn NotificationSender>) -> Self {
        Self {
            config,
            pool,
            sender,
        }
    }

    /// Open the database and assemble the state with the default log sender
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        Ok(Self::new(config.clone(), db.pool, Arc::new(LogSender)))
    }
}
