//! Server Implementation
//!
//! HTTP server startup and lifecycle

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::tasks::ReminderTask;
use crate::core::{Config, ServerState};
use crate::utils::{AppError, AppResult};

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state (tests inject their own pool/sender)
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(&self) -> AppResult<()> {
        let state = match &self.state {
            Some(s) => s.clone(),
            None => ServerState::initialize(&self.config).await?,
        };

        // Internal reminder loop; external cron may still hit the trigger
        // endpoint, both paths are idempotent.
        let shutdown = CancellationToken::new();
        if self.config.reminder_interval_secs > 0 {
            let task = ReminderTask::new(
                state.pool.clone(),
                state.sender.clone(),
                Duration::from_secs(self.config.reminder_interval_secs),
                shutdown.clone(),
            );
            tokio::spawn(task.run());
        }

        let app = crate::api::router(state);
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
        info!("Back office server listening on {}", addr);

        let graceful = shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutting down...");
                graceful.cancel();
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        shutdown.cancel();
        Ok(())
    }
}
