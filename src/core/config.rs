/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | HTTP_PORT | 3000 | HTTP API port |
/// | DATABASE_PATH | backoffice.db | SQLite database file |
/// | CRON_SECRET | (unset) | Shared secret for the reminder trigger endpoint |
/// | REMINDER_INTERVAL_SECS | 86400 | Internal reminder loop interval (0 disables it) |
/// | LOG_LEVEL | info | Tracing level filter |
/// | LOG_DIR | (unset) | Rolling log file directory; stdout only when unset |
///
/// # Example
///
/// ```ignore
/// DATABASE_PATH=/data/backoffice.db HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API port
    pub http_port: u16,
    /// SQLite database file path
    pub database_path: String,
    /// Shared secret the external cron trigger must present
    pub cron_secret: Option<String>,
    /// Interval of the built-in reminder loop, in seconds (0 disables it)
    pub reminder_interval_secs: u64,
    /// Tracing level filter
    pub log_level: String,
    /// Rolling log file directory
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "backoffice.db".into()),
            cron_secret: std::env::var("CRON_SECRET").ok().filter(|s| !s.is_empty()),
            reminder_interval_secs: std::env::var("REMINDER_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(86_400),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Override the port and database path (test scenarios)
    pub fn with_overrides(database_path: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.database_path = database_path.into();
        config.http_port = http_port;
        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
