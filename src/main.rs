use backoffice_server::{init_logger_with_file, Config, Server, ServerState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Environment (.env is optional)
    let _ = dotenv::dotenv();

    // 2. Configuration and logging
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!("Back office server starting...");

    // 3. Server state (opens the database, applies migrations)
    let state = ServerState::initialize(&config).await?;

    // 4. HTTP server (spawns the reminder loop)
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
