use engine_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    let log_dir = format!("{}/logs", config.work_dir);
    std::fs::create_dir_all(&log_dir).ok();
    init_logger_with_file(None, Some(&log_dir));

    tracing::info!("Entitlement engine starting...");

    let state = ServerState::initialize(&config).await?;

    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
