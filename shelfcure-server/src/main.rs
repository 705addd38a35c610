use shelfcure_server::{Config, Server, init_logger_with_file};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // .env is optional
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;
    init_logger_with_file(None, config.log_dir.as_deref());
    shared::error::set_expose_internal_errors(config.is_development());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        "ShelfCure server starting"
    );

    if let Err(e) = Server::new(config).run().await {
        tracing::error!("Server error: {e}");
        return Err(e.into());
    }
    Ok(())
}
