// ghproxy entry point.
// Loads configuration, initializes logging and serves the API until shutdown.

use ghproxy::{Config, Result, build_app};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine; real deployments set the environment directly.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        api_url = %config.api_url,
        listen_addr = %config.listen_addr,
        allowed_origin = %config.allowed_origin,
        redis = config.redis.is_some(),
        "starting ghproxy"
    );

    let app = build_app(&config)?;
    let listener = TcpListener::bind(config.listen_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        // Without a signal handler, keep serving until killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
