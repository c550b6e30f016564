//! Marginalia API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use marginalia_api::build_app;
use marginalia_api::config::Config;
use marginalia_api::error::AppError;
use marginalia_api::state::AppState;
use marginalia_core::clock::SystemClock;
use marginalia_store::UpstashStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Marginalia comment API server");

    // Read and validate configuration; any problem aborts startup.
    let config = Config::from_env()?;

    let store = Arc::new(UpstashStore::new(
        config.redis_endpoint.clone(),
        config.redis_token.clone(),
    ));
    let app_state = AppState::new(
        Arc::new(SystemClock),
        store,
        config.limits,
        config.add_comment_rate_limit,
    );

    let app = build_app(app_state);

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(AppError::Server)?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(AppError::Server)?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
