use glean_server::{ServerConfig, app};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("glean_server=info,glean_core=warn,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!(
        addr = %config.addr,
        max_body_bytes = config.max_body_bytes,
        timeout_secs = config.request_timeout.as_secs(),
        "glean-server listening"
    );

    axum::serve(listener, app(config)).with_graceful_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
