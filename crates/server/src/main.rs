mod analysis;
mod api;
mod router;
mod state;
mod upload;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dossier_assistant::{AssistantApi, AzureAssistantClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dossier_core::config::load_dotenv();
    let config = dossier_core::Config::from_env();
    config.log_summary();

    tokio::fs::create_dir_all(&config.upload.dir).await?;

    let api: Option<Arc<dyn AssistantApi>> =
        match AzureAssistantClient::from_config(&config.assistant) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                warn!("Assistant client not available: {}; analysis endpoints will answer 503", e);
                None
            }
        };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let port = config.server.port;
    let state = Arc::new(state::AppState {
        config,
        api,
        shutdown: shutdown_rx,
    });
    let app = router::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://localhost:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await?;

    Ok(())
}

/// Resolves on Ctrl-C, after flipping the shutdown flag so in-flight
/// waits cancel their runs before the server stops accepting.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, cancelling in-flight runs");
            let _ = shutdown_tx.send(true);
        }
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
