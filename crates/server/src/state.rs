use std::sync::Arc;

use tokio::sync::watch;

use dossier_assistant::AssistantApi;
use dossier_core::Config;

/// Shared state handed to every handler.
pub struct AppState {
    pub config: Config,
    /// Assistant client, or `None` when the service is not configured.
    /// Handlers that need it answer 503 until it is.
    pub api: Option<Arc<dyn AssistantApi>>,
    /// Flips to `true` when the process starts shutting down so
    /// in-flight runs can be cancelled.
    pub shutdown: watch::Receiver<bool>,
}
