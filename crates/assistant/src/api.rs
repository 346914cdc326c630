use async_trait::async_trait;

use crate::types::{Assistant, MessageRole, Run, Thread, ThreadMessage};

/// Trait for the remote assistant service. The Azure client implements
/// this; tests substitute scripted fakes.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    async fn create_assistant(
        &self,
        name: &str,
        instructions: &str,
    ) -> Result<Assistant, AssistantError>;

    async fn create_thread(&self) -> Result<Thread, AssistantError>;

    /// Append a message to a thread.
    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<ThreadMessage, AssistantError>;

    /// Start an asynchronous run of `assistant_id` over the thread.
    async fn create_run(&self, thread_id: &str, assistant_id: &str)
        -> Result<Run, AssistantError>;

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError>;

    /// Ask the service to stop a run that is still pending.
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError>;

    /// List the messages on a thread, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AssistantError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("assistant service not configured: {0}")]
    NotConfigured(String),
}
