//! Client for the remote assistant service (Azure OpenAI Assistants API).

pub mod api;
pub mod azure;
pub mod poll;
pub mod types;

pub use api::{AssistantApi, AssistantError};
pub use azure::AzureAssistantClient;
pub use poll::{await_run, PollSchedule, RunWaitError};
pub use types::{
    Assistant, MessageContent, MessageList, MessageRole, Run, RunStatus, TextValue, Thread,
    ThreadMessage,
};
