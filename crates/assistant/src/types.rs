//! Wire types for the Assistants API.
//!
//! Only the fields the analysis flow reads are modelled; everything else
//! in the service responses is ignored on deserialization.

use serde::{Deserialize, Serialize};

/// A created assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assistant {
    pub id: String,
}

/// A conversation thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
}

/// An asynchronous run of an assistant over a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
}

/// Lifecycle status of a run. Statuses the service adds later map to
/// [`RunStatus::Unknown`] and count as terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
    Unknown,
}

impl From<String> for RunStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "requires_action" => Self::RequiresAction,
            "cancelling" => Self::Cancelling,
            "cancelled" => Self::Cancelled,
            "failed" => Self::Failed,
            "completed" => Self::Completed,
            "expired" => Self::Expired,
            _ => Self::Unknown,
        }
    }
}

impl RunStatus {
    /// A run is pending while the service still has work queued or running.
    pub fn is_pending(&self) -> bool {
        matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }
}

/// Role of a thread message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One content part of a thread message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageContent {
    /// A text part; the only kind the analysis flow reads.
    Text { text: TextValue },
    /// Any other part kind (images, files). Ignored.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextValue {
    pub value: String,
}

/// A message on a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadMessage {
    pub role: MessageRole,
    pub content: Vec<MessageContent>,
}

/// Envelope returned by the message-list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageList {
    pub data: Vec<ThreadMessage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_parses_from_service_json() {
        let run: Run = serde_json::from_str(
            r#"{"id":"run_abc","object":"thread.run","thread_id":"thread_1","status":"in_progress","created_at":1699063290}"#,
        )
        .unwrap();
        assert_eq!(run.id, "run_abc");
        assert_eq!(run.status, RunStatus::InProgress);
    }

    #[test]
    fn unknown_status_maps_to_unknown_and_is_terminal() {
        let run: Run = serde_json::from_str(r#"{"id":"r","status":"incomplete"}"#).unwrap();
        assert_eq!(run.status, RunStatus::Unknown);
        assert!(!run.status.is_pending());
    }

    #[test]
    fn only_queued_and_in_progress_are_pending() {
        assert!(RunStatus::Queued.is_pending());
        assert!(RunStatus::InProgress.is_pending());
        for status in [
            RunStatus::RequiresAction,
            RunStatus::Cancelling,
            RunStatus::Cancelled,
            RunStatus::Failed,
            RunStatus::Completed,
            RunStatus::Expired,
            RunStatus::Unknown,
        ] {
            assert!(!status.is_pending(), "{status:?} must be terminal");
        }
    }

    #[test]
    fn message_content_reads_text_and_ignores_other_parts() {
        let list: MessageList = serde_json::from_str(
            r#"{
                "object": "list",
                "data": [{
                    "id": "msg_1",
                    "role": "assistant",
                    "content": [
                        {"type": "image_file", "image_file": {"file_id": "file_1"}},
                        {"type": "text", "text": {"value": "the analysis", "annotations": []}}
                    ]
                }],
                "first_id": "msg_1",
                "last_id": "msg_1",
                "has_more": false
            }"#,
        )
        .unwrap();
        let msg = &list.data[0];
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.content.len(), 2);
        assert!(matches!(&msg.content[0], MessageContent::Other));
        match &msg.content[1] {
            MessageContent::Text { text } => assert_eq!(text.value, "the analysis"),
            other => panic!("expected text part, got {other:?}"),
        }
    }

    #[test]
    fn roles_parse_lowercase() {
        let msg: ThreadMessage = serde_json::from_str(
            r#"{"role":"user","content":[{"type":"text","text":{"value":"q","annotations":[]}}]}"#,
        )
        .unwrap();
        assert_eq!(msg.role, MessageRole::User);
    }
}
