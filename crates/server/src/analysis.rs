//! The analysis flow: extract, chunk, submit, poll, collect.
//!
//! `analyze_upload` reads a staged PDF and hands the extracted document to
//! `analyze_document`, which drives the assistant service end to end. The
//! split keeps the service flow testable against constructed documents.

use std::time::Duration;

use axum::http::StatusCode;
use tokio::sync::watch;
use tracing::{info, warn};

use dossier_assistant::{
    await_run, AssistantApi, AssistantError, MessageContent, MessageRole, PollSchedule, RunStatus,
    RunWaitError, ThreadMessage,
};
use dossier_core::Config;
use dossier_extract::chunker::{chunk_pages, ChunkConfig};
use dossier_extract::{extract_document, ExtractedDocument, ExtractionError};

use crate::upload::StagedUpload;

pub const ASSISTANT_NAME: &str = "PDF Analyzer";
pub const ASSISTANT_INSTRUCTIONS: &str = "You are an AI assistant specialized in analyzing PDF \
     documents. Please provide detailed analysis based on the content of the uploaded PDF.";
pub const DEFAULT_QUESTION: &str = "Please analyze this PDF document and provide key insights.";

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Reading the staged upload back from disk failed.
    #[error("failed to read staged upload: {0}")]
    Io(#[from] std::io::Error),
    /// The uploaded bytes could not be parsed as a PDF.
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    /// The PDF parsed but carries no text layer.
    #[error("Document '{0}' contains no extractable text")]
    EmptyDocument(String),
    /// A call to the assistant service failed.
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    /// The run did not finish: deadline hit or shutdown requested.
    #[error(transparent)]
    Wait(#[from] RunWaitError),
}

impl AnalysisError {
    /// HTTP status the analyze endpoint answers with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AnalysisError::EmptyDocument(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Read a staged upload, extract its text, and run the analysis flow.
pub async fn analyze_upload(
    api: &dyn AssistantApi,
    config: &Config,
    staged: &StagedUpload,
    question: Option<&str>,
    cancel: watch::Receiver<bool>,
) -> Result<String, AnalysisError> {
    let bytes = tokio::fs::read(staged.path()).await?;
    let document = extract_document(&bytes, staged.filename())?;
    info!(
        "Extracted '{}': {} pages, {} fragments, {} chars",
        document.filename,
        document.pages.len(),
        document.fragment_count(),
        document.total_chars()
    );
    analyze_document(api, config, &document, question, cancel).await
}

/// Submit an extracted document to the assistant service and wait for its
/// answer.
///
/// Chunks are posted as user messages in document order, followed by the
/// question (or a default prompt when none was given). The run is polled
/// until it leaves the pending states, then the assistant's reply text is
/// concatenated in the order the service returns it.
pub async fn analyze_document(
    api: &dyn AssistantApi,
    config: &Config,
    document: &ExtractedDocument,
    question: Option<&str>,
    cancel: watch::Receiver<bool>,
) -> Result<String, AnalysisError> {
    if document.total_chars() == 0 {
        return Err(AnalysisError::EmptyDocument(document.filename.clone()));
    }

    let chunk_config = ChunkConfig {
        max_chars: config.chunk.max_chars,
    };
    let chunks = chunk_pages(&document.pages, &chunk_config);
    info!(
        "Chunked '{}' into {} chunks (max {} chars)",
        document.filename,
        chunks.len(),
        chunk_config.max_chars
    );

    let assistant = api
        .create_assistant(ASSISTANT_NAME, ASSISTANT_INSTRUCTIONS)
        .await?;
    let thread = api.create_thread().await?;

    for chunk in &chunks {
        api.create_message(&thread.id, MessageRole::User, &chunk.content)
            .await?;
    }

    let prompt = question.filter(|q| !q.is_empty()).unwrap_or(DEFAULT_QUESTION);
    api.create_message(&thread.id, MessageRole::User, prompt)
        .await?;

    let run = api.create_run(&thread.id, &assistant.id).await?;
    info!(run_id = %run.id, thread_id = %thread.id, "Run created");

    let schedule = PollSchedule::from_config(&config.poll);
    let timeout = Duration::from_secs(config.poll.timeout_seconds);
    let run = await_run(api, &thread.id, run, &schedule, timeout, cancel).await?;

    if run.status != RunStatus::Completed {
        warn!(run_id = %run.id, status = ?run.status, "Run finished in a non-completed status");
    }

    let messages = api.list_messages(&thread.id).await?;
    Ok(assistant_text(&messages))
}

/// Join the text parts of all assistant messages, in list order.
fn assistant_text(messages: &[ThreadMessage]) -> String {
    let parts: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .flat_map(|m| m.content.iter())
        .filter_map(|part| match part {
            MessageContent::Text { text } => Some(text.value.as_str()),
            MessageContent::Other => None,
        })
        .collect();
    parts.join(" ").trim().to_string()
}
