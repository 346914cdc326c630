//! PDF analysis endpoint.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::api::{error_response, ErrorResponse};
use crate::state::AppState;
use crate::{analysis, upload};

#[derive(Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: String,
}

// ── POST /api/analyze ─────────────────────────────────────────────

/// Analyze an uploaded PDF
///
/// Accepts multipart form data with a `pdf` file field and an optional
/// `question` text field. The PDF text is extracted, chunked, and submitted
/// to the assistant service together with the question; the response carries
/// the assistant's answer.
#[utoipa::path(
    post,
    path = "/api/analyze",
    tag = "Analysis",
    request_body(
        content_type = "multipart/form-data",
        description = "PDF file (`pdf`) plus an optional `question` text field"
    ),
    responses(
        (status = 200, description = "Analysis produced", body = AnalyzeResponse),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 500, description = "Extraction or assistant failure", body = ErrorResponse),
        (status = 503, description = "Assistant service not configured", body = ErrorResponse)
    )
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut pdf: Option<(String, axum::body::Bytes)> = None;
    let mut question: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("pdf") => {
                if field.content_type() != Some("application/pdf") {
                    return Err(error_response(
                        StatusCode::BAD_REQUEST,
                        "Only PDF files are allowed".to_string(),
                    ));
                }
                let filename = field.file_name().unwrap_or("document.pdf").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    error_response(StatusCode::BAD_REQUEST, format!("Failed to read upload: {e}"))
                })?;
                pdf = Some((filename, bytes));
            }
            Some("question") => {
                let text = field.text().await.map_err(|e| {
                    error_response(
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read question: {e}"),
                    )
                })?;
                question = Some(text);
            }
            _ => {}
        }
    }

    let Some((filename, bytes)) = pdf else {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "No PDF file uploaded".to_string(),
        ));
    };

    let Some(api) = state.api.as_ref() else {
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Assistant service is not configured".to_string(),
        ));
    };

    let staged = upload::stage(&state.config.upload.dir, &filename, &bytes)
        .await
        .map_err(|e| {
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to stage upload: {e}"),
            )
        })?;
    info!(
        "Staged '{}' ({} bytes) at {}",
        staged.filename(),
        bytes.len(),
        staged.path().display()
    );

    let result = analysis::analyze_upload(
        api.as_ref(),
        &state.config,
        &staged,
        question.as_deref(),
        state.shutdown.clone(),
    )
    .await;

    match result {
        Ok(analysis) => {
            staged.remove().await;
            Ok(Json(AnalyzeResponse {
                success: true,
                analysis,
            }))
        }
        Err(e) => {
            // `staged` drops on return and cleans the file up.
            error!("Analysis of '{}' failed: {}", staged.filename(), e);
            Err(error_response(e.status_code(), e.to_string()))
        }
    }
}
