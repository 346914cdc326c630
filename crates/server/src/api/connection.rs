//! Assistant service connectivity check.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::api::{error_response, ErrorResponse};
use crate::state::AppState;

const TEST_ASSISTANT_NAME: &str = "Test Assistant";
const TEST_ASSISTANT_INSTRUCTIONS: &str = "Test instructions";

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionResponse {
    pub success: bool,
    pub message: &'static str,
    pub assistant_id: String,
}

/// Verify the assistant service is reachable
///
/// Creates a throwaway assistant against the configured deployment and
/// reports its id. Answers 503 until the service is configured.
#[utoipa::path(
    get,
    path = "/api/test-connection",
    tag = "Assistant",
    responses(
        (status = 200, description = "Connection works", body = TestConnectionResponse),
        (status = 500, description = "Service call failed", body = ErrorResponse),
        (status = 503, description = "Assistant service not configured", body = ErrorResponse)
    )
)]
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TestConnectionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let Some(api) = state.api.as_ref() else {
        return Err(error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Assistant service is not configured".to_string(),
        ));
    };

    match api
        .create_assistant(TEST_ASSISTANT_NAME, TEST_ASSISTANT_INSTRUCTIONS)
        .await
    {
        Ok(assistant) => {
            info!(assistant_id = %assistant.id, "Connection test succeeded");
            Ok(Json(TestConnectionResponse {
                success: true,
                message: "Connection successful",
                assistant_id: assistant.id,
            }))
        }
        Err(e) => {
            error!("Connection test failed: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                e.to_string(),
            ))
        }
    }
}
