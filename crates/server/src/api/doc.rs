//! OpenAPI documentation aggregator.
//!
//! Collects all `#[utoipa::path]`-annotated handlers and `ToSchema`-derived
//! types into a single OpenAPI spec, served via Scalar UI at `/docs`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "dossier API",
        version = "0.1.0",
        description = "PDF analysis service backed by the Azure OpenAI Assistants API.",
    ),
    tags(
        (name = "Health", description = "Server liveness"),
        (name = "Analysis", description = "PDF upload and assistant-driven analysis"),
        (name = "Assistant", description = "Assistant service connectivity"),
    ),
    paths(
        crate::api::health::health,
        crate::api::analyze::analyze,
        crate::api::connection::test_connection,
    ),
    components(schemas(
        crate::api::ErrorResponse,
        crate::api::health::HealthResponse,
        crate::api::analyze::AnalyzeResponse,
        crate::api::connection::TestConnectionResponse,
    ))
)]
pub struct ApiDoc;
