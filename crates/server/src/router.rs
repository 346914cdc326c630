//! HTTP router construction.
//!
//! Assembles the Axum routes, middleware, and OpenAPI docs into a single
//! `Router`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api;
use crate::state::AppState;

/// Build the complete application router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.upload.max_upload_bytes;

    Router::new()
        .route("/health", get(api::health::health))
        .route(
            "/api/analyze",
            post(api::analyze::analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/test-connection", get(api::connection::test_connection))
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(Scalar::with_url("/docs", api::doc::ApiDoc::openapi()))
}
