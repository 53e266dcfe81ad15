#![forbid(unsafe_code)]
//! HTTP surface of the formbridge service: thin plumbing over the store and
//! fill crates. No algorithmic content lives here; handlers decode, call
//! the core, and map errors onto the shared envelope.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

mod config;
mod http;

pub use config::FormConfig;

pub const CRATE_NAME: &str = "formbridge-server";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<FormConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(config: FormConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;
    Router::new()
        .route("/healthz", get(http::healthz_handler))
        .route("/openapi.json", get(http::openapi_handler))
        .route("/v1/version", get(http::version_handler))
        .route(
            "/v1/records",
            get(http::records_get_handler).post(http::records_post_handler),
        )
        .route("/v1/fill", post(http::fill_handler))
        .route("/v1/document/base64", get(http::document_base64_handler))
        .route("/v1/fields", get(http::fields_handler))
        .route("/v1/fields/normalize", post(http::normalize_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
