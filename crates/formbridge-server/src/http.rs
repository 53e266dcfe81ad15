// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formbridge_api::{decode_upsert_payload, openapi_v1_spec, ApiError, ApiErrorCode};
use formbridge_fill::{fill_document, list_field_names, load_document_base64, normalize_document};
use formbridge_fill::{FillError, FillErrorCode};
use formbridge_store::{read_records, upsert, StoreError, StoreErrorCode, UpsertOutcome};
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;

fn api_error_response(err: ApiError) -> Response {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({"error": err}))).into_response()
}

fn store_error(err: StoreError) -> Response {
    let code = match err.code {
        StoreErrorCode::NotFound => ApiErrorCode::NotFound,
        StoreErrorCode::Format => ApiErrorCode::FormatError,
        StoreErrorCode::EmptyPayload => ApiErrorCode::EmptyPayload,
        StoreErrorCode::Io | StoreErrorCode::Internal => ApiErrorCode::Internal,
    };
    api_error_response(ApiError::new(code, err.message, json!({})))
}

fn fill_error(err: FillError) -> Response {
    let code = match err.code {
        FillErrorCode::NotFound => ApiErrorCode::NotFound,
        FillErrorCode::Format => ApiErrorCode::FormatError,
        FillErrorCode::Io | FillErrorCode::Internal => ApiErrorCode::Internal,
    };
    api_error_response(ApiError::new(code, err.message, json!({})))
}

fn blocking_failed(err: tokio::task::JoinError) -> Response {
    warn!(error = %err, "blocking task failed");
    api_error_response(ApiError::new(
        ApiErrorCode::Internal,
        "internal task failure",
        json!({}),
    ))
}

/// Record endpoints take the store file via `?path=`; deployments that pin
/// the store can reject anything but the configured path.
fn resolve_record_path(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<PathBuf, ApiError> {
    let Some(raw) = params.get("path") else {
        return Err(ApiError::missing_query_param("path"));
    };
    let path = PathBuf::from(raw);
    if state.config.restrict_record_paths && path != state.config.records_path {
        return Err(ApiError::new(
            ApiErrorCode::InvalidPayload,
            "record path is restricted to the configured store",
            json!({"path": raw}),
        ));
    }
    Ok(path)
}

pub(crate) async fn healthz_handler() -> &'static str {
    "ok"
}

pub(crate) async fn version_handler() -> Json<serde_json::Value> {
    Json(json!({
        "name": crate::CRATE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub(crate) async fn openapi_handler() -> Json<serde_json::Value> {
    Json(openapi_v1_spec())
}

pub(crate) async fn records_get_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let path = match resolve_record_path(&state, &params) {
        Ok(path) => path,
        Err(err) => return api_error_response(err),
    };

    let result = tokio::task::spawn_blocking(move || read_records(&path)).await;
    match result {
        Ok(Ok(set)) => Json(json!({
            "shape": set.shape.as_str(),
            "records": set.records,
        }))
        .into_response(),
        Ok(Err(err)) => store_error(err),
        Err(err) => blocking_failed(err),
    }
}

pub(crate) async fn records_post_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let path = match resolve_record_path(&state, &params) {
        Ok(path) => path,
        Err(err) => return api_error_response(err),
    };
    let incoming = match decode_upsert_payload(&body) {
        Ok(records) => records,
        Err(err) => return api_error_response(err),
    };

    let result = tokio::task::spawn_blocking(move || upsert(&path, incoming)).await;
    match result {
        Ok(Ok(outcome)) => {
            let replaced = match outcome {
                UpsertOutcome::Replaced(n) => Some(n),
                _ => None,
            };
            Json(json!({
                "status": outcome.as_str(),
                "records_replaced": replaced,
            }))
            .into_response()
        }
        Ok(Err(err)) => store_error(err),
        Err(err) => blocking_failed(err),
    }
}

pub(crate) async fn fill_handler(State(state): State<AppState>) -> Response {
    let config = Arc::clone(&state.config);
    let result = tokio::task::spawn_blocking(move || {
        fill_document(
            &config.records_path,
            &config.template_path,
            &config.filled_output_path,
        )
    })
    .await;
    match result {
        Ok(Ok(report)) => Json(json!(report)).into_response(),
        Ok(Err(err)) => fill_error(err),
        Err(err) => blocking_failed(err),
    }
}

pub(crate) async fn document_base64_handler(State(state): State<AppState>) -> Response {
    let config = Arc::clone(&state.config);
    let result =
        tokio::task::spawn_blocking(move || load_document_base64(&config.filled_output_path))
            .await;
    match result {
        Ok(Ok(encoded)) => Json(json!({"base64": encoded})).into_response(),
        Ok(Err(err)) => fill_error(err),
        Err(err) => blocking_failed(err),
    }
}

pub(crate) async fn normalize_handler(State(state): State<AppState>) -> Response {
    let config = Arc::clone(&state.config);
    let result = tokio::task::spawn_blocking(move || {
        normalize_document(&config.filled_output_path, &config.normalized_output_path)
    })
    .await;
    match result {
        Ok(Ok(report)) => Json(json!(report)).into_response(),
        Ok(Err(err)) => fill_error(err),
        Err(err) => blocking_failed(err),
    }
}

pub(crate) async fn fields_handler(State(state): State<AppState>) -> Response {
    let config = Arc::clone(&state.config);
    let result =
        tokio::task::spawn_blocking(move || list_field_names(&config.template_path)).await;
    match result {
        Ok(Ok(names)) => Json(json!(names)).into_response(),
        Ok(Err(err)) => fill_error(err),
        Err(err) => blocking_failed(err),
    }
}
