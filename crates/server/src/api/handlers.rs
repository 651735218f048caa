use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use torrentwave_core::{SanitizedConfig, SearchError, SessionError};

use crate::metrics::{collect_dynamic_metrics, encode_metrics};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error half of every fallible handler.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub fn not_configured() -> ApiError {
    error_response(
        StatusCode::SERVICE_UNAVAILABLE,
        "Search backend not configured",
    )
}

/// Map an aggregator failure to a status code.
///
/// Problems on the aggregator's side (bad key, bad response, unreachable)
/// are reported as gateway errors; only an empty query is the client's fault.
pub fn search_error_response(e: SearchError) -> ApiError {
    let status = match &e {
        SearchError::EmptyQuery => StatusCode::BAD_REQUEST,
        SearchError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        SearchError::InvalidApiKey(_)
        | SearchError::ConnectionFailed(_)
        | SearchError::ApiError(_)
        | SearchError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
    };
    error_response(status, e.to_string())
}

pub fn session_error_response(e: SessionError) -> ApiError {
    match e {
        SessionError::NotFound(_) => error_response(StatusCode::NOT_FOUND, e.to_string()),
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

/// GET /metrics
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    collect_dynamic_metrics(&state).await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
