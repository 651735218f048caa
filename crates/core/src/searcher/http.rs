//! HTTP plumbing shared by the aggregator backends.

use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

use super::SearchError;
use crate::config::AggregatorConfig;

/// Build a client with the configured request timeout.
pub(super) fn build_client(config: &AggregatorConfig) -> Result<Client, SearchError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs as u64))
        .build()
        .map_err(|e| SearchError::ConnectionFailed(format!("Failed to create HTTP client: {}", e)))
}

/// Base URL without a trailing slash.
pub(super) fn base_url(config: &AggregatorConfig) -> &str {
    config.url.trim_end_matches('/')
}

pub(super) fn map_request_error(e: reqwest::Error) -> SearchError {
    if e.is_timeout() {
        SearchError::Timeout
    } else if e.is_connect() {
        SearchError::ConnectionFailed(e.to_string())
    } else {
        SearchError::ApiError(e.to_string())
    }
}

/// Turn a non-success response into the matching error.
///
/// `product` names the aggregator in the invalid-key message.
pub(super) async fn check_response(
    response: Response,
    product: &str,
) -> Result<Response, SearchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(SearchError::InvalidApiKey(product.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    Err(SearchError::ApiError(error_message(status.as_u16(), &body)))
}

/// The `message` field of a JSON error body, or a generic status line.
pub(super) fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP error! Status: {}", status))
}
