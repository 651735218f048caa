//! Search session API handlers.
//!
//! A session keeps one fetched batch on the server together with the
//! user's sort directive and page, so the client only ever asks for
//! "next page" or "sort by seeders" and gets back the visible slice.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use torrentwave_core::{
    Page, SearchQuery, SearchSession, SessionView, SortDirective, SortKey,
};

use super::handlers::{
    error_response, not_configured, search_error_response, session_error_response, ApiError,
};
use super::search::RecordItem;
use crate::metrics::{SESSIONS_CREATED_TOTAL, SORT_REQUESTS_TOTAL};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub key: SortKey,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub directive: SortDirective,
    pub page: Page<RecordItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SessionView> for SessionResponse {
    fn from(view: SessionView) -> Self {
        Self {
            id: view.id,
            query: view.query,
            category: view.category,
            directive: view.directive,
            page: view.page.map(RecordItem::from),
            created_at: view.created_at,
            updated_at: view.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MagnetResponse {
    pub record_id: String,
    pub magnet_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info_hash: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/sessions
///
/// Run a search and keep the batch as a new session.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let searcher = state.searcher().ok_or_else(not_configured)?;

    let mut query = SearchQuery::new(body.query);
    query.category = body.category;

    let batch = searcher.search(&query).await.map_err(|e| {
        warn!(searcher = searcher.name(), error = %e, "Search failed");
        search_error_response(e)
    })?;

    let session = SearchSession::from_batch(batch, state.page_size());
    info!(
        session_id = %session.id,
        query = %session.query,
        results = session.results.len(),
        "Session created"
    );

    let view = state.sessions().create(session).await;
    SESSIONS_CREATED_TOTAL.inc();

    Ok((StatusCode::CREATED, Json(SessionResponse::from(view))))
}

/// GET /api/v1/sessions/{id}
///
/// Current view of a session. `?page=N` navigates first, clamped to the
/// available pages.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<SessionResponse>, ApiError> {
    let view = match params.page {
        Some(page) => state
            .sessions()
            .update(&id, |session| {
                session.go_to_page(page);
                session.view()
            })
            .await,
        None => state.sessions().view(&id).await,
    }
    .map_err(session_error_response)?;

    Ok(Json(SessionResponse::from(view)))
}

/// POST /api/v1/sessions/{id}/sort
///
/// Select a sort key. Reselecting the active descending key flips it to
/// ascending; anything else sorts descending. Always returns page 1.
pub async fn sort_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<SortRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let view = state
        .sessions()
        .update(&id, |session| {
            session.request_sort(body.key);
            session.view()
        })
        .await
        .map_err(session_error_response)?;

    SORT_REQUESTS_TOTAL
        .with_label_values(&[body.key.as_str()])
        .inc();
    debug!(session_id = %id, key = %body.key, direction = view.directive.direction.as_str(), "Session sorted");

    Ok(Json(SessionResponse::from(view)))
}

/// POST /api/v1/sessions/{id}/refresh
///
/// Re-run the session's query and replace its batch.
pub async fn refresh_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let searcher = state.searcher().ok_or_else(not_configured)?;
    let query = state
        .sessions()
        .get(&id)
        .await
        .map_err(session_error_response)?
        .search_query();

    // The store lock is not held across the aggregator call
    let batch = searcher.search(&query).await.map_err(|e| {
        warn!(session_id = %id, error = %e, "Refresh failed");
        search_error_response(e)
    })?;

    let view = state
        .sessions()
        .update(&id, |session| {
            session.replace_results(batch.records);
            session.view()
        })
        .await
        .map_err(session_error_response)?;

    info!(session_id = %id, results = view.page.total_items, "Session refreshed");
    Ok(Json(SessionResponse::from(view)))
}

/// DELETE /api/v1/sessions/{id}
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions()
        .remove(&id)
        .await
        .map_err(session_error_response)?;
    debug!(session_id = %id, "Session deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/sessions/{id}/records/{record_id}/magnet
pub async fn get_record_magnet(
    State(state): State<Arc<AppState>>,
    Path((id, record_id)): Path<(String, String)>,
) -> Result<Json<MagnetResponse>, ApiError> {
    let session = state
        .sessions()
        .get(&id)
        .await
        .map_err(session_error_response)?;

    let record = session.find_record(&record_id).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            format!("Record not found: {}", record_id),
        )
    })?;

    match record.magnet_uri.as_deref().filter(|m| !m.is_empty()) {
        Some(magnet_uri) => Ok(Json(MagnetResponse {
            record_id,
            magnet_uri: magnet_uri.to_string(),
            info_hash: record.info_hash.clone(),
        })),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            "No magnet link available for this record",
        )),
    }
}
