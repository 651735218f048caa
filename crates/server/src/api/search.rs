//! Searcher API handlers.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use torrentwave_core::{
    present, total_pages, Category, Page, PageState, RecordDisplay, ResultRecord, SearchQuery,
    SortDirection, SortDirective, SortKey,
};

use super::handlers::{not_configured, search_error_response, ApiError};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub direction: Option<SortDirection>,
    #[serde(default)]
    pub page: Option<usize>,
}

/// A visible record with its pre-rendered display fields.
#[derive(Debug, Serialize)]
pub struct RecordItem {
    #[serde(flatten)]
    pub record: ResultRecord,
    pub display: RecordDisplay,
}

impl From<ResultRecord> for RecordItem {
    fn from(record: ResultRecord) -> Self {
        let display = RecordDisplay::for_record(&record);
        Self { record, display }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub directive: SortDirective,
    pub duration_ms: u64,
    pub page: Page<RecordItem>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct SearcherStatusResponse {
    pub backend: String,
    pub configured: bool,
    pub connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SortKeyOption {
    pub key: SortKey,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SortKeysResponse {
    pub keys: Vec<SortKeyOption>,
    pub default: SortDirective,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/search
///
/// One-shot search: fetch, rank and return a single page without keeping
/// a session around.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let searcher = state.searcher().ok_or_else(not_configured)?;

    let mut query = SearchQuery::new(body.query);
    query.category = body.category;

    let batch = searcher.search(&query).await.map_err(|e| {
        warn!(searcher = searcher.name(), error = %e, "Search failed");
        search_error_response(e)
    })?;

    let directive = match (body.sort, body.direction) {
        (Some(key), Some(direction)) => SortDirective::new(key, direction),
        (Some(key), None) => SortDirective::new(key, SortDirection::Descending),
        (None, Some(direction)) => SortDirective {
            direction,
            ..SortDirective::default()
        },
        (None, None) => SortDirective::default(),
    };
    let pages = total_pages(batch.records.len(), state.page_size());
    let page = PageState::new(state.page_size()).navigate(body.page.unwrap_or(1), pages);

    info!(
        searcher = searcher.name(),
        query = %batch.query.query,
        results = batch.records.len(),
        duration_ms = batch.duration_ms,
        "Search executed"
    );

    Ok(Json(SearchResponse {
        page: present(&batch.records, directive, page).map(RecordItem::from),
        query: batch.query.query,
        category: batch.query.category,
        directive,
        duration_ms: batch.duration_ms,
    }))
}

/// GET /api/v1/categories
pub async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let searcher = state.searcher().ok_or_else(not_configured)?;
    let categories = searcher.categories().await.map_err(search_error_response)?;
    Ok(Json(CategoriesResponse { categories }))
}

/// GET /api/v1/searcher/status
///
/// Get searcher status and probe the aggregator.
pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<SearcherStatusResponse> {
    match state.searcher() {
        Some(searcher) => match searcher.test_connection().await {
            Ok(status) => Json(SearcherStatusResponse {
                backend: searcher.name().to_string(),
                configured: true,
                connected: true,
                app_name: status.app_name,
                version: status.version,
                error: None,
            }),
            Err(e) => Json(SearcherStatusResponse {
                backend: searcher.name().to_string(),
                configured: true,
                connected: false,
                app_name: None,
                version: None,
                error: Some(e.to_string()),
            }),
        },
        None => Json(SearcherStatusResponse {
            backend: "none".to_string(),
            configured: false,
            connected: false,
            app_name: None,
            version: None,
            error: None,
        }),
    }
}

/// GET /api/v1/sort-keys
///
/// Sortable columns with their labels, and the directive a new search
/// starts with.
pub async fn list_sort_keys() -> Json<SortKeysResponse> {
    Json(SortKeysResponse {
        keys: SortKey::ALL
            .into_iter()
            .map(|key| SortKeyOption {
                key,
                label: key.label(),
            })
            .collect(),
        default: SortDirective::default(),
    })
}
