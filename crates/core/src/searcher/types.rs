//! Types for the aggregator search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::ResultRecord;

/// Query parameters for an aggregator search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search query.
    pub query: String,
    /// Optional aggregator category id (e.g. "2000" for movies).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            category: None,
        }
    }

    /// Restrict to a category. An empty id means "all categories".
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = if category.trim().is_empty() {
            None
        } else {
            Some(category)
        };
        self
    }

    /// Trim the query text and reject it when nothing is left.
    pub fn normalized(&self) -> Result<Self, SearchError> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }
        Ok(Self {
            query: query.to_string(),
            category: self
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }
}

/// One complete batch of normalized results for a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchBatch {
    /// The query that was executed.
    pub query: SearchQuery,
    /// Records in the order the aggregator returned them.
    pub records: Vec<ResultRecord>,
    /// How long the aggregator took, in milliseconds.
    pub duration_ms: u64,
}

/// A selectable aggregator category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Result of probing the aggregator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionStatus {
    /// Backend name ("prowlarr", "jackett").
    pub backend: String,
    /// Application name the server reported, when it reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Errors that can occur talking to an aggregator.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Invalid API Key. Please check your {0} settings.")]
    InvalidApiKey(String),

    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("{0}")]
    ApiError(String),

    #[error("Unexpected response from search backend: {0}")]
    InvalidResponse(String),

    #[error("Please enter a search term.")]
    EmptyQuery,

    #[error("Search backend not configured: {0}")]
    NotConfigured(String),

    #[error("Request timeout")]
    Timeout,
}

/// Trait for aggregator backends.
#[async_trait]
pub trait Searcher: Send + Sync {
    /// Backend name for logging and status reporting.
    fn name(&self) -> &str;

    /// Run a search and return the whole normalized batch.
    async fn search(&self, query: &SearchQuery) -> Result<SearchBatch, SearchError>;

    /// Categories the aggregator offers, sorted by name.
    async fn categories(&self) -> Result<Vec<Category>, SearchError>;

    /// Check that the backend is reachable and the API key is accepted.
    async fn test_connection(&self) -> Result<ConnectionStatus, SearchError>;
}
