//! Mock searcher for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

use crate::record::ResultRecord;
use crate::searcher::{
    Category, ConnectionStatus, SearchBatch, SearchError, SearchQuery, Searcher,
};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The query that was searched, after normalization.
    pub query: SearchQuery,
    /// When the search was made.
    pub timestamp: Instant,
}

/// Mock implementation of the Searcher trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable records and categories
/// - Track search queries for assertions
/// - Simulate failures
///
/// # Example
///
/// ```rust,ignore
/// use torrentwave_core::testing::{MockSearcher, fixtures};
///
/// let searcher = MockSearcher::new();
/// searcher.set_records(fixtures::numbered_records(3)).await;
///
/// let batch = searcher.search(&SearchQuery::new("ubuntu")).await?;
/// assert_eq!(batch.records.len(), 3);
/// assert_eq!(searcher.search_count().await, 1);
/// ```
pub struct MockSearcher {
    /// Records returned by every search.
    records: Arc<RwLock<Vec<ResultRecord>>>,
    categories: Arc<RwLock<Vec<Category>>>,
    /// Recorded search queries.
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next call will fail with this error.
    next_error: Arc<RwLock<Option<SearchError>>>,
}

impl std::fmt::Debug for MockSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSearcher")
            .field("records", &"<records>")
            .field("categories", &"<categories>")
            .field("searches", &"<searches>")
            .field("next_error", &"<next_error>")
            .finish()
    }
}

impl Default for MockSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSearcher {
    /// Create a new mock searcher with no records and two categories.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            categories: Arc::new(RwLock::new(vec![
                Category::new("2000", "Movies"),
                Category::new("5000", "TV"),
            ])),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the records to return for subsequent searches.
    pub async fn set_records(&self, records: Vec<ResultRecord>) {
        *self.records.write().await = records;
    }

    pub async fn set_categories(&self, categories: Vec<Category>) {
        *self.categories.write().await = categories;
    }

    /// Get recorded search queries.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Configure the next call to fail with the given error.
    pub async fn set_next_error(&self, error: SearchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<SearchError> {
        self.next_error.write().await.take()
    }
}

#[async_trait]
impl Searcher for MockSearcher {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchBatch, SearchError> {
        // Same validation as the real backends
        let query = query.normalized()?;

        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        self.searches.write().await.push(RecordedSearch {
            query: query.clone(),
            timestamp: Instant::now(),
        });

        Ok(SearchBatch {
            query,
            records: self.records.read().await.clone(),
            duration_ms: 5,
        })
    }

    async fn categories(&self) -> Result<Vec<Category>, SearchError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(self.categories.read().await.clone())
    }

    async fn test_connection(&self) -> Result<ConnectionStatus, SearchError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }
        Ok(ConnectionStatus {
            backend: "mock".to_string(),
            app_name: Some("Mock".to_string()),
            version: Some("1.0.0".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_basic_search() {
        let searcher = MockSearcher::new();
        searcher.set_records(fixtures::numbered_records(2)).await;

        let batch = searcher.search(&SearchQuery::new("anything")).await.unwrap();
        assert_eq!(batch.records.len(), 2);
    }

    #[tokio::test]
    async fn test_recorded_searches() {
        let searcher = MockSearcher::new();

        searcher.search(&SearchQuery::new(" first ")).await.unwrap();
        searcher
            .search(&SearchQuery::new("second").with_category("2000"))
            .await
            .unwrap();

        let searches = searcher.recorded_searches().await;
        assert_eq!(searches.len(), 2);
        assert_eq!(searches[0].query.query, "first");
        assert_eq!(searches[1].query.category.as_deref(), Some("2000"));
    }

    #[tokio::test]
    async fn test_empty_query_rejected_and_not_recorded() {
        let searcher = MockSearcher::new();
        let result = searcher.search(&SearchQuery::new("  ")).await;
        assert!(matches!(result, Err(SearchError::EmptyQuery)));
        assert_eq!(searcher.search_count().await, 0);
    }

    #[tokio::test]
    async fn test_error_injection() {
        let searcher = MockSearcher::new();
        searcher
            .set_next_error(SearchError::ConnectionFailed("test error".into()))
            .await;

        let result = searcher.search(&SearchQuery::new("test")).await;
        assert!(result.is_err());

        // Error should be consumed
        let result = searcher.search(&SearchQuery::new("test")).await;
        assert!(result.is_ok());
    }
}
