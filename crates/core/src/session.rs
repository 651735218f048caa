//! Search sessions: the presentation state for one query.
//!
//! A [`SearchSession`] owns the fetched batch, the active sort directive
//! and the current page. Every view is recomputed from those three, so a
//! new batch or a new directive can never leave a stale ordering behind.
//! [`SessionStore`] keeps sessions in memory for the HTTP server.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

use crate::ranking::{present, total_pages, Page, PageState, SortDirective, SortKey};
use crate::record::ResultRecord;
use crate::searcher::{SearchBatch, SearchQuery};

/// Errors from the session store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
}

/// Presentation state for one query.
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub id: String,
    pub query: String,
    /// Category id the query was restricted to.
    pub category: Option<String>,
    /// The fetched batch in aggregator order. Never reordered in place.
    pub results: Vec<ResultRecord>,
    pub directive: SortDirective,
    pub page: PageState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Last read or write through the store; drives eviction.
    pub accessed_at: DateTime<Utc>,
}

/// What a client sees of a session: the visible page plus its context.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: String,
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub directive: SortDirective,
    pub page: Page<ResultRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SearchSession {
    /// Start a session on page 1 with the default directive.
    pub fn new(query: SearchQuery, results: Vec<ResultRecord>, page_size: usize) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            query: query.query,
            category: query.category,
            results,
            directive: SortDirective::default(),
            page: PageState::new(page_size),
            created_at: now,
            updated_at: now,
            accessed_at: now,
        }
    }

    pub fn from_batch(batch: SearchBatch, page_size: usize) -> Self {
        Self::new(batch.query, batch.records, page_size)
    }

    /// The query this session was created for, suitable for re-running.
    pub fn search_query(&self) -> SearchQuery {
        SearchQuery {
            query: self.query.clone(),
            category: self.category.clone(),
        }
    }

    /// Swap in a freshly fetched batch and go back to page 1.
    ///
    /// The directive survives so a refresh keeps the user's ordering.
    pub fn replace_results(&mut self, results: Vec<ResultRecord>) {
        self.results = results;
        self.page = self.page.first();
        self.touch();
    }

    /// Apply the toggle rule for `key` and go back to page 1.
    pub fn request_sort(&mut self, key: SortKey) {
        self.directive = self.directive.toggle(key);
        self.page = self.page.first();
        self.touch();
    }

    /// Jump to `page`, clamped to the available pages.
    pub fn go_to_page(&mut self, page: usize) {
        self.page = self.page.navigate(page, self.total_pages());
        self.touch();
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page.current_page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.page.current_page.saturating_sub(1));
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.results.len(), self.page.page_size)
    }

    /// Rank and paginate the current batch.
    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            query: self.query.clone(),
            category: self.category.clone(),
            directive: self.directive,
            page: present(&self.results, self.directive, self.page),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Look up a record of the current batch by its raw id.
    pub fn find_record(&self, raw_id: &str) -> Option<&ResultRecord> {
        self.results.iter().find(|r| r.id.matches(raw_id))
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.accessed_at = self.updated_at;
    }
}

/// Bounded in-memory session storage keyed by session id.
///
/// When full, creating a session evicts the least recently used one.
/// Reads count as use.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SearchSession>>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Store a session and return its view.
    pub async fn create(&self, session: SearchSession) -> SessionView {
        let view = session.view();
        let mut sessions = self.sessions.write().await;

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .values()
                .min_by_key(|s| s.accessed_at)
                .map(|s| s.id.clone());
            match oldest {
                Some(id) => {
                    debug!(session_id = %id, "Evicting least recently used session");
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        sessions.insert(session.id.clone(), session);
        view
    }

    /// A snapshot of the session.
    pub async fn get(&self, id: &str) -> Result<SearchSession, SessionError> {
        self.access(id, |s| s.clone()).await
    }

    pub async fn view(&self, id: &str) -> Result<SessionView, SessionError> {
        self.access(id, SearchSession::view).await
    }

    /// Read a session, marking it as used.
    async fn access<F, R>(&self, id: &str, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&SearchSession) -> R,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        session.accessed_at = Utc::now();
        Ok(f(session))
    }

    /// Mutate a session under the write lock.
    pub async fn update<F, R>(&self, id: &str, f: F) -> Result<R, SessionError>
    where
        F: FnOnce(&mut SearchSession) -> R,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        Ok(f(session))
    }

    pub async fn remove(&self, id: &str) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::SortDirection;
    use crate::testing::fixtures;

    fn session_with(count: usize, page_size: usize) -> SearchSession {
        SearchSession::new(
            SearchQuery::new("ubuntu"),
            fixtures::numbered_records(count),
            page_size,
        )
    }

    #[test]
    fn test_new_session_defaults() {
        let session = session_with(3, 50);
        assert_eq!(session.directive, SortDirective::default());
        assert_eq!(session.page.current_page, 1);
        assert_eq!(session.page.page_size, 50);
        assert!(uuid::Uuid::parse_str(&session.id).is_ok());
    }

    #[test]
    fn test_request_sort_toggles_and_resets_page() {
        let mut session = session_with(120, 50);
        session.go_to_page(3);
        assert_eq!(session.page.current_page, 3);

        session.request_sort(SortKey::SeederCount);
        assert_eq!(session.directive.direction, SortDirection::Ascending);
        assert_eq!(session.page.current_page, 1);

        session.request_sort(SortKey::Title);
        assert_eq!(
            session.directive,
            SortDirective::new(SortKey::Title, SortDirection::Descending)
        );
    }

    #[test]
    fn test_navigation_is_clamped() {
        let mut session = session_with(51, 50);
        session.go_to_page(99);
        assert_eq!(session.page.current_page, 2);

        session.next_page();
        assert_eq!(session.page.current_page, 2);

        session.previous_page();
        session.previous_page();
        assert_eq!(session.page.current_page, 1);

        let mut empty = session_with(0, 50);
        empty.go_to_page(5);
        assert_eq!(empty.page.current_page, 1);
    }

    #[test]
    fn test_replace_results_resets_page_keeps_directive() {
        let mut session = session_with(120, 50);
        session.request_sort(SortKey::Title);
        session.go_to_page(2);

        session.replace_results(fixtures::numbered_records(10));
        assert_eq!(session.page.current_page, 1);
        assert_eq!(session.directive.key, SortKey::Title);
        assert_eq!(session.view().page.total_items, 10);
    }

    #[test]
    fn test_view_ranks_current_batch() {
        let session = session_with(5, 2);
        let view = session.view();
        // record n has n*10 seeders; default is seeders descending
        let ids: Vec<_> = view.page.items.iter().map(|r| r.id.to_string()).collect();
        assert_eq!(ids, vec!["5", "4"]);
        assert_eq!(view.page.total_pages, 3);
        assert!(view.page.has_next);
    }

    #[test]
    fn test_find_record() {
        let session = session_with(3, 50);
        assert!(session.find_record("2").is_some());
        assert!(session.find_record("42").is_none());
        assert!(session.find_record("abc").is_none());
    }

    #[tokio::test]
    async fn test_store_crud() {
        let store = SessionStore::new(4);
        let view = store.create(session_with(3, 50)).await;
        assert_eq!(store.len().await, 1);

        let sort = store
            .update(&view.id, |s| {
                s.request_sort(SortKey::Title);
                s.directive
            })
            .await
            .unwrap();
        assert_eq!(sort.key, SortKey::Title);
        assert_eq!(store.get(&view.id).await.unwrap().directive, sort);

        store.remove(&view.id).await.unwrap();
        assert!(store.is_empty().await);
        assert_eq!(
            store.view(&view.id).await.unwrap_err(),
            SessionError::NotFound(view.id.clone())
        );
        assert!(store.remove(&view.id).await.is_err());
    }

    #[tokio::test]
    async fn test_store_reads_count_as_use() {
        let store = SessionStore::new(2);
        let first = store.create(session_with(1, 50)).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create(session_with(1, 50)).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        // Only read the first; its updated_at stays the oldest
        let viewed = store.view(&first.id).await.unwrap();
        assert_eq!(viewed.updated_at, first.updated_at);

        store.create(session_with(1, 50)).await;
        assert!(store.get(&first.id).await.is_ok());
        assert!(store.get(&second.id).await.is_err());
    }

    #[tokio::test]
    async fn test_store_evicts_least_recently_updated() {
        let store = SessionStore::new(2);
        let first = store.create(session_with(1, 50)).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = store.create(session_with(1, 50)).await;
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        // Touch the first so the second becomes the oldest
        store.update(&first.id, |s| s.go_to_page(1)).await.unwrap();

        let third = store.create(session_with(1, 50)).await;
        assert_eq!(store.len().await, 2);
        assert!(store.get(&first.id).await.is_ok());
        assert!(store.get(&second.id).await.is_err());
        assert!(store.get(&third.id).await.is_ok());
    }
}
