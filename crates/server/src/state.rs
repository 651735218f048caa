use std::sync::Arc;
use torrentwave_core::{Config, SanitizedConfig, Searcher, SessionStore};

/// Shared application state
pub struct AppState {
    config: Config,
    searcher: Option<Arc<dyn Searcher>>,
    sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, searcher: Option<Arc<dyn Searcher>>) -> Self {
        let sessions = SessionStore::new(config.presentation.max_sessions);
        Self {
            config,
            searcher,
            sessions,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn searcher(&self) -> Option<&Arc<dyn Searcher>> {
        self.searcher.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Results per page for new sessions.
    pub fn page_size(&self) -> usize {
        self.config.presentation.page_size
    }
}
