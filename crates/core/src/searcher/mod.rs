//! Indexer aggregator clients.
//!
//! This module provides a `Searcher` trait with Prowlarr and Jackett
//! backends. Each backend turns one query into a complete batch of
//! normalized [`ResultRecord`](crate::record::ResultRecord)s.

mod caps;
mod http;
mod jackett;
mod prowlarr;
mod types;

use std::sync::Arc;

use crate::config::{SearcherBackend, SearcherConfig};

pub use caps::{parse_caps_categories, parse_torznab_error};
pub use jackett::JackettSearcher;
pub use prowlarr::ProwlarrSearcher;
pub use types::*;

/// Build the searcher selected by `config.backend`.
pub fn create_searcher(config: &SearcherConfig) -> Result<Arc<dyn Searcher>, SearchError> {
    let aggregator = config.active().cloned().ok_or_else(|| {
        SearchError::NotConfigured(format!(
            "missing [searcher.{}] section",
            config.backend.as_str()
        ))
    })?;

    Ok(match config.backend {
        SearcherBackend::Prowlarr => Arc::new(ProwlarrSearcher::new(aggregator)?),
        SearcherBackend::Jackett => Arc::new(JackettSearcher::new(aggregator)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AggregatorConfig;

    fn aggregator() -> AggregatorConfig {
        AggregatorConfig {
            url: "http://localhost:9696".to_string(),
            api_key: "key".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_create_searcher_selects_backend() {
        let config = SearcherConfig {
            backend: SearcherBackend::Jackett,
            prowlarr: Some(aggregator()),
            jackett: Some(aggregator()),
        };
        assert_eq!(create_searcher(&config).unwrap().name(), "jackett");

        let config = SearcherConfig {
            backend: SearcherBackend::Prowlarr,
            ..config
        };
        assert_eq!(create_searcher(&config).unwrap().name(), "prowlarr");
    }

    #[test]
    fn test_create_searcher_missing_section() {
        let config = SearcherConfig {
            backend: SearcherBackend::Jackett,
            prowlarr: Some(aggregator()),
            jackett: None,
        };
        match create_searcher(&config) {
            Err(SearchError::NotConfigured(msg)) => assert!(msg.contains("searcher.jackett")),
            Err(e) => panic!("unexpected error: {}", e),
            Ok(_) => panic!("expected an error"),
        }
    }
}
