//! Testing utilities and mock implementations.
//!
//! This module provides a mock [`Searcher`](crate::searcher::Searcher) and
//! record fixtures, allowing the server to be tested without a running
//! aggregator.
//!
//! # Example
//!
//! ```rust,ignore
//! use torrentwave_core::testing::{fixtures, MockSearcher};
//!
//! let searcher = MockSearcher::new();
//! searcher.set_records(fixtures::sample_records()).await;
//!
//! // Use in AppState...
//! ```

mod mock_searcher;

pub use mock_searcher::{MockSearcher, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::record::ResultRecord;

    /// Create a record with reasonable defaults.
    pub fn record(id: i64, title: &str, seeders: u64) -> ResultRecord {
        let mut record = ResultRecord::new(id, title)
            .with_tracker("mock-indexer")
            .with_category("Movies")
            .with_size(1024 * 1024 * 100) // 100 MB
            .with_seeders(seeders)
            .with_peers(seeders / 10)
            .with_publish_date("2024-01-01T00:00:00Z");
        record.details_url = format!("https://tracker.example/t/{}", id);
        record
    }

    /// `count` records with ids `1..=count`; record `n` has `n * 10` seeders.
    pub fn numbered_records(count: usize) -> Vec<ResultRecord> {
        (1..=count as i64)
            .map(|n| record(n, &format!("Record {}", n), n as u64 * 10))
            .collect()
    }

    /// A small mixed batch with missing and odd values.
    pub fn sample_records() -> Vec<ResultRecord> {
        vec![
            record(1, "Ubuntu 24.04 Desktop amd64", 5)
                .with_magnet("magnet:?xt=urn:btih:a94a8fe5ccb19ba61c4c0873d391e987982fbbd3"),
            record(2, "Ubuntu 22.04 Server", 50).with_tracker("LinuxTracker"),
            ResultRecord::new(3, "ubuntu-mate 24.04"),
            record(4, "Ubuntu 9.10 Karmic", 12).with_publish_date("not a date"),
        ]
    }
}
