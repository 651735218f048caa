pub mod config;
pub mod format;
pub mod magnet;
pub mod metrics;
pub mod ranking;
pub mod record;
pub mod searcher;
pub mod session;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, AggregatorConfig, Config, ConfigError,
    PresentationConfig, SanitizedConfig, SearcherBackend, SearcherConfig,
};
pub use format::{format_bytes, format_publish_date, RecordDisplay, SeederHealth};
pub use magnet::{build_magnet, extract_info_hash, is_valid_info_hash, parse_magnet, MagnetLink};
pub use ranking::{
    paginate, present, rank, total_pages, Page, PageState, SortDirection, SortDirective, SortKey,
};
pub use record::{parse_timestamp, RecordId, ResultRecord};
pub use searcher::{
    create_searcher, Category, ConnectionStatus, SearchBatch, SearchError, SearchQuery, Searcher,
};
pub use session::{SearchSession, SessionError, SessionStore, SessionView};
