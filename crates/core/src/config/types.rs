use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::ranking::DEFAULT_PAGE_SIZE;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub searcher: Option<SearcherConfig>,
    #[serde(default)]
    pub presentation: PresentationConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Searcher configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearcherConfig {
    /// Search backend type
    pub backend: SearcherBackend,
    /// Required when backend = "prowlarr"
    #[serde(default)]
    pub prowlarr: Option<AggregatorConfig>,
    /// Required when backend = "jackett"
    #[serde(default)]
    pub jackett: Option<AggregatorConfig>,
}

impl SearcherConfig {
    /// Connection settings of the selected backend, if present.
    pub fn active(&self) -> Option<&AggregatorConfig> {
        match self.backend {
            SearcherBackend::Prowlarr => self.prowlarr.as_ref(),
            SearcherBackend::Jackett => self.jackett.as_ref(),
        }
    }
}

/// Available search backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearcherBackend {
    Prowlarr,
    Jackett,
}

impl SearcherBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearcherBackend::Prowlarr => "prowlarr",
            SearcherBackend::Jackett => "jackett",
        }
    }

    /// Product name, as shown in user-facing messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            SearcherBackend::Prowlarr => "Prowlarr",
            SearcherBackend::Jackett => "Jackett",
        }
    }
}

/// Connection settings for an aggregator
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AggregatorConfig {
    /// Server URL (e.g., "http://localhost:9696")
    pub url: String,
    /// API key
    pub api_key: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

fn default_timeout() -> u32 {
    30
}

/// How result lists are presented
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresentationConfig {
    /// Records per page (default: 50)
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Maximum number of search sessions kept in memory (default: 256)
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_sessions: default_max_sessions(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_sessions() -> usize {
    256
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searcher: Option<SanitizedSearcherConfig>,
    pub presentation: PresentationConfig,
}

/// Sanitized searcher config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSearcherConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub api_key_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u32>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            searcher: config.searcher.as_ref().map(|s| {
                let active = s.active();
                SanitizedSearcherConfig {
                    backend: s.backend.as_str().to_string(),
                    url: active.map(|a| a.url.clone()),
                    api_key_configured: active.map(|a| !a.api_key.is_empty()).unwrap_or(false),
                    timeout_secs: active.map(|a| a.timeout_secs),
                }
            }),
            presentation: config.presentation.clone(),
        }
    }
}
