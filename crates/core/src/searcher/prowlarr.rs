//! Prowlarr search backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::AggregatorConfig;
use crate::magnet::derive_magnet;
use crate::metrics::{observe_request, SEARCH_RESULTS};
use crate::ranking::natural_cmp;
use crate::record::{
    lenient_id, lenient_string, lenient_u64, unique_batch_ids, RecordId, ResultRecord,
};

use super::http::{base_url, build_client, check_response, map_request_error};
use super::{Category, ConnectionStatus, SearchBatch, SearchError, SearchQuery, Searcher};

const BACKEND: &str = "prowlarr";
const PRODUCT: &str = "Prowlarr";
const API_KEY_HEADER: &str = "X-Api-Key";

/// Prowlarr search backend.
pub struct ProwlarrSearcher {
    client: Client,
    config: AggregatorConfig,
}

impl ProwlarrSearcher {
    pub fn new(config: AggregatorConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }

    /// Build the Prowlarr API URL for a search.
    fn build_search_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}/api/v1/search?query={}&type=search",
            base_url(&self.config),
            urlencoding::encode(&query.query)
        );
        if let Some(category) = &query.category {
            url.push_str(&format!("&categories={}", urlencoding::encode(category)));
        }
        url
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, SearchError> {
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await
            .map_err(map_request_error)?;
        check_response(response, PRODUCT).await
    }

    async fn fetch_releases(&self, query: &SearchQuery) -> Result<Vec<ResultRecord>, SearchError> {
        let url = self.build_search_url(query);
        debug!(query = %query.query, category = ?query.category, "Searching Prowlarr");

        let releases: Vec<ProwlarrRelease> = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(normalize_releases(releases))
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>, SearchError> {
        let url = format!("{}/api/v1/definition/category", base_url(&self.config));
        let definitions: Vec<ProwlarrCategory> = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(format!("Failed to parse categories: {}", e)))?;

        Ok(flatten_categories(definitions))
    }

    async fn fetch_status(&self) -> Result<ConnectionStatus, SearchError> {
        let url = format!("{}/api/v1/system/status", base_url(&self.config));
        let status: SystemStatus = self
            .get(&url)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(format!("Failed to parse status: {}", e)))?;

        if status.app_name.as_deref() != Some(PRODUCT) {
            return Err(SearchError::ApiError(
                "Connected to an application, but it is not Prowlarr.".to_string(),
            ));
        }

        Ok(ConnectionStatus {
            backend: BACKEND.to_string(),
            app_name: status.app_name,
            version: status.version,
        })
    }
}

#[async_trait]
impl Searcher for ProwlarrSearcher {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchBatch, SearchError> {
        let query = query.normalized()?;
        let start = Instant::now();

        let result = self.fetch_releases(&query).await;
        let elapsed = start.elapsed();
        observe_request(BACKEND, "search", result.is_ok(), elapsed.as_secs_f64());

        let records = result.inspect_err(|e| {
            warn!(error = %e, "Prowlarr search failed");
        })?;

        SEARCH_RESULTS
            .with_label_values(&[BACKEND])
            .observe(records.len() as f64);
        debug!(
            results = records.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Prowlarr search complete"
        );

        Ok(SearchBatch {
            query,
            records,
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    async fn categories(&self) -> Result<Vec<Category>, SearchError> {
        let start = Instant::now();
        let result = self.fetch_categories().await;
        observe_request(BACKEND, "categories", result.is_ok(), start.elapsed().as_secs_f64());
        result
    }

    async fn test_connection(&self) -> Result<ConnectionStatus, SearchError> {
        let start = Instant::now();
        let result = self.fetch_status().await;
        observe_request(BACKEND, "status", result.is_ok(), start.elapsed().as_secs_f64());
        result
    }
}

/// Keep torrent releases and map them onto [`ResultRecord`].
fn normalize_releases(releases: Vec<ProwlarrRelease>) -> Vec<ResultRecord> {
    let torrents: Vec<ProwlarrRelease> = releases
        .into_iter()
        .filter(|r| r.protocol.as_deref() == Some("torrent"))
        .collect();
    let ids = unique_batch_ids(torrents.iter().map(|r| r.id.clone()).collect());

    torrents
        .into_iter()
        .zip(ids)
        .map(|(r, id)| {
            let info_hash = r.info_hash.map(|h| h.to_lowercase());
            let magnet_uri = r
                .magnet_url
                .filter(|m| !m.is_empty())
                .or_else(|| derive_magnet(info_hash.as_deref(), r.title.as_deref()));
            let category_label = r
                .categories
                .as_ref()
                .and_then(|c| c.get(0))
                .and_then(|c| c.get("name"))
                .and_then(|n| n.as_str())
                .filter(|n| !n.is_empty())
                .unwrap_or("N/A")
                .to_string();

            ResultRecord {
                id,
                title: r.title,
                tracker: r.indexer,
                category_label: Some(category_label),
                size_bytes: r.size,
                seeder_count: r.seeders,
                peer_count: r.leechers,
                publish_date: r.publish_date,
                details_url: r.info_url.unwrap_or_default(),
                download_url: r.download_url,
                magnet_uri,
                info_hash,
            }
        })
        .collect()
}

/// Flatten the category tree into one list sorted by name.
///
/// An id seen twice keeps the name it had in tree order.
fn flatten_categories(definitions: Vec<ProwlarrCategory>) -> Vec<Category> {
    fn walk(nodes: Vec<ProwlarrCategory>, seen: &mut HashSet<String>, out: &mut Vec<Category>) {
        for node in nodes {
            if let (Some(id), Some(name)) = (node.id, node.name.filter(|n| !n.is_empty())) {
                let id = id.to_string();
                if seen.insert(id.clone()) {
                    out.push(Category::new(id, name));
                }
            }
            walk(node.sub_categories.unwrap_or_default(), seen, out);
        }
    }

    let mut categories = Vec::new();
    walk(definitions, &mut HashSet::new(), &mut categories);
    categories.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    categories
}

// Prowlarr API response types
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwlarrRelease {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_string")]
    protocol: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    indexer: Option<String>,
    #[serde(default)]
    categories: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    download_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    info_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    magnet_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    info_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    seeders: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    leechers: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    publish_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProwlarrCategory {
    #[serde(default, deserialize_with = "lenient_id")]
    id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
    #[serde(default)]
    sub_categories: Option<Vec<ProwlarrCategory>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SystemStatus {
    #[serde(default)]
    app_name: Option<String>,
    #[serde(default)]
    version: Option<String>,
}
