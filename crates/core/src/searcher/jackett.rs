//! Jackett search backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::AggregatorConfig;
use crate::magnet::derive_magnet;
use crate::metrics::{observe_request, SEARCH_RESULTS};
use crate::record::{lenient_string, lenient_u64, RecordId, ResultRecord};

use super::caps::{parse_caps_categories, parse_torznab_error};
use super::http::{base_url, build_client, check_response, map_request_error};
use super::{Category, ConnectionStatus, SearchBatch, SearchError, SearchQuery, Searcher};

const BACKEND: &str = "jackett";
const PRODUCT: &str = "Jackett";

/// Jackett search backend. Queries the aggregate "all" indexer.
pub struct JackettSearcher {
    client: Client,
    config: AggregatorConfig,
}

impl JackettSearcher {
    pub fn new(config: AggregatorConfig) -> Result<Self, SearchError> {
        Ok(Self {
            client: build_client(&config)?,
            config,
        })
    }

    /// Build the Jackett API URL for a search.
    fn build_search_url(&self, query: &SearchQuery) -> String {
        let mut url = format!(
            "{}/api/v2.0/indexers/all/results?apikey={}&Query={}",
            base_url(&self.config),
            urlencoding::encode(&self.config.api_key),
            urlencoding::encode(&query.query)
        );

        if let Some(category) = &query.category {
            url.push_str(&format!("&Category[]={}", urlencoding::encode(category)));
        }

        url
    }

    fn build_caps_url(&self) -> String {
        format!(
            "{}/api/v2.0/indexers/all/results/torznab/api?apikey={}&t=caps",
            base_url(&self.config),
            urlencoding::encode(&self.config.api_key)
        )
    }

    async fn fetch_results(&self, query: &SearchQuery) -> Result<Vec<ResultRecord>, SearchError> {
        let url = self.build_search_url(query);
        debug!(query = %query.query, category = ?query.category, "Searching Jackett");

        let response = self.client.get(&url).send().await.map_err(map_request_error)?;
        let jackett_response: JackettResponse = check_response(response, PRODUCT)
            .await?
            .json()
            .await
            .map_err(|e| SearchError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

        Ok(normalize_results(jackett_response.results))
    }

    /// Fetch the caps document, surfacing Torznab errors.
    async fn fetch_caps(&self) -> Result<String, SearchError> {
        let response = self
            .client
            .get(self.build_caps_url())
            .send()
            .await
            .map_err(map_request_error)?;
        let body = check_response(response, PRODUCT)
            .await?
            .text()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        if let Some(err) = parse_torznab_error(&body, PRODUCT) {
            return Err(err);
        }
        Ok(body)
    }
}

#[async_trait]
impl Searcher for JackettSearcher {
    fn name(&self) -> &str {
        BACKEND
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchBatch, SearchError> {
        let query = query.normalized()?;
        let start = Instant::now();

        let result = self.fetch_results(&query).await;
        let elapsed = start.elapsed();
        observe_request(BACKEND, "search", result.is_ok(), elapsed.as_secs_f64());

        let records = result.inspect_err(|e| {
            warn!(error = %e, "Jackett search failed");
        })?;

        SEARCH_RESULTS
            .with_label_values(&[BACKEND])
            .observe(records.len() as f64);
        debug!(
            results = records.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Jackett search complete"
        );

        Ok(SearchBatch {
            query,
            records,
            duration_ms: elapsed.as_millis() as u64,
        })
    }

    async fn categories(&self) -> Result<Vec<Category>, SearchError> {
        let start = Instant::now();
        let result = self.fetch_caps().await.map(|xml| parse_caps_categories(&xml));
        observe_request(BACKEND, "categories", result.is_ok(), start.elapsed().as_secs_f64());
        result
    }

    async fn test_connection(&self) -> Result<ConnectionStatus, SearchError> {
        let start = Instant::now();
        let result = self.fetch_caps().await.and_then(|xml| {
            if xml.contains("<caps") {
                Ok(ConnectionStatus {
                    backend: BACKEND.to_string(),
                    app_name: Some(PRODUCT.to_string()),
                    version: None,
                })
            } else {
                Err(SearchError::InvalidResponse(
                    "Response is not a Torznab caps document".to_string(),
                ))
            }
        });
        observe_request(BACKEND, "status", result.is_ok(), start.elapsed().as_secs_f64());
        result
    }
}

/// Map Jackett results onto [`ResultRecord`]. Jackett has no stable id,
/// so ids follow the batch order.
fn normalize_results(results: Vec<JackettResult>) -> Vec<ResultRecord> {
    results
        .into_iter()
        .enumerate()
        .map(|(index, r)| {
            let info_hash = r.info_hash.map(|h| h.to_lowercase());
            let magnet_uri = r
                .magnet_uri
                .filter(|m| !m.is_empty())
                .or_else(|| derive_magnet(info_hash.as_deref(), r.title.as_deref()));

            ResultRecord {
                id: RecordId::Int(index as i64),
                title: r.title,
                tracker: r.tracker,
                category_label: Some(r.category_desc.unwrap_or_else(|| "N/A".to_string())),
                size_bytes: r.size,
                seeder_count: r.seeders,
                peer_count: r.peers,
                publish_date: r.publish_date,
                details_url: r.details.unwrap_or_default(),
                download_url: r.link,
                magnet_uri,
                info_hash,
            }
        })
        .collect()
}

// Jackett API response types
#[derive(Debug, Deserialize)]
struct JackettResponse {
    #[serde(rename = "Results", default)]
    results: Vec<JackettResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JackettResult {
    #[serde(default, deserialize_with = "lenient_string")]
    title: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    tracker: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    category_desc: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    link: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    details: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    magnet_uri: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    info_hash: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    size: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    seeders: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    peers: Option<u64>,
    #[serde(default, deserialize_with = "lenient_string")]
    publish_date: Option<String>,
}
