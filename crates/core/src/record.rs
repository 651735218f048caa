//! The uniform search result record produced by every searcher backend.
//!
//! Aggregators disagree on field names and are not always careful about
//! field types. Records are therefore deserialized leniently: a value of
//! the wrong shape (a string where a count is expected, a negative size,
//! an object where a title should be) becomes `None` instead of failing
//! the whole batch. Ranking treats `None` as "missing".

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Identifier of a record, unique within one fetched batch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Str(String),
}

impl RecordId {
    /// Whether this id matches a raw identifier taken from a URL path.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            RecordId::Int(n) => raw.parse::<i64>().map(|r| r == *n).unwrap_or(false),
            RecordId::Str(s) => s == raw,
        }
    }
}

impl Default for RecordId {
    fn default() -> Self {
        RecordId::Int(0)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(n) => write!(f, "{}", n),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Int(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Str(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Str(s)
    }
}

/// One discovered torrent, normalized from an aggregator response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    #[serde(default)]
    pub id: RecordId,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
    /// Source indexer name.
    #[serde(default, deserialize_with = "lenient_string")]
    pub tracker: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category_label: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub seeder_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub peer_count: Option<u64>,
    /// Raw timestamp as reported by the aggregator. May not parse.
    #[serde(default, deserialize_with = "lenient_string")]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub details_url: String,
    /// Direct `.torrent` download link, when the aggregator exposes one.
    #[serde(default, deserialize_with = "lenient_string")]
    pub download_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub magnet_uri: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub info_hash: Option<String>,
}

impl ResultRecord {
    /// Create a record with a numeric id and a title.
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id: RecordId::Int(id),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }

    pub fn with_tracker(mut self, tracker: impl Into<String>) -> Self {
        self.tracker = Some(tracker.into());
        self
    }

    pub fn with_category(mut self, label: impl Into<String>) -> Self {
        self.category_label = Some(label.into());
        self
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    pub fn with_seeders(mut self, seeders: u64) -> Self {
        self.seeder_count = Some(seeders);
        self
    }

    pub fn with_peers(mut self, peers: u64) -> Self {
        self.peer_count = Some(peers);
        self
    }

    pub fn with_publish_date(mut self, date: impl Into<String>) -> Self {
        self.publish_date = Some(date.into());
        self
    }

    pub fn with_magnet(mut self, magnet_uri: impl Into<String>) -> Self {
        self.magnet_uri = Some(magnet_uri.into());
        self
    }

    pub fn with_info_hash(mut self, info_hash: impl Into<String>) -> Self {
        self.info_hash = Some(info_hash.into());
        self
    }

    /// The publish date as an instant, if present and parseable.
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        self.publish_date.as_deref().and_then(parse_timestamp)
    }
}

/// Parse the timestamp formats aggregators are known to emit.
///
/// Returns `None` for anything unrecognized; callers treat that as a
/// missing date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            // Jackett emits local times without an offset
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|ndt| ndt.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|ndt| ndt.and_utc())
        })
}

/// Any JSON shape, captured just enough to tell numbers from strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
    Other(serde::de::IgnoredAny),
}

pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Unsigned(n) => Some(n),
        LooseValue::Float(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Some(f as u64),
        LooseValue::Signed(_)
        | LooseValue::Float(_)
        | LooseValue::Text(_)
        | LooseValue::Other(_) => None,
    })
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Text(s) => Some(s),
        _ => None,
    })
}

pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<Option<RecordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseValue::deserialize(deserializer)? {
        LooseValue::Unsigned(n) => i64::try_from(n).ok().map(RecordId::Int),
        LooseValue::Signed(n) => Some(RecordId::Int(n)),
        LooseValue::Text(s) => Some(RecordId::Str(s)),
        LooseValue::Float(_) | LooseValue::Other(_) => None,
    })
}

/// Resolve the ids of one batch so that no two records share an id.
///
/// The first record carrying an id keeps it. Records without an id, or
/// repeating one already taken, get the smallest free integer. Ids are
/// compared in their URL form, so `7` and `"7"` collide.
pub(crate) fn unique_batch_ids(ids: Vec<Option<RecordId>>) -> Vec<RecordId> {
    let mut taken: HashSet<String> = HashSet::with_capacity(ids.len());
    let kept: Vec<Option<RecordId>> = ids
        .into_iter()
        .map(|id| id.filter(|id| taken.insert(id.to_string())))
        .collect();

    let mut next_free: i64 = 0;
    kept.into_iter()
        .map(|id| {
            id.unwrap_or_else(|| {
                while taken.contains(&next_free.to_string()) {
                    next_free += 1;
                }
                taken.insert(next_free.to_string());
                RecordId::Int(next_free)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_unique_batch_ids_missing_next_to_real_zero() {
        let ids = unique_batch_ids(vec![None, Some(RecordId::Int(0))]);
        assert_eq!(ids, vec![RecordId::Int(1), RecordId::Int(0)]);
    }

    #[test]
    fn test_unique_batch_ids_repeated() {
        let ids = unique_batch_ids(vec![
            Some(RecordId::Int(3)),
            Some(RecordId::Int(3)),
            Some(RecordId::Str("0".to_string())),
            None,
        ]);
        assert_eq!(
            ids,
            vec![
                RecordId::Int(3),
                RecordId::Int(1),
                RecordId::Str("0".to_string()),
                RecordId::Int(2),
            ]
        );
    }

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{
            "id": 42,
            "title": "Ubuntu 24.04 Desktop",
            "tracker": "LinuxTracker",
            "category_label": "PC/ISO",
            "size_bytes": 6000000000,
            "seeder_count": 120,
            "peer_count": 8,
            "publish_date": "2024-04-25T10:00:00Z",
            "details_url": "https://example.org/t/42",
            "magnet_uri": "magnet:?xt=urn:btih:abc",
            "info_hash": "abc"
        }"#;
        let record: ResultRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, RecordId::Int(42));
        assert_eq!(record.seeder_count, Some(120));
        assert_eq!(record.size_bytes, Some(6_000_000_000));
        assert!(record.download_url.is_none());
    }

    #[test]
    fn test_wrong_typed_fields_become_missing() {
        let json = r#"{
            "id": "x-1",
            "title": 17,
            "seeder_count": "lots",
            "peer_count": -3,
            "size_bytes": null,
            "publish_date": {"when": "yesterday"}
        }"#;
        let record: ResultRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, RecordId::Str("x-1".to_string()));
        assert!(record.title.is_none());
        assert!(record.seeder_count.is_none());
        assert!(record.peer_count.is_none());
        assert!(record.size_bytes.is_none());
        assert!(record.publish_date.is_none());
        assert_eq!(record.details_url, "");
    }

    #[test]
    fn test_whole_float_counts_are_accepted() {
        let record: ResultRecord =
            serde_json::from_str(r#"{"id": 1, "seeder_count": 12.0, "peer_count": 1.5}"#)
                .unwrap();
        assert_eq!(record.seeder_count, Some(12));
        assert!(record.peer_count.is_none());
    }

    #[test]
    fn test_record_id_matches() {
        assert!(RecordId::Int(7).matches("7"));
        assert!(!RecordId::Int(7).matches("seven"));
        assert!(RecordId::from("abc").matches("abc"));
        assert_eq!(RecordId::Int(7).to_string(), "7");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let rfc3339 = parse_timestamp("2024-06-15T10:30:00+02:00").unwrap();
        assert_eq!(rfc3339.day(), 15);

        assert!(parse_timestamp("2024-06-15T10:30:00").is_some());
        assert!(parse_timestamp("2024-06-15T10:30:00.123").is_some());
        assert!(parse_timestamp("Sat, 15 Jun 2024 10:30:00 +0000").is_some());
        assert!(parse_timestamp("2024-06-15").is_some());
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("not a date").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }
}
