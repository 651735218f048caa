//! Display formatting for result records.

use serde::Serialize;

use crate::record::{parse_timestamp, ResultRecord};

const SIZE_UNITS: [&str; 9] = ["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Human-readable size using 1024-based units.
///
/// Trailing zeros are dropped: `1536` renders as `"1.5 KB"`.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rendered = format!("{:.*}", decimals, value);
    let rendered = if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.')
    } else {
        rendered.as_str()
    };
    format!("{} {}", rendered, SIZE_UNITS[unit])
}

/// Rough swarm health bucket from the seeder count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeederHealth {
    /// More than 50 seeders.
    Good,
    /// More than 10 seeders.
    Fair,
    Poor,
}

impl SeederHealth {
    pub fn from_count(seeders: u64) -> Self {
        if seeders > 50 {
            SeederHealth::Good
        } else if seeders > 10 {
            SeederHealth::Fair
        } else {
            SeederHealth::Poor
        }
    }
}

/// Publish date as `YYYY-MM-DD`, when it parses.
pub fn format_publish_date(raw: &str) -> Option<String> {
    parse_timestamp(raw).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Pre-rendered display fields for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDisplay {
    pub size: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    pub seeder_health: SeederHealth,
    pub has_magnet: bool,
}

impl RecordDisplay {
    pub fn for_record(record: &ResultRecord) -> Self {
        Self {
            size: record
                .size_bytes
                .map(|b| format_bytes(b, 2))
                .unwrap_or_else(|| "N/A".to_string()),
            published: record.publish_date.as_deref().and_then(format_publish_date),
            seeder_health: SeederHealth::from_count(record.seeder_count.unwrap_or(0)),
            has_magnet: record
                .magnet_uri
                .as_deref()
                .map(|m| !m.is_empty())
                .unwrap_or(false),
        }
    }
}
