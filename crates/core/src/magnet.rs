//! Magnet URI helpers.

use serde::{Deserialize, Serialize};

const MAGNET_PREFIX: &str = "magnet:?";
const BTIH_PREFIX: &str = "urn:btih:";

/// The parts of a magnet link a search client cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnetLink {
    /// BitTorrent info hash, lowercased.
    pub info_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub trackers: Vec<String>,
}

impl MagnetLink {
    /// Render back into a magnet URI.
    pub fn to_uri(&self) -> String {
        build_magnet(&self.info_hash, self.display_name.as_deref(), &self.trackers)
    }
}

/// Parse a magnet URI. Returns `None` unless it carries a btih topic.
pub fn parse_magnet(uri: &str) -> Option<MagnetLink> {
    let params = uri.trim().strip_prefix(MAGNET_PREFIX)?;

    let mut info_hash = None;
    let mut display_name = None;
    let mut trackers = Vec::new();

    for param in params.split('&') {
        let (key, value) = match param.split_once('=') {
            Some(pair) => pair,
            None => continue,
        };
        match key {
            "xt" if info_hash.is_none() => {
                if let Some(hash) = value.strip_prefix(BTIH_PREFIX) {
                    if !hash.is_empty() {
                        info_hash = Some(hash.to_lowercase());
                    }
                }
            }
            "dn" => display_name = Some(decode_component(value)),
            "tr" => trackers.push(decode_component(value)),
            _ => {}
        }
    }

    Some(MagnetLink {
        info_hash: info_hash?,
        display_name,
        trackers,
    })
}

/// Extract the info hash from a magnet URI.
pub fn extract_info_hash(uri: &str) -> Option<String> {
    parse_magnet(uri).map(|m| m.info_hash)
}

/// Build a magnet URI from an info hash and optional name and trackers.
pub fn build_magnet(info_hash: &str, display_name: Option<&str>, trackers: &[String]) -> String {
    let mut uri = format!("{}xt={}{}", MAGNET_PREFIX, BTIH_PREFIX, info_hash.to_lowercase());
    if let Some(name) = display_name.filter(|n| !n.is_empty()) {
        uri.push_str("&dn=");
        uri.push_str(&urlencoding::encode(name));
    }
    for tracker in trackers {
        uri.push_str("&tr=");
        uri.push_str(&urlencoding::encode(tracker));
    }
    uri
}

/// Whether `hash` looks like a v1 info hash: 40 hex or 32 base32 chars.
pub fn is_valid_info_hash(hash: &str) -> bool {
    match hash.len() {
        40 => hash.chars().all(|c| c.is_ascii_hexdigit()),
        32 => hash
            .chars()
            .all(|c| c.is_ascii_alphabetic() || ('2'..='7').contains(&c)),
        _ => false,
    }
}

/// Derive a magnet URI for a record that only carries an info hash.
pub(crate) fn derive_magnet(info_hash: Option<&str>, title: Option<&str>) -> Option<String> {
    info_hash
        .filter(|h| is_valid_info_hash(h))
        .map(|h| build_magnet(h, title, &[]))
}

fn decode_component(value: &str) -> String {
    // Form-encoded spaces show up in the wild
    let value = value.replace('+', " ");
    urlencoding::decode(&value)
        .map(|s| s.into_owned())
        .unwrap_or(value)
}
