//! Sort and page state for the ranking engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of records shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// The record fields a result list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SortKey {
    Title,
    CategoryLabel,
    Tracker,
    SizeBytes,
    SeederCount,
    PeerCount,
    PublishDate,
}

impl SortKey {
    /// Every key, in the order sort controls list them.
    pub const ALL: [SortKey; 7] = [
        SortKey::SeederCount,
        SortKey::PeerCount,
        SortKey::SizeBytes,
        SortKey::PublishDate,
        SortKey::Title,
        SortKey::CategoryLabel,
        SortKey::Tracker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::CategoryLabel => "category_label",
            SortKey::Tracker => "tracker",
            SortKey::SizeBytes => "size_bytes",
            SortKey::SeederCount => "seeder_count",
            SortKey::PeerCount => "peer_count",
            SortKey::PublishDate => "publish_date",
        }
    }

    /// Column label for display.
    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Title => "Title",
            SortKey::CategoryLabel => "Category",
            SortKey::Tracker => "Tracker",
            SortKey::SizeBytes => "Size",
            SortKey::SeederCount => "Seeders",
            SortKey::PeerCount => "Peers",
            SortKey::PublishDate => "Date",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown sort key: {0}")]
pub struct ParseSortKeyError(pub String);

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    /// Accepts snake_case names, camelCase names and the column labels
    /// used by aggregator front ends ("Seeders", "CategoryDesc", ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "title" => Ok(SortKey::Title),
            "categorylabel" | "categorydesc" | "category" => Ok(SortKey::CategoryLabel),
            "tracker" | "indexer" => Ok(SortKey::Tracker),
            "sizebytes" | "size" => Ok(SortKey::SizeBytes),
            "seedercount" | "seeders" => Ok(SortKey::SeederCount),
            "peercount" | "peers" | "leechers" => Ok(SortKey::PeerCount),
            "publishdate" | "date" => Ok(SortKey::PublishDate),
            _ => Err(ParseSortKeyError(s.to_string())),
        }
    }
}

impl TryFrom<String> for SortKey {
    type Error = ParseSortKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

impl FromStr for SortDirection {
    type Err = ParseSortKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(ParseSortKeyError(s.to_string())),
        }
    }
}

/// The single active sort: which key, which way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortDirective {
    /// Most-seeded first.
    fn default() -> Self {
        Self {
            key: SortKey::SeederCount,
            direction: SortDirection::Descending,
        }
    }
}

impl SortDirective {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// The directive that results from the user selecting `key`.
    ///
    /// Reselecting the active key while descending switches to ascending.
    /// Anything else (reselecting while ascending, or picking another key)
    /// starts over at descending.
    pub fn toggle(self, key: SortKey) -> Self {
        if key == self.key && self.direction == SortDirection::Descending {
            Self::new(key, SortDirection::Ascending)
        } else {
            Self::new(key, SortDirection::Descending)
        }
    }
}

/// Which page of a ranked list is visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    /// 1-based.
    pub current_page: usize,
    pub page_size: usize,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageState {
    /// First page with the given size. A zero size is bumped to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Same page size, back to page 1.
    pub fn first(self) -> Self {
        Self {
            current_page: 1,
            ..self
        }
    }

    /// Request `page`, clamped to `[1, total_pages]`.
    ///
    /// With no pages at all the result is page 1.
    pub fn navigate(self, page: usize, total_pages: usize) -> Self {
        Self {
            current_page: page.clamp(1, total_pages.max(1)),
            ..self
        }
    }

    /// Pull the current page back into range after the list shrank.
    pub fn clamp_to(self, total_pages: usize) -> Self {
        self.navigate(self.current_page, total_pages)
    }

    /// Index of the first record on this page.
    pub fn offset(&self) -> usize {
        self.current_page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
    }
}
