// Core listing record types.
//
// A `Listing` is a single marketplace offer for a console in a given
// condition, snapshotted from a data source. Listings are immutable inputs
// to the evaluation pipeline; nothing in this crate mutates them.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Listing identifier
// ---------------------------------------------------------------------------

/// Listing identifier. Marketplace exports use numeric ids, scraper exports
/// use opaque item-id strings, so both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingId {
    Num(i64),
    Text(String),
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListingId::Num(n) => write!(f, "{n}"),
            ListingId::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for ListingId {
    fn from(n: i64) -> Self {
        ListingId::Num(n)
    }
}

impl From<&str> for ListingId {
    fn from(s: &str) -> Self {
        ListingId::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Listing status
// ---------------------------------------------------------------------------

/// Whether the offer is still live or already sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Available,
    Sold,
}

impl ListingStatus {
    /// Parse a status cell from a data export. Case-insensitive; returns
    /// `None` for anything outside the recognized set.
    pub fn from_str_status(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" => Some(ListingStatus::Available),
            "sold" => Some(ListingStatus::Sold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Available => "available",
            ListingStatus::Sold => "sold",
        }
    }

    pub fn is_sold(&self) -> bool {
        matches!(self, ListingStatus::Sold)
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Listing record
// ---------------------------------------------------------------------------

/// A single marketplace listing.
///
/// `condition` is an open string set ("Loose", "CIB", "New", ...) because
/// marketplaces keep inventing grading labels; it is matched by exact string
/// equality wherever it matters. `average_price` is the market reference
/// for this console+condition pairing and must be positive for deviation
/// computation to be defined (enforced by the evaluator, not here).
///
/// Serialized field names are camelCase to match the dashboard's data shape;
/// deserialization also accepts the field spellings found in older exports
/// (`avgPrice`, `consoleName`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    #[serde(alias = "consoleName")]
    pub console: String,
    pub condition: String,
    pub price: f64,
    #[serde(alias = "avgPrice")]
    pub average_price: f64,
    pub platform: String,
    pub days_ago: u32,
    pub status: ListingStatus,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
