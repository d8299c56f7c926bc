// Market CSV loading and normalization.
//
// Reads dashboard-export CSV files: listings, per-console metrics, platform
// share, and monthly price history. Headers accept both the snake_case
// spellings and the dashboard's camelCase ones. Rows that cannot be
// normalized are skipped with a warning rather than failing the whole load.

use crate::config::{Config, DataPaths};
use crate::market::aggregate::{ConsoleMetrics, PlatformShare};
use crate::market::history::PricePoint;
use crate::market::listing::{Listing, ListingId, ListingStatus};
use crate::source::{MarketDataSource, SourceError};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// All market data loaded and ready for evaluation.
#[derive(Debug, Clone)]
pub struct MarketData {
    pub listings: Vec<Listing>,
    pub console_metrics: Vec<ConsoleMetrics>,
    pub market_share: Vec<PlatformShare>,
    /// Monthly price history keyed by console name, sorted chronologically.
    pub price_history: HashMap<String, Vec<PricePoint>>,
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

/// One listing row. The id column holds either a numeric id or an opaque
/// marketplace id string. Extra columns are silently ignored via
/// `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawListingRow {
    id: ListingId,
    #[serde(alias = "consoleName")]
    console: String,
    condition: String,
    price: f64,
    #[serde(alias = "avgPrice", alias = "averagePrice")]
    avg_price: f64,
    platform: String,
    #[serde(alias = "daysAgo")]
    days_ago: u32,
    status: String,
    /// Absorb any extra columns the export includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

/// One per-console metrics row, matching the dashboard's summary table.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawConsoleRow {
    #[serde(alias = "consoleName")]
    console: String,
    #[serde(alias = "avgPrice")]
    avg_price: f64,
    #[serde(alias = "listings")]
    listing_count: u32,
    #[serde(alias = "trend")]
    trend_pct: f64,
    #[serde(alias = "velocity")]
    sell_velocity: f64,
    /// Absorb any extra columns the export includes.
    #[serde(flatten)]
    _extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawShareRow {
    #[serde(alias = "name")]
    platform: String,
    #[serde(alias = "share", alias = "value")]
    share_pct: f64,
}

#[derive(Debug, Deserialize)]
struct RawHistoryRow {
    #[serde(alias = "consoleName")]
    console: String,
    #[serde(alias = "date")]
    month: String,
    #[serde(alias = "price", alias = "avgPrice")]
    avg_price: f64,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Returns true if all given f64 values are finite (not NaN or Infinity).
fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Trim a text id and promote it to a numeric id when it parses as one.
fn normalize_id(id: ListingId) -> ListingId {
    match id {
        ListingId::Text(s) => {
            let trimmed = s.trim();
            match trimmed.parse::<i64>() {
                Ok(n) => ListingId::Num(n),
                Err(_) => ListingId::Text(trimmed.to_string()),
            }
        }
        num => num,
    }
}

/// Parse a history month. Accepts both `2024-03` and full `2024-03-01`
/// dates; anything else is rejected.
fn parse_month(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    let (year, month) = s.split_once('-')?;
    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn load_listings_from_reader<R: Read>(rdr: R) -> Result<Vec<Listing>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut listings = Vec::new();
    for result in reader.deserialize::<RawListingRow>() {
        match result {
            Ok(raw) => {
                let id = normalize_id(raw.id);
                if !all_finite(&[raw.price, raw.avg_price]) {
                    warn!("skipping listing {id}: non-finite price value");
                    continue;
                }
                if raw.price < 0.0 {
                    warn!("skipping listing {id}: negative price {}", raw.price);
                    continue;
                }
                if raw.console.trim().is_empty() {
                    warn!("skipping listing {id}: empty console name");
                    continue;
                }
                let status = match ListingStatus::from_str_status(&raw.status) {
                    Some(status) => status,
                    None => {
                        warn!("skipping listing {id}: unknown status '{}'", raw.status);
                        continue;
                    }
                };
                // A zero or negative reference price passes through: the
                // evaluator owns that rule and reports it per listing.
                listings.push(Listing {
                    id,
                    console: raw.console.trim().to_string(),
                    condition: raw.condition.trim().to_string(),
                    price: raw.price,
                    average_price: raw.avg_price,
                    platform: raw.platform.trim().to_string(),
                    days_ago: raw.days_ago,
                    status,
                });
            }
            Err(e) => {
                warn!("skipping malformed listing row: {}", e);
            }
        }
    }
    Ok(listings)
}

fn load_console_metrics_from_reader<R: Read>(rdr: R) -> Result<Vec<ConsoleMetrics>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut metrics = Vec::new();
    for result in reader.deserialize::<RawConsoleRow>() {
        match result {
            Ok(raw) => {
                if !all_finite(&[raw.avg_price, raw.trend_pct, raw.sell_velocity]) {
                    warn!(
                        "skipping console metrics '{}': non-finite value",
                        raw.console.trim()
                    );
                    continue;
                }
                if raw.console.trim().is_empty() {
                    warn!("skipping console metrics row: empty console name");
                    continue;
                }
                metrics.push(ConsoleMetrics {
                    console: raw.console.trim().to_string(),
                    average_price: raw.avg_price,
                    listing_count: raw.listing_count,
                    trend_pct: raw.trend_pct,
                    sell_velocity: raw.sell_velocity,
                });
            }
            Err(e) => {
                warn!("skipping malformed console metrics row: {}", e);
            }
        }
    }
    Ok(metrics)
}

fn load_market_share_from_reader<R: Read>(rdr: R) -> Result<Vec<PlatformShare>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut shares = Vec::new();
    for result in reader.deserialize::<RawShareRow>() {
        match result {
            Ok(raw) => {
                if !raw.share_pct.is_finite() {
                    warn!(
                        "skipping market share '{}': non-finite value",
                        raw.platform.trim()
                    );
                    continue;
                }
                shares.push(PlatformShare {
                    platform: raw.platform.trim().to_string(),
                    share_pct: raw.share_pct,
                });
            }
            Err(e) => {
                warn!("skipping malformed market share row: {}", e);
            }
        }
    }
    Ok(shares)
}

fn load_price_history_from_reader<R: Read>(
    rdr: R,
) -> Result<HashMap<String, Vec<PricePoint>>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut history: HashMap<String, Vec<PricePoint>> = HashMap::new();
    for result in reader.deserialize::<RawHistoryRow>() {
        match result {
            Ok(raw) => {
                let console = raw.console.trim().to_string();
                if console.is_empty() {
                    warn!("skipping price history row: empty console name");
                    continue;
                }
                if !raw.avg_price.is_finite() {
                    warn!("skipping price history for '{}': non-finite value", console);
                    continue;
                }
                let month = match parse_month(&raw.month) {
                    Some(month) => month,
                    None => {
                        warn!(
                            "skipping price history for '{}': unparseable month '{}'",
                            console, raw.month
                        );
                        continue;
                    }
                };
                history.entry(console).or_default().push(PricePoint {
                    month,
                    average_price: raw.avg_price,
                });
            }
            Err(e) => {
                warn!("skipping malformed price history row: {}", e);
            }
        }
    }
    for points in history.values_mut() {
        points.sort_by(|a, b| a.month.cmp(&b.month));
    }
    Ok(history)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load listings from a CSV file.
pub fn load_listings(path: &Path) -> Result<Vec<Listing>, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_listings_from_reader(file).map_err(|e| SourceError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load the per-console metrics table from a CSV file.
pub fn load_console_metrics(path: &Path) -> Result<Vec<ConsoleMetrics>, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_console_metrics_from_reader(file).map_err(|e| SourceError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load marketplace share from a CSV file.
pub fn load_market_share(path: &Path) -> Result<Vec<PlatformShare>, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_market_share_from_reader(file).map_err(|e| SourceError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load monthly price history from a CSV file. Returns a map of console
/// name to chronologically sorted price points.
pub fn load_price_history(path: &Path) -> Result<HashMap<String, Vec<PricePoint>>, SourceError> {
    let file = std::fs::File::open(path).map_err(|e| SourceError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_price_history_from_reader(file).map_err(|e| SourceError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

/// Load all market data using paths from the config and return the combined
/// `MarketData`.
pub fn load_market(config: &Config) -> Result<MarketData, SourceError> {
    load_market_from_paths(&config.data_paths)
}

/// Load all market data from explicit paths. Exposed for testing and flexibility.
pub fn load_market_from_paths(paths: &DataPaths) -> Result<MarketData, SourceError> {
    let listings = load_listings(Path::new(&paths.listings))?;
    let console_metrics = load_console_metrics(Path::new(&paths.console_metrics))?;
    let market_share = load_market_share(Path::new(&paths.market_share))?;
    let price_history = load_price_history(Path::new(&paths.price_history))?;

    if listings.is_empty() {
        return Err(SourceError::Validation(
            "listings CSV produced zero valid rows".into(),
        ));
    }

    Ok(MarketData {
        listings,
        console_metrics,
        market_share,
        price_history,
    })
}

// ---------------------------------------------------------------------------
// CSV-backed provider
// ---------------------------------------------------------------------------

/// A `MarketDataSource` backed by CSV exports, loaded eagerly at
/// construction so later accessor calls cannot fail on I/O.
#[derive(Debug, Clone)]
pub struct CsvMarket {
    data: MarketData,
}

impl CsvMarket {
    pub fn load(paths: &DataPaths) -> Result<Self, SourceError> {
        Ok(CsvMarket {
            data: load_market_from_paths(paths)?,
        })
    }

    pub fn data(&self) -> &MarketData {
        &self.data
    }
}

impl MarketDataSource for CsvMarket {
    fn listings(&self) -> Result<Vec<Listing>, SourceError> {
        Ok(self.data.listings.clone())
    }

    fn console_metrics(&self) -> Result<Vec<ConsoleMetrics>, SourceError> {
        Ok(self.data.console_metrics.clone())
    }

    fn market_share(&self) -> Result<Vec<PlatformShare>, SourceError> {
        Ok(self.data.market_share.clone())
    }

    fn price_history(&self, console: &str) -> Result<Vec<PricePoint>, SourceError> {
        Ok(self
            .data
            .price_history
            .get(console)
            .cloned()
            .unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
