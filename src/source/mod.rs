// Market data sources.
//
// The evaluation core is fed by pluggable providers: the dashboard's
// built-in sample dataset, or CSV exports from a scraping pipeline.

pub mod ingest;
pub mod sample;

use crate::market::aggregate::{ConsoleMetrics, PlatformShare};
use crate::market::history::PricePoint;
use crate::market::listing::Listing;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// A provider of market data for the evaluation core.
///
/// Every method returns freshly allocated data; providers hold immutable
/// snapshots and callers own what they get back.
pub trait MarketDataSource {
    /// The current listing collection.
    fn listings(&self) -> Result<Vec<Listing>, SourceError>;

    /// Externally computed per-console metrics (trend, velocity).
    fn console_metrics(&self) -> Result<Vec<ConsoleMetrics>, SourceError>;

    /// Marketplace share of tracked activity.
    fn market_share(&self) -> Result<Vec<PlatformShare>, SourceError>;

    /// Monthly average-price history for one console, chronological order,
    /// exact name match. Unknown consoles yield an empty series.
    fn price_history(&self, console: &str) -> Result<Vec<PricePoint>, SourceError>;
}
