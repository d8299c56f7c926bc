// Market-wide statistics over a listing collection.
//
// Mirrors the stats step of the scraping pipeline (count, sold count, mean,
// min/max, median) plus the dashboard's summary card metrics (active
// listings, hot deals, days to sell, per-condition average).

use crate::config::Thresholds;
use crate::market::evaluator::EvaluatedListing;
use crate::market::listing::Listing;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Collection statistics
// ---------------------------------------------------------------------------

/// Price statistics over one listing collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub total_listings: usize,
    pub sold_count: usize,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Upper median: the element at index n/2 of the sorted prices.
    pub median_price: f64,
}

/// Compute price statistics over a collection. Returns `None` for an empty
/// collection rather than inventing zeros.
pub fn compute_market_stats(listings: &[Listing]) -> Option<MarketStats> {
    if listings.is_empty() {
        return None;
    }

    let mut prices: Vec<f64> = listings.iter().map(|l| l.price).collect();
    prices.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let total_listings = listings.len();
    let sold_count = listings.iter().filter(|l| l.status.is_sold()).count();
    let average_price = prices.iter().sum::<f64>() / total_listings as f64;

    Some(MarketStats {
        total_listings,
        sold_count,
        average_price,
        min_price: prices[0],
        max_price: prices[total_listings - 1],
        median_price: prices[total_listings / 2],
    })
}

/// Mean asking price across listings of the given condition, exact string
/// match. `None` when no listing has that condition.
pub fn average_price_by_condition(listings: &[Listing], condition: &str) -> Option<f64> {
    let matching: Vec<f64> = listings
        .iter()
        .filter(|l| l.condition == condition)
        .map(|l| l.price)
        .collect();

    if matching.is_empty() {
        return None;
    }
    Some(matching.iter().sum::<f64>() / matching.len() as f64)
}

// ---------------------------------------------------------------------------
// Dashboard summary metrics
// ---------------------------------------------------------------------------

/// The dashboard's headline numbers, computed from evaluated listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub active_listings: usize,
    pub sold_listings: usize,
    /// Listings at or below the hot-deal deviation (default 15% under
    /// market). Inclusive at the boundary: "15%+ below" counts exactly -15.
    pub hot_deal_count: usize,
    /// Mean days-on-market of sold listings; `None` when nothing has sold.
    pub average_days_to_sell: Option<f64>,
}

/// Compute the summary metrics for a set of evaluated listings.
pub fn compute_market_summary(
    evaluated: &[EvaluatedListing],
    thresholds: &Thresholds,
) -> MarketSummary {
    let active_listings = evaluated
        .iter()
        .filter(|e| !e.listing.status.is_sold())
        .count();
    let sold_listings = evaluated.len() - active_listings;

    let hot_deal_count = hot_deals(evaluated, thresholds).len();

    let sold_days: Vec<f64> = evaluated
        .iter()
        .filter(|e| e.listing.status.is_sold())
        .map(|e| e.listing.days_ago as f64)
        .collect();
    let average_days_to_sell = if sold_days.is_empty() {
        None
    } else {
        Some(sold_days.iter().sum::<f64>() / sold_days.len() as f64)
    };

    MarketSummary {
        active_listings,
        sold_listings,
        hot_deal_count,
        average_days_to_sell,
    }
}

/// Listings at or below the hot-deal deviation, in input order. Status is
/// not consulted; the cut is purely on deviation.
pub fn hot_deals<'a>(
    evaluated: &'a [EvaluatedListing],
    thresholds: &Thresholds,
) -> Vec<&'a EvaluatedListing> {
    evaluated
        .iter()
        .filter(|e| e.deviation_pct <= -thresholds.hot_deal)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
