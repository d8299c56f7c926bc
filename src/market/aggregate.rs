// Per-console aggregation of listing collections.
//
// Groups listings by exact console name and attaches externally supplied
// market metrics (price trend, sell velocity). Trend and velocity come from
// an upstream pipeline with historical transaction data; this crate only
// passes them through and never computes them.

use crate::market::listing::Listing;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// External console metrics
// ---------------------------------------------------------------------------

/// Per-console market data supplied by an external source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleMetrics {
    pub console: String,
    /// Market average price across tracked sales.
    #[serde(alias = "avgPrice")]
    pub average_price: f64,
    /// Number of live listings market-wide (not just in a local snapshot).
    #[serde(alias = "listings")]
    pub listing_count: u32,
    /// Price trend over the tracking window, percent.
    #[serde(alias = "trend")]
    pub trend_pct: f64,
    /// Average sales per day.
    #[serde(alias = "velocity")]
    pub sell_velocity: f64,
}

/// Look up the metrics entry for a console by exact name.
pub fn metrics_for_console<'a>(
    metrics: &'a [ConsoleMetrics],
    console: &str,
) -> Option<&'a ConsoleMetrics> {
    metrics.iter().find(|m| m.console == console)
}

// ---------------------------------------------------------------------------
// Platform share
// ---------------------------------------------------------------------------

/// A marketplace's share of tracked market activity, percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformShare {
    pub platform: String,
    #[serde(alias = "share")]
    pub share_pct: f64,
}

// ---------------------------------------------------------------------------
// Console summary
// ---------------------------------------------------------------------------

/// Summary of one console's listings within a collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleSummary {
    pub console: String,
    /// Listings for this console in the input collection.
    pub count: usize,
    /// Arithmetic mean of their asking prices.
    pub mean_price: f64,
    /// Externally supplied trend, when the metrics table has this console.
    pub trend_pct: Option<f64>,
    /// Externally supplied sell velocity, likewise.
    pub sell_velocity: Option<f64>,
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Group listings by console name and summarize each group.
///
/// Grouping key is exact string equality; no trimming or fuzzy matching.
/// Group order follows the first occurrence of each console name in the
/// input, so repeated calls over the same collection are deterministic.
pub fn aggregate_by_console(
    listings: &[Listing],
    metrics: &[ConsoleMetrics],
) -> Vec<ConsoleSummary> {
    // (console, count, price sum), in first-occurrence order.
    let mut groups: Vec<(String, usize, f64)> = Vec::new();

    for listing in listings {
        match groups.iter_mut().find(|(name, _, _)| *name == listing.console) {
            Some((_, count, sum)) => {
                *count += 1;
                *sum += listing.price;
            }
            None => groups.push((listing.console.clone(), 1, listing.price)),
        }
    }

    groups
        .into_iter()
        .map(|(console, count, sum)| {
            let external = metrics_for_console(metrics, &console);
            ConsoleSummary {
                mean_price: sum / count as f64,
                trend_pct: external.map(|m| m.trend_pct),
                sell_velocity: external.map(|m| m.sell_velocity),
                console,
                count,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::listing::{ListingId, ListingStatus};

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_listing(id: i64, console: &str, price: f64) -> Listing {
        Listing {
            id: ListingId::Num(id),
            console: console.into(),
            condition: "Loose".into(),
            price,
            average_price: price,
            platform: "eBay".into(),
            days_ago: 1,
            status: ListingStatus::Available,
        }
    }

    fn make_metrics(console: &str, trend_pct: f64, sell_velocity: f64) -> ConsoleMetrics {
        ConsoleMetrics {
            console: console.into(),
            average_price: 80.0,
            listing_count: 100,
            trend_pct,
            sell_velocity,
        }
    }

    #[test]
    fn two_gamecube_listings_form_one_group() {
        let listings = vec![
            make_listing(1, "GameCube", 82.0),
            make_listing(2, "GameCube", 88.0),
        ];

        let summaries = aggregate_by_console(&listings, &[]);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].console, "GameCube");
        assert_eq!(summaries[0].count, 2);
        assert!(approx_eq(summaries[0].mean_price, 85.0, 1e-12));
    }

    #[test]
    fn groups_follow_first_occurrence_order() {
        let listings = vec![
            make_listing(1, "Nintendo 64", 75.0),
            make_listing(2, "PlayStation 1", 95.0),
            make_listing(3, "Nintendo 64", 180.0),
            make_listing(4, "GameCube", 82.0),
            make_listing(5, "PlayStation 1", 60.0),
        ];

        let summaries = aggregate_by_console(&listings, &[]);
        let order: Vec<&str> = summaries.iter().map(|s| s.console.as_str()).collect();
        assert_eq!(order, vec!["Nintendo 64", "PlayStation 1", "GameCube"]);
    }

    #[test]
    fn mean_price_per_group() {
        let listings = vec![
            make_listing(1, "Nintendo 64", 75.0),
            make_listing(2, "Nintendo 64", 180.0),
            make_listing(3, "GameCube", 82.0),
        ];

        let summaries = aggregate_by_console(&listings, &[]);
        // (75 + 180) / 2 = 127.5
        assert!(approx_eq(summaries[0].mean_price, 127.5, 1e-12));
        assert_eq!(summaries[0].count, 2);
        // Single listing: mean is its price.
        assert!(approx_eq(summaries[1].mean_price, 82.0, 1e-12));
        assert_eq!(summaries[1].count, 1);
    }

    #[test]
    fn external_metrics_passed_through_when_present() {
        let listings = vec![
            make_listing(1, "Nintendo 64", 75.0),
            make_listing(2, "GameCube", 82.0),
        ];
        let metrics = vec![make_metrics("Nintendo 64", 8.2, 4.5)];

        let summaries = aggregate_by_console(&listings, &metrics);

        assert_eq!(summaries[0].trend_pct, Some(8.2));
        assert_eq!(summaries[0].sell_velocity, Some(4.5));
        // No metrics row for GameCube: explicitly absent, never computed.
        assert_eq!(summaries[1].trend_pct, None);
        assert_eq!(summaries[1].sell_velocity, None);
    }

    #[test]
    fn grouping_is_exact_string_match() {
        let listings = vec![
            make_listing(1, "GameCube", 82.0),
            make_listing(2, "Gamecube", 88.0),
            make_listing(3, "GameCube ", 90.0),
        ];

        let summaries = aggregate_by_console(&listings, &[]);
        assert_eq!(summaries.len(), 3);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        let summaries = aggregate_by_console(&[], &[]);
        assert!(summaries.is_empty());
    }

    #[test]
    fn metrics_lookup_is_exact() {
        let metrics = vec![make_metrics("Nintendo 64", 8.2, 4.5)];
        assert!(metrics_for_console(&metrics, "Nintendo 64").is_some());
        assert!(metrics_for_console(&metrics, "nintendo 64").is_none());
        assert!(metrics_for_console(&metrics, "N64").is_none());
    }

    #[test]
    fn console_metrics_deserializes_dashboard_shape() {
        let json = r#"{
            "console": "Super Nintendo",
            "avgPrice": 118,
            "listings": 87,
            "trend": 12.5,
            "velocity": 6.1
        }"#;

        let metrics: ConsoleMetrics = serde_json::from_str(json).unwrap();
        assert_eq!(metrics.console, "Super Nintendo");
        assert!(approx_eq(metrics.average_price, 118.0, 1e-12));
        assert_eq!(metrics.listing_count, 87);
        assert!(approx_eq(metrics.trend_pct, 12.5, 1e-12));
        assert!(approx_eq(metrics.sell_velocity, 6.1, 1e-12));
    }
}
