// Listing evaluation: price deviation and deal classification.
//
// The evaluator derives, per listing, the percentage deviation of the asking
// price from the market average and buckets it as a deal, overpriced, or
// neutral relative to configured thresholds. Derived values are computed once
// into an `EvaluatedListing` that carries its listing snapshot, so repeated
// filtering never recomputes and a stale classification can never be paired
// with a different listing.

use crate::config::Thresholds;
use crate::market::listing::{Listing, ListingId};
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("invalid reference price {average_price} for listing {listing_id}: must be finite and > 0")]
    InvalidReferencePrice {
        listing_id: ListingId,
        average_price: f64,
    },

    #[error("invalid filter selector `{value}`: expected one of all, deals, overpriced, neutral")]
    InvalidFilterSelector { value: String },
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Price bucket for a listing relative to its market average.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Deviation below the deal threshold: priced meaningfully under market.
    Deal,
    /// Deviation above the overpriced threshold: priced meaningfully over.
    Overpriced,
    /// Everything in between, boundary values included.
    Neutral,
}

impl Classification {
    /// Return a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Classification::Deal => "DEAL",
            Classification::Overpriced => "OVERPRICED",
            Classification::Neutral => "NEUTRAL",
        }
    }
}

// ---------------------------------------------------------------------------
// Filter selection
// ---------------------------------------------------------------------------

/// Which classification bucket a filtered view should contain.
///
/// `All`, `DealsOnly`, and `OverpricedOnly` are the selectors the dashboard
/// control exposes; `NeutralOnly` completes the set so the three single-bucket
/// selectors partition any input exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSelection {
    All,
    DealsOnly,
    OverpricedOnly,
    NeutralOnly,
}

impl FilterSelection {
    /// Parse a selector value from a UI control or config file.
    /// Case-insensitive. Unrecognized values are an error rather than a
    /// silent fallback to `All`.
    pub fn from_str_filter(s: &str) -> Result<Self, EvaluationError> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(FilterSelection::All),
            "deals" => Ok(FilterSelection::DealsOnly),
            "overpriced" => Ok(FilterSelection::OverpricedOnly),
            "neutral" => Ok(FilterSelection::NeutralOnly),
            _ => Err(EvaluationError::InvalidFilterSelector {
                value: s.to_string(),
            }),
        }
    }

    /// Return the display label used by the dashboard control.
    pub fn display_str(&self) -> &'static str {
        match self {
            FilterSelection::All => "All Listings",
            FilterSelection::DealsOnly => "Deals Only",
            FilterSelection::OverpricedOnly => "Overpriced Only",
            FilterSelection::NeutralOnly => "Neutral Only",
        }
    }

    /// Whether a listing with the given classification belongs in this view.
    pub fn matches(&self, classification: Classification) -> bool {
        match self {
            FilterSelection::All => true,
            FilterSelection::DealsOnly => classification == Classification::Deal,
            FilterSelection::OverpricedOnly => classification == Classification::Overpriced,
            FilterSelection::NeutralOnly => classification == Classification::Neutral,
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluated listing
// ---------------------------------------------------------------------------

/// A listing together with its derived price analysis.
///
/// Derived fields are never persisted or deserialized; they exist only in
/// these freshly computed records. Serialization is provided for handing
/// results to a display layer, which applies its own rounding (one decimal).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluatedListing {
    #[serde(flatten)]
    pub listing: Listing,
    /// Percentage deviation from the market average, unrounded.
    pub deviation_pct: f64,
    pub classification: Classification,
}

impl EvaluatedListing {
    /// Absolute dollars below market (negative when priced above market).
    pub fn savings(&self) -> f64 {
        self.listing.average_price - self.listing.price
    }
}

// ---------------------------------------------------------------------------
// Core computation
// ---------------------------------------------------------------------------

/// Percentage deviation of the asking price from the market average:
/// `(price - average_price) / average_price * 100`, unrounded.
///
/// A zero, negative, or non-finite average price has no defined deviation
/// and is rejected with `InvalidReferencePrice` naming the listing.
pub fn compute_deviation(listing: &Listing) -> Result<f64, EvaluationError> {
    let avg = listing.average_price;
    if !avg.is_finite() || avg <= 0.0 {
        return Err(EvaluationError::InvalidReferencePrice {
            listing_id: listing.id.clone(),
            average_price: avg,
        });
    }
    Ok((listing.price - avg) / avg * 100.0)
}

/// Bucket a deviation percentage against the configured thresholds.
///
/// Comparisons are strict: a deviation sitting exactly on either threshold
/// classifies as `Neutral`.
pub fn classify(deviation_pct: f64, thresholds: &Thresholds) -> Classification {
    if deviation_pct < thresholds.deal {
        Classification::Deal
    } else if deviation_pct > thresholds.overpriced {
        Classification::Overpriced
    } else {
        Classification::Neutral
    }
}

/// Evaluate a single listing: deviation plus classification.
pub fn evaluate_listing(
    listing: &Listing,
    thresholds: &Thresholds,
) -> Result<EvaluatedListing, EvaluationError> {
    let deviation_pct = compute_deviation(listing)?;
    let classification = classify(deviation_pct, thresholds);
    Ok(EvaluatedListing {
        listing: listing.clone(),
        deviation_pct,
        classification,
    })
}

/// Evaluate a collection of listings, preserving input order.
///
/// The first invalid reference price aborts the whole evaluation; partial
/// results are never returned for malformed input.
pub fn evaluate_listings(
    listings: &[Listing],
    thresholds: &Thresholds,
) -> Result<Vec<EvaluatedListing>, EvaluationError> {
    listings
        .iter()
        .map(|listing| evaluate_listing(listing, thresholds))
        .collect()
}

/// Project the evaluated listings matching `filter`, preserving relative
/// order. Pure: the input is untouched and the output freshly allocated.
pub fn filter_by_classification(
    evaluated: &[EvaluatedListing],
    filter: FilterSelection,
) -> Vec<EvaluatedListing> {
    evaluated
        .iter()
        .filter(|e| filter.matches(e.classification))
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::listing::ListingStatus;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn make_listing(id: i64, console: &str, price: f64, average_price: f64) -> Listing {
        Listing {
            id: ListingId::Num(id),
            console: console.into(),
            condition: "Loose".into(),
            price,
            average_price,
            platform: "eBay".into(),
            days_ago: 2,
            status: ListingStatus::Available,
        }
    }

    // -- Deviation math --

    #[test]
    fn deviation_known_values() {
        // (75 - 82) / 82 * 100 = -8.5366
        let dev = compute_deviation(&make_listing(1, "Nintendo 64", 75.0, 82.0)).unwrap();
        assert!(approx_eq(dev, -8.5366, 0.001));

        // (75 - 90) / 90 * 100 = -16.6667
        let dev = compute_deviation(&make_listing(2, "Nintendo 64", 75.0, 90.0)).unwrap();
        assert!(approx_eq(dev, -16.6667, 0.001));

        // (95 - 110) / 110 * 100 = -13.6364
        let dev = compute_deviation(&make_listing(3, "PlayStation 1", 95.0, 110.0)).unwrap();
        assert!(approx_eq(dev, -13.6364, 0.001));

        // At-market listing deviates by zero.
        let dev = compute_deviation(&make_listing(4, "GameCube", 88.0, 88.0)).unwrap();
        assert!(approx_eq(dev, 0.0, 1e-12));

        // Free listing: 100% below market.
        let dev = compute_deviation(&make_listing(5, "GameCube", 0.0, 88.0)).unwrap();
        assert!(approx_eq(dev, -100.0, 1e-12));
    }

    #[test]
    fn deviation_is_unrounded() {
        let dev = compute_deviation(&make_listing(1, "Nintendo 64", 75.0, 82.0)).unwrap();
        // Full precision, not the display value -8.5.
        assert!(approx_eq(dev, -8.536585365853659, 1e-12));
    }

    #[test]
    fn deviation_rejects_zero_average() {
        let err = compute_deviation(&make_listing(7, "Nintendo 64", 75.0, 0.0)).unwrap_err();
        match err {
            EvaluationError::InvalidReferencePrice {
                listing_id,
                average_price,
            } => {
                assert_eq!(listing_id, ListingId::Num(7));
                assert_eq!(average_price, 0.0);
            }
            other => panic!("expected InvalidReferencePrice, got: {other}"),
        }
    }

    #[test]
    fn deviation_rejects_negative_average() {
        let err = compute_deviation(&make_listing(1, "Nintendo 64", 75.0, -5.0)).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::InvalidReferencePrice { .. }
        ));
    }

    #[test]
    fn deviation_rejects_non_finite_average() {
        // A NaN average slips past a plain `<= 0` check; it must still be
        // rejected rather than producing a NaN deviation.
        let err = compute_deviation(&make_listing(1, "Nintendo 64", 75.0, f64::NAN)).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::InvalidReferencePrice { .. }
        ));

        let err =
            compute_deviation(&make_listing(1, "Nintendo 64", 75.0, f64::INFINITY)).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::InvalidReferencePrice { .. }
        ));
    }

    // -- Classification thresholds --

    #[test]
    fn classification_threshold_table() {
        let t = Thresholds::default(); // deal = -10, overpriced = +10

        assert_eq!(classify(-25.0, &t), Classification::Deal);
        assert_eq!(classify(-10.01, &t), Classification::Deal);
        assert_eq!(classify(-10.0, &t), Classification::Neutral); // boundary
        assert_eq!(classify(-9.99, &t), Classification::Neutral);
        assert_eq!(classify(-0.5, &t), Classification::Neutral);
        assert_eq!(classify(0.0, &t), Classification::Neutral);
        assert_eq!(classify(9.99, &t), Classification::Neutral);
        assert_eq!(classify(10.0, &t), Classification::Neutral); // boundary
        assert_eq!(classify(10.01, &t), Classification::Overpriced);
        assert_eq!(classify(42.0, &t), Classification::Overpriced);
    }

    #[test]
    fn classification_custom_thresholds() {
        let t = Thresholds {
            deal: -5.0,
            overpriced: 20.0,
            ..Thresholds::default()
        };

        assert_eq!(classify(-6.0, &t), Classification::Deal);
        assert_eq!(classify(-5.0, &t), Classification::Neutral);
        assert_eq!(classify(15.0, &t), Classification::Neutral);
        assert_eq!(classify(20.0, &t), Classification::Neutral);
        assert_eq!(classify(21.0, &t), Classification::Overpriced);
    }

    #[test]
    fn boundary_price_at_ninety_percent_of_average_is_neutral() {
        // price = average * 0.9 exactly: 72 = 80 * 0.9.
        // (72 - 80) / 80 * 100 is exactly -10.0 in f64, which sits on the
        // deal threshold and therefore stays Neutral under strict `<`.
        let evaluated =
            evaluate_listing(&make_listing(1, "Nintendo 64", 72.0, 80.0), &Thresholds::default())
                .unwrap();
        assert_eq!(evaluated.deviation_pct, -10.0);
        assert_eq!(evaluated.classification, Classification::Neutral);
    }

    #[test]
    fn boundary_price_at_110_percent_of_average_is_neutral() {
        // (88 - 80) / 80 * 100 is exactly +10.0.
        let evaluated =
            evaluate_listing(&make_listing(1, "Nintendo 64", 88.0, 80.0), &Thresholds::default())
                .unwrap();
        assert_eq!(evaluated.deviation_pct, 10.0);
        assert_eq!(evaluated.classification, Classification::Neutral);
    }

    #[test]
    fn deal_iff_price_below_threshold_multiple() {
        // Deal <=> price < average * (1 + deal/100). With the default -10
        // threshold and average 100 the boundary price is 90.
        let t = Thresholds::default();

        let below = evaluate_listing(&make_listing(1, "SNES", 89.99, 100.0), &t).unwrap();
        assert_eq!(below.classification, Classification::Deal);

        let at = evaluate_listing(&make_listing(2, "SNES", 90.0, 100.0), &t).unwrap();
        assert_eq!(at.classification, Classification::Neutral);

        let above = evaluate_listing(&make_listing(3, "SNES", 90.01, 100.0), &t).unwrap();
        assert_eq!(above.classification, Classification::Neutral);
    }

    #[test]
    fn known_deviation_examples() {
        let t = Thresholds::default();

        // 75 vs 82 average: -8.54%, inside the neutral band.
        let neutral = evaluate_listing(&make_listing(1, "Nintendo 64", 75.0, 82.0), &t).unwrap();
        assert!(approx_eq(neutral.deviation_pct, -8.54, 0.01));
        assert_eq!(neutral.classification, Classification::Neutral);

        // 75 vs 90 average: -16.67%, below the deal threshold.
        let deal = evaluate_listing(&make_listing(2, "Nintendo 64", 75.0, 90.0), &t).unwrap();
        assert!(approx_eq(deal.deviation_pct, -16.67, 0.01));
        assert_eq!(deal.classification, Classification::Deal);
    }

    // -- Batch evaluation --

    #[test]
    fn evaluate_listings_preserves_order() {
        let listings = vec![
            make_listing(10, "Nintendo 64", 75.0, 82.0),
            make_listing(11, "PlayStation 1", 95.0, 110.0),
            make_listing(12, "GameCube", 82.0, 88.0),
        ];

        let evaluated = evaluate_listings(&listings, &Thresholds::default()).unwrap();
        assert_eq!(evaluated.len(), 3);
        assert_eq!(evaluated[0].listing.id, ListingId::Num(10));
        assert_eq!(evaluated[1].listing.id, ListingId::Num(11));
        assert_eq!(evaluated[2].listing.id, ListingId::Num(12));
        // Input untouched.
        assert_eq!(listings.len(), 3);
    }

    #[test]
    fn evaluate_listings_propagates_first_error() {
        let listings = vec![
            make_listing(1, "Nintendo 64", 75.0, 82.0),
            make_listing(2, "PlayStation 1", 95.0, 0.0),
            make_listing(3, "GameCube", 82.0, 88.0),
        ];

        let err = evaluate_listings(&listings, &Thresholds::default()).unwrap_err();
        match err {
            EvaluationError::InvalidReferencePrice { listing_id, .. } => {
                assert_eq!(listing_id, ListingId::Num(2));
            }
            other => panic!("expected InvalidReferencePrice, got: {other}"),
        }
    }

    // -- Filtering --

    /// The dashboard's six sample listings produce one deal (PlayStation 1,
    /// -13.64%) and five neutrals under the default thresholds.
    fn dashboard_mix() -> Vec<EvaluatedListing> {
        let listings = vec![
            make_listing(1, "Nintendo 64", 75.0, 82.0),    // -8.54  neutral
            make_listing(2, "PlayStation 1", 95.0, 110.0), // -13.64 deal
            make_listing(3, "Super Nintendo", 115.0, 118.0), // -2.54 neutral
            make_listing(4, "Sega Genesis", 85.0, 92.0),   // -7.61  neutral
            make_listing(5, "GameCube", 82.0, 88.0),       // -6.82  neutral
            make_listing(6, "Nintendo 64", 180.0, 195.0),  // -7.69  neutral
        ];
        evaluate_listings(&listings, &Thresholds::default()).unwrap()
    }

    #[test]
    fn filter_all_returns_input_unchanged() {
        let evaluated = dashboard_mix();
        let filtered = filter_by_classification(&evaluated, FilterSelection::All);
        assert_eq!(filtered, evaluated);
    }

    #[test]
    fn filter_deals_only() {
        let evaluated = dashboard_mix();
        let deals = filter_by_classification(&evaluated, FilterSelection::DealsOnly);
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].listing.id, ListingId::Num(2));
        assert_eq!(deals[0].classification, Classification::Deal);
    }

    #[test]
    fn filter_partitions_input_exactly() {
        let mut listings = vec![
            make_listing(1, "Nintendo 64", 60.0, 82.0),  // -26.8 deal
            make_listing(2, "Nintendo 64", 75.0, 82.0),  // -8.5  neutral
            make_listing(3, "Nintendo 64", 99.0, 82.0),  // +20.7 overpriced
            make_listing(4, "GameCube", 70.0, 88.0),     // -20.5 deal
            make_listing(5, "GameCube", 88.0, 88.0),     // 0.0   neutral
            make_listing(6, "GameCube", 100.0, 88.0),    // +13.6 overpriced
        ];
        // A seventh listing sitting exactly on the boundary lands in neutral.
        listings.push(make_listing(7, "SNES", 72.0, 80.0)); // -10.0 exact

        let evaluated = evaluate_listings(&listings, &Thresholds::default()).unwrap();

        let deals = filter_by_classification(&evaluated, FilterSelection::DealsOnly);
        let over = filter_by_classification(&evaluated, FilterSelection::OverpricedOnly);
        let neutral = filter_by_classification(&evaluated, FilterSelection::NeutralOnly);

        // No omissions, no overlaps.
        assert_eq!(deals.len() + over.len() + neutral.len(), evaluated.len());
        let mut ids: Vec<&ListingId> = deals
            .iter()
            .chain(over.iter())
            .chain(neutral.iter())
            .map(|e| &e.listing.id)
            .collect();
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), evaluated.len());

        assert_eq!(deals.len(), 2);
        assert_eq!(over.len(), 2);
        assert_eq!(neutral.len(), 3);
    }

    #[test]
    fn filter_preserves_relative_order() {
        let evaluated = dashboard_mix();
        let neutral = filter_by_classification(&evaluated, FilterSelection::NeutralOnly);
        let ids: Vec<String> = neutral.iter().map(|e| e.listing.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "3", "4", "5", "6"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let evaluated = dashboard_mix();
        let once = filter_by_classification(&evaluated, FilterSelection::DealsOnly);
        let twice = filter_by_classification(&once, FilterSelection::DealsOnly);
        assert_eq!(once, twice);
    }

    #[test]
    fn filter_empty_input() {
        let filtered = filter_by_classification(&[], FilterSelection::DealsOnly);
        assert!(filtered.is_empty());
    }

    // -- Selector parsing --

    #[test]
    fn selector_parsing() {
        assert_eq!(
            FilterSelection::from_str_filter("all").unwrap(),
            FilterSelection::All
        );
        assert_eq!(
            FilterSelection::from_str_filter("deals").unwrap(),
            FilterSelection::DealsOnly
        );
        assert_eq!(
            FilterSelection::from_str_filter("overpriced").unwrap(),
            FilterSelection::OverpricedOnly
        );
        assert_eq!(
            FilterSelection::from_str_filter("neutral").unwrap(),
            FilterSelection::NeutralOnly
        );
        assert_eq!(
            FilterSelection::from_str_filter("  Deals  ").unwrap(),
            FilterSelection::DealsOnly
        );
    }

    #[test]
    fn selector_parsing_rejects_unknown() {
        let err = FilterSelection::from_str_filter("cheap").unwrap_err();
        match err {
            EvaluationError::InvalidFilterSelector { value } => {
                assert_eq!(value, "cheap");
            }
            other => panic!("expected InvalidFilterSelector, got: {other}"),
        }

        assert!(FilterSelection::from_str_filter("").is_err());
    }

    #[test]
    fn selector_labels() {
        assert_eq!(FilterSelection::All.display_str(), "All Listings");
        assert_eq!(FilterSelection::DealsOnly.display_str(), "Deals Only");
        assert_eq!(Classification::Deal.label(), "DEAL");
        assert_eq!(Classification::Overpriced.label(), "OVERPRICED");
        assert_eq!(Classification::Neutral.label(), "NEUTRAL");
    }

    // -- Savings --

    #[test]
    fn savings_below_and_above_market() {
        let t = Thresholds::default();

        let below = evaluate_listing(&make_listing(1, "PlayStation 1", 95.0, 110.0), &t).unwrap();
        assert!(approx_eq(below.savings(), 15.0, 1e-12));

        let above = evaluate_listing(&make_listing(2, "SNES", 130.0, 118.0), &t).unwrap();
        assert!(approx_eq(above.savings(), -12.0, 1e-12));
    }
}
