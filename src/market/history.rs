// Historical price series windowing.
//
// A price series is a month-indexed sequence of average prices supplied by
// an external source; this crate never generates or validates the series
// itself. The dashboard's timeframe control picks a trailing window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Price point
// ---------------------------------------------------------------------------

/// One month of a console's average-price history. `month` is the first day
/// of the month; display labels ("Jan", "Feb", ...) are a presentation
/// concern derived downstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub month: NaiveDate,
    #[serde(alias = "price")]
    pub average_price: f64,
}

// ---------------------------------------------------------------------------
// Timeframe
// ---------------------------------------------------------------------------

/// Trailing window length for a price series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    ThreeMonths,
    SixMonths,
    TwelveMonths,
}

impl Timeframe {
    /// Parse a timeframe from the dashboard control's values ("3m", "6m",
    /// "12m"). Case-insensitive; returns `None` for anything else.
    pub fn from_str_tf(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "3m" => Some(Timeframe::ThreeMonths),
            "6m" => Some(Timeframe::SixMonths),
            "12m" => Some(Timeframe::TwelveMonths),
            _ => None,
        }
    }

    /// Number of months in the window.
    pub fn months(&self) -> usize {
        match self {
            Timeframe::ThreeMonths => 3,
            Timeframe::SixMonths => 6,
            Timeframe::TwelveMonths => 12,
        }
    }

    pub fn display_str(&self) -> &'static str {
        match self {
            Timeframe::ThreeMonths => "3M",
            Timeframe::SixMonths => "6M",
            Timeframe::TwelveMonths => "12M",
        }
    }
}

// ---------------------------------------------------------------------------
// Windowing
// ---------------------------------------------------------------------------

/// The trailing `timeframe` window of a series, assuming the series is in
/// chronological order. A series shorter than the window passes through
/// whole.
pub fn window(points: &[PricePoint], timeframe: Timeframe) -> &[PricePoint] {
    let n = timeframe.months();
    &points[points.len().saturating_sub(n)..]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
