// Built-in sample dataset.
//
// The fixed records the dashboard ships with: six recent listings, the
// five-console metrics table, marketplace share, and twelve months of
// per-console average prices for 2024. The history tables are precomputed
// constants (base price plus a seasonal arc); nothing here is generated at
// runtime, so every run sees identical data.

use crate::market::aggregate::{ConsoleMetrics, PlatformShare};
use crate::market::history::PricePoint;
use crate::market::listing::{Listing, ListingId, ListingStatus};
use crate::source::{MarketDataSource, SourceError};
use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Sample tables
// ---------------------------------------------------------------------------

const SAMPLE_YEAR: i32 = 2024;

/// Seasonal offset added to a console's base price, one entry per month.
const MONTH_OFFSETS: [f64; 12] = [
    0.0, 5.0, 9.0, 13.0, 15.0, 15.0, 14.0, 11.0, 7.0, 2.0, -3.0, -7.0,
];

/// Base price per tracked console for the sample history tables.
const BASE_PRICES: &[(&str, f64)] = &[
    ("Nintendo 64", 80.0),
    ("PlayStation 1", 60.0),
    ("Sega Genesis", 50.0),
    ("Super Nintendo", 120.0),
    ("GameCube", 90.0),
];

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// The dashboard's built-in sample data. Infallible by construction; the
/// `Result` returns exist only to satisfy the provider seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleMarket;

impl SampleMarket {
    pub fn new() -> Self {
        SampleMarket
    }
}

fn listing(
    id: i64,
    console: &str,
    condition: &str,
    price: f64,
    average_price: f64,
    platform: &str,
    days_ago: u32,
    status: ListingStatus,
) -> Listing {
    Listing {
        id: ListingId::Num(id),
        console: console.into(),
        condition: condition.into(),
        price,
        average_price,
        platform: platform.into(),
        days_ago,
        status,
    }
}

impl MarketDataSource for SampleMarket {
    fn listings(&self) -> Result<Vec<Listing>, SourceError> {
        use ListingStatus::{Available, Sold};
        Ok(vec![
            listing(1, "Nintendo 64", "Loose", 75.0, 82.0, "eBay", 2, Available),
            listing(2, "PlayStation 1", "CIB", 95.0, 110.0, "r/GameSale", 1, Available),
            listing(3, "Super Nintendo", "Loose", 115.0, 118.0, "Mercari", 3, Sold),
            listing(4, "Sega Genesis", "CIB", 85.0, 92.0, "eBay", 1, Available),
            listing(5, "GameCube", "Loose", 82.0, 88.0, "Facebook", 4, Available),
            listing(6, "Nintendo 64", "CIB", 180.0, 195.0, "eBay", 2, Available),
        ])
    }

    fn console_metrics(&self) -> Result<Vec<ConsoleMetrics>, SourceError> {
        let rows = [
            ("Nintendo 64", 82.0, 143, 8.2, 4.5),
            ("PlayStation 1", 65.0, 198, -3.1, 3.2),
            ("Super Nintendo", 118.0, 87, 12.5, 6.1),
            ("Sega Genesis", 52.0, 156, -1.8, 5.8),
            ("GameCube", 88.0, 121, 15.3, 4.9),
        ];
        Ok(rows
            .into_iter()
            .map(
                |(console, average_price, listing_count, trend_pct, sell_velocity)| {
                    ConsoleMetrics {
                        console: console.into(),
                        average_price,
                        listing_count,
                        trend_pct,
                        sell_velocity,
                    }
                },
            )
            .collect())
    }

    fn market_share(&self) -> Result<Vec<PlatformShare>, SourceError> {
        let rows = [
            ("eBay", 45.0),
            ("r/GameSale", 20.0),
            ("Mercari", 15.0),
            ("Facebook", 12.0),
            ("Other", 8.0),
        ];
        Ok(rows
            .into_iter()
            .map(|(platform, share_pct)| PlatformShare {
                platform: platform.into(),
                share_pct,
            })
            .collect())
    }

    fn price_history(&self, console: &str) -> Result<Vec<PricePoint>, SourceError> {
        let Some(&(_, base)) = BASE_PRICES.iter().find(|(name, _)| *name == console) else {
            return Ok(Vec::new());
        };

        Ok(MONTH_OFFSETS
            .iter()
            .enumerate()
            .map(|(i, offset)| PricePoint {
                month: NaiveDate::from_ymd_opt(SAMPLE_YEAR, i as u32 + 1, 1)
                    .expect("sample months are 1..=12"),
                average_price: base + offset,
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
