//! Price feeds
//!
//! The orchestrator only needs index-based access to a pre-built, immutable
//! series and a length. [`PriceSeries`] is the in-memory implementation; it
//! can be loaded from CSV ([`load_csv`]) or generated ([`generator`]).

pub mod generator;
mod loader;

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use loader::{load_csv, read_csv};

use crate::common::types::PricePoint;

/// Random-access view of one symbol's price history
pub trait PriceSource: Send + Sync {
    /// Number of points in the series
    fn len(&self) -> usize;

    /// Point at `index`, or `None` once the series is exhausted
    fn price_at(&self, index: usize) -> Option<PricePoint>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Boxed price source for dynamic dispatch
pub type BoxedPriceSource = Box<dyn PriceSource>;

/// In-memory price series for one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            points,
        }
    }

    /// Evenly spaced series starting at `start`
    pub fn from_prices(
        symbol: impl Into<String>,
        start: DateTime<Utc>,
        step: Duration,
        prices: impl IntoIterator<Item = Decimal>,
    ) -> Self {
        let mut timestamp = start;
        let points = prices
            .into_iter()
            .map(|price| {
                let point = PricePoint::new(timestamp, price);
                timestamp += step;
                point
            })
            .collect();
        Self::new(symbol, points)
    }

    /// Last observed price, if any
    pub fn last_price(&self) -> Option<Decimal> {
        self.points.last().map(|p| p.price)
    }
}

impl PriceSource for PriceSeries {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn price_at(&self, index: usize) -> Option<PricePoint> {
        self.points.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_prices_spacing() {
        let start = DateTime::<Utc>::UNIX_EPOCH;
        let series = PriceSeries::from_prices(
            "A",
            start,
            Duration::minutes(1),
            [dec!(1), dec!(2), dec!(3)],
        );
        assert_eq!(series.len(), 3);
        assert_eq!(series.price_at(2).unwrap().timestamp, start + Duration::minutes(2));
        assert_eq!(series.last_price(), Some(dec!(3)));
        assert!(series.price_at(3).is_none());
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::new("A", Vec::new());
        assert!(series.is_empty());
        assert!(series.price_at(0).is_none());
    }
}
