//! Shared types used across the strategy, execution and ledger layers

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Side of a signed quantity; `None` for zero
    pub fn from_size(size: Decimal) -> Option<Self> {
        if size > Decimal::ZERO {
            Some(Side::Buy)
        } else if size < Decimal::ZERO {
            Some(Side::Sell)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A strategy's per-tick decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    None,
}

impl Signal {
    /// Signed order quantity for this signal
    pub fn to_order_size(self, order_size: Decimal) -> Decimal {
        match self {
            Signal::Buy => order_size,
            Signal::Sell => -order_size,
            Signal::None => Decimal::ZERO,
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::None => write!(f, "NONE"),
        }
    }
}

/// A single observation of a price series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Time of the observation
    pub timestamp: DateTime<Utc>,
    /// Observed price
    pub price: Decimal,
}

impl PricePoint {
    /// Create a new price point
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_signal_order_size() {
        assert_eq!(Signal::Buy.to_order_size(dec!(10)), dec!(10));
        assert_eq!(Signal::Sell.to_order_size(dec!(10)), dec!(-10));
        assert_eq!(Signal::None.to_order_size(dec!(10)), Decimal::ZERO);
    }

    #[test]
    fn test_side_from_size() {
        assert_eq!(Side::from_size(dec!(3)), Some(Side::Buy));
        assert_eq!(Side::from_size(dec!(-0.5)), Some(Side::Sell));
        assert_eq!(Side::from_size(Decimal::ZERO), None);
    }

    #[test]
    fn test_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Side::Sell).unwrap(), "\"SELL\"");
        assert_eq!(serde_json::to_string(&Signal::None).unwrap(), "\"NONE\"");
    }
}
