use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::common::types::Side;

/// Current position in a symbol
///
/// An entry only exists while `size` is non-zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    /// Positive = long, negative = short
    pub size: Decimal,
    /// Cost basis; only moves on size-increasing trades
    pub avg_price: Decimal,
}

impl Position {
    pub fn new(symbol: impl Into<String>, size: Decimal, avg_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            size,
            avg_price,
        }
    }

    /// Unrealized profit at the given mark
    pub fn unrealized_pnl(&self, mark: Decimal) -> Decimal {
        (mark - self.avg_price) * self.size
    }

    /// Notional value at the given mark
    pub fn exposure(&self, mark: Decimal) -> Decimal {
        mark * self.size
    }
}

/// One executed trade, already folded into the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    /// Signed quantity (positive = buy)
    pub size: Decimal,
    /// Price after slippage
    pub price: Decimal,
    pub commission: Decimal,
    pub side: Side,
    /// Profit realized by this trade; zero for opening trades
    pub realized_pnl: Decimal,
}

/// Point-in-time view of the ledger
///
/// Snapshots are appended to history and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: Option<DateTime<Utc>>,
    pub cash: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_exposure: Decimal,
    pub positions: BTreeMap<String, Position>,
    /// Tick index, when taken by the orchestrator
    pub tick: Option<usize>,
}

impl Snapshot {
    /// Cash plus the marked value of every priced position
    pub fn equity(&self) -> Decimal {
        self.cash + self.total_exposure
    }

    /// Realized plus unrealized profit
    pub fn total_pnl(&self) -> Decimal {
        self.realized_pnl + self.unrealized_pnl
    }
}
