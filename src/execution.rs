//! Market-impact execution model
//!
//! A stand-in for an order book: it does not match orders, it only moves the
//! execution price against the order in proportion to its size relative to the
//! configured liquidity depth.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::types::ExecutionConfig;

/// Keeps the impact finite when depth is configured as zero
const DEPTH_EPSILON: Decimal = dec!(0.000000001);

/// Result of executing one market order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Impact-adjusted execution price
    pub price: Decimal,
    /// Signed executed quantity; always the requested size
    pub size: Decimal,
}

/// Liquidity-impact execution model
///
/// `impact = |size| / (depth + ε) * spread`; buys pay `price * (1 + impact)`,
/// sells receive `price * (1 - impact)`. Orders are never partially filled.
///
/// Execution takes `&self` and touches no mutable state, so a shared model can
/// be used from several callers. Reconfiguration takes `&mut self` and is
/// therefore exclusive.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionModel {
    depth: Decimal,
    spread: Decimal,
}

impl ExecutionModel {
    pub fn new(depth: Decimal, spread: Decimal) -> Self {
        Self { depth, spread }
    }

    pub fn from_config(config: &ExecutionConfig) -> Self {
        Self::new(config.depth, config.spread)
    }

    pub fn depth(&self) -> Decimal {
        self.depth
    }

    pub fn spread(&self) -> Decimal {
        self.spread
    }

    pub fn set_depth(&mut self, depth: Decimal) {
        self.depth = depth;
    }

    pub fn set_spread(&mut self, spread: Decimal) {
        self.spread = spread;
    }

    /// Relative price impact of an order of `size` units
    pub fn impact(&self, size: Decimal) -> Decimal {
        size.abs() / (self.depth + DEPTH_EPSILON) * self.spread
    }

    /// Execute a market order against the reference price
    pub fn execute(&self, symbol: &str, size: Decimal, reference_price: Decimal) -> Fill {
        let impact = self.impact(size);
        let price = if size > Decimal::ZERO {
            reference_price * (Decimal::ONE + impact)
        } else if size < Decimal::ZERO {
            reference_price * (Decimal::ONE - impact)
        } else {
            reference_price
        };
        trace!(symbol, %size, %reference_price, %price, "market order executed");
        Fill { price, size }
    }
}

impl Default for ExecutionModel {
    fn default() -> Self {
        Self::from_config(&ExecutionConfig::default())
    }
}
