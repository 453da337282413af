use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

use super::types::{Position, Snapshot, Trade};
use crate::common::errors::{Result, SimError};
use crate::common::types::Side;
use crate::config::types::LedgerConfig;

/// Cash, positions and realized PnL
///
/// The ledger is the single source of truth for accounting. Every mutating
/// call validates first and then applies all of its changes, so a rejected
/// trade leaves no trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    config: LedgerConfig,
    cash: Decimal,
    positions: BTreeMap<String, Position>,
    realized_pnl: Decimal,
    history: Vec<Snapshot>,
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            cash: config.initial_cash,
            config,
            positions: BTreeMap::new(),
            realized_pnl: Decimal::ZERO,
            history: Vec::new(),
        }
    }

    /// Frictionless, unconstrained ledger starting with `cash`
    pub fn with_cash(cash: Decimal) -> Self {
        Self::new(LedgerConfig {
            initial_cash: cash,
            ..LedgerConfig::default()
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    pub fn positions(&self) -> &BTreeMap<String, Position> {
        &self.positions
    }

    pub fn position(&self, symbol: &str) -> Option<&Position> {
        self.positions.get(symbol)
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }

    /// Drop the snapshot history; cash and positions are untouched
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Execute a signed trade at `reference_price`
    ///
    /// Positive sizes buy, negative sizes sell. Slippage is applied against
    /// the initiator on top of whatever the caller already priced in. Returns
    /// `Ok(None)` for a zero size.
    ///
    /// # Errors
    /// * `PositionLimitExceeded` - resulting |position| would exceed the limit
    /// * `InsufficientPosition` - reducing trade larger than the holding, or
    ///   a sell on a flat book when shorting is disabled
    /// * `InvalidPrice` - non-positive reference price
    #[instrument(level = "debug", skip(self))]
    pub fn execute_trade(
        &mut self,
        symbol: &str,
        size: Decimal,
        reference_price: Decimal,
    ) -> Result<Option<Trade>> {
        let Some(side) = Side::from_size(size) else {
            return Ok(None);
        };
        if reference_price <= Decimal::ZERO {
            return Err(SimError::InvalidPrice {
                symbol: symbol.to_string(),
                price: reference_price,
            });
        }

        let price = match side {
            Side::Buy => reference_price * (Decimal::ONE + self.config.slippage),
            Side::Sell => reference_price * (Decimal::ONE - self.config.slippage),
        };

        let held = self
            .positions
            .get(symbol)
            .map(|p| p.size)
            .unwrap_or(Decimal::ZERO);
        let prospective = held + size;

        if let Some(limit) = self.config.position_limit {
            if prospective.abs() > limit {
                return Err(SimError::PositionLimitExceeded {
                    symbol: symbol.to_string(),
                    prospective,
                    limit,
                });
            }
        }

        let reducing = if held.is_zero() {
            side == Side::Sell && !self.config.allow_short
        } else {
            (held > Decimal::ZERO) != (size > Decimal::ZERO)
        };
        if reducing && size.abs() > held.abs() {
            return Err(SimError::InsufficientPosition {
                symbol: symbol.to_string(),
                held,
                requested: size.abs(),
            });
        }

        // Validation done; everything below must succeed
        let commission = self.config.commission;
        self.cash -= price * size + commission;

        let mut realized = Decimal::ZERO;
        if reducing {
            if let Some(position) = self.positions.get_mut(symbol) {
                realized = (price - position.avg_price) * -size;
                position.size = prospective;
            }
            self.realized_pnl += realized;
            if prospective.is_zero() {
                self.positions.remove(symbol);
            }
        } else {
            let position = self
                .positions
                .entry(symbol.to_string())
                .or_insert_with(|| Position::new(symbol, Decimal::ZERO, Decimal::ZERO));
            position.avg_price = (position.avg_price * held + price * size) / prospective;
            position.size = prospective;
        }

        debug!(%side, %price, %realized, cash = %self.cash, "trade applied");

        Ok(Some(Trade {
            symbol: symbol.to_string(),
            size,
            price,
            commission,
            side,
            realized_pnl: realized,
        }))
    }

    /// Mark every priced position and append a snapshot to history
    ///
    /// Positions whose symbol is missing from `prices` are left out of both
    /// sums; a missing quote does not invalidate the rest of the snapshot.
    pub fn mark_to_market(
        &mut self,
        prices: &BTreeMap<String, Decimal>,
        timestamp: Option<DateTime<Utc>>,
    ) -> Snapshot {
        self.mark_to_market_at(prices, timestamp, None)
    }

    /// [`Ledger::mark_to_market`] stamped with a tick index
    pub fn mark_to_market_at(
        &mut self,
        prices: &BTreeMap<String, Decimal>,
        timestamp: Option<DateTime<Utc>>,
        tick: Option<usize>,
    ) -> Snapshot {
        let (unrealized_pnl, total_exposure) = self
            .positions
            .values()
            .filter_map(|position| {
                prices
                    .get(&position.symbol)
                    .map(|mark| (position.unrealized_pnl(*mark), position.exposure(*mark)))
            })
            .fold((Decimal::ZERO, Decimal::ZERO), |(u, e), (pu, pe)| (u + pu, e + pe));

        let snapshot = Snapshot {
            timestamp,
            cash: self.cash,
            realized_pnl: self.realized_pnl,
            unrealized_pnl,
            total_exposure,
            positions: self.positions.clone(),
            tick,
        };
        self.history.push(snapshot.clone());
        snapshot
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}
