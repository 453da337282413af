use rust_decimal::Decimal;
use std::collections::VecDeque;

use super::traits::Strategy;
use crate::common::types::Signal;
use crate::config::types::StrategyConfig;

/// Moving-average crossover
///
/// Buys while the short moving average is above the long one and sells while
/// it is below. Stays silent until both windows are full.
///
/// `short_window >= long_window` is accepted; the resulting signals are legal
/// but carry no crossover meaning. A zero-length window never signals.
#[derive(Debug, Clone)]
pub struct MovingAverageCrossover {
    short_window: usize,
    long_window: usize,
    order_size: Decimal,
    /// Most recent prices, capped at the larger window
    prices: VecDeque<Decimal>,
    observed: usize,
}

impl MovingAverageCrossover {
    pub fn new(short_window: usize, long_window: usize, order_size: Decimal) -> Self {
        Self {
            short_window,
            long_window,
            order_size,
            prices: VecDeque::with_capacity(short_window.max(long_window)),
            observed: 0,
        }
    }

    pub fn from_config(config: &StrategyConfig) -> Self {
        Self::new(config.short_window, config.long_window, config.order_size)
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }

    /// Total number of prices seen, including those dropped from the window
    pub fn observed(&self) -> usize {
        self.observed
    }

    /// Mean of the trailing `window` prices, if that many are held
    fn trailing_mean(&self, window: usize) -> Option<Decimal> {
        if window == 0 || self.prices.len() < window {
            return None;
        }
        let sum: Decimal = self.prices.iter().rev().take(window).sum();
        Some(sum / Decimal::from(window))
    }
}

impl Strategy for MovingAverageCrossover {
    fn name(&self) -> &str {
        "ma_crossover"
    }

    fn on_price(&mut self, price: Decimal) -> Signal {
        let capacity = self.short_window.max(self.long_window);
        if capacity > 0 {
            if self.prices.len() == capacity {
                self.prices.pop_front();
            }
            self.prices.push_back(price);
        }
        self.observed += 1;

        if self.observed < self.long_window {
            return Signal::None;
        }

        match (
            self.trailing_mean(self.short_window),
            self.trailing_mean(self.long_window),
        ) {
            (Some(short), Some(long)) if short > long => Signal::Buy,
            (Some(short), Some(long)) if short < long => Signal::Sell,
            _ => Signal::None,
        }
    }

    fn order_size(&self) -> Decimal {
        self.order_size
    }
}
