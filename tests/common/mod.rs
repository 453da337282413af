//! Common test utilities and fixtures

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::Duration as StdDuration;
use tick_sim::{
    ExecutionModel, Ledger, PriceSeries, Signal, SimulationOrchestrator, SimulationSetup,
    SimulationState, SimulationStatus, Strategy,
};

/// Evenly spaced one-minute series starting at the Unix epoch
pub fn series(symbol: &str, prices: &[Decimal]) -> Box<PriceSeries> {
    Box::new(PriceSeries::from_prices(
        symbol,
        DateTime::<Utc>::UNIX_EPOCH,
        Duration::minutes(1),
        prices.iter().copied(),
    ))
}

/// Flat series of `len` points at 100
pub fn flat_series(symbol: &str, len: usize) -> Box<PriceSeries> {
    series(symbol, &vec![dec!(100); len])
}

/// Execution model with no price impact
pub fn frictionless() -> ExecutionModel {
    ExecutionModel::new(dec!(1000), Decimal::ZERO)
}

/// Setup with a frictionless ledger holding 100k cash and no symbols
pub fn empty_setup(tick_interval: StdDuration) -> SimulationSetup {
    SimulationSetup::new(Ledger::with_cash(dec!(100000)), frictionless(), tick_interval)
}

/// Strategy that replays a fixed list of signals, then stays silent
pub struct Scripted {
    signals: Vec<Signal>,
    next: usize,
    order_size: Decimal,
}

impl Scripted {
    pub fn new(signals: Vec<Signal>, order_size: Decimal) -> Box<Self> {
        Box::new(Self {
            signals,
            next: 0,
            order_size,
        })
    }
}

impl Strategy for Scripted {
    fn name(&self) -> &str {
        "scripted"
    }

    fn on_price(&mut self, _price: Decimal) -> Signal {
        let signal = self.signals.get(self.next).copied().unwrap_or(Signal::None);
        self.next += 1;
        signal
    }

    fn order_size(&self) -> Decimal {
        self.order_size
    }
}

/// Poll until the orchestrator leaves `Running`, panicking after `timeout`
pub async fn wait_until_stopped(
    orchestrator: &SimulationOrchestrator,
    timeout: StdDuration,
) -> SimulationState {
    tokio::time::timeout(timeout, async {
        loop {
            let state = orchestrator.get_state();
            if state.status != SimulationStatus::Running {
                return state;
            }
            tokio::time::sleep(StdDuration::from_millis(5)).await;
        }
    })
    .await
    .expect("simulation did not stop in time")
}
