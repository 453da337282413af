//! tick_sim Library
//!
//! Tick-driven intraday trading simulation: a price stream feeds per-symbol
//! strategies, their signals are executed against a market-impact model and
//! reconciled against a position/PnL ledger on every tick.

pub mod common;
pub mod config;
pub mod execution;
pub mod feed;
pub mod ledger;
pub mod simulation;
pub mod sink;
pub mod strategy;

// Re-export commonly used types
pub use common::errors::{Result, SimError};
pub use common::types::{PricePoint, Side, Signal};
pub use config::types::AppConfig;
pub use execution::{ExecutionModel, Fill};
pub use feed::{BoxedPriceSource, PriceSeries, PriceSource};
pub use ledger::{Ledger, Position, Snapshot, Trade};
pub use simulation::{SimulationOrchestrator, SimulationSetup, SimulationState, SimulationStatus};

// Strategy types
pub use strategy::{BoxedStrategy, MovingAverageCrossover, Strategy};
