//! Strategy module: per-symbol signal sources
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 ONE TICK, ONE SYMBOL                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  price                                                      │
//! │    │                                                        │
//! │    ▼                                                        │
//! │  Strategy.on_price() → Buy / Sell / None                    │
//! │    │                                                        │
//! │    ▼ (Buy → +order_size, Sell → -order_size)                │
//! │  ExecutionModel → Ledger                                    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Strategy`]: Trait for implementing signal sources
//! - [`MovingAverageCrossover`]: short/long moving-average crossover

mod moving_average;
mod traits;

pub use moving_average::MovingAverageCrossover;
pub use traits::{BoxedStrategy, Strategy};
