//! Simulation orchestrator
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │               CONTROL SURFACE (caller)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  configure / start / stop / reset / get_state               │
//! └──────────────────────────┬──────────────────────────────────┘
//!                            │  Mutex<Inner>
//! ┌──────────────────────────▼──────────────────────────────────┐
//! │               ADVANCING TASK (tokio)                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  lock                                                       │
//! │    prices @ tick → Strategy → ExecutionModel → Ledger       │
//! │    Ledger.mark_to_market → history                          │
//! │    tick += 1                                                │
//! │  unlock                                                     │
//! │  sleep(tick_interval)   ← outside the lock                  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ticks are processed strictly in order. The run ends at the first exhausted
//! price series, on `stop`, or on an unexpected failure (reported in
//! [`SimulationState::last_error`]).

mod orchestrator;
mod types;

pub use orchestrator::{SimulationOrchestrator, STOP_TIMEOUT};
pub use types::{SimulationSetup, SimulationState, SimulationStatus};
