use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::execution::ExecutionModel;
use crate::feed::BoxedPriceSource;
use crate::ledger::{Ledger, Snapshot};
use crate::strategy::BoxedStrategy;

/// Orchestrator lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationStatus {
    /// Nothing installed yet, or reset
    Idle,
    /// Collaborators installed, not started
    Configured,
    /// Background task advancing ticks
    Running,
    /// Run ended: stop requested, series exhausted, or failure
    Stopped,
}

impl std::fmt::Display for SimulationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationStatus::Idle => write!(f, "idle"),
            SimulationStatus::Configured => write!(f, "configured"),
            SimulationStatus::Running => write!(f, "running"),
            SimulationStatus::Stopped => write!(f, "stopped"),
        }
    }
}

/// Everything one simulation run needs
///
/// Installed as a unit by `configure`; replaced, never patched, between runs.
pub struct SimulationSetup {
    /// Price series per symbol
    pub feeds: BTreeMap<String, BoxedPriceSource>,
    /// Strategy per symbol; symbols without one are only marked
    pub strategies: BTreeMap<String, BoxedStrategy>,
    pub ledger: Ledger,
    pub execution: ExecutionModel,
    /// Delay between ticks
    pub tick_interval: Duration,
}

impl SimulationSetup {
    pub fn new(ledger: Ledger, execution: ExecutionModel, tick_interval: Duration) -> Self {
        Self {
            feeds: BTreeMap::new(),
            strategies: BTreeMap::new(),
            ledger,
            execution,
            tick_interval,
        }
    }

    /// Add a price feed, and optionally a strategy, for `symbol`
    pub fn with_symbol(
        mut self,
        symbol: impl Into<String>,
        feed: BoxedPriceSource,
        strategy: Option<BoxedStrategy>,
    ) -> Self {
        let symbol = symbol.into();
        if let Some(strategy) = strategy {
            self.strategies.insert(symbol.clone(), strategy);
        }
        self.feeds.insert(symbol, feed);
        self
    }

    /// Length of the shortest feed; the run cannot go past it
    pub fn max_ticks(&self) -> usize {
        self.feeds.values().map(|f| f.len()).min().unwrap_or(0)
    }
}

impl std::fmt::Debug for SimulationSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationSetup")
            .field("symbols", &self.feeds.keys().collect::<Vec<_>>())
            .field(
                "strategies",
                &self
                    .strategies
                    .iter()
                    .map(|(symbol, s)| (symbol.as_str(), s.name()))
                    .collect::<Vec<_>>(),
            )
            .field("ledger", &self.ledger)
            .field("execution", &self.execution)
            .field("tick_interval", &self.tick_interval)
            .finish()
    }
}

/// Owned copy of the orchestrator state returned by `get_state`
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub status: SimulationStatus,
    /// Next tick to process
    pub tick_index: usize,
    /// Orchestrator snapshot history, one per processed tick
    pub history: Vec<Snapshot>,
    /// Copy of the installed ledger
    pub ledger: Option<Ledger>,
    /// Trades rejected by the ledger's position checks in this run
    pub rejected_trades: u64,
    /// Why the last run halted, if it failed
    pub last_error: Option<String>,
}

impl SimulationState {
    pub fn is_running(&self) -> bool {
        self.status == SimulationStatus::Running
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.history.last()
    }
}
