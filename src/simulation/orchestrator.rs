//! Background simulation loop

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use super::types::{SimulationSetup, SimulationState, SimulationStatus};
use crate::common::errors::{Result, SimError};
use crate::ledger::Snapshot;

/// How long `stop` waits for the loop before detaching it
pub const STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// State shared between the control surface and the advancing task
///
/// Every read and write goes through one mutex. The lock is never held
/// across an `.await`.
struct Inner {
    status: SimulationStatus,
    tick_index: usize,
    history: Vec<Snapshot>,
    setup: Option<SimulationSetup>,
    rejected_trades: u64,
    last_error: Option<String>,
    /// Bumped on every start; a task only writes while it owns the current one
    generation: u64,
}

/// Handle to the running loop
struct Worker {
    generation: u64,
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
    handle: JoinHandle<()>,
}

enum TickOutcome {
    /// Tick processed; sleep this long before the next one
    Advanced(Duration),
    /// Nothing left to process
    Finished(&'static str),
    /// Unexpected failure; the run halts
    Failed(SimError),
}

/// Drives strategies, execution and the ledger one tick at a time
///
/// Control surface: [`configure`](Self::configure), [`start`](Self::start),
/// [`stop`](Self::stop), [`reset`](Self::reset) and
/// [`get_state`](Self::get_state). The orchestrator is an ordinary owned
/// value; share it with `Arc` when several tasks need to control it.
///
/// `start` must be called from within a tokio runtime.
pub struct SimulationOrchestrator {
    inner: Arc<Mutex<Inner>>,
    worker: Mutex<Option<Worker>>,
}

impl SimulationOrchestrator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                status: SimulationStatus::Idle,
                tick_index: 0,
                history: Vec::new(),
                setup: None,
                rejected_trades: 0,
                last_error: None,
                generation: 0,
            })),
            worker: Mutex::new(None),
        }
    }

    /// Install a new run
    ///
    /// Resets the tick index and history and replaces every collaborator.
    /// Fails with `ConfigurationConflict` while running.
    #[instrument(skip_all)]
    pub fn configure(&self, setup: SimulationSetup) -> Result<()> {
        let mut inner = lock(&self.inner);
        if inner.status == SimulationStatus::Running {
            return Err(SimError::ConfigurationConflict(
                "cannot configure while the simulation is running".to_string(),
            ));
        }

        info!(
            symbols = setup.feeds.len(),
            strategies = setup.strategies.len(),
            max_ticks = setup.max_ticks(),
            tick_interval_ms = setup.tick_interval.as_millis() as u64,
            "Simulation configured"
        );
        inner.setup = Some(setup);
        inner.tick_index = 0;
        inner.history.clear();
        inner.rejected_trades = 0;
        inner.last_error = None;
        inner.status = SimulationStatus::Configured;
        Ok(())
    }

    /// Spawn the advancing task; a no-op while already running
    pub fn start(&self) -> Result<()> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| SimError::Internal(format!("start requires a tokio runtime: {e}")))?;

        let mut worker = lock(&self.worker);
        let generation = {
            let mut inner = lock(&self.inner);
            if inner.status == SimulationStatus::Running {
                debug!("start ignored, already running");
                return Ok(());
            }
            inner.status = SimulationStatus::Running;
            inner.last_error = None;
            inner.generation += 1;
            inner.generation
        };

        let stop = Arc::new(AtomicBool::new(false));
        let wake = Arc::new(Notify::new());
        let handle = runtime.spawn(run_loop(
            self.inner.clone(),
            generation,
            stop.clone(),
            wake.clone(),
        ));

        info!(generation, "Simulation started");
        *worker = Some(Worker {
            generation,
            stop,
            wake,
            handle,
        });
        Ok(())
    }

    /// Ask the loop to stop and wait up to [`STOP_TIMEOUT`] for it
    ///
    /// Cancellation is cooperative. If the loop does not finish in time it is
    /// detached: the orchestrator is marked stopped and the old task can no
    /// longer change any state. Safe to call when not running.
    pub async fn stop(&self) {
        let worker = lock(&self.worker).take();
        let Some(worker) = worker else {
            debug!("stop ignored, no worker");
            return;
        };

        worker.stop.store(true, Ordering::SeqCst);
        worker.wake.notify_one();

        match tokio::time::timeout(STOP_TIMEOUT, worker.handle).await {
            Ok(Ok(())) => info!(generation = worker.generation, "Simulation stopped"),
            Ok(Err(e)) => {
                error!("Simulation task ended abnormally: {}", e);
                self.detach(worker.generation, Some(format!("simulation task failed: {e}")));
            }
            Err(_) => {
                warn!(
                    "Simulation task did not stop within {:?}, detaching",
                    STOP_TIMEOUT
                );
                self.detach(worker.generation, None);
            }
        }
    }

    /// Rewind to tick zero, keeping the installed collaborators
    ///
    /// Clears the orchestrator history and the ledger's own history. Cash,
    /// positions and strategy state are left as they are. Fails with
    /// `ConfigurationConflict` while running.
    pub fn reset(&self) -> Result<()> {
        let mut inner = lock(&self.inner);
        if inner.status == SimulationStatus::Running {
            return Err(SimError::ConfigurationConflict(
                "cannot reset while the simulation is running".to_string(),
            ));
        }

        inner.tick_index = 0;
        inner.history.clear();
        inner.rejected_trades = 0;
        inner.last_error = None;
        if let Some(setup) = inner.setup.as_mut() {
            setup.ledger.clear_history();
        }
        inner.status = SimulationStatus::Idle;
        info!("Simulation reset");
        Ok(())
    }

    /// Owned copy of the current state
    pub fn get_state(&self) -> SimulationState {
        let inner = lock(&self.inner);
        SimulationState {
            status: inner.status,
            tick_index: inner.tick_index,
            history: inner.history.clone(),
            ledger: inner.setup.as_ref().map(|s| s.ledger.clone()),
            rejected_trades: inner.rejected_trades,
            last_error: inner.last_error.clone(),
        }
    }

    /// Orphan the task of `generation` and mark the run stopped
    fn detach(&self, generation: u64, reason: Option<String>) {
        let mut inner = lock(&self.inner);
        if inner.generation == generation {
            inner.generation += 1;
            inner.status = SimulationStatus::Stopped;
            if reason.is_some() {
                inner.last_error = reason;
            }
        }
    }
}

impl Default for SimulationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SimulationOrchestrator {
    fn drop(&mut self) {
        if let Some(worker) = lock(&self.worker).take() {
            worker.stop.store(true, Ordering::SeqCst);
            worker.wake.notify_one();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic inside a tick is reported through the join handle; the state
    // itself is still consistent at tick granularity.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn run_loop(
    inner: Arc<Mutex<Inner>>,
    generation: u64,
    stop: Arc<AtomicBool>,
    wake: Arc<Notify>,
) {
    loop {
        if stop.load(Ordering::SeqCst) {
            finish(&inner, generation, "stop requested", None);
            return;
        }

        let outcome = {
            let mut guard = lock(&inner);
            if guard.generation != generation {
                debug!(generation, "superseded, exiting");
                return;
            }
            process_tick(&mut guard)
        };

        match outcome {
            TickOutcome::Advanced(interval) if interval.is_zero() => {
                tokio::task::yield_now().await;
            }
            TickOutcome::Advanced(interval) => {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = wake.notified() => {}
                }
            }
            TickOutcome::Finished(reason) => {
                finish(&inner, generation, reason, None);
                return;
            }
            TickOutcome::Failed(err) => {
                error!("Simulation halted: {}", err);
                finish(&inner, generation, "failed", Some(err.to_string()));
                return;
            }
        }
    }
}

fn finish(inner: &Mutex<Inner>, generation: u64, reason: &str, failure: Option<String>) {
    let mut guard = lock(inner);
    if guard.generation != generation {
        return;
    }
    guard.status = SimulationStatus::Stopped;
    if failure.is_some() {
        guard.last_error = failure;
    }
    info!(
        reason,
        ticks = guard.tick_index,
        rejected_trades = guard.rejected_trades,
        "Simulation loop finished"
    );
}

/// Process the tick at the current index
fn process_tick(inner: &mut Inner) -> TickOutcome {
    let Inner {
        setup,
        tick_index,
        history,
        rejected_trades,
        ..
    } = inner;

    let Some(setup) = setup.as_mut() else {
        return TickOutcome::Finished("nothing configured");
    };
    if setup.feeds.is_empty() {
        return TickOutcome::Finished("no symbols configured");
    }

    let index = *tick_index;
    let mut prices: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut timestamp = None;

    for (symbol, feed) in &setup.feeds {
        let Some(point) = feed.price_at(index) else {
            info!(symbol = %symbol, tick = index, "Price series exhausted");
            return TickOutcome::Finished("price series exhausted");
        };
        if point.price <= Decimal::ZERO {
            return TickOutcome::Failed(SimError::InvalidPrice {
                symbol: symbol.clone(),
                price: point.price,
            });
        }
        // Series are tick-aligned; the first symbol stamps the snapshot
        timestamp.get_or_insert(point.timestamp);
        prices.insert(symbol.clone(), point.price);
    }

    for (symbol, strategy) in setup.strategies.iter_mut() {
        let Some(&price) = prices.get(symbol) else {
            continue;
        };
        let signal = strategy.on_price(price);
        let size = signal.to_order_size(strategy.order_size());
        if size.is_zero() {
            continue;
        }

        let fill = setup.execution.execute(symbol, size, price);
        // Impact >= 1 drives a sell fill to zero or below; skip that trade only
        if fill.price <= Decimal::ZERO {
            *rejected_trades += 1;
            warn!(
                symbol = %symbol,
                tick = index,
                %signal,
                price = %fill.price,
                "Trade rejected: impact-adjusted price is not positive"
            );
            continue;
        }
        match setup.ledger.execute_trade(symbol, fill.size, fill.price) {
            Ok(Some(trade)) => debug!(
                symbol = %symbol,
                tick = index,
                side = %trade.side,
                size = %trade.size,
                price = %trade.price,
                "Trade executed"
            ),
            Ok(None) => {}
            Err(err) if err.is_recoverable() => {
                *rejected_trades += 1;
                warn!(symbol = %symbol, tick = index, %signal, "Trade rejected: {}", err);
            }
            Err(err) => return TickOutcome::Failed(err),
        }
    }

    let snapshot = setup.ledger.mark_to_market_at(&prices, timestamp, Some(index));
    history.push(snapshot);
    *tick_index += 1;

    TickOutcome::Advanced(setup.tick_interval)
}
