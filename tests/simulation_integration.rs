//! Integration tests for the simulation orchestrator
//!
//! These run the real background loop on the tokio test runtime with short or
//! zero tick intervals.

mod common;

use common::{empty_setup, flat_series, frictionless, series, wait_until_stopped, Scripted};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::time::{Duration, Instant};
use tick_sim::config::types::LedgerConfig;
use tick_sim::simulation::STOP_TIMEOUT;
use tick_sim::{
    ExecutionModel, Ledger, MovingAverageCrossover, Signal, SimError, SimulationOrchestrator,
    SimulationSetup, SimulationStatus,
};

const WAIT: Duration = Duration::from_secs(5);

// ============================================================================
// Run to completion
// ============================================================================

#[test_log::test(tokio::test)]
async fn test_run_ends_at_shortest_series() {
    let setup = empty_setup(Duration::ZERO)
        .with_symbol(
            "AAA",
            flat_series("AAA", 7),
            Some(Box::new(MovingAverageCrossover::new(2, 3, dec!(1)))),
        )
        .with_symbol(
            "BBB",
            flat_series("BBB", 4),
            Some(Box::new(MovingAverageCrossover::new(2, 3, dec!(1)))),
        );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    let state = wait_until_stopped(&orchestrator, WAIT).await;

    assert_eq!(state.status, SimulationStatus::Stopped);
    assert_eq!(state.history.len(), 4);
    assert_eq!(state.tick_index, 4);
    assert!(state.last_error.is_none());

    let ticks: Vec<_> = state.history.iter().map(|s| s.tick).collect();
    assert_eq!(ticks, vec![Some(0), Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn test_ledger_history_mirrors_orchestrator_history() {
    let prices = [dec!(100), dec!(101), dec!(102), dec!(101), dec!(99), dec!(98)];
    let setup = empty_setup(Duration::ZERO).with_symbol(
        "AAA",
        series("AAA", &prices),
        Some(Box::new(MovingAverageCrossover::new(2, 3, dec!(10)))),
    );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    let state = wait_until_stopped(&orchestrator, WAIT).await;

    let ledger = state.ledger.expect("ledger installed");
    assert_eq!(ledger.history(), state.history.as_slice());
    assert_eq!(state.history.len(), prices.len());
}

#[tokio::test]
async fn test_scripted_round_trip_accounting() {
    let prices = [dec!(10), dec!(11), dec!(12), dec!(13), dec!(14)];
    let signals = vec![Signal::Buy, Signal::Buy, Signal::Sell, Signal::Sell, Signal::Sell];
    let setup = empty_setup(Duration::ZERO).with_symbol(
        "AAA",
        series("AAA", &prices),
        Some(Scripted::new(signals, dec!(5))),
    );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    let state = wait_until_stopped(&orchestrator, WAIT).await;

    // The last sell has nothing left to sell and is skipped
    assert_eq!(state.rejected_trades, 1);
    assert_eq!(state.history.len(), 5);

    let avg_after_buys = state.history[1].positions["AAA"].avg_price;
    assert_eq!(avg_after_buys, dec!(10.5));

    let last = state.latest().unwrap();
    assert_eq!(last.realized_pnl, dec!(20));
    assert_eq!(last.cash, dec!(100020));
    assert!(last.positions.is_empty());
    assert_eq!(last.unrealized_pnl, Decimal::ZERO);
    assert_eq!(last.total_exposure, Decimal::ZERO);
    assert_eq!(last.total_pnl(), dec!(20));
    assert_eq!(last.equity(), dec!(100020));
    let first = state.history[0].timestamp.unwrap();
    assert_eq!(last.timestamp, Some(first + chrono::Duration::minutes(4)));
}

#[tokio::test]
async fn test_position_limit_rejections_do_not_halt() {
    let ledger = Ledger::new(LedgerConfig {
        initial_cash: dec!(10000),
        position_limit: Some(dec!(10)),
        ..LedgerConfig::default()
    });
    let setup = SimulationSetup::new(ledger, frictionless(), Duration::ZERO).with_symbol(
        "AAA",
        flat_series("AAA", 4),
        Some(Scripted::new(vec![Signal::Buy; 4], dec!(4))),
    );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    let state = wait_until_stopped(&orchestrator, WAIT).await;

    assert_eq!(state.status, SimulationStatus::Stopped);
    assert!(state.last_error.is_none());
    assert_eq!(state.rejected_trades, 2);
    assert_eq!(state.history.len(), 4);
    assert_eq!(state.latest().unwrap().positions["AAA"].size, dec!(8));
    assert_eq!(state.latest().unwrap().cash, dec!(9200));
}

#[tokio::test]
async fn test_impact_then_slippage() {
    let execution = ExecutionModel::new(dec!(1000), dec!(0.1));
    let ledger = Ledger::new(LedgerConfig {
        slippage: dec!(0.01),
        ..LedgerConfig::default()
    });
    let setup = SimulationSetup::new(ledger, execution.clone(), Duration::ZERO).with_symbol(
        "AAA",
        series("AAA", &[dec!(50)]),
        Some(Scripted::new(vec![Signal::Buy], dec!(100))),
    );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    let state = wait_until_stopped(&orchestrator, WAIT).await;

    let impacted = execution.execute("AAA", dec!(100), dec!(50)).price;
    let expected = impacted * (Decimal::ONE + dec!(0.01));
    let position = &state.latest().unwrap().positions["AAA"];
    // cost basis goes through one multiply/divide, allow for Decimal rounding
    assert!((position.avg_price - expected).abs() < dec!(0.000000001));
    assert!(position.avg_price > dec!(50.5));
}

#[tokio::test]
async fn test_zero_depth_sell_is_skipped_not_fatal() {
    let setup = SimulationSetup::new(
        Ledger::with_cash(dec!(100000)),
        ExecutionModel::new(Decimal::ZERO, dec!(0.001)),
        Duration::ZERO,
    )
    .with_symbol(
        "AAA",
        flat_series("AAA", 4),
        Some(Scripted::new(vec![Signal::Buy, Signal::Sell], dec!(10))),
    );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    let state = wait_until_stopped(&orchestrator, WAIT).await;

    // the sell fill lands below zero and only that trade is dropped
    assert_eq!(state.status, SimulationStatus::Stopped);
    assert!(state.last_error.is_none());
    assert_eq!(state.rejected_trades, 1);
    assert_eq!(state.tick_index, 4);
    assert_eq!(state.history.len(), 4);
    assert_eq!(state.latest().unwrap().positions["AAA"].size, dec!(10));

    let ledger = state.ledger.expect("ledger installed");
    assert_eq!(ledger.history(), state.history.as_slice());
}

#[tokio::test]
async fn test_invalid_price_halts_with_reason() {
    let setup = empty_setup(Duration::ZERO).with_symbol(
        "AAA",
        series("AAA", &[dec!(10), dec!(11), dec!(0), dec!(12)]),
        None,
    );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    let state = wait_until_stopped(&orchestrator, WAIT).await;

    assert_eq!(state.status, SimulationStatus::Stopped);
    assert_eq!(state.history.len(), 2);
    let reason = state.last_error.expect("failure reason recorded");
    assert!(reason.contains("Invalid price"), "unexpected reason: {reason}");
}

#[tokio::test]
async fn test_start_without_symbols_stops_immediately() {
    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(empty_setup(Duration::ZERO)).unwrap();
    orchestrator.start().unwrap();
    let state = wait_until_stopped(&orchestrator, WAIT).await;

    assert_eq!(state.status, SimulationStatus::Stopped);
    assert!(state.history.is_empty());
}

// ============================================================================
// Control surface
// ============================================================================

#[tokio::test]
async fn test_initial_state() {
    let orchestrator = SimulationOrchestrator::new();
    let state = orchestrator.get_state();
    assert_eq!(state.status, SimulationStatus::Idle);
    assert_eq!(state.tick_index, 0);
    assert!(state.history.is_empty());
    assert!(state.ledger.is_none());

    // stop and reset are safe with nothing running
    orchestrator.stop().await;
    orchestrator.reset().unwrap();
    assert_eq!(orchestrator.get_state().status, SimulationStatus::Idle);
}

#[tokio::test]
async fn test_configure_and_reset_conflict_while_running() {
    let setup = empty_setup(Duration::from_millis(20)).with_symbol(
        "AAA",
        flat_series("AAA", 1000),
        None,
    );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    assert!(orchestrator.get_state().is_running());

    let err = orchestrator
        .configure(empty_setup(Duration::ZERO))
        .unwrap_err();
    assert!(matches!(err, SimError::ConfigurationConflict(_)));
    assert!(matches!(
        orchestrator.reset(),
        Err(SimError::ConfigurationConflict(_))
    ));

    // start while running is a no-op
    orchestrator.start().unwrap();

    orchestrator.stop().await;
    assert_eq!(orchestrator.get_state().status, SimulationStatus::Stopped);
    orchestrator.configure(empty_setup(Duration::ZERO)).unwrap();
    assert_eq!(orchestrator.get_state().status, SimulationStatus::Configured);
}

#[tokio::test]
async fn test_stop_interrupts_long_tick_interval() {
    let setup = empty_setup(Duration::from_secs(30)).with_symbol(
        "AAA",
        flat_series("AAA", 100),
        None,
    );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let started = Instant::now();
    orchestrator.stop().await;
    assert!(started.elapsed() < STOP_TIMEOUT);

    let state = orchestrator.get_state();
    assert_eq!(state.status, SimulationStatus::Stopped);
    assert_eq!(state.tick_index, 1);
    assert_eq!(state.history.len(), 1);
}

#[tokio::test]
async fn test_reset_preserves_collaborators() {
    let setup = empty_setup(Duration::ZERO).with_symbol(
        "AAA",
        flat_series("AAA", 3),
        Some(Scripted::new(vec![Signal::Buy], dec!(2))),
    );

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    wait_until_stopped(&orchestrator, WAIT).await;

    orchestrator.reset().unwrap();
    let state = orchestrator.get_state();
    assert_eq!(state.status, SimulationStatus::Idle);
    assert_eq!(state.tick_index, 0);
    assert!(state.history.is_empty());

    let ledger = state.ledger.expect("ledger kept across reset");
    assert!(ledger.history().is_empty());
    assert_eq!(ledger.position("AAA").unwrap().size, dec!(2));

    // the installed feeds still drive a new run
    orchestrator.start().unwrap();
    let rerun = wait_until_stopped(&orchestrator, WAIT).await;
    assert_eq!(rerun.history.len(), 3);
}

#[tokio::test]
async fn test_get_state_is_a_copy() {
    let setup = empty_setup(Duration::ZERO).with_symbol("AAA", flat_series("AAA", 2), None);

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup).unwrap();
    orchestrator.start().unwrap();
    let mut state = wait_until_stopped(&orchestrator, WAIT).await;

    state.history.clear();
    assert_eq!(orchestrator.get_state().history.len(), 2);
}

#[tokio::test]
async fn test_reconfigure_replaces_run() {
    let orchestrator = SimulationOrchestrator::new();
    orchestrator
        .configure(empty_setup(Duration::ZERO).with_symbol("AAA", flat_series("AAA", 5), None))
        .unwrap();
    orchestrator.start().unwrap();
    wait_until_stopped(&orchestrator, WAIT).await;

    orchestrator
        .configure(empty_setup(Duration::ZERO).with_symbol("BBB", flat_series("BBB", 2), None))
        .unwrap();
    let state = orchestrator.get_state();
    assert_eq!(state.tick_index, 0);
    assert!(state.history.is_empty());

    orchestrator.start().unwrap();
    let state = wait_until_stopped(&orchestrator, WAIT).await;
    assert_eq!(state.history.len(), 2);
    assert!(state.history[0].positions.is_empty());
}
