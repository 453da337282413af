//! tick-sim - Main Entry Point
//!
//! Runs a moving-average crossover simulation over generated or loaded price
//! series and optionally persists the snapshot history.

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use tick_sim::config::loader::load_config;
use tick_sim::feed::{generator, load_csv, BoxedPriceSource, PriceSeries};
use tick_sim::{
    ExecutionModel, Ledger, MovingAverageCrossover, SimulationOrchestrator, SimulationSetup,
    SimulationStatus,
};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// CSV price file with `timestamp,symbol,price` rows; prices are
    /// generated when omitted
    #[arg(long)]
    prices: Option<String>,

    /// Comma-separated list of symbols to generate prices for
    #[arg(long)]
    symbols: Option<String>,

    /// Append the snapshot history to this CSV file
    #[arg(short, long)]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    let mut config = load_config(Some(&args.config)).context("loading configuration")?;
    if let Some(symbols) = &args.symbols {
        config.simulation.symbols = symbols
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    // Initialize logging
    let log_level = args.log_level.as_deref().unwrap_or(&config.settings.log_level);
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting tick-sim");
    info!("Configuration file: {}", args.config);

    let series: Vec<PriceSeries> = match &args.prices {
        Some(path) => load_csv(path)
            .with_context(|| format!("loading prices from {path}"))?
            .into_values()
            .collect(),
        None => generator::generate_many(&config.simulation.symbols, &config.generator)?,
    };

    let mut feeds: BTreeMap<String, BoxedPriceSource> = BTreeMap::new();
    let mut setup = SimulationSetup::new(
        Ledger::new(config.ledger.clone()),
        ExecutionModel::from_config(&config.execution),
        config.simulation.tick_interval(),
    );
    for s in series {
        setup
            .strategies
            .insert(s.symbol.clone(), Box::new(MovingAverageCrossover::from_config(&config.strategy)));
        feeds.insert(s.symbol.clone(), Box::new(s));
    }
    setup.feeds = feeds;

    let orchestrator = SimulationOrchestrator::new();
    orchestrator.configure(setup)?;
    orchestrator.start()?;

    // Poll until the run ends on its own or the user interrupts it
    let poll = config.simulation.tick_interval().max(Duration::from_millis(50));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("Received shutdown signal, stopping simulation...");
                break;
            }
            _ = tokio::time::sleep(poll) => {
                if orchestrator.get_state().status != SimulationStatus::Running {
                    break;
                }
            }
        }
    }
    orchestrator.stop().await;

    let state = orchestrator.get_state();
    if let Some(error) = &state.last_error {
        warn!("Simulation halted with error: {}", error);
    }
    match state.latest() {
        Some(last) => info!(
            ticks = state.tick_index,
            rejected_trades = state.rejected_trades,
            cash = %last.cash,
            realized_pnl = %last.realized_pnl,
            unrealized_pnl = %last.unrealized_pnl,
            total_exposure = %last.total_exposure,
            total_pnl = %last.total_pnl(),
            equity = %last.equity(),
            "Final snapshot"
        ),
        None => warn!("No ticks were processed"),
    }

    let output = args.output.or(config.settings.history_path);
    if let Some(path) = output {
        tick_sim::sink::write_history(&path, &state.history)
            .with_context(|| format!("writing history to {path}"))?;
    }

    Ok(())
}
