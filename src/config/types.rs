//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Run loop configuration
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Ledger accounting and constraints
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Market impact model
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Moving-average crossover parameters applied to every symbol
    #[serde(default)]
    pub strategy: StrategyConfig,
    /// Synthetic price generation, used when no price file is given
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Run loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Delay between ticks in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Symbols to simulate when generating prices
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            symbols: default_symbols(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    10
}

fn default_symbols() -> Vec<String> {
    vec!["SYM".to_string()]
}

/// Ledger accounting and constraints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Starting cash balance
    #[serde(default = "default_initial_cash")]
    pub initial_cash: Decimal,
    /// Flat commission charged per trade
    #[serde(default)]
    pub commission: Decimal,
    /// Fractional price penalty applied against the trade initiator
    #[serde(default)]
    pub slippage: Decimal,
    /// Maximum absolute position per symbol (None = unlimited)
    #[serde(default)]
    pub position_limit: Option<Decimal>,
    /// Whether a sell on a flat book may open a short position
    #[serde(default)]
    pub allow_short: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_cash: default_initial_cash(),
            commission: Decimal::ZERO,
            slippage: Decimal::ZERO,
            position_limit: None,
            allow_short: false,
        }
    }
}

fn default_initial_cash() -> Decimal {
    dec!(100000)
}

/// Market impact model parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Liquidity proxy; larger depth means less impact
    #[serde(default = "default_depth")]
    pub depth: Decimal,
    /// Relative impact coefficient
    #[serde(default = "default_spread")]
    pub spread: Decimal,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            spread: default_spread(),
        }
    }
}

fn default_depth() -> Decimal {
    dec!(1000)
}

fn default_spread() -> Decimal {
    dec!(0.001)
}

/// Moving-average crossover parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default = "default_short_window")]
    pub short_window: usize,
    #[serde(default = "default_long_window")]
    pub long_window: usize,
    /// Unsigned quantity traded per signal
    #[serde(default = "default_order_size")]
    pub order_size: Decimal,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            short_window: default_short_window(),
            long_window: default_long_window(),
            order_size: default_order_size(),
        }
    }
}

fn default_short_window() -> usize {
    20
}

fn default_long_window() -> usize {
    50
}

fn default_order_size() -> Decimal {
    dec!(10)
}

/// Synthetic random-walk price generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of points per symbol
    #[serde(default = "default_points")]
    pub points: usize,
    #[serde(default = "default_start_price")]
    pub start_price: f64,
    /// Mean per-step return
    #[serde(default)]
    pub mu: f64,
    /// Standard deviation of the per-step return
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Probability of a jump on any step
    #[serde(default = "default_jump_prob")]
    pub jump_prob: f64,
    /// Standard deviation of a jump
    #[serde(default = "default_jump_scale")]
    pub jump_scale: f64,
    /// Unix timestamp (seconds) of the first point
    #[serde(default = "default_start_timestamp")]
    pub start_timestamp: i64,
    /// Seconds between consecutive points
    #[serde(default = "default_step_seconds")]
    pub step_seconds: i64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            points: default_points(),
            start_price: default_start_price(),
            mu: 0.0,
            sigma: default_sigma(),
            seed: default_seed(),
            jump_prob: default_jump_prob(),
            jump_scale: default_jump_scale(),
            start_timestamp: default_start_timestamp(),
            step_seconds: default_step_seconds(),
        }
    }
}

fn default_points() -> usize {
    1000
}

fn default_start_price() -> f64 {
    100.0
}

fn default_sigma() -> f64 {
    0.01
}

fn default_seed() -> u64 {
    42
}

fn default_jump_prob() -> f64 {
    0.001
}

fn default_jump_scale() -> f64 {
    0.05
}

// 2025-01-01T00:00:00Z
fn default_start_timestamp() -> i64 {
    1_735_689_600
}

fn default_step_seconds() -> i64 {
    60
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Where to persist snapshot history after a run (optional)
    #[serde(default)]
    pub history_path: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            history_path: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
