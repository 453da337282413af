//! Configuration loader

use config::{Config, Environment, File};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::debug;

use super::types::AppConfig;
use crate::common::errors::{Result, SimError};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with SIM_, nested with `__`,
///    e.g. `SIM_LEDGER__COMMISSION=1.0`)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    // Pick up a local .env before reading the environment
    dotenvy::dotenv().ok();

    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            debug!("Reading configuration file {}", path);
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("SIM")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("simulation.symbols")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let app: AppConfig = config.try_deserialize()?;
    validate(&app)?;
    Ok(app)
}

/// Reject values no simulation can run with
pub fn validate(config: &AppConfig) -> Result<()> {
    if config.ledger.slippage < Decimal::ZERO {
        return Err(SimError::Configuration(format!(
            "slippage must be non-negative, got {}",
            config.ledger.slippage
        )));
    }
    if let Some(limit) = config.ledger.position_limit {
        if limit < Decimal::ZERO {
            return Err(SimError::Configuration(format!(
                "position_limit must be non-negative, got {limit}"
            )));
        }
    }
    if config.execution.depth < Decimal::ZERO {
        return Err(SimError::Configuration(format!(
            "depth must be non-negative, got {}",
            config.execution.depth
        )));
    }
    if config.strategy.order_size <= Decimal::ZERO {
        return Err(SimError::Configuration(format!(
            "order_size must be positive, got {}",
            config.strategy.order_size
        )));
    }
    if config.simulation.symbols.is_empty() {
        return Err(SimError::Configuration(
            "at least one symbol is required".to_string(),
        ));
    }
    Ok(())
}
