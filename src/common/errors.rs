//! Error types for the simulator

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type alias using our SimError
pub type Result<T> = std::result::Result<T, SimError>;

/// Main error type for simulation operations
#[derive(Error, Debug)]
pub enum SimError {
    /// Trade would push the absolute position past the configured limit
    #[error("Position limit exceeded for {symbol}: prospective size {prospective} > limit {limit}")]
    PositionLimitExceeded {
        symbol: String,
        prospective: Decimal,
        limit: Decimal,
    },

    /// Reducing trade is larger than the held position
    #[error("Insufficient position in {symbol}: held {held}, requested {requested}")]
    InsufficientPosition {
        symbol: String,
        held: Decimal,
        requested: Decimal,
    },

    /// Reconfiguration attempted while the simulation is running
    #[error("Configuration conflict: {0}")]
    ConfigurationConflict(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Price that cannot be traded or marked against
    #[error("Invalid price for {symbol}: {price}")]
    InvalidPrice { symbol: String, price: Decimal },

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimError {
    /// Trade rejections that only cancel the attempted trade.
    ///
    /// The orchestrator discards the trade for the current tick and keeps
    /// running; every other variant halts the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimError::PositionLimitExceeded { .. } | SimError::InsufficientPosition { .. }
        )
    }
}

impl From<config::ConfigError> for SimError {
    fn from(err: config::ConfigError) -> Self {
        SimError::Configuration(err.to_string())
    }
}
