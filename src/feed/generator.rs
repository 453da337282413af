//! Synthetic price generation
//!
//! A seeded random walk with occasional jumps. The same configuration always
//! produces the same series, so simulation runs are replayable.

use chrono::{Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::debug;

use super::PriceSeries;
use crate::common::errors::{Result, SimError};
use crate::common::types::PricePoint;
use crate::config::types::GeneratorConfig;

/// Generated prices never fall below this
const PRICE_FLOOR: Decimal = dec!(0.000001);

/// Decimal places kept on generated prices
const PRICE_SCALE: u32 = 6;

/// Generate one series
///
/// Each step applies `r ~ N(mu, sigma)`, plus `N(0, jump_scale)` with
/// probability `jump_prob`, as `p[i] = p[i - 1] * (1 + r)`.
pub fn generate(symbol: &str, config: &GeneratorConfig) -> Result<PriceSeries> {
    let step_dist = Normal::new(config.mu, config.sigma)
        .map_err(|e| SimError::Configuration(format!("invalid sigma {}: {e}", config.sigma)))?;
    let jump_dist = Normal::new(0.0, config.jump_scale).map_err(|e| {
        SimError::Configuration(format!("invalid jump_scale {}: {e}", config.jump_scale))
    })?;
    let start = Utc
        .timestamp_opt(config.start_timestamp, 0)
        .single()
        .ok_or_else(|| {
            SimError::Configuration(format!("invalid start_timestamp {}", config.start_timestamp))
        })?;
    let step = Duration::try_seconds(config.step_seconds).ok_or_else(|| {
        SimError::Configuration(format!("step_seconds {} out of range", config.step_seconds))
    })?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut points = Vec::with_capacity(config.points);
    let mut price = config.start_price;

    for i in 0..config.points {
        if i > 0 {
            let mut ret = step_dist.sample(&mut rng);
            if rng.gen::<f64>() < config.jump_prob {
                ret += jump_dist.sample(&mut rng);
            }
            price *= 1.0 + ret;
        }
        let value = Decimal::from_f64(price)
            .ok_or_else(|| SimError::Internal(format!("generated price {price} is not representable")))?
            .round_dp(PRICE_SCALE)
            .max(PRICE_FLOOR);
        let timestamp = i32::try_from(i)
            .ok()
            .and_then(|i| step.checked_mul(i))
            .and_then(|offset| start.checked_add_signed(offset))
            .ok_or_else(|| {
                SimError::Configuration(format!(
                    "timestamp of point {i} overflows (start {}, step {}s)",
                    config.start_timestamp, config.step_seconds
                ))
            })?;
        points.push(PricePoint::new(timestamp, value));
    }

    debug!(symbol, points = points.len(), seed = config.seed, "generated price series");
    Ok(PriceSeries::new(symbol, points))
}

/// Generate one series per symbol, each with its own derived seed
pub fn generate_many(symbols: &[String], config: &GeneratorConfig) -> Result<Vec<PriceSeries>> {
    symbols
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            let per_symbol = GeneratorConfig {
                seed: config.seed.wrapping_add(i as u64),
                ..config.clone()
            };
            generate(symbol, &per_symbol)
        })
        .collect()
}
