//! CSV price loader

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

use super::PriceSeries;
use crate::common::errors::{Result, SimError};
use crate::common::types::PricePoint;

/// One `timestamp,symbol,price` row
#[derive(Debug, Deserialize)]
struct PriceRow {
    timestamp: DateTime<Utc>,
    symbol: String,
    price: Decimal,
}

/// Load a price file, one series per symbol in file order
pub fn load_csv(path: impl AsRef<Path>) -> Result<BTreeMap<String, PriceSeries>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let series = read_csv(file)?;
    info!(
        "Loaded {} symbol(s) from {}",
        series.len(),
        path.display()
    );
    Ok(series)
}

/// Parse `timestamp,symbol,price` rows (with header) from any reader
pub fn read_csv<R: Read>(reader: R) -> Result<BTreeMap<String, PriceSeries>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut series: BTreeMap<String, PriceSeries> = BTreeMap::new();

    for row in csv_reader.deserialize() {
        let row: PriceRow = row?;
        if row.price <= Decimal::ZERO {
            return Err(SimError::InvalidPrice {
                symbol: row.symbol,
                price: row.price,
            });
        }
        series
            .entry(row.symbol.clone())
            .or_insert_with(|| PriceSeries::new(row.symbol, Vec::new()))
            .points
            .push(PricePoint::new(row.timestamp, row.price));
    }

    Ok(series)
}
