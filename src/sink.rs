//! Snapshot persistence
//!
//! Writes snapshot history as flat CSV rows, one per snapshot, with the
//! position map embedded as a JSON value. Appends to an existing file and only
//! writes the header when the file is new or empty.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::common::errors::Result;
use crate::ledger::Snapshot;

/// Flat CSV representation of a [`Snapshot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRow {
    pub tick: Option<usize>,
    pub timestamp: Option<DateTime<Utc>>,
    pub cash: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_exposure: Decimal,
    /// JSON object of symbol -> position
    pub positions: String,
}

impl SnapshotRow {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self> {
        Ok(Self {
            tick: snapshot.tick,
            timestamp: snapshot.timestamp,
            cash: snapshot.cash,
            realized_pnl: snapshot.realized_pnl,
            unrealized_pnl: snapshot.unrealized_pnl,
            total_exposure: snapshot.total_exposure,
            positions: serde_json::to_string(&snapshot.positions)?,
        })
    }
}

/// Write `history` as CSV rows to any writer
///
/// `with_header` controls whether the column header is emitted first.
pub fn write_rows<W: Write>(writer: W, history: &[Snapshot], with_header: bool) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(with_header)
        .from_writer(writer);
    for snapshot in history {
        csv_writer.serialize(SnapshotRow::from_snapshot(snapshot)?)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Append `history` to the CSV file at `path`, creating it if needed
pub fn write_history(path: impl AsRef<Path>, history: &[Snapshot]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let is_empty = file.metadata()?.len() == 0;
    write_rows(file, history, is_empty)?;

    info!("Wrote {} snapshot(s) to {}", history.len(), path.display());
    Ok(())
}
