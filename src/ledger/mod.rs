//! Position and profit-and-loss ledger
//!
//! - Trades are all-or-nothing: a rejected trade leaves cash, positions and
//!   realized PnL untouched
//! - Cost basis is a size-weighted average that only moves on trades that
//!   grow a position
//! - Mark-to-market produces immutable [`Snapshot`]s; the ordered snapshot
//!   history is the audit trail

mod accounting;
mod types;

pub use accounting::Ledger;
pub use types::{Position, Snapshot, Trade};
