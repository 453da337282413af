use rust_decimal::Decimal;

use crate::common::types::Signal;

/// Core strategy trait
///
/// A strategy is a per-symbol signal source. It receives one price per tick
/// and emits a [`Signal`]; the orchestrator turns `Buy`/`Sell` into a signed
/// order of [`Strategy::order_size`] units.
///
/// # Implementation Notes
///
/// - `on_price` should be fast - no blocking I/O, it runs under the
///   orchestrator's state lock
/// - Internal state (price history, indicators) is owned by the strategy
/// - Output must be deterministic for a given price sequence so that runs
///   are replayable
///
/// # Example
///
/// ```ignore
/// struct AlwaysBuy;
///
/// impl Strategy for AlwaysBuy {
///     fn name(&self) -> &str { "always_buy" }
///
///     fn on_price(&mut self, _price: Decimal) -> Signal {
///         Signal::Buy
///     }
///
///     fn order_size(&self) -> Decimal { dec!(1) }
/// }
/// ```
pub trait Strategy: Send + Sync {
    /// Unique identifier for this strategy
    fn name(&self) -> &str;

    /// Called once per tick with the symbol's current price
    fn on_price(&mut self, price: Decimal) -> Signal;

    /// Unsigned quantity to trade when a signal fires
    fn order_size(&self) -> Decimal;
}

/// Boxed strategy for dynamic dispatch
pub type BoxedStrategy = Box<dyn Strategy>;
