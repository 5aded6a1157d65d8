use async_trait::async_trait;

use crate::{CycleContext, Differential, Result, Signal, TradeOutcome};

/// Substituted when `Market::check_latest_trade` fails.
pub const NEUTRAL_SIGNAL: Signal = Signal::None;
/// Substituted when `Market::check_differential` fails.
pub const NEUTRAL_DIFFERENTIAL: Differential = 0.0;
/// Substituted when `Market::buy` or `Market::sell` fails.
pub const NEUTRAL_OUTCOME: TradeOutcome = TradeOutcome::Failure;

/// The capability set the trader needs from a market.
///
/// `LiveMarket` (crates/engine) implements this against the exchange and
/// `MockMarket` (crates/mock) with canned values. The trader is handed one as
/// a `Box<dyn Market>`.
///
/// Every method reports failures as `Err`. Callers substitute the neutral
/// values above, so a failing exchange only ever degrades a cycle to a no-op.
#[async_trait]
pub trait Market: Send {
    /// Which side the next trade should be on, derived from the latest trade:
    /// `Buy` after a sell (or with no history), `Sell` after a buy.
    async fn check_latest_trade(&mut self, ctx: &CycleContext) -> Result<Signal>;

    /// Current trend signal.
    async fn check_differential(&mut self, ctx: &CycleContext) -> Result<Differential>;

    async fn buy(&mut self, ctx: &CycleContext) -> Result<TradeOutcome>;

    async fn sell(&mut self, ctx: &CycleContext) -> Result<TradeOutcome>;
}
