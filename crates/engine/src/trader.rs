use tracing::{info, warn};

use common::{
    CycleContext, Differential, Market, Signal, TradeOutcome, NEUTRAL_DIFFERENTIAL,
    NEUTRAL_OUTCOME, NEUTRAL_SIGNAL,
};

pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Decide whether to trade this cycle.
///
/// `latest` is the side the trade history allows next. A trade happens only
/// when the differential is at least `threshold` in magnitude and points the
/// same way: a non-negative differential for `Buy`, a negative one for `Sell`.
pub fn decide(threshold: f64, differential: Differential, latest: Signal) -> Signal {
    if differential.abs() < threshold {
        info!(threshold, differential, "|differential| below threshold, no deal");
        return Signal::None;
    }

    match latest {
        Signal::Buy if differential >= 0.0 => Signal::Buy,
        Signal::Sell if differential < 0.0 => Signal::Sell,
        _ => {
            info!(differential, latest = %latest, "latest trade and differential mismatch, no deal");
            Signal::None
        }
    }
}

/// Runs one decision cycle against a market.
pub struct Trader {
    market: Box<dyn Market>,
    threshold: f64,
}

impl Trader {
    pub fn new(market: Box<dyn Market>, threshold: f64) -> Self {
        info!(threshold, "Trader initialized");
        Self { market, threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Check, decide and act once. Adapter failures degrade to the neutral
    /// values, so this always yields an outcome.
    pub async fn trade(&mut self, ctx: &CycleContext) -> TradeOutcome {
        let latest = self.market.check_latest_trade(ctx).await.unwrap_or_else(|e| {
            warn!(error = %e, "latest trade check failed");
            NEUTRAL_SIGNAL
        });
        info!(latest = %latest, "latest trade");

        let differential = self.market.check_differential(ctx).await.unwrap_or_else(|e| {
            warn!(error = %e, "differential check failed");
            NEUTRAL_DIFFERENTIAL
        });
        info!(differential, "differential");

        let deal = decide(self.threshold, differential, latest);
        info!(deal = %deal, "decision");

        let result = match deal {
            Signal::Buy => self.market.buy(ctx).await,
            Signal::Sell => self.market.sell(ctx).await,
            Signal::None => Ok(TradeOutcome::Skipped),
        };
        let outcome = result.unwrap_or_else(|e| {
            warn!(deal = %deal, error = %e, "deal failed");
            NEUTRAL_OUTCOME
        });

        info!(outcome = %outcome, elapsed_ms = ctx.elapsed_ms(), "deal result");
        outcome
    }
}
