use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::RwLock;
use tracing::{debug, info};

use common::{
    CycleContext, Differential, Market, MockConfig, OrderSide, Result, Signal, TradeOutcome,
};

/// Market with canned answers, for running the trader without an exchange.
///
/// Every value left unset in `MockConfig` is drawn from a seeded RNG, so two
/// runs with the same seed make the same decisions. No order ever leaves the
/// process; submissions are only recorded.
pub struct MockMarket {
    last_trade: Option<Signal>,
    differential: Option<Differential>,
    trade_result: Option<TradeOutcome>,
    dry_run: bool,
    rng: StdRng,
    /// Sides of the orders that `buy`/`sell` would have sent.
    submissions: Arc<RwLock<Vec<OrderSide>>>,
}

impl MockMarket {
    pub fn new(cfg: &MockConfig, dry_run: bool) -> Self {
        info!(
            last_trade = ?cfg.last_trade,
            differential = ?cfg.differential,
            trade_result = ?cfg.trade_result,
            seed = cfg.seed,
            dry_run,
            "MockMarket initialized"
        );
        Self {
            last_trade: cfg.last_trade,
            differential: cfg.differential,
            trade_result: cfg.trade_result,
            dry_run,
            rng: StdRng::seed_from_u64(cfg.seed),
            submissions: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Shared view of the recorded submissions, usable after the market has
    /// been boxed into a trader.
    pub fn submissions_handle(&self) -> Arc<RwLock<Vec<OrderSide>>> {
        self.submissions.clone()
    }

    async fn execute(&mut self, side: OrderSide) -> TradeOutcome {
        if self.dry_run {
            info!(side = %side, "dry-run: mock order not recorded");
            return TradeOutcome::Skipped;
        }
        self.submissions.write().await.push(side);

        let outcome = match self.trade_result {
            Some(outcome) => outcome,
            None => {
                let drawn = TradeOutcome::from_i8(self.rng.random_range(-1..=1));
                debug!(outcome = %drawn, "using random trade result");
                drawn
            }
        };
        info!(side = %side, outcome = %outcome, "mock order executed");
        outcome
    }
}

#[async_trait]
impl Market for MockMarket {
    async fn check_latest_trade(&mut self, _ctx: &CycleContext) -> Result<Signal> {
        let last = match self.last_trade {
            Some(last) => last,
            None => {
                let drawn = Signal::from_i8(self.rng.random_range(-1..=1));
                debug!(last_trade = %drawn, "using random last trade");
                drawn
            }
        };
        let next = last.opposite();
        debug!(last_trade = %last, next = %next, "mock latest trade");
        Ok(next)
    }

    async fn check_differential(&mut self, _ctx: &CycleContext) -> Result<Differential> {
        let differential = match self.differential {
            Some(d) => d,
            None => {
                let drawn = self.rng.random_range(-1.0..=1.0);
                debug!(differential = drawn, "using random differential");
                drawn
            }
        };
        Ok(differential)
    }

    async fn buy(&mut self, _ctx: &CycleContext) -> Result<TradeOutcome> {
        Ok(self.execute(OrderSide::Buy).await)
    }

    async fn sell(&mut self, _ctx: &CycleContext) -> Result<TradeOutcome> {
        Ok(self.execute(OrderSide::Sell).await)
    }
}
