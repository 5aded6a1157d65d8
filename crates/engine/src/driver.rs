use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tracing::{error, info, Instrument};

use common::CycleContext;

use crate::trader::Trader;

pub const DEFAULT_WAIT: Duration = Duration::from_secs(1);

/// Runs trading cycles back to back with a pause in between.
pub struct Driver {
    trader: Trader,
    wait: Duration,
}

impl Driver {
    pub fn new(trader: Trader, wait: Duration) -> Self {
        Self { trader, wait }
    }

    /// Loop until `shutdown` resolves. Returns the number of cycles run.
    ///
    /// Each cycle gets a fresh `CycleContext` and runs inside its span. A
    /// cycle is never interrupted; shutdown is honoured during the pause.
    /// A panicking cycle is logged and the loop carries on.
    pub async fn run<F: Future>(mut self, shutdown: F) -> u64 {
        info!(
            wait_ms = self.wait.as_millis() as u64,
            threshold = self.trader.threshold(),
            "driver started"
        );
        tokio::pin!(shutdown);
        let mut cycles = 0u64;

        loop {
            let ctx = CycleContext::new();
            let cycle = AssertUnwindSafe(self.trader.trade(&ctx))
                .catch_unwind()
                .instrument(ctx.span());
            match cycle.await {
                Ok(outcome) => {
                    info!(transaction_id = %ctx.transaction_id, outcome = %outcome, "cycle finished")
                }
                Err(panic) => error!(
                    transaction_id = %ctx.transaction_id,
                    panic = %panic_message(panic.as_ref()),
                    "cycle panicked"
                ),
            }
            cycles += 1;

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(cycles, "shutdown requested, driver stopping");
                    break;
                }
                _ = tokio::time::sleep(self.wait) => {}
            }
        }

        cycles
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use common::{Differential, Market, MockConfig, OrderSide, Result, Signal, TradeOutcome};
    use mock::MockMarket;

    use crate::trader::DEFAULT_THRESHOLD;

    #[tokio::test(start_paused = true)]
    async fn cycles_until_shutdown() {
        let cfg = MockConfig {
            last_trade: Some(Signal::Sell),
            differential: Some(0.5),
            trade_result: Some(TradeOutcome::Success),
            ..MockConfig::default()
        };
        let market = MockMarket::new(&cfg, false);
        let submissions = market.submissions_handle();
        let driver = Driver::new(
            Trader::new(Box::new(market), DEFAULT_THRESHOLD),
            Duration::from_secs(1),
        );

        let cycles = driver
            .run(tokio::time::sleep(Duration::from_millis(2_500)))
            .await;

        assert_eq!(cycles, 3);
        assert_eq!(*submissions.read().await, vec![OrderSide::Buy; 3]);
    }

    /// Panics on the first differential check only.
    struct FlakyMarket {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Market for FlakyMarket {
        async fn check_latest_trade(&mut self, _ctx: &CycleContext) -> Result<Signal> {
            Ok(Signal::None)
        }

        async fn check_differential(&mut self, _ctx: &CycleContext) -> Result<Differential> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("chart feed went away");
            }
            Ok(0.0)
        }

        async fn buy(&mut self, _ctx: &CycleContext) -> Result<TradeOutcome> {
            Ok(TradeOutcome::Success)
        }

        async fn sell(&mut self, _ctx: &CycleContext) -> Result<TradeOutcome> {
            Ok(TradeOutcome::Success)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_cycle_does_not_stop_the_loop() {
        let calls = Arc::new(AtomicUsize::new(0));
        let market = FlakyMarket { calls: calls.clone() };
        let driver = Driver::new(
            Trader::new(Box::new(market), DEFAULT_THRESHOLD),
            Duration::from_secs(1),
        );

        let cycles = driver
            .run(tokio::time::sleep(Duration::from_millis(1_500)))
            .await;

        assert_eq!(cycles, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn panic_messages_are_extracted() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
