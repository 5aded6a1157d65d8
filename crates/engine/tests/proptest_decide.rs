use proptest::prelude::*;

use common::{CycleContext, MockConfig, Signal, TradeOutcome};
use engine::{decide, Trader};
use mock::MockMarket;

fn any_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Buy), Just(Signal::Sell), Just(Signal::None)]
}

fn any_outcome() -> impl Strategy<Value = TradeOutcome> {
    prop_oneof![
        Just(TradeOutcome::Success),
        Just(TradeOutcome::Failure),
        Just(TradeOutcome::Skipped),
    ]
}

proptest! {
    /// A differential smaller than the threshold never trades.
    #[test]
    fn below_threshold_is_no_deal(
        threshold in 0.0001f64..1.0,
        fraction in 0.0f64..0.999,
        negative in any::<bool>(),
        latest in any_signal(),
    ) {
        let magnitude = threshold * fraction;
        let differential = if negative { -magnitude } else { magnitude };
        prop_assert_eq!(decide(threshold, differential, latest), Signal::None);
    }

    #[test]
    fn agreeing_direction_trades(threshold in 0.0f64..1.0, excess in 0.0f64..1.0) {
        let magnitude = threshold + excess;
        prop_assert_eq!(decide(threshold, magnitude, Signal::Buy), Signal::Buy);
        if magnitude > 0.0 {
            prop_assert_eq!(decide(threshold, -magnitude, Signal::Sell), Signal::Sell);
        }
    }

    #[test]
    fn mismatched_direction_is_no_deal(threshold in 0.0f64..1.0, excess in 0.0001f64..1.0) {
        let magnitude = threshold + excess;
        prop_assert_eq!(decide(threshold, magnitude, Signal::Sell), Signal::None);
        prop_assert_eq!(decide(threshold, -magnitude, Signal::Buy), Signal::None);
        prop_assert_eq!(decide(threshold, magnitude, Signal::None), Signal::None);
        prop_assert_eq!(decide(threshold, -magnitude, Signal::None), Signal::None);
    }

    /// The trader only ever returns what the market reported, or `Skipped`
    /// when it decided not to trade.
    #[test]
    fn trade_returns_the_market_outcome(
        last_trade in any_signal(),
        differential in -1.0f64..1.0,
        result in any_outcome(),
        threshold in 0.0f64..1.0,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (outcome, submitted) = rt.block_on(async {
            let cfg = MockConfig {
                last_trade: Some(last_trade),
                differential: Some(differential),
                trade_result: Some(result),
                ..MockConfig::default()
            };
            let market = MockMarket::new(&cfg, false);
            let submissions = market.submissions_handle();
            let mut trader = Trader::new(Box::new(market), threshold);
            let outcome = trader.trade(&CycleContext::new()).await;
            let submitted = submissions.read().await.len();
            (outcome, submitted)
        });

        let deal = decide(threshold, differential, last_trade.opposite());
        if deal == Signal::None {
            prop_assert_eq!(outcome, TradeOutcome::Skipped);
            prop_assert_eq!(submitted, 0);
        } else {
            prop_assert_eq!(outcome, result);
            prop_assert_eq!(submitted, 1);
        }
    }
}
