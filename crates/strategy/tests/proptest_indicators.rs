use proptest::prelude::*;

use common::{DifferentialStrategy, SlopeEdge};
use strategy::indicators::{
    detect_reversal, exponential_moving_average, latest_signal, simple_moving_average, slope,
};
use strategy::DifferentialIndicator;

fn prices() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.01f64..10_000_000.0f64, 0..120)
}

fn any_strategy() -> impl Strategy<Value = DifferentialStrategy> {
    prop_oneof![
        Just(DifferentialStrategy::Sma),
        Just(DifferentialStrategy::Ema),
        Just(DifferentialStrategy::Ticker),
        Just(DifferentialStrategy::Hamster),
        Just(DifferentialStrategy::Combined),
    ]
}

proptest! {
    #[test]
    fn moving_averages_have_len_minus_span_values(prices in prices(), span in 1usize..20) {
        let expected = prices.len().saturating_sub(span);
        prop_assert_eq!(simple_moving_average(&prices, span).len(), expected);
        prop_assert_eq!(exponential_moving_average(&prices, span).len(), expected);
    }

    #[test]
    fn sma_stays_within_the_price_range(prices in prices(), span in 1usize..20) {
        let lo = prices.iter().cloned().fold(f64::INFINITY, f64::min);
        let hi = prices.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        for value in simple_moving_average(&prices, span) {
            prop_assert!(value >= lo * (1.0 - 1e-9) && value <= hi * (1.0 + 1e-9));
        }
    }

    #[test]
    fn reversal_is_one_shorter_than_slope(series in prices(), span in 1usize..10) {
        let slopes = slope(&series, 1, span, SlopeEdge::Skip);
        let reversals = detect_reversal(&slopes);
        prop_assert_eq!(reversals.len(), slopes.len().saturating_sub(1));
        prop_assert!(reversals.iter().all(|r| (-1..=1).contains(r)));
    }

    #[test]
    fn wrap_keeps_every_position(series in prices()) {
        let wrapped = slope(&series, 1, 1, SlopeEdge::Wrap);
        let skipped = slope(&series, 1, 1, SlopeEdge::Skip);
        if series.len() > 1 {
            prop_assert_eq!(wrapped.len(), series.len());
            prop_assert_eq!(&wrapped[1..], &skipped[..]);
        } else {
            prop_assert!(wrapped.is_empty());
        }
    }

    #[test]
    fn latest_signal_is_a_reversal_value(reversals in prop::collection::vec(-1i8..=1, 0..50)) {
        let signal = latest_signal(&reversals);
        prop_assert!(signal == -1.0 || signal == 0.0 || signal == 1.0);
        if let Some(&last_flip) = reversals.iter().rev().find(|&&r| r != 0) {
            prop_assert_eq!(signal, f64::from(last_flip));
        }
    }

    #[test]
    fn differential_is_bounded(
        prices in prices(),
        span in 1usize..30,
        strategy in any_strategy(),
        wrap in any::<bool>(),
    ) {
        let edge = if wrap { SlopeEdge::Wrap } else { SlopeEdge::Skip };
        let differential = DifferentialIndicator::new(strategy, span, edge).compute(&prices);
        prop_assert!((-1.0..=1.0).contains(&differential));
    }
}
