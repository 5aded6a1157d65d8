/// Simple moving average.
///
/// One value per start index `i` in `0..len - span`, each the mean of
/// `prices[i..i + span]`. The final full window is not included, so the
/// result is `len - span` long. Empty when `prices.len() <= span`.
pub fn simple_moving_average(prices: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || prices.len() <= span {
        return Vec::new();
    }
    (0..prices.len() - span)
        .map(|i| window_sum(prices, i, span) / span as f64)
        .collect()
}

/// Smoothed moving average.
///
/// For each start index `i` in `0..len - span`: the window sum plus the price
/// right after the window, divided by `span + 1`. This is not a recursive
/// EMA; it weights the newest price into an otherwise simple average.
pub fn exponential_moving_average(prices: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || prices.len() <= span {
        return Vec::new();
    }
    (0..prices.len() - span)
        .map(|i| (window_sum(prices, i, span) + prices[i + span]) / (span + 1) as f64)
        .collect()
}

fn window_sum(prices: &[f64], start: usize, span: usize) -> f64 {
    prices[start..start + span].iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(|i| i as f64).collect()
    }

    #[test]
    fn sma_window_means() {
        let sma = simple_moving_average(&one_to_ten(), 3);
        assert_eq!(sma.len(), 7);
        assert!((sma[0] - 2.0).abs() < 1e-12);
        for (i, value) in sma.iter().enumerate() {
            let expected = (i as f64 + 1.0 + i as f64 + 2.0 + i as f64 + 3.0) / 3.0;
            assert!((value - expected).abs() < 1e-12, "index {i}: {value} != {expected}");
        }
    }

    #[test]
    fn ema_adds_the_next_price() {
        let ema = exponential_moving_average(&one_to_ten(), 3);
        assert_eq!(ema.len(), 7);
        // (1 + 2 + 3 + 4) / 4
        assert!((ema[0] - 2.5).abs() < 1e-12);
        // (7 + 8 + 9 + 10) / 4
        assert!((ema[6] - 8.5).abs() < 1e-12);
    }

    #[test]
    fn too_short_series_is_empty() {
        assert!(simple_moving_average(&[1.0, 2.0, 3.0], 3).is_empty());
        assert!(exponential_moving_average(&[1.0, 2.0], 3).is_empty());
        assert!(simple_moving_average(&[], 1).is_empty());
    }

    #[test]
    fn zero_span_is_empty() {
        assert!(simple_moving_average(&one_to_ten(), 0).is_empty());
        assert!(exponential_moving_average(&one_to_ten(), 0).is_empty());
    }
}
