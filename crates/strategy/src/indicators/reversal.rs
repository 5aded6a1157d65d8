/// Marks sign flips between consecutive slopes.
///
/// One entry per adjacent pair `(s[i], s[i + 1])`: `1` when the slope turns
/// from negative to positive, `-1` when it turns from positive to negative,
/// `0` otherwise (including any pair touching zero).
pub fn detect_reversal(slopes: &[f64]) -> Vec<i8> {
    slopes
        .windows(2)
        .map(|pair| {
            if pair[0] < 0.0 && pair[1] > 0.0 {
                1
            } else if pair[0] > 0.0 && pair[1] < 0.0 {
                -1
            } else {
                0
            }
        })
        .collect()
}

/// Collapses a reversal series into one differential.
///
/// The most recent non-zero reversal wins over a later run of zeros. Without
/// any reversal this is the last entry (always `0`), and `0` for an empty
/// series.
pub fn latest_signal(reversals: &[i8]) -> f64 {
    reversals
        .iter()
        .rev()
        .find(|&&r| r != 0)
        .or(reversals.last())
        .map(|&r| f64::from(r))
        .unwrap_or(0.0)
}
