use common::SlopeEdge;

/// First differences of a series, divided by `span`.
///
/// `slope[i] = (series[i] - series[i - lag]) / span`. The divisor is the
/// moving-average window the series was built with, not `lag`: the live bot
/// divides by `index - (index - span)` with `span` set to the configured
/// window, which reduces to `span`. A textbook slope over the same data would
/// divide by `lag` instead, so values here are smaller by `span / lag`.
///
/// Positions `i < lag` have no neighbour inside the series:
/// - `SlopeEdge::Skip` leaves them out (`len - lag` values);
/// - `SlopeEdge::Wrap` reads the neighbour from `series[len + i - lag]`, as a
///   negative array index would (`len` values). The leading values then
///   compare the oldest average against the newest ones.
///
/// Empty when `lag` or `span` is zero or `lag` is not shorter than the series.
pub fn slope(series: &[f64], lag: usize, span: usize, edge: SlopeEdge) -> Vec<f64> {
    let len = series.len();
    if lag == 0 || span == 0 || lag >= len {
        return Vec::new();
    }
    let divisor = span as f64;
    let first = match edge {
        SlopeEdge::Skip => lag,
        SlopeEdge::Wrap => 0,
    };
    (first..len)
        .map(|i| {
            let previous = if i >= lag { i - lag } else { len + i - lag };
            (series[i] - series[previous]) / divisor
        })
        .collect()
}
