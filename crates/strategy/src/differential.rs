use tracing::debug;

use common::{Differential, DifferentialStrategy, ExchangeConfig, SlopeEdge};

use crate::indicators::{
    detect_reversal, exponential_moving_average, latest_signal, simple_moving_average, slope,
};

/// Slopes compare each average with its direct predecessor.
const SLOPE_LAG: usize = 1;

/// Turns a close-price series into a differential with one of the
/// configured strategies.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialIndicator {
    pub strategy: DifferentialStrategy,
    pub span: usize,
    pub edge: SlopeEdge,
}

impl DifferentialIndicator {
    pub fn new(strategy: DifferentialStrategy, span: usize, edge: SlopeEdge) -> Self {
        Self { strategy, span, edge }
    }

    pub fn from_config(cfg: &ExchangeConfig) -> Self {
        Self::new(cfg.strategy, cfg.span, cfg.slope_edge)
    }

    /// Compute the differential from close prices (oldest first).
    /// Returns `0.0` when the series is too short to show any reversal.
    pub fn compute(&self, closes: &[f64]) -> Differential {
        let differential = match self.strategy {
            DifferentialStrategy::Sma => self.reversal_of(&simple_moving_average(closes, self.span)),
            DifferentialStrategy::Ema => {
                self.reversal_of(&exponential_moving_average(closes, self.span))
            }
            DifferentialStrategy::Ticker => self.reversal_of(closes),
            DifferentialStrategy::Hamster => self.crossover(closes),
            // The SMA reversal decides; the EMA one is only reported.
            DifferentialStrategy::Combined => {
                let sma = self.reversal_of(&simple_moving_average(closes, self.span));
                let ema = self.reversal_of(&exponential_moving_average(closes, self.span));
                debug!(sma, ema, "combined differential parts");
                sma
            }
        };
        debug!(
            strategy = %self.strategy,
            span = self.span,
            closes = closes.len(),
            differential,
            "differential computed"
        );
        differential
    }

    fn reversal_of(&self, series: &[f64]) -> Differential {
        let slopes = slope(series, SLOPE_LAG, self.span, self.edge);
        let reversals = detect_reversal(&slopes);
        debug!(slopes = slopes.len(), reversals = ?reversals, "slope reversals");
        latest_signal(&reversals)
    }

    // A flip of the EMA - SMA spread is the smoothed line crossing the simple one.
    fn crossover(&self, closes: &[f64]) -> Differential {
        let sma = simple_moving_average(closes, self.span);
        let ema = exponential_moving_average(closes, self.span);
        let spread: Vec<f64> = ema.iter().zip(&sma).map(|(e, s)| e - s).collect();
        latest_signal(&detect_reversal(&spread))
    }
}

/// One-off differential without keeping an indicator around.
pub fn compute_differential(
    strategy: DifferentialStrategy,
    closes: &[f64],
    span: usize,
    edge: SlopeEdge,
) -> Differential {
    DifferentialIndicator::new(strategy, span, edge).compute(closes)
}
