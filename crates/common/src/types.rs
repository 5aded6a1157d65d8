use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Signed trend strength. Positive is bullish, negative is bearish, the
/// magnitude is the conviction.
pub type Differential = f64;

/// Direction of a trade: the last one seen in the exchange history, or the one
/// the trader decided on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    /// Unknown direction, or no trade.
    #[default]
    None,
}

impl Signal {
    /// `+1` for buy, `-1` for sell, `0` for none.
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::None => 0,
        }
    }

    /// Maps `+1`/`-1` to buy/sell; every other value is `None`.
    pub fn from_i8(value: i8) -> Self {
        match value {
            1 => Signal::Buy,
            -1 => Signal::Sell,
            _ => Signal::None,
        }
    }

    /// The other side of the market. `None` stays `None`.
    pub fn opposite(self) -> Self {
        match self {
            Signal::Buy => Signal::Sell,
            Signal::Sell => Signal::Buy,
            Signal::None => Signal::None,
        }
    }
}

impl From<OrderSide> for Signal {
    fn from(side: OrderSide) -> Self {
        match side {
            OrderSide::Buy => Signal::Buy,
            OrderSide::Sell => Signal::Sell,
        }
    }
}

impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i8::deserialize(deserializer).map(Signal::from_i8)
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::Buy => write!(f, "buy"),
            Signal::Sell => write!(f, "sell"),
            Signal::None => write!(f, "none"),
        }
    }
}

/// Result of a buy, sell or cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeOutcome {
    Success,
    Failure,
    /// Nothing was submitted: dry-run, or no trade was decided.
    Skipped,
}

impl TradeOutcome {
    pub fn as_i8(self) -> i8 {
        match self {
            TradeOutcome::Success => 1,
            TradeOutcome::Failure => -1,
            TradeOutcome::Skipped => 0,
        }
    }

    pub fn from_i8(value: i8) -> Self {
        match value {
            1 => TradeOutcome::Success,
            -1 => TradeOutcome::Failure,
            _ => TradeOutcome::Skipped,
        }
    }
}

impl<'de> Deserialize<'de> for TradeOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        i8::deserialize(deserializer).map(TradeOutcome::from_i8)
    }
}

impl std::fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeOutcome::Success => write!(f, "success"),
            TradeOutcome::Failure => write!(f, "failure"),
            TradeOutcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Side of an order on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(format!("unknown order side '{other}'")),
        }
    }
}

/// Lifecycle state of a child order as reported by the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChildOrderState {
    Active,
    Completed,
    Canceled,
    Expired,
    Rejected,
    #[serde(other)]
    Other,
}

/// One row of the trade history. The exchange returns these newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildOrder {
    pub child_order_id: String,
    /// Kept raw so that one odd row does not fail the whole history.
    #[serde(default)]
    pub side: String,
    pub child_order_state: ChildOrderState,
    #[serde(default)]
    pub size: f64,
}

impl ChildOrder {
    pub fn order_side(&self) -> Option<OrderSide> {
        self.side.parse().ok()
    }
}

/// Balance of one currency in the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub currency_code: String,
    pub amount: f64,
}

/// A market order to submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildOrderRequest {
    pub product_code: String,
    pub child_order_type: String,
    pub side: OrderSide,
    pub size: f64,
}

impl ChildOrderRequest {
    pub fn market(product_code: impl Into<String>, side: OrderSide, size: f64) -> Self {
        Self {
            product_code: product_code.into(),
            child_order_type: "MARKET".to_string(),
            side,
            size,
        }
    }
}

/// How a differential is derived from the close prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferentialStrategy {
    /// Reversals of the simple moving average slope.
    Sma,
    /// Reversals of the smoothed moving average slope.
    Ema,
    /// Reversals of the raw close-price slope.
    Ticker,
    /// Crossovers of the smoothed average over the simple one.
    Hamster,
    /// Reversal of the SMA slope. The EMA reversal is computed and logged
    /// next to it but does not change the result.
    #[default]
    Combined,
}

impl From<&str> for DifferentialStrategy {
    fn from(key: &str) -> Self {
        match key.to_lowercase().as_str() {
            "sma" => DifferentialStrategy::Sma,
            "ema" => DifferentialStrategy::Ema,
            "ticker" => DifferentialStrategy::Ticker,
            "hamster" => DifferentialStrategy::Hamster,
            _ => DifferentialStrategy::Combined,
        }
    }
}

// Unknown keys fall back to the combined strategy instead of failing the load.
impl<'de> Deserialize<'de> for DifferentialStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(DifferentialStrategy::from(key.as_str()))
    }
}

impl std::fmt::Display for DifferentialStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DifferentialStrategy::Sma => write!(f, "sma"),
            DifferentialStrategy::Ema => write!(f, "ema"),
            DifferentialStrategy::Ticker => write!(f, "ticker"),
            DifferentialStrategy::Hamster => write!(f, "hamster"),
            DifferentialStrategy::Combined => write!(f, "combined"),
        }
    }
}

/// What a slope does at positions whose lagged neighbour lies before the
/// start of the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlopeEdge {
    /// Leave them out.
    #[default]
    Skip,
    /// Read the neighbour from the end of the series, like a negative index.
    Wrap,
}
