use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{redact, DifferentialStrategy, Error, Result, Signal, SlopeEdge, TradeOutcome};

/// Configuration file contents.
///
/// The file is JSON when its extension is `.json`, TOML otherwise. Keys are
/// kebab-case:
///
/// ```toml
/// [bitflyer]
/// key = "..."
/// secret = "..."
/// type = "180"
/// span = 50
/// minimum-trade-size = 0.01
/// strategy = "sma"
///
/// [bitflyer.endpoint]
/// url = "https://api.bitflyer.com"
/// check-collateral = "/v1/me/getbalance"
/// check-board = "/v1/getboard?product_code=FX_BTC_JPY"
/// check-trade = "/v1/me/getchildorders?product_code=FX_BTC_JPY"
/// buy = "/v1/me/sendchildorder"
/// sell = "/v1/me/sendchildorder"
/// cancel = "/v1/me/cancelchildorder"
/// chart = "https://api.cryptowat.ch/markets/bitflyer/btcfxjpy/ohlc"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// Live exchange settings. Required only when the live market is used.
    #[serde(default)]
    pub bitflyer: Option<ExchangeConfig>,
    #[serde(default)]
    pub mock: MockConfig,
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExchangeConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub secret: String,
    pub endpoint: EndpointConfig,
    /// Candle interval selector in the chart response, e.g. "180" for 3 minutes.
    #[serde(rename = "type")]
    pub candle_type: String,
    /// Moving-average window, in candles.
    pub span: usize,
    pub minimum_trade_size: f64,
    #[serde(default)]
    pub strategy: DifferentialStrategy,
    #[serde(default)]
    pub slope_edge: SlopeEdge,
    #[serde(default = "default_product_code")]
    pub product_code: String,
    /// Currency the buy size is paid from.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
    /// Currency held as the open position.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Paths of the exchange endpoints. `chart` is an absolute URL; the others
/// are appended to `url`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct EndpointConfig {
    pub url: String,
    pub check_collateral: String,
    pub check_board: String,
    pub check_trade: String,
    pub buy: String,
    pub sell: String,
    pub cancel: String,
    pub chart: String,
}

/// Canned answers for the mock market. Anything left out is drawn at random
/// from a generator seeded with `seed`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MockConfig {
    /// Direction of the last executed trade (`1` buy, `-1` sell, `0` unknown).
    #[serde(default)]
    pub last_trade: Option<Signal>,
    #[serde(default)]
    pub differential: Option<f64>,
    #[serde(default)]
    pub trade_result: Option<TradeOutcome>,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            last_trade: None,
            differential: None,
            trade_result: None,
            seed: default_seed(),
        }
    }
}

fn default_product_code() -> String {
    "FX_BTC_JPY".to_string()
}

fn default_quote_currency() -> String {
    "JPY".to_string()
}

fn default_base_currency() -> String {
    "BTC".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_seed() -> u64 {
    42
}

impl AppConfig {
    /// Load the configuration file, then apply `BITFLYER_API_KEY` and
    /// `BITFLYER_API_SECRET` from the environment (or a `.env` file).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read '{}': {e}", path.display()))
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut config = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_toml(&content)?
        };

        let _ = dotenvy::dotenv(); // ignore error if .env not present
        if let Some(exchange) = config.bitflyer.as_mut() {
            exchange.apply_env(optional_env("BITFLYER_API_KEY"), optional_env("BITFLYER_API_SECRET"));
        }
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| Error::Config(format!("invalid JSON config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::Config(format!("invalid TOML config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Settings for the live market, or a config error if there are none.
    pub fn exchange(&self) -> Result<&ExchangeConfig> {
        self.bitflyer
            .as_ref()
            .ok_or_else(|| Error::Config("missing [bitflyer] section".to_string()))
    }

    fn validate(&self) -> Result<()> {
        if let Some(exchange) = &self.bitflyer {
            if exchange.span == 0 {
                return Err(Error::Config("span must be at least 1".to_string()));
            }
            if exchange.minimum_trade_size < 0.0 {
                return Err(Error::Config(
                    "minimum-trade-size must not be negative".to_string(),
                ));
            }
            if exchange.endpoint.url.is_empty() {
                return Err(Error::Config("endpoint url is empty".to_string()));
            }
        }
        Ok(())
    }
}

impl ExchangeConfig {
    fn apply_env(&mut self, key: Option<String>, secret: Option<String>) {
        if let Some(key) = key {
            self.key = key;
        }
        if let Some(secret) = secret {
            self.secret = secret;
        }
    }
}

// Credentials stay masked even in debug output.
impl std::fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("key", &redact(&self.key))
            .field("secret", &redact(&self.secret))
            .field("endpoint", &self.endpoint)
            .field("candle_type", &self.candle_type)
            .field("span", &self.span)
            .field("minimum_trade_size", &self.minimum_trade_size)
            .field("strategy", &self.strategy)
            .field("slope_edge", &self.slope_edge)
            .field("product_code", &self.product_code)
            .field("quote_currency", &self.quote_currency)
            .field("base_currency", &self.base_currency)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
