pub mod config;
pub mod context;
pub mod error;
pub mod exchange;
pub mod market;
pub mod types;

pub use config::{AppConfig, EndpointConfig, ExchangeConfig, MockConfig};
pub use context::{redact, CycleContext};
pub use error::{Error, Result};
pub use exchange::ExchangeApi;
pub use market::{Market, NEUTRAL_DIFFERENTIAL, NEUTRAL_OUTCOME, NEUTRAL_SIGNAL};
pub use types::*;
