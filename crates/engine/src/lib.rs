pub mod bitflyer;
pub mod driver;
pub mod market;
pub mod trader;

pub use bitflyer::BitflyerClient;
pub use driver::{Driver, DEFAULT_WAIT};
pub use market::LiveMarket;
pub use trader::{decide, Trader, DEFAULT_THRESHOLD};
