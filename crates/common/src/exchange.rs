use async_trait::async_trait;

use crate::{Balance, ChildOrder, ChildOrderRequest, Result};

/// Abstraction over the exchange's REST surface.
///
/// `BitflyerClient` implements this over HTTP. `LiveMarket` holds one and
/// turns trader decisions into calls on it, so its bookkeeping can be tested
/// against an in-memory exchange.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Trade history, newest first.
    async fn child_orders(&self) -> Result<Vec<ChildOrder>>;

    /// Account balances per currency.
    async fn balances(&self) -> Result<Vec<Balance>>;

    /// Mid price of the order book.
    async fn mid_price(&self) -> Result<f64>;

    /// Recent candle close prices, oldest first.
    async fn close_prices(&self) -> Result<Vec<f64>>;

    /// Submit an order and return the exchange's acceptance id.
    async fn send_child_order(&self, order: &ChildOrderRequest) -> Result<String>;

    /// Cancel an order that has not been filled yet.
    async fn cancel_child_order(&self, child_order_id: &str) -> Result<()>;
}
