use async_trait::async_trait;
use tracing::{debug, info, warn};

use common::{
    ChildOrderRequest, ChildOrderState, CycleContext, Differential, Error, ExchangeApi,
    ExchangeConfig, Market, OrderSide, Result, Signal, TradeOutcome,
};
use strategy::DifferentialIndicator;

/// Market backed by a real exchange.
///
/// Holds the id of the latest order if the last history check found it still
/// ACTIVE. While that id is set, `buy` and `sell` cancel it instead of
/// submitting anything new.
pub struct LiveMarket<A: ExchangeApi> {
    api: A,
    indicator: DifferentialIndicator,
    product_code: String,
    quote_currency: String,
    base_currency: String,
    minimum_trade_size: f64,
    dry_run: bool,
    pending_cancel: Option<String>,
}

impl<A: ExchangeApi> LiveMarket<A> {
    pub fn new(api: A, cfg: &ExchangeConfig, dry_run: bool) -> Self {
        info!(
            strategy = %cfg.strategy,
            span = cfg.span,
            minimum_trade_size = cfg.minimum_trade_size,
            dry_run,
            "LiveMarket initialized"
        );
        Self {
            api,
            indicator: DifferentialIndicator::from_config(cfg),
            product_code: cfg.product_code.clone(),
            quote_currency: cfg.quote_currency.clone(),
            base_currency: cfg.base_currency.clone(),
            minimum_trade_size: cfg.minimum_trade_size,
            dry_run,
            pending_cancel: None,
        }
    }

    /// Id of the unfilled order that the next buy or sell will cancel.
    pub fn pending_cancellation(&self) -> Option<&str> {
        self.pending_cancel.as_deref()
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Cancel the pending order. Clears it once the exchange acknowledges.
    pub async fn cancel(&mut self, ctx: &CycleContext) -> Result<TradeOutcome> {
        let Some(id) = self.pending_cancel.clone() else {
            debug!("no pending order to cancel");
            return Ok(TradeOutcome::Skipped);
        };
        if self.dry_run {
            info!(child_order_id = %id, "dry-run: cancel not submitted");
            return Ok(TradeOutcome::Skipped);
        }

        match self.api.cancel_child_order(&id).await {
            Ok(()) => {
                info!(child_order_id = %id, elapsed_ms = ctx.elapsed_ms(), "order cancelled");
                self.pending_cancel = None;
                Ok(TradeOutcome::Success)
            }
            Err(e) => {
                warn!(child_order_id = %id, error = %e, "failed to cancel order");
                Err(e)
            }
        }
    }

    async fn balance_of(&self, currency: &str) -> Result<f64> {
        let balances = self.api.balances().await?;
        let amount = balances
            .iter()
            .find(|b| b.currency_code == currency)
            .map(|b| b.amount)
            .unwrap_or(0.0);
        debug!(currency, amount, "balance");
        Ok(amount)
    }

    async fn buy_size(&self) -> Result<f64> {
        let mid_price = self.api.mid_price().await?;
        let collateral = self.balance_of(&self.quote_currency).await?;
        let size = deal_size(mid_price, collateral, self.minimum_trade_size)?;
        info!(mid_price, collateral, size, "buy size computed");
        Ok(size)
    }

    /// Submit a market order of `size`, which may have failed to compute.
    /// In dry-run nothing is sent and the outcome is `Skipped`, whether or
    /// not the size could be read.
    async fn submit(
        &self,
        ctx: &CycleContext,
        side: OrderSide,
        size: Result<f64>,
    ) -> Result<TradeOutcome> {
        if self.dry_run {
            match &size {
                Ok(size) => info!(side = %side, size, "dry-run: order not submitted"),
                Err(e) => warn!(
                    side = %side,
                    error = %e,
                    "dry-run: size unavailable, order not submitted"
                ),
            }
            return Ok(TradeOutcome::Skipped);
        }
        let size = size?;
        if size <= 0.0 {
            warn!(side = %side, size, "nothing to trade, order not submitted");
            return Ok(TradeOutcome::Failure);
        }

        let order = ChildOrderRequest::market(&self.product_code, side, size);
        let acceptance_id = self.api.send_child_order(&order).await?;
        info!(
            side = %side,
            size,
            child_order_acceptance_id = %acceptance_id,
            elapsed_ms = ctx.elapsed_ms(),
            "order submitted"
        );
        Ok(TradeOutcome::Success)
    }
}

/// Buy size: the quote collateral converted at `mid_price`, raised to the
/// exchange minimum.
pub fn deal_size(mid_price: f64, collateral: f64, minimum: f64) -> Result<f64> {
    if !(mid_price > 0.0) {
        return Err(Error::MalformedResponse(format!(
            "mid price must be positive, got {mid_price}"
        )));
    }
    Ok((collateral / mid_price).max(minimum))
}

#[async_trait]
impl<A: ExchangeApi> Market for LiveMarket<A> {
    async fn check_latest_trade(&mut self, _ctx: &CycleContext) -> Result<Signal> {
        let orders = match self.api.child_orders().await {
            Ok(orders) => orders,
            Err(e) => {
                self.pending_cancel = None;
                return Err(e);
            }
        };

        let latest = orders.into_iter().find(|o| {
            matches!(
                o.child_order_state,
                ChildOrderState::Active | ChildOrderState::Completed
            )
        });
        let Some(latest) = latest else {
            self.pending_cancel = None;
            info!("no trade history, first deal is a buy");
            return Ok(Signal::Buy);
        };

        // One assignment: an ACTIVE order becomes the pending cancellation,
        // anything else clears it.
        self.pending_cancel = match latest.child_order_state {
            ChildOrderState::Active => Some(latest.child_order_id.clone()),
            _ => None,
        };

        let side = latest.order_side().ok_or_else(|| {
            Error::MalformedResponse(format!("unknown side on latest trade: {latest:?}"))
        })?;
        let next = Signal::from(side).opposite();
        info!(
            latest_side = %side,
            state = ?latest.child_order_state,
            pending_cancel = ?self.pending_cancel,
            next = %next,
            "latest trade checked"
        );
        Ok(next)
    }

    async fn check_differential(&mut self, _ctx: &CycleContext) -> Result<Differential> {
        let closes = self.api.close_prices().await?;
        debug!(closes = closes.len(), "close prices fetched");
        Ok(self.indicator.compute(&closes))
    }

    async fn buy(&mut self, ctx: &CycleContext) -> Result<TradeOutcome> {
        if self.pending_cancel.is_some() {
            info!("unfilled order pending, cancelling instead of buying");
            return self.cancel(ctx).await;
        }

        let size = self.buy_size().await;
        self.submit(ctx, OrderSide::Buy, size).await
    }

    async fn sell(&mut self, ctx: &CycleContext) -> Result<TradeOutcome> {
        if self.pending_cancel.is_some() {
            info!("unfilled order pending, cancelling instead of selling");
            return self.cancel(ctx).await;
        }

        let size = self.balance_of(&self.base_currency).await;
        if let Ok(size) = &size {
            info!(size, "sell size is the open position");
        }
        self.submit(ctx, OrderSide::Sell, size).await
    }
}
