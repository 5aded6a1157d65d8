use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::{debug, info};

use common::{
    redact, Balance, ChildOrder, ChildOrderRequest, EndpointConfig, Error, ExchangeApi,
    ExchangeConfig, OrderSide, Result,
};

/// Column of the close price in a chart row:
/// `[CloseTime, OpenPrice, HighPrice, LowPrice, ClosePrice, Volume, QuoteVolume]`.
const CLOSE_COLUMN: usize = 4;

/// REST API client for bitFlyer Lightning.
///
/// Private endpoints are signed with `ACCESS-KEY`, `ACCESS-TIMESTAMP` and
/// `ACCESS-SIGN` headers. Nothing is retried here; failures go back to the
/// caller as `Error`.
pub struct BitflyerClient {
    api_key: String,
    secret: String,
    endpoints: EndpointConfig,
    candle_type: String,
    product_code: String,
    http: Client,
}

impl BitflyerClient {
    pub fn new(cfg: &ExchangeConfig) -> Result<Self> {
        let http = Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        info!(
            key = %redact(&cfg.key),
            url = %cfg.endpoint.url,
            product_code = %cfg.product_code,
            timeout_secs = cfg.request_timeout_secs,
            "BitflyerClient initialized"
        );

        Ok(Self {
            api_key: cfg.key.clone(),
            secret: cfg.secret.clone(),
            endpoints: cfg.endpoint.clone(),
            candle_type: cfg.candle_type.clone(),
            product_code: cfg.product_code.clone(),
            http,
        })
    }

    fn timestamp_ms() -> String {
        Utc::now().timestamp_millis().to_string()
    }

    /// Hex HMAC-SHA256 of `timestamp + method + path + body` keyed with the
    /// API secret. GET requests sign an empty body.
    pub fn sign(&self, timestamp: &str, method: &Method, path: &str, body: &str) -> Result<String> {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| Error::Auth(e.to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(method.as_str().as_bytes());
        mac.update(path.as_bytes());
        mac.update(body.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    async fn signed_request(&self, method: Method, path: &str, body: String) -> Result<String> {
        let timestamp = Self::timestamp_ms();
        let signature = self.sign(&timestamp, &method, path, &body)?;
        let url = format!("{}{path}", self.endpoints.url);

        info!(method = %method, url = %url, "call api");
        debug!(key = %redact(&self.api_key), timestamp = %timestamp, body = %body, "signed request");

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("ACCESS-KEY", &self.api_key)
            .header("ACCESS-TIMESTAMP", &timestamp)
            .header("ACCESS-SIGN", signature);
        if method == Method::POST {
            request = request.header("Content-Type", "application/json").body(body);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        read_body(resp).await
    }

    async fn signed_get(&self, path: &str) -> Result<String> {
        self.signed_request(Method::GET, path, String::new()).await
    }

    async fn signed_post<T: Serialize>(&self, path: &str, payload: &T) -> Result<String> {
        let body = serde_json::to_string(payload)?;
        self.signed_request(Method::POST, path, body).await
    }

    async fn public_get(&self, url: &str) -> Result<String> {
        info!(method = "GET", url = %url, "call api");
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        read_body(resp).await
    }
}

async fn read_body(resp: Response) -> Result<String> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| Error::Transport(e.to_string()))?;
    debug!(status = %status, body = %body, "api response");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(Error::Auth(format!("HTTP {status}: {body}")));
    }
    if !status.is_success() {
        return Err(Error::Transport(format!("HTTP {status}: {body}")));
    }
    Ok(body)
}

#[async_trait]
impl ExchangeApi for BitflyerClient {
    async fn child_orders(&self) -> Result<Vec<ChildOrder>> {
        let body = self.signed_get(&self.endpoints.check_trade).await?;
        decode(&body)
    }

    async fn balances(&self) -> Result<Vec<Balance>> {
        let body = self.signed_get(&self.endpoints.check_collateral).await?;
        decode(&body)
    }

    async fn mid_price(&self) -> Result<f64> {
        let url = format!("{}{}", self.endpoints.url, self.endpoints.check_board);
        let body = self.public_get(&url).await?;
        parse_mid_price(&body)
    }

    async fn close_prices(&self) -> Result<Vec<f64>> {
        let body = self.public_get(&self.endpoints.chart).await?;
        parse_close_prices(&body, &self.candle_type)
    }

    async fn send_child_order(&self, order: &ChildOrderRequest) -> Result<String> {
        let path = match order.side {
            OrderSide::Buy => &self.endpoints.buy,
            OrderSide::Sell => &self.endpoints.sell,
        };
        let body = self.signed_post(path, order).await?;
        let resp: OrderAcceptance = decode(&body)?;
        info!(
            child_order_acceptance_id = %resp.child_order_acceptance_id,
            side = %order.side,
            size = order.size,
            "order accepted"
        );
        Ok(resp.child_order_acceptance_id)
    }

    async fn cancel_child_order(&self, child_order_id: &str) -> Result<()> {
        let payload = CancelRequest {
            product_code: &self.product_code,
            child_order_id,
        };
        self.signed_post(&self.endpoints.cancel, &payload).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::MalformedResponse(e.to_string()))
}

fn parse_mid_price(body: &str) -> Result<f64> {
    let board: Board = decode(body)?;
    Ok(board.mid_price)
}

/// Close prices from a chart response, oldest first.
fn parse_close_prices(body: &str, candle_type: &str) -> Result<Vec<f64>> {
    let chart: ChartResponse = decode(body)?;
    let rows = chart.result.get(candle_type).ok_or_else(|| {
        Error::MalformedResponse(format!("chart has no candles of type '{candle_type}'"))
    })?;
    rows.iter()
        .map(|row| {
            row.get(CLOSE_COLUMN).copied().ok_or_else(|| {
                Error::MalformedResponse(format!("chart row too short: {row:?}"))
            })
        })
        .collect()
}

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct CancelRequest<'a> {
    product_code: &'a str,
    child_order_id: &'a str,
}

#[derive(Deserialize)]
struct OrderAcceptance {
    child_order_acceptance_id: String,
}

#[derive(Deserialize)]
struct Board {
    mid_price: f64,
}

#[derive(Deserialize)]
struct ChartResponse {
    result: HashMap<String, Vec<Vec<f64>>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> BitflyerClient {
        let cfg: ExchangeConfig = serde_json::from_str(
            r#"{
                "key": "key",
                "secret": "secret",
                "endpoint": {
                    "url": "https://api.bitflyer.com",
                    "check-collateral": "/v1/me/getbalance",
                    "check-board": "/v1/getboard",
                    "check-trade": "/v1/me/getchildorders",
                    "buy": "/v1/me/sendchildorder",
                    "sell": "/v1/me/sendchildorder",
                    "cancel": "/v1/me/cancelchildorder",
                    "chart": "https://example.com/ohlc"
                },
                "type": "180",
                "span": 3,
                "minimum-trade-size": 0.01
            }"#,
        )
        .unwrap();
        BitflyerClient::new(&cfg).unwrap()
    }

    #[test]
    fn get_signs_the_empty_body() {
        let sign = client()
            .sign("1700000000000", &Method::GET, "/v1/me/getbalance", "")
            .unwrap();
        assert_eq!(
            sign,
            "da06260b464f88a4dad2088d9346efa6b26c31f183af682c4fc3cfe1ec76463f"
        );
    }

    #[test]
    fn post_signs_the_json_body() {
        let body = serde_json::to_string(&CancelRequest {
            product_code: "FX_BTC_JPY",
            child_order_id: "JOR-1",
        })
        .unwrap();
        assert_eq!(body, r#"{"product_code":"FX_BTC_JPY","child_order_id":"JOR-1"}"#);

        let sign = client()
            .sign("1700000000000", &Method::POST, "/v1/me/cancelchildorder", &body)
            .unwrap();
        assert_eq!(
            sign,
            "9c7ecadadc31a939edb6fb57e946366f4f17b4accde6710f966bef3e7d6bf3ad"
        );
    }

    #[test]
    fn close_prices_come_from_the_fifth_column() {
        let body = r#"{"result": {"180": [
            [1700000000, 100.0, 110.0, 90.0, 105.0, 1.5, 150.0],
            [1700000180, 105.0, 112.0, 101.0, 111.0, 2.0, 220.0]
        ], "60": []}}"#;
        assert_eq!(parse_close_prices(body, "180").unwrap(), vec![105.0, 111.0]);
        assert!(parse_close_prices(body, "60").unwrap().is_empty());
    }

    #[test]
    fn missing_candle_type_is_malformed() {
        let body = r#"{"result": {"60": []}}"#;
        assert!(matches!(
            parse_close_prices(body, "180"),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn short_chart_row_is_malformed() {
        let body = r#"{"result": {"180": [[1700000000, 100.0]]}}"#;
        assert!(matches!(
            parse_close_prices(body, "180"),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn board_mid_price() {
        let body = r#"{"mid_price": 4500000.0, "bids": [], "asks": []}"#;
        assert_eq!(parse_mid_price(body).unwrap(), 4_500_000.0);
        assert!(matches!(parse_mid_price("<html>"), Err(Error::MalformedResponse(_))));
    }
}
