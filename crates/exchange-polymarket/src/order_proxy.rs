//! HTTP-proxy order placement for venue A.
//!
//! Direct order submission to the CLOB requires a wallet signature and is
//! geo-restricted for some callers. Instead of signing locally, orders are
//! routed through an operator-run HTTP proxy that holds the signing key and
//! forwards the signed order to the CLOB on the caller's behalf.
//!
//! Wire format: `POST {action:"polymarket_order", order:{tokenID, price,
//! side, size, feeRateBps:0, tickSize:"0.01"}}` with `Authorization: Bearer
//! <token>`.

use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Side of a proxied order, as the proxy's wire format expects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProxySide {
    Buy,
    Sell,
}

#[derive(Debug, Error)]
pub enum ProxyOrderError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("proxy rejected order: {0}")]
    Rejected(String),
    #[error("malformed proxy response: {0}")]
    Malformed(String),
}

/// Result of a filled (or partially filled) proxied order.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyOrderResult {
    #[serde(rename = "orderID")]
    pub order_id: String,
    #[serde(rename = "filledSize")]
    pub filled_size: Decimal,
    #[serde(rename = "avgPrice")]
    pub avg_price: Decimal,
}

#[derive(Debug, Serialize)]
struct ProxyOrderPayload {
    #[serde(rename = "tokenID")]
    token_id: String,
    price: Decimal,
    side: ProxySide,
    size: Decimal,
    #[serde(rename = "feeRateBps")]
    fee_rate_bps: u32,
    #[serde(rename = "tickSize")]
    tick_size: String,
}

#[derive(Debug, Serialize)]
struct ProxyRequest {
    action: &'static str,
    order: ProxyOrderPayload,
}

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    #[serde(flatten)]
    result: Option<ProxyOrderResult>,
    error: Option<String>,
}

/// Client for the order-placement HTTP proxy.
pub struct OrderProxyClient {
    http: Client,
    base_url: String,
    token: SecretString,
}

impl OrderProxyClient {
    pub fn new(base_url: impl Into<String>, token: SecretString, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into(),
            token,
        }
    }

    /// Places an order through the proxy. `tick_size` defaults to the
    /// venue's standard "0.01".
    pub async fn place_order(
        &self,
        token_id: &str,
        price: Decimal,
        side: ProxySide,
        size: Decimal,
    ) -> Result<ProxyOrderResult, ProxyOrderError> {
        let body = ProxyRequest {
            action: "polymarket_order",
            order: ProxyOrderPayload {
                token_id: token_id.to_string(),
                price,
                side,
                size,
                fee_rate_bps: 0,
                tick_size: "0.01".to_string(),
            },
        };

        let response = self
            .http
            .post(&self.base_url)
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProxyOrderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ProxyOrderError::Rejected(format!("{status}: {text}")));
        }

        let parsed: ProxyResponse = response
            .json()
            .await
            .map_err(|e| ProxyOrderError::Malformed(e.to_string()))?;

        if let Some(err) = parsed.error {
            return Err(ProxyOrderError::Rejected(err));
        }

        parsed
            .result
            .ok_or_else(|| ProxyOrderError::Malformed("missing order result".to_string()))
    }
}
