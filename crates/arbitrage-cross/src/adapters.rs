//! Concrete `LegMarket`/`MarketSource` adapters wiring the venue-A and
//! venue-B clients into the venue-agnostic execution and discovery traits.
//!
//! Venue B (Kalshi) outcomes are addressed by a composite id of
//! `"{ticker}|YES"` / `"{ticker}|NO"` since a single Kalshi market has one
//! order book shared by both sides; venue A outcomes are addressed directly
//! by CLOB token id, matching the id the catalog already hands out.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use arbx_kalshi::{Action as KalshiAction, KalshiClient, Order, OrderRequest, OrderType, Side as KalshiSide};
use arbx_polymarket::{OrderProxyClient, PolymarketClient, ProxySide};

use crate::executor::{LegError, LegFill, LegMarket, LegOrder};
use crate::orchestrator::MarketSource;
use crate::types::{Action, Outcome, Side, Venue};

/// Venue-A (on-chain CLOB-style) market source and execution leg.
pub struct PolymarketMarket {
    client: Arc<PolymarketClient>,
    proxy: Arc<OrderProxyClient>,
}

impl PolymarketMarket {
    pub fn new(client: Arc<PolymarketClient>, proxy: Arc<OrderProxyClient>) -> Self {
        Self { client, proxy }
    }
}

#[async_trait]
impl MarketSource for PolymarketMarket {
    async fn fetch_outcomes(&self) -> Result<Vec<Outcome>, String> {
        let (markets, _) = self
            .client
            .get_markets(None, None)
            .await
            .map_err(|e| e.to_string())?;

        Ok(markets
            .into_iter()
            .filter_map(|m| {
                let yes = m.yes_token()?;
                let no = m.no_token()?;
                Some(Outcome {
                    venue: Venue::A,
                    market_id: m.condition_id.clone(),
                    outcome_title: m.question.clone(),
                    yes_id: yes.token_id.clone(),
                    no_id: no.token_id.clone(),
                    yes_price_cents: price_to_cents(yes.price),
                    no_price_cents: price_to_cents(no.price),
                    volume_usd: m.volume_24h.and_then(|v| v.to_f64()).unwrap_or(0.0),
                })
            })
            .collect())
    }
}

#[async_trait]
impl LegMarket for PolymarketMarket {
    async fn ask_depth(&self, outcome_id: &str) -> Option<Decimal> {
        let book = self.client.get_book(outcome_id).await.ok()?;
        Some(book.asks.iter().map(|(_, size)| *size).sum())
    }

    async fn place_order(&self, order: LegOrder) -> Result<LegFill, LegError> {
        let side = match order.action {
            Action::Buy => ProxySide::Buy,
            Action::Sell => ProxySide::Sell,
        };

        self.proxy
            .place_order(&order.outcome_id, order.price_dec, side, order.contracts)
            .await
            .map(|fill| LegFill {
                order_id: fill.order_id,
                filled: fill.filled_size,
                avg_price_dec: fill.avg_price,
            })
            .map_err(|e| match e {
                arbx_polymarket::ProxyOrderError::Transport(msg) => LegError::Transport(msg),
                arbx_polymarket::ProxyOrderError::Rejected(msg) => LegError::Rejected(msg),
                arbx_polymarket::ProxyOrderError::Malformed(msg) => LegError::Rejected(msg),
            })
    }
}

fn price_to_cents(price: Decimal) -> i64 {
    (price * Decimal::from(100)).round().to_i64().unwrap_or(0)
}

/// Venue-B (centralized) market source and execution leg.
pub struct KalshiMarket {
    client: Arc<KalshiClient>,
}

impl KalshiMarket {
    pub fn new(client: Arc<KalshiClient>) -> Self {
        Self { client }
    }
}

fn outcome_id(ticker: &str, side: Side) -> String {
    match side {
        Side::Yes => format!("{ticker}|YES"),
        Side::No => format!("{ticker}|NO"),
    }
}

/// Splits a composite outcome id back into its ticker and side.
fn parse_outcome_id(outcome_id: &str) -> Option<(&str, Side)> {
    let (ticker, side) = outcome_id.rsplit_once('|')?;
    let side = match side {
        "YES" => Side::Yes,
        "NO" => Side::No,
        _ => return None,
    };
    Some((ticker, side))
}

#[async_trait]
impl MarketSource for KalshiMarket {
    async fn fetch_outcomes(&self) -> Result<Vec<Outcome>, String> {
        let markets = self
            .client
            .get_tradeable_btc_markets()
            .await
            .map_err(|e| e.to_string())?;

        Ok(markets
            .into_iter()
            .filter_map(|m| {
                let yes_price = m.yes_mid()?;
                let no_price = m.no_mid().unwrap_or(Decimal::from(100) - yes_price);
                Some(Outcome {
                    venue: Venue::B,
                    market_id: m.ticker.clone(),
                    outcome_title: m.title.clone(),
                    yes_id: outcome_id(&m.ticker, Side::Yes),
                    no_id: outcome_id(&m.ticker, Side::No),
                    yes_price_cents: yes_price.round().to_i64().unwrap_or(0),
                    no_price_cents: no_price.round().to_i64().unwrap_or(0),
                    volume_usd: m.volume_24h.unwrap_or(0) as f64,
                })
            })
            .collect())
    }
}

#[async_trait]
impl LegMarket for KalshiMarket {
    async fn ask_depth(&self, outcome_id: &str) -> Option<Decimal> {
        let (ticker, side) = parse_outcome_id(outcome_id)?;
        let book = self.client.get_orderbook(ticker, 100).await.ok()?;

        let levels = match side {
            Side::Yes => &book.yes_asks,
            Side::No => &book.yes_bids,
        };
        Some(levels.iter().map(|l| Decimal::from(l.count)).sum())
    }

    async fn place_order(&self, order: LegOrder) -> Result<LegFill, LegError> {
        let (ticker, side) = parse_outcome_id(&order.outcome_id)
            .ok_or_else(|| LegError::Rejected(format!("malformed outcome id: {}", order.outcome_id)))?;

        let price_cents = (order.price_dec * Decimal::from(100))
            .round()
            .to_u32()
            .ok_or_else(|| LegError::Rejected("price out of range".to_string()))?;
        let count = order
            .contracts
            .round()
            .to_u32()
            .ok_or_else(|| LegError::Rejected("contract count out of range".to_string()))?;

        let kalshi_side = match side {
            Side::Yes => KalshiSide::Yes,
            Side::No => KalshiSide::No,
        };
        let kalshi_action = match order.action {
            Action::Buy => KalshiAction::Buy,
            Action::Sell => KalshiAction::Sell,
        };

        let request = OrderRequest {
            ticker: ticker.to_string(),
            side: kalshi_side,
            action: kalshi_action,
            order_type: OrderType::Limit,
            count,
            yes_price: matches!(side, Side::Yes).then_some(price_cents),
            no_price: matches!(side, Side::No).then_some(price_cents),
            client_order_id: None,
            expiration_ts: None,
        };

        let filled: Order = self
            .client
            .submit_order(&request)
            .await
            .map_err(|e| LegError::Transport(e.to_string()))?;

        Ok(LegFill {
            order_id: filled.order_id,
            filled: Decimal::from(filled.filled_count),
            avg_price_dec: filled
                .avg_fill_price
                .map(|p| p / Decimal::from(100))
                .unwrap_or(order.price_dec),
        })
    }
}
