//! Venue A (on-chain CLOB-style) client.
//!
//! This crate provides:
//! - REST client with rate limiting for the CLOB API
//! - Gamma API client for 15-minute market discovery
//! - Models for markets, tokens, and prices
//! - A streaming order book feed
//! - Order book walking used by the cross-venue detector
//! - Proxied order placement (`order_proxy`) used by the cross-venue
//!   executor's venue-A leg, since direct CLOB submission requires wallet
//!   signing that is out of scope for this crate
//!
//! # Example
//!
//! ```no_run
//! use arbx_polymarket::{PolymarketClient, GammaClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let gamma = GammaClient::new();
//!     let markets = gamma.get_all_current_15min_markets().await;
//!     println!("discovered {} 15-min markets", markets.len());
//!
//!     let client = PolymarketClient::new();
//!     let (active, _cursor) = client.get_markets(None, None).await?;
//!     println!("discovered {} active markets", active.len());
//!
//!     Ok(())
//! }
//! ```

pub mod arbitrage;
pub mod client;
pub mod error;
pub mod gamma;
pub mod models;
pub mod order_proxy;
pub mod websocket;

// Re-export main types
pub use client::{Book, PolymarketClient};
pub use error::{PolymarketError, Result as PolymarketResult};
pub use gamma::GammaClient;
pub use models::{Coin, GammaEvent, GammaMarket, Market, MarketFilter, Price, Token};
pub use order_proxy::{OrderProxyClient, ProxyOrderError, ProxyOrderResult, ProxySide};
pub use websocket::{BookEvent, PolymarketWebSocket, WebSocketConfig, WebSocketError};
