//! Data models for the arbitrage engine's persistence layer (§6).
//!
//! Four tables: executed trades, near-misses kept for tuning, a generic
//! portfolio-state key/value blob, and rolled-up daily statistics. All use
//! `rust_decimal::Decimal` where a dollar amount appears and derive
//! `sqlx::FromRow`.

pub mod trade;

pub use trade::{DailyStats, NearMiss, PortfolioStateEntry, TradeRecord};
