//! Persistence for the arbitrage engine (§6).
//!
//! This crate provides:
//! - A `Postgres` connection pool wrapper
//! - Data models for executed trades, near-misses, portfolio state, and
//!   rolled-up daily statistics
//! - Repositories for typed access to each of those four tables

pub mod database;
pub mod models;
pub mod repositories;

pub use database::DatabaseClient;

pub use models::{DailyStats, NearMiss, PortfolioStateEntry, TradeRecord};

pub use repositories::{DailyStatsRepository, NearMissRepository, PortfolioStateRepository, Repositories, TradeRepository};
