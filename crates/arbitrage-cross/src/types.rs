//! Shared data model for matching, evaluation, and execution: venues, sides,
//! outcomes, matched pairs, opportunities, order books, fills, positions, and
//! the audit/alert envelopes the executor and alert manager populate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// The two venues this engine trades across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    /// On-chain CLOB-style venue.
    A,
    /// Centralized venue.
    B,
}

impl Venue {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }
}

/// A binary market's two complementary outcome shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Yes,
    No,
}

impl Side {
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Buy,
    Sell,
}

/// One binary-market outcome as quoted by a single venue (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub venue: Venue,
    pub market_id: String,
    pub outcome_title: String,
    pub yes_id: String,
    pub no_id: String,
    pub yes_price_cents: i64,
    pub no_price_cents: i64,
    pub volume_usd: f64,
}

impl Outcome {
    /// `0 <= yesPrice <= 100`; the sole hard invariant the data model names
    /// for an outcome.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        (0..=100).contains(&self.yes_price_cents) && (0..=100).contains(&self.no_price_cents)
    }
}

/// A one-to-one pairing of outcomes across the two venues, produced by the
/// matcher (C2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedPair {
    pub outcome_a: Outcome,
    pub outcome_b: Outcome,
    pub similarity: f64,
}

impl MatchedPair {
    #[must_use]
    pub fn meets_threshold(&self, tau: f64) -> bool {
        self.similarity >= tau
    }
}

/// Which arbitrage strategy an [`Opportunity`] represents (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Buy YES on venue A, buy NO on venue B.
    S1,
    /// Buy NO on venue A, buy YES on venue B.
    S2,
    /// Buy YES and NO on the same venue's single binary market.
    Sm,
}

impl Strategy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S1 => "S1",
            Self::S2 => "S2",
            Self::Sm => "SM",
        }
    }
}

/// A detected, profitable arbitrage opportunity. Emitted only when
/// `net_profit_cents > 0` and every leg price clears `minPriceThreshold` —
/// the evaluator enforces this before constructing one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub name: String,
    pub strategy: Strategy,
    pub side_a: Side,
    pub side_b: Side,
    pub price_a_cents: i64,
    pub price_b_cents: i64,
    pub fees_cents: i64,
    pub net_profit_cents: i64,
    pub total_cost_cents: i64,
    pub contracts: Option<i64>,
    pub total_volume_usd: f64,
    pub detected_at: DateTime<Utc>,
}

impl Opportunity {
    #[must_use]
    pub fn gross_spread_cents(&self) -> i64 {
        100 - self.price_a_cents - self.price_b_cents
    }

    #[must_use]
    pub fn is_profitable(&self) -> bool {
        self.net_profit_cents > 0
    }
}

/// Level-2 order book for one binary-market side. Bids sorted descending,
/// asks ascending.
#[derive(Debug, Clone)]
pub struct OrderBook {
    pub bids: BTreeMap<Reverse<Decimal>, Decimal>,
    pub asks: BTreeMap<Decimal, Decimal>,
}

impl OrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    /// Replaces all levels with a fresh snapshot. Non-positive sizes and
    /// out-of-range prices are dropped (the book walker's parse-and-validate
    /// step happens here, at ingest).
    pub fn apply_snapshot(&mut self, bids: Vec<(Decimal, Decimal)>, asks: Vec<(Decimal, Decimal)>) {
        self.bids.clear();
        self.asks.clear();
        for (price, size) in bids {
            if is_valid_level(price, size) {
                self.bids.insert(Reverse(price), size);
            }
        }
        for (price, size) in asks {
            if is_valid_level(price, size) {
                self.asks.insert(price, size);
            }
        }
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    #[must_use]
    pub fn total_ask_depth(&self) -> Decimal {
        self.asks.values().copied().sum()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

fn is_valid_level(price: Decimal, size: Decimal) -> bool {
    price > Decimal::ZERO && price < Decimal::ONE && size > Decimal::ZERO
}

/// Result of walking an ask ladder for a target buy size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
    pub filled: Decimal,
    pub total_cost_dollars: Decimal,
    pub vwap_dec: Decimal,
    pub worst_price_dec: Decimal,
    pub best_price_dec: Decimal,
}

/// An open, fully-hedged position resulting from a successful dual-leg fill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub id: uuid::Uuid,
    pub opportunity_name: String,
    pub strategy: Strategy,
    pub shares_a: Decimal,
    pub shares_b: Decimal,
    pub outcome_id_a: String,
    pub outcome_id_b: String,
    pub entry_price_a: Decimal,
    pub entry_price_b: Decimal,
    pub entry_timestamp: DateTime<Utc>,
    pub expected_net_profit_cents: i64,
    /// Row id in the persisted `trades` table, if the engine is running
    /// with a database configured. `None` when persistence is disabled or
    /// the insert failed (persistence failures are logged and swallowed
    /// per §7 — the in-memory position still tracks and closes normally).
    pub trade_record_id: Option<i64>,
}

impl Position {
    /// Mark-to-market P&L given current per-venue prices.
    #[must_use]
    pub fn mark_to_market(&self, current_price_a: Decimal, current_price_b: Decimal) -> Decimal {
        let value = self.shares_a * current_price_a + self.shares_b * current_price_b;
        let cost = self.shares_a * self.entry_price_a + self.shares_b * self.entry_price_b;
        value - cost
    }
}

/// Audit-ring entry types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEventType {
    SkipMinOrder,
    SkipLiquidity,
    DryRun,
    Executed,
    CriticalPartialFill,
    BothFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub event_type: AuditEventType,
    pub market: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

/// Alert severity. `Critical` bypasses the cooldown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertLevel {
    Info,
    Warn,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEnvelope {
    pub alert_type: String,
    pub message: String,
    pub level: AlertLevel,
    pub timestamp: DateTime<Utc>,
    pub source: String,
}
