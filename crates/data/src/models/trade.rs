//! Executed-trade record for the `trades` table (§6).
//!
//! Mirrors an executed opportunity plus the execution/exit bookkeeping the
//! orchestrator accumulates once a position is opened and later closed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the `trades` table: an opportunity that was executed, with its
/// entry/exit lifecycle filled in as the position progresses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TradeRecord {
    pub id: i64,
    pub name: String,
    pub strategy: String,
    pub side_a: String,
    pub side_b: String,
    pub price_a_cents: i64,
    pub price_b_cents: i64,
    pub contracts: i64,
    pub total_cost_cents: i64,
    pub gross_spread_cents: i64,
    pub fees_cents: i64,
    pub expected_net_cents: i64,
    pub actual_net_cents: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
    pub hold_ms: Option<i64>,
    pub payout_cents: Option<i64>,
    pub timestamp: DateTime<Utc>,
}

impl TradeRecord {
    /// Builds the pre-exit row for a just-executed opportunity.
    #[must_use]
    pub fn opened(
        name: String,
        strategy: &str,
        side_a: &str,
        side_b: &str,
        price_a_cents: i64,
        price_b_cents: i64,
        contracts: i64,
        total_cost_cents: i64,
        fees_cents: i64,
        expected_net_cents: i64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            strategy: strategy.to_string(),
            side_a: side_a.to_string(),
            side_b: side_b.to_string(),
            price_a_cents,
            price_b_cents,
            contracts,
            total_cost_cents,
            gross_spread_cents: 100 - price_a_cents - price_b_cents,
            fees_cents,
            expected_net_cents,
            actual_net_cents: None,
            expires_at: None,
            entry_time: now,
            exit_time: None,
            hold_ms: None,
            payout_cents: None,
            timestamp: now,
        }
    }

    /// Records the close of a position: exit time, actual net P&L in cents,
    /// and the realized hold duration.
    pub fn close(&mut self, exit_time: DateTime<Utc>, actual_net_cents: i64, payout_cents: i64) {
        self.exit_time = Some(exit_time);
        self.actual_net_cents = Some(actual_net_cents);
        self.payout_cents = Some(payout_cents);
        self.hold_ms = Some((exit_time - self.entry_time).num_milliseconds().max(0));
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.exit_time.is_some()
    }
}

/// A matched pair or same-market book that was evaluated but fell short of
/// the profitable threshold — kept for tuning/inspection, not for trading.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct NearMiss {
    pub id: i64,
    pub name: String,
    pub strategy: String,
    pub price_a_cents: i64,
    pub price_b_cents: i64,
    pub shortfall_cents: i64,
    pub timestamp: DateTime<Utc>,
}

impl NearMiss {
    #[must_use]
    pub fn new(name: String, strategy: &str, price_a_cents: i64, price_b_cents: i64, shortfall_cents: i64) -> Self {
        Self {
            id: 0,
            name,
            strategy: strategy.to_string(),
            price_a_cents,
            price_b_cents,
            shortfall_cents,
            timestamp: Utc::now(),
        }
    }
}

/// A single key/value entry in the `portfolio_state` table — an arbitrary
/// JSON blob keyed by name, used to persist orchestrator state (open
/// positions, cooldown timestamps) across restarts.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PortfolioStateEntry {
    pub key: String,
    pub json_value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Rolled-up daily trading statistics for the `daily_stats` table.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyStats {
    pub date: chrono::NaiveDate,
    pub opportunities_detected: i64,
    pub trades_executed: i64,
    pub trades_skipped_min_order: i64,
    pub trades_skipped_liquidity: i64,
    pub critical_partial_fills: i64,
    pub both_failed: i64,
    pub gross_pnl_cents: i64,
    pub fees_cents: i64,
    pub net_pnl_cents: i64,
}

impl DailyStats {
    #[must_use]
    pub fn empty(date: chrono::NaiveDate) -> Self {
        Self {
            date,
            opportunities_detected: 0,
            trades_executed: 0,
            trades_skipped_min_order: 0,
            trades_skipped_liquidity: 0,
            critical_partial_fills: 0,
            both_failed: 0,
            gross_pnl_cents: 0,
            fees_cents: 0,
            net_pnl_cents: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_record_close_computes_hold_duration() {
        let mut trade = TradeRecord::opened(
            "BTC-100k".into(),
            "S1",
            "YES",
            "NO",
            40,
            40,
            20,
            1600,
            0,
            400,
        );
        let exit = trade.entry_time + chrono::Duration::seconds(30);
        trade.close(exit, 380, 2000);
        assert!(trade.is_closed());
        assert_eq!(trade.hold_ms, Some(30_000));
        assert_eq!(trade.actual_net_cents, Some(380));
    }

    #[test]
    fn daily_stats_empty_has_zeroed_counters() {
        let stats = DailyStats::empty(chrono::Utc::now().date_naive());
        assert_eq!(stats.trades_executed, 0);
        assert_eq!(stats.net_pnl_cents, 0);
    }
}
