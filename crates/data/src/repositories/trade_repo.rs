//! Repository for the `trades` table: insert on open, update on close,
//! query for reporting.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::TradeRecord;

#[derive(Debug, Clone)]
pub struct TradeRepository {
    pool: PgPool,
}

impl TradeRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a newly opened trade and returns its generated ID.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert(&self, record: &TradeRecord) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r"
            INSERT INTO trades
                (name, strategy, side_a, side_b, price_a_cents, price_b_cents, contracts,
                 total_cost_cents, gross_spread_cents, fees_cents, expected_net_cents,
                 actual_net_cents, expires_at, entry_time, exit_time, hold_ms, payout_cents, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING id
            ",
        )
        .bind(&record.name)
        .bind(&record.strategy)
        .bind(&record.side_a)
        .bind(&record.side_b)
        .bind(record.price_a_cents)
        .bind(record.price_b_cents)
        .bind(record.contracts)
        .bind(record.total_cost_cents)
        .bind(record.gross_spread_cents)
        .bind(record.fees_cents)
        .bind(record.expected_net_cents)
        .bind(record.actual_net_cents)
        .bind(record.expires_at)
        .bind(record.entry_time)
        .bind(record.exit_time)
        .bind(record.hold_ms)
        .bind(record.payout_cents)
        .bind(record.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Records the exit of a position: actual net P&L, payout, and hold time.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn close(&self, id: i64, exit_time: DateTime<Utc>, actual_net_cents: i64, payout_cents: i64) -> Result<()> {
        sqlx::query(
            r"
            UPDATE trades
            SET exit_time = $2, actual_net_cents = $3, payout_cents = $4,
                hold_ms = EXTRACT(EPOCH FROM ($2 - entry_time)) * 1000
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(exit_time)
        .bind(actual_net_cents)
        .bind(payout_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Returns trades still open (no recorded exit).
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_open(&self) -> Result<Vec<TradeRecord>> {
        let records = sqlx::query_as::<_, TradeRecord>(
            r"
            SELECT id, name, strategy, side_a, side_b, price_a_cents, price_b_cents, contracts,
                   total_cost_cents, gross_spread_cents, fees_cents, expected_net_cents,
                   actual_net_cents, expires_at, entry_time, exit_time, hold_ms, payout_cents, timestamp
            FROM trades
            WHERE exit_time IS NULL
            ORDER BY entry_time ASC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Returns closed trades within `[start, end]`, most recent last.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_closed_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TradeRecord>> {
        let records = sqlx::query_as::<_, TradeRecord>(
            r"
            SELECT id, name, strategy, side_a, side_b, price_a_cents, price_b_cents, contracts,
                   total_cost_cents, gross_spread_cents, fees_cents, expected_net_cents,
                   actual_net_cents, expires_at, entry_time, exit_time, hold_ms, payout_cents, timestamp
            FROM trades
            WHERE exit_time IS NOT NULL AND exit_time >= $1 AND exit_time <= $2
            ORDER BY exit_time ASC
            ",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
