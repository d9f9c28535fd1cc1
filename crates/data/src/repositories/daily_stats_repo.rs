//! Repository for the `daily_stats` rollup table.

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::models::DailyStats;

#[derive(Debug, Clone)]
pub struct DailyStatsRepository {
    pool: PgPool,
}

impl DailyStatsRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts the full day's row, overwriting any prior partial rollup.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn upsert(&self, stats: &DailyStats) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO daily_stats
                (date, opportunities_detected, trades_executed, trades_skipped_min_order,
                 trades_skipped_liquidity, critical_partial_fills, both_failed,
                 gross_pnl_cents, fees_cents, net_pnl_cents)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (date) DO UPDATE
            SET opportunities_detected = EXCLUDED.opportunities_detected,
                trades_executed = EXCLUDED.trades_executed,
                trades_skipped_min_order = EXCLUDED.trades_skipped_min_order,
                trades_skipped_liquidity = EXCLUDED.trades_skipped_liquidity,
                critical_partial_fills = EXCLUDED.critical_partial_fills,
                both_failed = EXCLUDED.both_failed,
                gross_pnl_cents = EXCLUDED.gross_pnl_cents,
                fees_cents = EXCLUDED.fees_cents,
                net_pnl_cents = EXCLUDED.net_pnl_cents
            ",
        )
        .bind(stats.date)
        .bind(stats.opportunities_detected)
        .bind(stats.trades_executed)
        .bind(stats.trades_skipped_min_order)
        .bind(stats.trades_skipped_liquidity)
        .bind(stats.critical_partial_fills)
        .bind(stats.both_failed)
        .bind(stats.gross_pnl_cents)
        .bind(stats.fees_cents)
        .bind(stats.net_pnl_cents)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reads a single day's rollup, if recorded.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get(&self, date: NaiveDate) -> Result<Option<DailyStats>> {
        let record = sqlx::query_as::<_, DailyStats>(
            r"
            SELECT date, opportunities_detected, trades_executed, trades_skipped_min_order,
                   trades_skipped_liquidity, critical_partial_fills, both_failed,
                   gross_pnl_cents, fees_cents, net_pnl_cents
            FROM daily_stats
            WHERE date = $1
            ",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
