//! Repository for the `near_misses` table.

use anyhow::Result;
use sqlx::PgPool;

use crate::models::NearMiss;

#[derive(Debug, Clone)]
pub struct NearMissRepository {
    pool: PgPool,
}

impl NearMissRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a near-miss evaluation for later tuning.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert(&self, record: &NearMiss) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            r"
            INSERT INTO near_misses (name, strategy, price_a_cents, price_b_cents, shortfall_cents, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&record.name)
        .bind(&record.strategy)
        .bind(record.price_a_cents)
        .bind(record.price_b_cents)
        .bind(record.shortfall_cents)
        .bind(record.timestamp)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    /// Returns the most recent near-misses, newest first.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<NearMiss>> {
        let records = sqlx::query_as::<_, NearMiss>(
            r"
            SELECT id, name, strategy, price_a_cents, price_b_cents, shortfall_cents, timestamp
            FROM near_misses
            ORDER BY timestamp DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
