//! Repository for the `portfolio_state` key/value table, used to persist
//! orchestrator state (open positions, cooldown timestamps) across restarts.

use anyhow::Result;
use chrono::Utc;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use crate::models::PortfolioStateEntry;

#[derive(Debug, Clone)]
pub struct PortfolioStateRepository {
    pool: PgPool,
}

impl PortfolioStateRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upserts a key's JSON value.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub async fn set(&self, key: &str, value: JsonValue) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO portfolio_state (key, json_value, updated_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
            SET json_value = EXCLUDED.json_value, updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Reads a key's stored value, if present.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<PortfolioStateEntry>> {
        let record = sqlx::query_as::<_, PortfolioStateEntry>(
            r"
            SELECT key, json_value, updated_at
            FROM portfolio_state
            WHERE key = $1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
