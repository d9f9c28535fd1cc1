use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

/// Thin wrapper around a `Postgres` connection pool, handed to each
/// repository. Persistence failures are logged and swallowed by callers per
/// §7 — the engine keeps running in-memory if the store is unavailable.
pub struct DatabaseClient {
    pool: PgPool,
}

impl DatabaseClient {
    /// Connects to the database named by `database_url`.
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    #[must_use]
    pub fn pool(&self) -> PgPool {
        self.pool.clone()
    }
}
