//! Repositories for the arbitrage engine's four persisted tables (§6).
//!
//! Each repository provides typed access to a single table; `Repositories`
//! bundles all four behind one connection pool for the orchestrator to hold.

pub mod daily_stats_repo;
pub mod near_miss_repo;
pub mod portfolio_state_repo;
pub mod trade_repo;

pub use daily_stats_repo::DailyStatsRepository;
pub use near_miss_repo::NearMissRepository;
pub use portfolio_state_repo::PortfolioStateRepository;
pub use trade_repo::TradeRepository;

use sqlx::PgPool;

/// Creates all repositories from a single database pool.
pub struct Repositories {
    pub trades: TradeRepository,
    pub near_misses: NearMissRepository,
    pub portfolio_state: PortfolioStateRepository,
    pub daily_stats: DailyStatsRepository,
}

impl Repositories {
    /// Creates a new set of repositories from a database pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            trades: TradeRepository::new(pool.clone()),
            near_misses: NearMissRepository::new(pool.clone()),
            portfolio_state: PortfolioStateRepository::new(pool.clone()),
            daily_stats: DailyStatsRepository::new(pool),
        }
    }
}
