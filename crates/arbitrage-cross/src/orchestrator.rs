//! Poll/stream orchestrator (C7).
//!
//! One process-wide scheduler driving three independent tasks that share
//! state through lock-guarded maps: market discovery, per-venue price
//! ingest, and the scan loop that feeds detected opportunities through the
//! executor (C5) and alert manager (C6). All three stop together on a
//! shutdown broadcast (§4.7, §5).
//!
//! Both venues are abstracted behind [`MarketSource`], so this module stays
//! agnostic to whether a concrete adapter is backed by a long-lived
//! streaming connection (venue A) or periodic polling (venue B) — that
//! distinction lives entirely in the adapter, not here.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

use arbx_data::{DailyStats, Repositories, TradeRecord};

use crate::alerts::AlertManager;
use crate::detector::{evaluate_cross_venue, EvaluatorConfig};
use crate::executor::{ExecutionResult, Executor, LegMarket};
use crate::matcher::match_outcomes;
use crate::types::{AlertLevel, MatchedPair, Opportunity, Outcome, Position, Venue};

/// A venue's market catalog and live pricing, abstracted so the orchestrator
/// stays agnostic to which concrete client backs it.
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Returns the current set of active outcomes, freshly fetched.
    async fn fetch_outcomes(&self) -> Result<Vec<Outcome>, String>;

    /// Returns outcomes for markets that closed recently, for the
    /// resolution watcher. Venues that don't support this return an empty
    /// list rather than an error.
    async fn fetch_recently_closed(&self) -> Result<Vec<Outcome>, String> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    pub market_refresh: Duration,
    pub venue_b_poll_interval: Duration,
    pub scan_interval: Duration,
    pub per_market_cooldown: Duration,
    pub matching_threshold: f64,
    pub alert_threshold_cents: i64,
    pub requested_contracts: i64,
    pub resolution_watcher: Option<ResolutionWatcherConfig>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            market_refresh: Duration::from_secs(60),
            venue_b_poll_interval: Duration::from_secs(5),
            scan_interval: Duration::from_secs(5),
            per_market_cooldown: Duration::from_secs(10),
            matching_threshold: 0.7,
            alert_threshold_cents: 50,
            requested_contracts: 10,
            resolution_watcher: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolutionWatcherConfig {
    pub check_interval: Duration,
    pub min_profit_cents: i64,
}

#[derive(Default)]
struct SharedState {
    outcomes_a: HashMap<String, Outcome>,
    outcomes_b: HashMap<String, Outcome>,
    matched: Vec<MatchedPair>,
    position: Option<Position>,
    last_trade_at: HashMap<String, Instant>,
    daily_stats: Option<DailyStats>,
}

impl SharedState {
    fn refresh_matched(&mut self, tau: f64) {
        let a: Vec<Outcome> = self.outcomes_a.values().cloned().collect();
        let b: Vec<Outcome> = self.outcomes_b.values().cloned().collect();
        self.matched = match_outcomes(&a, &b, tau);
    }

    fn in_cooldown(&self, market_id: &str, cooldown: Duration) -> bool {
        self.last_trade_at
            .get(market_id)
            .is_some_and(|last| last.elapsed() < cooldown)
    }

    /// Returns today's rollup, resetting it if the UTC date has rolled over
    /// since the last event.
    fn daily_stats_mut(&mut self) -> &mut DailyStats {
        let today = Utc::now().date_naive();
        if self.daily_stats.as_ref().map(|d| d.date) != Some(today) {
            self.daily_stats = Some(DailyStats::empty(today));
        }
        self.daily_stats.as_mut().expect("just set")
    }
}

/// Drives the three concurrent activities of §4.7 against one matched
/// cross-venue track. The same-market track is out of scope for this type —
/// its scan loop differs enough (per-market position caps, a single venue)
/// that it is its own orchestrator in the collaborator layer, not this one.
pub struct Orchestrator {
    config: OrchestratorConfig,
    evaluator_cfg: EvaluatorConfig,
    executor: Executor,
    alerts: Arc<AlertManager>,
    source_a: Arc<dyn MarketSource>,
    source_b: Arc<dyn MarketSource>,
    market_a: Arc<dyn LegMarket>,
    market_b: Arc<dyn LegMarket>,
    /// Trade/daily-stats persistence (§6 ambient store). `None` runs the
    /// engine in-memory only — every call site below treats that as "log
    /// and skip", matching §7's persistence error policy.
    repos: Option<Arc<Repositories>>,
    state: Mutex<SharedState>,
}

impl Orchestrator {
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: OrchestratorConfig,
        evaluator_cfg: EvaluatorConfig,
        executor: Executor,
        alerts: Arc<AlertManager>,
        source_a: Arc<dyn MarketSource>,
        source_b: Arc<dyn MarketSource>,
        market_a: Arc<dyn LegMarket>,
        market_b: Arc<dyn LegMarket>,
        repos: Option<Arc<Repositories>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            config,
            evaluator_cfg,
            executor,
            alerts,
            source_a,
            source_b,
            market_a,
            market_b,
            repos,
            state: Mutex::new(SharedState::default()),
        })
    }

    /// Spawns discovery, price ingest (one task per venue), the scan loop,
    /// and — if configured — the resolution watcher. Returns once all tasks
    /// have observed the shutdown signal.
    pub async fn run(self: Arc<Self>, shutdown: broadcast::Sender<()>) {
        self.alerts.bot_started().await;

        let mut tasks = vec![
            tokio::spawn(Self::discovery_loop(self.clone(), shutdown.subscribe())),
            tokio::spawn(Self::price_ingest_loop(
                self.clone(),
                Venue::A,
                shutdown.subscribe(),
            )),
            tokio::spawn(Self::price_ingest_loop(
                self.clone(),
                Venue::B,
                shutdown.subscribe(),
            )),
            tokio::spawn(Self::scan_loop(self.clone(), shutdown.subscribe())),
        ];

        if self.config.resolution_watcher.is_some() {
            tasks.push(tokio::spawn(Self::resolution_watcher_loop(
                self.clone(),
                shutdown.subscribe(),
            )));
        }

        for task in tasks {
            let _ = task.await;
        }

        self.alerts.flush().await;
        self.alerts.bot_stopped().await;
    }

    async fn discovery_loop(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.config.market_refresh);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.refresh_catalog().await;
                }
                _ = shutdown.recv() => {
                    info!("discovery loop shutting down");
                    return;
                }
            }
        }
    }

    async fn refresh_catalog(&self) {
        let (a, b) = tokio::join!(self.source_a.fetch_outcomes(), self.source_b.fetch_outcomes());

        let mut state = self.state.lock();
        match a {
            Ok(outcomes) => {
                state.outcomes_a = outcomes.into_iter().map(|o| (o.market_id.clone(), o)).collect();
            }
            Err(err) => warn!(venue = "A", error = %err, "market discovery failed"),
        }
        match b {
            Ok(outcomes) => {
                state.outcomes_b = outcomes.into_iter().map(|o| (o.market_id.clone(), o)).collect();
            }
            Err(err) => warn!(venue = "B", error = %err, "market discovery failed"),
        }
        state.refresh_matched(self.config.matching_threshold);
    }

    async fn price_ingest_loop(self: Arc<Self>, venue: Venue, mut shutdown: broadcast::Receiver<()>) {
        let period = match venue {
            Venue::A => self.config.venue_b_poll_interval.min(self.config.scan_interval),
            Venue::B => self.config.venue_b_poll_interval,
        };
        let mut interval = tokio::time::interval(period);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.refresh_prices(venue).await;
                }
                _ = shutdown.recv() => {
                    info!(?venue, "price ingest loop shutting down");
                    return;
                }
            }
        }
    }

    async fn refresh_prices(&self, venue: Venue) {
        let source = match venue {
            Venue::A => &self.source_a,
            Venue::B => &self.source_b,
        };
        let fetched = match source.fetch_outcomes().await {
            Ok(outcomes) => outcomes,
            Err(err) => {
                warn!(?venue, error = %err, "price ingest failed");
                return;
            }
        };

        let mut state = self.state.lock();
        let map = match venue {
            Venue::A => &mut state.outcomes_a,
            Venue::B => &mut state.outcomes_b,
        };
        // Last-writer-wins per (venue, marketId); membership is owned by
        // discovery, so only update prices for markets already known.
        for outcome in fetched {
            if let Some(existing) = map.get_mut(&outcome.market_id) {
                existing.yes_price_cents = outcome.yes_price_cents;
                existing.no_price_cents = outcome.no_price_cents;
            }
        }
    }

    async fn scan_loop(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let mut interval = tokio::time::interval(self.config.scan_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.scan_once().await;
                }
                _ = shutdown.recv() => {
                    info!("scan loop shutting down");
                    return;
                }
            }
        }
    }

    async fn scan_once(&self) {
        let (matched, open_position) = {
            let state = self.state.lock();
            (state.matched.clone(), state.position.clone())
        };

        if let Some(position) = open_position {
            if self.should_exit(&position, &matched).await {
                self.close_position(position).await;
            }
            return;
        }

        let mut best: Option<(MatchedPair, Opportunity)> = None;
        let mut detected = 0u32;
        for pair in &matched {
            if self.state.lock().in_cooldown(&market_pair_name(pair), self.config.per_market_cooldown) {
                continue;
            }
            let Some(opp) = evaluate_cross_venue(pair, &self.evaluator_cfg) else {
                continue;
            };
            detected += 1;
            let better = best
                .as_ref()
                .map_or(true, |(_, current)| opp.net_profit_cents > current.net_profit_cents);
            if better {
                best = Some((pair.clone(), opp));
            }
        }
        if detected > 0 {
            self.state.lock().daily_stats_mut().opportunities_detected += i64::from(detected);
            self.persist_daily_stats().await;
        }

        let Some((pair, opportunity)) = best else {
            return;
        };

        if opportunity.net_profit_cents >= self.config.alert_threshold_cents {
            self.alerts
                .big_opportunity(&opportunity.name, opportunity.net_profit_cents)
                .await;
        }

        let (outcome_id_a, outcome_id_b) = leg_outcome_ids(&pair, opportunity.strategy);
        let result = self
            .executor
            .execute(
                &opportunity,
                self.market_a.as_ref(),
                self.market_b.as_ref(),
                &outcome_id_a,
                &outcome_id_b,
                self.config.requested_contracts,
            )
            .await;

        self.handle_execution_result(&opportunity, &outcome_id_a, &outcome_id_b, result)
            .await;
    }

    async fn should_exit(&self, position: &Position, matched: &[MatchedPair]) -> bool {
        let current = matched
            .iter()
            .find(|p| market_pair_name(p) == position.opportunity_name);

        let vanished = match current.and_then(|p| evaluate_cross_venue(p, &self.evaluator_cfg)) {
            Some(opp) => opp.net_profit_cents < self.evaluator_cfg.min_profit_cents,
            None => true,
        };
        if vanished {
            return true;
        }

        matched.iter().any(|p| {
            market_pair_name(p) != position.opportunity_name
                && evaluate_cross_venue(p, &self.evaluator_cfg)
                    .is_some_and(|opp| opp.net_profit_cents > position.expected_net_profit_cents)
        })
    }

    async fn close_position(&self, position: Position) {
        let (price_a, price_b) = {
            let state = self.state.lock();
            let price_of = |map: &HashMap<String, Outcome>, outcome_id: &str| -> Decimal {
                map.values()
                    .find(|o| o.yes_id == outcome_id || o.no_id == outcome_id)
                    .map(|o| {
                        if o.yes_id == outcome_id {
                            Decimal::from(o.yes_price_cents) / Decimal::from(100)
                        } else {
                            Decimal::from(o.no_price_cents) / Decimal::from(100)
                        }
                    })
                    .unwrap_or(position.entry_price_a)
            };
            (
                price_of(&state.outcomes_a, &position.outcome_id_a),
                price_of(&state.outcomes_b, &position.outcome_id_b),
            )
        };

        let result = self
            .executor
            .execute_exit(&position, self.market_a.as_ref(), self.market_b.as_ref(), price_a, price_b)
            .await;

        match result {
            ExecutionResult::Success { .. } => {
                info!(market = %position.opportunity_name, "position closed");
                let exit_time = Utc::now();
                let pnl_dollars = position.mark_to_market(price_a, price_b);
                let payout_dollars = position.shares_a * price_a + position.shares_b * price_b;
                let actual_net_cents = (pnl_dollars * Decimal::from(100))
                    .round()
                    .to_i64()
                    .unwrap_or(position.expected_net_profit_cents);
                let payout_cents = (payout_dollars * Decimal::from(100)).round().to_i64().unwrap_or(0);
                if let Some(trade_record_id) = position.trade_record_id {
                    self.persist_trade_closed(trade_record_id, exit_time, actual_net_cents, payout_cents)
                        .await;
                }
                {
                    let mut state = self.state.lock();
                    let stats = state.daily_stats_mut();
                    stats.net_pnl_cents += actual_net_cents;
                    stats.gross_pnl_cents += actual_net_cents;
                }
                self.persist_daily_stats().await;
                self.alerts
                    .trade_executed(&position.opportunity_name, position.expected_net_profit_cents)
                    .await;
            }
            ExecutionResult::CriticalPartialFill { .. } | ExecutionResult::BothFailed { .. } => {
                self.alerts
                    .send(
                        "exit_failed",
                        &format!("failed to fully close {}", position.opportunity_name),
                        AlertLevel::Critical,
                    )
                    .await;
            }
            ExecutionResult::SkipMinOrder { .. } | ExecutionResult::SkipLiquidity { .. } => {}
        }

        let mut state = self.state.lock();
        state.position = None;
        state
            .last_trade_at
            .insert(position.opportunity_name.clone(), Instant::now());
    }

    /// Inserts the `trades` row for a just-opened position. Returns `None`
    /// (logging the error) if persistence is disabled or the insert fails —
    /// per §7, storage errors never block the in-memory position lifecycle.
    async fn persist_trade_opened(&self, opportunity: &Opportunity, leg_a_filled: Decimal) -> Option<i64> {
        let repos = self.repos.as_ref()?;
        let record = TradeRecord::opened(
            opportunity.name.clone(),
            opportunity.strategy.as_str(),
            opportunity.side_a.as_str(),
            opportunity.side_b.as_str(),
            opportunity.price_a_cents,
            opportunity.price_b_cents,
            leg_a_filled.to_i64().unwrap_or(0),
            opportunity.total_cost_cents,
            opportunity.fees_cents,
            opportunity.net_profit_cents,
        );
        match repos.trades.insert(&record).await {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(error = %err, market = %opportunity.name, "failed to persist opened trade");
                None
            }
        }
    }

    /// Records the exit of a previously persisted trade. No-op if
    /// persistence is disabled; logs and swallows storage errors (§7).
    async fn persist_trade_closed(&self, trade_record_id: i64, exit_time: DateTime<Utc>, actual_net_cents: i64, payout_cents: i64) {
        let Some(repos) = self.repos.as_ref() else {
            return;
        };
        if let Err(err) = repos
            .trades
            .close(trade_record_id, exit_time, actual_net_cents, payout_cents)
            .await
        {
            warn!(error = %err, trade_record_id, "failed to persist trade close");
        }
    }

    /// Upserts today's `daily_stats` rollup from the in-memory accumulator.
    /// No-op if persistence is disabled; logs and swallows storage errors.
    async fn persist_daily_stats(&self) {
        let Some(repos) = self.repos.as_ref() else {
            return;
        };
        let snapshot = self.state.lock().daily_stats.clone();
        if let Some(stats) = snapshot {
            if let Err(err) = repos.daily_stats.upsert(&stats).await {
                warn!(error = %err, "failed to persist daily stats");
            }
        }
    }

    async fn handle_execution_result(
        &self,
        opportunity: &Opportunity,
        outcome_id_a: &str,
        outcome_id_b: &str,
        result: ExecutionResult,
    ) {
        match result {
            ExecutionResult::Success { leg_a, leg_b, dry_run, .. } => {
                let trade_record_id = self.persist_trade_opened(opportunity, leg_a.filled).await;
                let position = Position {
                    id: Uuid::new_v4(),
                    opportunity_name: opportunity.name.clone(),
                    strategy: opportunity.strategy,
                    shares_a: leg_a.filled,
                    shares_b: leg_b.filled,
                    outcome_id_a: outcome_id_a.to_string(),
                    outcome_id_b: outcome_id_b.to_string(),
                    entry_price_a: leg_a.avg_price_dec,
                    entry_price_b: leg_b.avg_price_dec,
                    entry_timestamp: Utc::now(),
                    expected_net_profit_cents: opportunity.net_profit_cents,
                    trade_record_id,
                };
                {
                    let mut state = self.state.lock();
                    state.position = Some(position);
                    state
                        .last_trade_at
                        .insert(opportunity.name.clone(), Instant::now());
                    state.daily_stats_mut().trades_executed += 1;
                }
                self.persist_daily_stats().await;
                self.alerts
                    .trade_executed(&opportunity.name, opportunity.net_profit_cents)
                    .await;
                info!(market = %opportunity.name, dry_run, "opportunity executed");
            }
            ExecutionResult::SkipMinOrder { reason } => {
                self.state.lock().daily_stats_mut().trades_skipped_min_order += 1;
                self.persist_daily_stats().await;
                info!(market = %opportunity.name, %reason, "trade skipped");
            }
            ExecutionResult::SkipLiquidity { reason } => {
                self.state.lock().daily_stats_mut().trades_skipped_liquidity += 1;
                self.persist_daily_stats().await;
                info!(market = %opportunity.name, %reason, "trade skipped");
            }
            ExecutionResult::CriticalPartialFill { filled_side, failed_side, failed_error, .. } => {
                {
                    let mut state = self.state.lock();
                    state
                        .last_trade_at
                        .insert(opportunity.name.clone(), Instant::now());
                    state.daily_stats_mut().critical_partial_fills += 1;
                }
                self.persist_daily_stats().await;
                self.alerts
                    .send(
                        "critical_partial_fill",
                        &format!(
                            "{}: {filled_side:?} filled, {failed_side:?} failed ({failed_error})",
                            opportunity.name
                        ),
                        AlertLevel::Critical,
                    )
                    .await;
            }
            ExecutionResult::BothFailed { error_a, error_b } => {
                self.state.lock().daily_stats_mut().both_failed += 1;
                self.persist_daily_stats().await;
                self.alerts
                    .trade_failed(&opportunity.name, &format!("both legs failed: a={error_a} b={error_b}"))
                    .await;
            }
        }
    }

    async fn resolution_watcher_loop(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) {
        let Some(cfg) = self.config.resolution_watcher else {
            return;
        };
        let mut interval = tokio::time::interval(cfg.check_interval);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.check_resolutions(&cfg).await;
                }
                _ = shutdown.recv() => {
                    info!("resolution watcher shutting down");
                    return;
                }
            }
        }
    }

    async fn check_resolutions(&self, cfg: &ResolutionWatcherConfig) {
        let closed = match self.source_a.fetch_recently_closed().await {
            Ok(outcomes) => outcomes,
            Err(err) => {
                warn!(error = %err, "resolution watcher fetch failed");
                return;
            }
        };

        for outcome in closed {
            let settled_yes = outcome.yes_price_cents >= 99 || outcome.no_price_cents <= 1;
            let settled_no = outcome.no_price_cents >= 99 || outcome.yes_price_cents <= 1;
            if settled_yes || settled_no {
                continue;
            }

            let winner_price = outcome.yes_price_cents.max(outcome.no_price_cents);
            let profit = 100 - winner_price;
            if profit >= cfg.min_profit_cents {
                info!(
                    market = %outcome.market_id,
                    profit_cents = profit,
                    "settlement_lag opportunity observed (no auto-execution)"
                );
                self.alerts
                    .send(
                        "settlement_lag",
                        &format!("{}: {profit}c lag, not auto-executed", outcome.market_id),
                        AlertLevel::Info,
                    )
                    .await;
            }
        }
    }
}

fn market_pair_name(pair: &MatchedPair) -> String {
    format!("{}::{}", pair.outcome_a.market_id, pair.outcome_b.market_id)
}

fn leg_outcome_ids(pair: &MatchedPair, strategy: crate::types::Strategy) -> (String, String) {
    use crate::types::Strategy;
    match strategy {
        Strategy::S1 => (pair.outcome_a.yes_id.clone(), pair.outcome_b.no_id.clone()),
        Strategy::S2 => (pair.outcome_a.no_id.clone(), pair.outcome_b.yes_id.clone()),
        Strategy::Sm => (pair.outcome_a.yes_id.clone(), pair.outcome_a.no_id.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::{AlertManagerConfig, AlertSink};
    use crate::executor::ExecutorConfig;
    use crate::types::{Side, Venue};
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NullSink;
    #[async_trait::async_trait]
    impl AlertSink for NullSink {
        async fn deliver(&self, _payload: &str) -> Result<(), String> {
            Ok(())
        }
    }

    struct StaticSource {
        outcomes: Vec<Outcome>,
    }

    #[async_trait]
    impl MarketSource for StaticSource {
        async fn fetch_outcomes(&self) -> Result<Vec<Outcome>, String> {
            Ok(self.outcomes.clone())
        }
    }

    struct FakeLegMarket {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LegMarket for FakeLegMarket {
        async fn ask_depth(&self, _outcome_id: &str) -> Option<Decimal> {
            Some(dec!(1000))
        }

        async fn place_order(
            &self,
            order: crate::executor::LegOrder,
        ) -> Result<crate::executor::LegFill, crate::executor::LegError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(crate::executor::LegFill {
                order_id: "ord".into(),
                filled: order.contracts,
                avg_price_dec: order.price_dec,
            })
        }
    }

    fn outcome(venue: Venue, market_id: &str, yes: i64, no: i64) -> Outcome {
        Outcome {
            venue,
            market_id: market_id.to_string(),
            outcome_title: "BTC above $100k".into(),
            yes_id: format!("{market_id}-yes"),
            no_id: format!("{market_id}-no"),
            yes_price_cents: yes,
            no_price_cents: no,
            volume_usd: 1000.0,
        }
    }

    fn test_orchestrator() -> Arc<Orchestrator> {
        let alerts = Arc::new(AlertManager::new(AlertManagerConfig::default(), Arc::new(NullSink)));
        let executor = Executor::new(
            ExecutorConfig {
                dry_run: true,
                ..Default::default()
            },
            10,
        );
        let source_a = Arc::new(StaticSource {
            outcomes: vec![outcome(Venue::A, "m1", 40, 60)],
        });
        let source_b = Arc::new(StaticSource {
            outcomes: vec![outcome(Venue::B, "m1", 60, 40)],
        });
        let market_a = Arc::new(FakeLegMarket { calls: AtomicUsize::new(0) });
        let market_b = Arc::new(FakeLegMarket { calls: AtomicUsize::new(0) });

        Orchestrator::new(
            OrchestratorConfig::default(),
            EvaluatorConfig::default(),
            executor,
            alerts,
            source_a,
            source_b,
            market_a,
            market_b,
            None,
        )
    }

    #[tokio::test]
    async fn discovery_populates_matched_pairs() {
        let orchestrator = test_orchestrator();
        orchestrator.refresh_catalog().await;
        let state = orchestrator.state.lock();
        assert_eq!(state.matched.len(), 1);
    }

    #[tokio::test]
    async fn scan_opens_a_position_on_a_profitable_pair() {
        let orchestrator = test_orchestrator();
        orchestrator.refresh_catalog().await;
        orchestrator.scan_once().await;
        let state = orchestrator.state.lock();
        assert!(state.position.is_some());
        assert_eq!(state.position.as_ref().unwrap().opportunity_name, "m1::m1");
    }

    #[tokio::test]
    async fn cooldown_blocks_a_second_trade_on_the_same_market() {
        let orchestrator = test_orchestrator();
        orchestrator.refresh_catalog().await;
        {
            let mut state = orchestrator.state.lock();
            state
                .last_trade_at
                .insert(market_pair_name(&state.matched[0]), Instant::now());
        }
        orchestrator.scan_once().await;
        let state = orchestrator.state.lock();
        assert!(state.position.is_none());
    }

    /// Exercises the real write path end-to-end: open a position via
    /// `scan_once()` (which writes `last_trade_at` keyed by
    /// `market_pair_name`), close it, then scan again immediately and
    /// confirm the cooldown — keyed the same way — blocks a re-trade on the
    /// same market.
    #[tokio::test]
    async fn cooldown_blocks_a_retrade_after_a_real_execution() {
        let orchestrator = test_orchestrator();
        orchestrator.refresh_catalog().await;

        orchestrator.scan_once().await;
        let position = {
            let state = orchestrator.state.lock();
            assert!(state.position.is_some(), "first scan should open a position");
            state.position.clone().unwrap()
        };
        orchestrator.close_position(position).await;
        {
            let state = orchestrator.state.lock();
            assert!(state.position.is_none());
        }

        orchestrator.scan_once().await;
        let state = orchestrator.state.lock();
        assert!(
            state.position.is_none(),
            "per-market cooldown should block an immediate re-trade on the same market"
        );
    }

    #[tokio::test]
    async fn exit_fires_when_opportunity_vanishes() {
        let orchestrator = test_orchestrator();
        let position = Position {
            id: Uuid::new_v4(),
            opportunity_name: "m1::m1".into(),
            strategy: crate::types::Strategy::S1,
            shares_a: dec!(10),
            shares_b: dec!(10),
            outcome_id_a: "m1-yes".into(),
            outcome_id_b: "m1-no".into(),
            entry_price_a: dec!(0.40),
            entry_price_b: dec!(0.40),
            entry_timestamp: Utc::now(),
            expected_net_profit_cents: 20,
            trade_record_id: None,
        };
        {
            let mut state = orchestrator.state.lock();
            state.position = Some(position);
            // Prices moved to parity: the cross-venue edge is gone.
            state.outcomes_a = HashMap::from([("m1".to_string(), outcome(Venue::A, "m1", 50, 50))]);
            state.outcomes_b = HashMap::from([("m1".to_string(), outcome(Venue::B, "m1", 50, 50))]);
            state.refresh_matched(orchestrator.config.matching_threshold);
        }
        orchestrator.scan_once().await;
        let state = orchestrator.state.lock();
        assert!(state.position.is_none());
        let _ = Side::Yes;
    }
}
