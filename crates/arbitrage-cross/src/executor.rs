//! Dual-leg execution engine (C5).
//!
//! Implements the state machine in §4.5: min-order validation, best-effort
//! liquidity probing, a dry-run gate, truly concurrent placement of both
//! legs via [`tokio::join!`], and reconciliation into a typed result. A
//! partial fill is surfaced as a critical, human-review event — the engine
//! never attempts to auto-close the surviving leg.

use crate::audit::{AuditEntry, AuditRing};
use crate::types::{Action, AuditEventType, Opportunity, Position, Side, Strategy};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::time::Duration;
use thiserror::Error;

/// One leg of a dual-leg order, fully resolved from an [`Opportunity`] and a
/// chosen contract count.
#[derive(Debug, Clone)]
pub struct LegOrder {
    pub market_id: String,
    pub outcome_id: String,
    pub side: Side,
    pub action: Action,
    pub price_dec: Decimal,
    pub contracts: Decimal,
}

#[derive(Debug, Clone)]
pub struct LegFill {
    pub order_id: String,
    pub filled: Decimal,
    pub avg_price_dec: Decimal,
}

#[derive(Debug, Error, Clone)]
pub enum LegError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("venue rejected order: {0}")]
    Rejected(String),
}

/// Abstraction over a single venue's order-placement and depth-probing
/// surface, so the executor stays agnostic to which concrete venue client
/// (venue A or venue B) it is driving. Implemented by thin adapters over
/// each venue's client crate.
#[async_trait]
pub trait LegMarket: Send + Sync {
    async fn ask_depth(&self, outcome_id: &str) -> Option<Decimal>;
    async fn place_order(&self, order: LegOrder) -> Result<LegFill, LegError>;
}

#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    pub liquidity_margin: f64,
    pub min_order_dollars: f64,
    pub order_timeout: Duration,
    pub probe_timeout: Duration,
    pub dry_run: bool,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            liquidity_margin: 0.5,
            min_order_dollars: 1.10,
            order_timeout: Duration::from_secs(15),
            probe_timeout: Duration::from_secs(10),
            dry_run: true,
        }
    }
}

/// Minimum contract count needed so that `price * contracts >= minOrderDollars`.
#[must_use]
pub fn min_contracts_for_price(price_dollars: f64, min_order_dollars: f64) -> i64 {
    if price_dollars <= 0.0 {
        return i64::MAX;
    }
    (min_order_dollars / price_dollars).ceil() as i64
}

/// `price * contracts >= min`, i.e. whether an order clears the dollar floor.
#[must_use]
pub fn validate_min_order(price_dollars: f64, contracts: i64, min_order_dollars: f64) -> bool {
    price_dollars * contracts as f64 >= min_order_dollars
}

#[derive(Debug, Clone)]
pub struct LegConfirmation {
    pub order_id: String,
    pub filled: Decimal,
    pub avg_price_dec: Decimal,
}

#[derive(Debug, Clone)]
pub enum ExecutionResult {
    /// Dry-run or live placement of both legs succeeded.
    Success {
        leg_a: LegConfirmation,
        leg_b: LegConfirmation,
        elapsed_ms: u64,
        dry_run: bool,
    },
    /// Neither leg met the minimum order dollar amount.
    SkipMinOrder { reason: String },
    /// Available depth (after the liquidity margin) was too small to trade.
    SkipLiquidity { reason: String },
    /// Exactly one leg filled. The unhedged side and the failed side's error
    /// are named; no automatic unwind is attempted — this is a human-review
    /// event by policy.
    CriticalPartialFill {
        filled_side: Side,
        filled: LegConfirmation,
        failed_side: Side,
        failed_error: LegError,
    },
    /// Both legs failed to place.
    BothFailed { error_a: LegError, error_b: LegError },
}

impl ExecutionResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn is_critical_partial_fill(&self) -> bool {
        matches!(self, Self::CriticalPartialFill { .. })
    }
}

/// Resolves a strategy into concrete (side A, side B) wiring for each leg
/// (§4.5's "Side/price wiring").
fn leg_sides(strategy: Strategy) -> (Side, Side) {
    match strategy {
        Strategy::S1 => (Side::Yes, Side::No),
        Strategy::S2 => (Side::No, Side::Yes),
        Strategy::Sm => (Side::Yes, Side::No),
    }
}

pub struct Executor {
    config: ExecutorConfig,
    audit: AuditRing,
}

impl Executor {
    #[must_use]
    pub fn new(config: ExecutorConfig, audit_capacity: usize) -> Self {
        Self {
            config,
            audit: AuditRing::new(audit_capacity),
        }
    }

    #[must_use]
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.snapshot()
    }

    /// Executes `opportunity` by placing two concurrent orders, one per
    /// venue/market, sized according to §4.5's liquidity rules. `market_a`
    /// and `market_b` are the venue adapters for each leg; for the
    /// same-market (`SM`) strategy both point at the same venue.
    pub async fn execute(
        &self,
        opportunity: &Opportunity,
        market_a: &dyn LegMarket,
        market_b: &dyn LegMarket,
        outcome_id_a: &str,
        outcome_id_b: &str,
        requested_contracts: i64,
    ) -> ExecutionResult {
        let (side_a, side_b) = leg_sides(opportunity.strategy);
        let price_a = opportunity.price_a_cents as f64 / 100.0;
        let price_b = opportunity.price_b_cents as f64 / 100.0;

        // Step 1: validate min-order on both legs.
        let a_ok = validate_min_order(price_a, requested_contracts, self.config.min_order_dollars);
        let b_ok = validate_min_order(price_b, requested_contracts, self.config.min_order_dollars);
        if !a_ok || !b_ok {
            let reason = format!(
                "leg below minimum order of ${:.2}: a_ok={a_ok} b_ok={b_ok}",
                self.config.min_order_dollars
            );
            self.audit.push(AuditEventType::SkipMinOrder, &opportunity.name, &reason);
            return ExecutionResult::SkipMinOrder { reason };
        }

        // Step 2: best-effort depth probe.
        let depth_a = market_a.ask_depth(outcome_id_a).await;
        let depth_b = market_b.ask_depth(outcome_id_b).await;

        let mut safe = requested_contracts;
        if let Some(d) = depth_a {
            let scaled = (d.to_f64().unwrap_or(0.0) * self.config.liquidity_margin).floor() as i64;
            safe = safe.min(scaled);
        }
        if let Some(d) = depth_b {
            let scaled = (d.to_f64().unwrap_or(0.0) * self.config.liquidity_margin).floor() as i64;
            safe = safe.min(scaled);
        }
        safe = safe.max(0).min(requested_contracts);

        if safe < 1
            || !validate_min_order(price_a, safe, self.config.min_order_dollars)
            || !validate_min_order(price_b, safe, self.config.min_order_dollars)
        {
            let reason = format!("safe size {safe} insufficient after liquidity margin");
            self.audit.push(AuditEventType::SkipLiquidity, &opportunity.name, &reason);
            return ExecutionResult::SkipLiquidity { reason };
        }

        let contracts = Decimal::from(safe);
        let leg_a = LegOrder {
            market_id: opportunity.name.clone(),
            outcome_id: outcome_id_a.to_string(),
            side: side_a,
            action: Action::Buy,
            price_dec: Decimal::from_f64_or_zero(price_a),
            contracts,
        };
        let leg_b = LegOrder {
            market_id: opportunity.name.clone(),
            outcome_id: outcome_id_b.to_string(),
            side: side_b,
            action: Action::Buy,
            price_dec: Decimal::from_f64_or_zero(price_b),
            contracts,
        };

        // Step 3: dry-run gate — no network I/O for order placement.
        if self.config.dry_run {
            let details = format!("synthesized dry-run fill of {safe} contracts");
            self.audit.push(AuditEventType::DryRun, &opportunity.name, &details);
            let synth = |side: Side, order: &LegOrder| LegConfirmation {
                order_id: format!("dry-run-{}-{}", opportunity.name, side.as_str()),
                filled: order.contracts,
                avg_price_dec: order.price_dec,
            };
            return ExecutionResult::Success {
                leg_a: synth(side_a, &leg_a),
                leg_b: synth(side_b, &leg_b),
                elapsed_ms: 0,
                dry_run: true,
            };
        }

        // Step 4: live placement — truly concurrent, both legs awaited.
        let started = std::time::Instant::now();
        let (result_a, result_b) = tokio::join!(
            tokio::time::timeout(self.config.order_timeout, market_a.place_order(leg_a)),
            tokio::time::timeout(self.config.order_timeout, market_b.place_order(leg_b)),
        );
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result_a = result_a.unwrap_or(Err(LegError::Timeout(self.config.order_timeout)));
        let result_b = result_b.unwrap_or(Err(LegError::Timeout(self.config.order_timeout)));

        // Step 5: reconcile.
        match (result_a, result_b) {
            (Ok(fill_a), Ok(fill_b)) => {
                self.audit.push(
                    AuditEventType::Executed,
                    &opportunity.name,
                    &format!("both legs filled in {elapsed_ms}ms"),
                );
                ExecutionResult::Success {
                    leg_a: LegConfirmation {
                        order_id: fill_a.order_id,
                        filled: fill_a.filled,
                        avg_price_dec: fill_a.avg_price_dec,
                    },
                    leg_b: LegConfirmation {
                        order_id: fill_b.order_id,
                        filled: fill_b.filled,
                        avg_price_dec: fill_b.avg_price_dec,
                    },
                    elapsed_ms,
                    dry_run: false,
                }
            }
            (Ok(fill_a), Err(err_b)) => {
                self.audit.push(
                    AuditEventType::CriticalPartialFill,
                    &opportunity.name,
                    &format!("leg A filled, leg B failed: {err_b}"),
                );
                ExecutionResult::CriticalPartialFill {
                    filled_side: side_a,
                    filled: LegConfirmation {
                        order_id: fill_a.order_id,
                        filled: fill_a.filled,
                        avg_price_dec: fill_a.avg_price_dec,
                    },
                    failed_side: side_b,
                    failed_error: err_b,
                }
            }
            (Err(err_a), Ok(fill_b)) => {
                self.audit.push(
                    AuditEventType::CriticalPartialFill,
                    &opportunity.name,
                    &format!("leg B filled, leg A failed: {err_a}"),
                );
                ExecutionResult::CriticalPartialFill {
                    filled_side: side_b,
                    filled: LegConfirmation {
                        order_id: fill_b.order_id,
                        filled: fill_b.filled,
                        avg_price_dec: fill_b.avg_price_dec,
                    },
                    failed_side: side_a,
                    failed_error: err_a,
                }
            }
            (Err(err_a), Err(err_b)) => {
                self.audit.push(
                    AuditEventType::BothFailed,
                    &opportunity.name,
                    &format!("both legs failed: a={err_a} b={err_b}"),
                );
                ExecutionResult::BothFailed {
                    error_a: err_a,
                    error_b: err_b,
                }
            }
        }
    }

    /// Closes an open position by placing the inverse (SELL) of both entry
    /// legs concurrently, at the supplied exit prices (§4.7's exit policy).
    /// Failure of either leg is reported the same way a partial fill is —
    /// as a critical, human-review event — since there is no automatic
    /// remediation for a position left half-unwound.
    pub async fn execute_exit(
        &self,
        position: &Position,
        market_a: &dyn LegMarket,
        market_b: &dyn LegMarket,
        exit_price_a: Decimal,
        exit_price_b: Decimal,
    ) -> ExecutionResult {
        let (side_a, side_b) = leg_sides(position.strategy);
        let leg_a = LegOrder {
            market_id: position.opportunity_name.clone(),
            outcome_id: position.outcome_id_a.clone(),
            side: side_a,
            action: Action::Sell,
            price_dec: exit_price_a,
            contracts: position.shares_a,
        };
        let leg_b = LegOrder {
            market_id: position.opportunity_name.clone(),
            outcome_id: position.outcome_id_b.clone(),
            side: side_b,
            action: Action::Sell,
            price_dec: exit_price_b,
            contracts: position.shares_b,
        };

        if self.config.dry_run {
            let details = format!("synthesized dry-run exit fill for {}", position.opportunity_name);
            self.audit.push(AuditEventType::Executed, &position.opportunity_name, &details);
            let synth = |side: Side, order: &LegOrder| LegConfirmation {
                order_id: format!("dry-run-exit-{}-{}", position.opportunity_name, side.as_str()),
                filled: order.contracts,
                avg_price_dec: order.price_dec,
            };
            return ExecutionResult::Success {
                leg_a: synth(side_a, &leg_a),
                leg_b: synth(side_b, &leg_b),
                elapsed_ms: 0,
                dry_run: true,
            };
        }

        let started = std::time::Instant::now();
        let (result_a, result_b) = tokio::join!(
            tokio::time::timeout(self.config.order_timeout, market_a.place_order(leg_a)),
            tokio::time::timeout(self.config.order_timeout, market_b.place_order(leg_b)),
        );
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result_a = result_a.unwrap_or(Err(LegError::Timeout(self.config.order_timeout)));
        let result_b = result_b.unwrap_or(Err(LegError::Timeout(self.config.order_timeout)));

        match (result_a, result_b) {
            (Ok(fill_a), Ok(fill_b)) => {
                self.audit.push(
                    AuditEventType::Executed,
                    &position.opportunity_name,
                    &format!("exit: both legs closed in {elapsed_ms}ms"),
                );
                ExecutionResult::Success {
                    leg_a: LegConfirmation {
                        order_id: fill_a.order_id,
                        filled: fill_a.filled,
                        avg_price_dec: fill_a.avg_price_dec,
                    },
                    leg_b: LegConfirmation {
                        order_id: fill_b.order_id,
                        filled: fill_b.filled,
                        avg_price_dec: fill_b.avg_price_dec,
                    },
                    elapsed_ms,
                    dry_run: false,
                }
            }
            (Ok(fill_a), Err(err_b)) => {
                self.audit.push(
                    AuditEventType::CriticalPartialFill,
                    &position.opportunity_name,
                    &format!("exit: leg A closed, leg B failed: {err_b}"),
                );
                ExecutionResult::CriticalPartialFill {
                    filled_side: side_a,
                    filled: LegConfirmation {
                        order_id: fill_a.order_id,
                        filled: fill_a.filled,
                        avg_price_dec: fill_a.avg_price_dec,
                    },
                    failed_side: side_b,
                    failed_error: err_b,
                }
            }
            (Err(err_a), Ok(fill_b)) => {
                self.audit.push(
                    AuditEventType::CriticalPartialFill,
                    &position.opportunity_name,
                    &format!("exit: leg B closed, leg A failed: {err_a}"),
                );
                ExecutionResult::CriticalPartialFill {
                    filled_side: side_b,
                    filled: LegConfirmation {
                        order_id: fill_b.order_id,
                        filled: fill_b.filled,
                        avg_price_dec: fill_b.avg_price_dec,
                    },
                    failed_side: side_a,
                    failed_error: err_a,
                }
            }
            (Err(err_a), Err(err_b)) => {
                self.audit.push(
                    AuditEventType::BothFailed,
                    &position.opportunity_name,
                    &format!("exit: both legs failed: a={err_a} b={err_b}"),
                );
                ExecutionResult::BothFailed {
                    error_a: err_a,
                    error_b: err_b,
                }
            }
        }
    }
}

trait DecimalExt {
    fn from_f64_or_zero(v: f64) -> Decimal;
}

impl DecimalExt for Decimal {
    fn from_f64_or_zero(v: f64) -> Decimal {
        Decimal::from_f64_retain(v).unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeMarket {
        depth: Option<Decimal>,
        result: Arc<dyn Fn() -> Result<LegFill, LegError> + Send + Sync>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl LegMarket for FakeMarket {
        async fn ask_depth(&self, _outcome_id: &str) -> Option<Decimal> {
            self.depth
        }

        async fn place_order(&self, order: LegOrder) -> Result<LegFill, LegError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)().map(|mut f| {
                f.filled = order.contracts;
                f
            })
        }
    }

    fn success_market(depth: Option<Decimal>) -> FakeMarket {
        FakeMarket {
            depth,
            result: Arc::new(|| {
                Ok(LegFill {
                    order_id: "ord-1".into(),
                    filled: Decimal::ZERO,
                    avg_price_dec: Decimal::new(50, 2),
                })
            }),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn failing_market(depth: Option<Decimal>) -> FakeMarket {
        FakeMarket {
            depth,
            result: Arc::new(|| Err(LegError::Transport("connection reset".into()))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn opportunity() -> Opportunity {
        Opportunity {
            name: "BTC-100k".into(),
            strategy: Strategy::S1,
            side_a: Side::Yes,
            side_b: Side::No,
            price_a_cents: 40,
            price_b_cents: 40,
            fees_cents: 0,
            net_profit_cents: 20,
            total_cost_cents: 80,
            contracts: None,
            total_volume_usd: 1000.0,
            detected_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn min_order_rejection_skips_execution() {
        let executor = Executor::new(
            ExecutorConfig {
                dry_run: false,
                min_order_dollars: 1.10,
                ..Default::default()
            },
            10,
        );
        let mut opp = opportunity();
        opp.price_a_cents = 1;
        opp.price_b_cents = 1;
        let a = success_market(Some(Decimal::from(1000)));
        let b = success_market(Some(Decimal::from(1000)));
        let result = executor.execute(&opp, &a, &b, "a", "b", 100).await;
        assert!(matches!(result, ExecutionResult::SkipMinOrder { .. }));
    }

    #[tokio::test]
    async fn validate_min_order_boundary() {
        assert!(!validate_min_order(0.01, 109, 1.10));
        assert!(validate_min_order(0.01, 110, 1.10));
    }

    #[tokio::test]
    async fn liquidity_cap_scenario() {
        let executor = Executor::new(
            ExecutorConfig {
                dry_run: false,
                liquidity_margin: 0.5,
                min_order_dollars: 1.10,
                ..Default::default()
            },
            10,
        );
        let mut opp = opportunity();
        opp.price_a_cents = 40;
        opp.price_b_cents = 40;
        let a = success_market(Some(Decimal::from(40)));
        let b = success_market(Some(Decimal::from(200)));
        let result = executor.execute(&opp, &a, &b, "a", "b", 100).await;
        match result {
            ExecutionResult::Success { leg_a, leg_b, .. } => {
                assert_eq!(leg_a.filled, Decimal::from(20));
                assert_eq!(leg_b.filled, Decimal::from(20));
            }
            other => panic!("expected success with capped size, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dry_run_synthesizes_success_without_placing_orders() {
        let executor = Executor::new(ExecutorConfig::default(), 10);
        let opp = opportunity();
        let a = success_market(None);
        let b = success_market(None);
        let result = executor.execute(&opp, &a, &b, "a", "b", 10).await;
        assert!(result.is_success());
        assert_eq!(a.calls.load(Ordering::SeqCst), 0);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn partial_fill_is_critical_and_not_auto_unwound() {
        let executor = Executor::new(
            ExecutorConfig {
                dry_run: false,
                ..Default::default()
            },
            10,
        );
        let opp = opportunity();
        let a = success_market(None);
        let b = failing_market(None);
        let result = executor.execute(&opp, &a, &b, "a", "b", 10).await;
        assert!(result.is_critical_partial_fill());
        // The surviving leg is reported, not automatically unwound — there
        // is no sell-side call on the successful market.
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn both_legs_failing_reports_both_errors() {
        let executor = Executor::new(
            ExecutorConfig {
                dry_run: false,
                ..Default::default()
            },
            10,
        );
        let opp = opportunity();
        let a = failing_market(None);
        let b = failing_market(None);
        let result = executor.execute(&opp, &a, &b, "a", "b", 10).await;
        assert!(matches!(result, ExecutionResult::BothFailed { .. }));
    }

    #[test]
    fn min_contracts_for_price_matches_ceiling_division() {
        assert_eq!(min_contracts_for_price(0.40, 1.10), 3);
        assert_eq!(min_contracts_for_price(0.55, 1.10), 2);
    }
}
