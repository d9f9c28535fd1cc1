//! Cross-venue arbitrage detection and execution for binary prediction markets.
//!
//! This crate provides tools for matching equivalent binary markets across a
//! decentralized on-chain venue ("venue A") and a centralized venue ("venue
//! B"), detecting when their combined pricing guarantees a profit net of
//! fees, and executing both legs concurrently.
//!
//! # Overview
//!
//! When the same event is priced differently on each venue, buying opposing
//! outcomes can lock in a guaranteed payout:
//!
//! ```text
//! Venue A:  YES @ $0.52
//! Venue B:  NO  @ $0.46
//! Total cost:        $0.98
//! Guaranteed payout:  $1.00
//! Gross edge:         $0.02
//! ```
//!
//! # Modules
//!
//! - [`types`]: shared types (`Venue`, `Side`, `Opportunity`, `Position`, ...)
//! - [`similarity`]: string similarity used to propose candidate matches
//! - [`matcher`]: one-to-one outcome matching across venues
//! - [`fees`]: order-book walking and venue fee models
//! - [`detector`]: pure opportunity evaluation (cross-venue and same-market)
//! - [`executor`]: the dual-leg execution state machine
//! - [`audit`]: bounded in-memory audit trail
//! - [`alerts`]: cooldown-throttled webhook alerting
//! - [`orchestrator`]: the scan/discovery/exit scheduler tying the above
//!   together into a running engine
//! - [`adapters`]: concrete `LegMarket`/`MarketSource` wiring for the real
//!   venue-A and venue-B clients

pub mod adapters;
pub mod audit;
pub mod alerts;
pub mod detector;
pub mod executor;
pub mod fees;
pub mod matcher;
pub mod orchestrator;
pub mod similarity;
pub mod types;

pub use adapters::{KalshiMarket, PolymarketMarket};
pub use alerts::{AlertManager, AlertManagerConfig, AlertSink, NullSink, WebhookSink};
pub use audit::AuditRing;
pub use detector::{evaluate_cross_venue, evaluate_same_market, EvaluatorConfig};
pub use executor::{ExecutionResult, Executor, ExecutorConfig, LegMarket, LegOrder};
pub use matcher::match_outcomes;
pub use orchestrator::{MarketSource, Orchestrator, OrchestratorConfig, ResolutionWatcherConfig};
pub use types::{
    Action, AlertLevel, AuditEntry, AuditEventType, MatchedPair, Opportunity, OrderBook, Outcome,
    Position, Side, Strategy, Venue,
};
