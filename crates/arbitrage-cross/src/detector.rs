//! Arb evaluator (C4).
//!
//! Pure functions: given a matched pair's live prices (cross-venue) or a
//! single binary market's two ask books (same-market), emit a profitable
//! [`Opportunity`] or nothing. No side effects, no I/O.

use crate::fees::{same_market_fee, venue_a_taker_fee, walk_buy};
use crate::types::{MatchedPair, OrderBook, Opportunity, Side, Strategy};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Thresholds the cross-venue and same-market evaluators are parameterized
/// on (§4.4).
#[derive(Debug, Clone, Copy)]
pub struct EvaluatorConfig {
    pub min_profit_cents: i64,
    pub min_price_threshold_cents: i64,
    pub fee_const_cents: i64,
    pub target_pair_cost: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            min_profit_cents: 1,
            min_price_threshold_cents: 2,
            fee_const_cents: 0,
            target_pair_cost: 0.97,
        }
    }
}

/// Cross-venue evaluation: emits S1 or S2, or nothing (§4.4).
///
/// S1 buys YES on venue A and NO on venue B; S2 is the mirror. The
/// evaluator only ever reads the YES price from one venue and the NO price
/// from the other — it never sums two same-side prices, which is how the
/// complementary-outcome pairing invariant is enforced explicitly.
#[must_use]
pub fn evaluate_cross_venue(pair: &MatchedPair, cfg: &EvaluatorConfig) -> Option<Opportunity> {
    let a = &pair.outcome_a;
    let b = &pair.outcome_b;

    let s1_cost = a.yes_price_cents + b.no_price_cents + cfg.fee_const_cents;
    let s2_cost = a.no_price_cents + b.yes_price_cents + cfg.fee_const_cents;

    let s1_profit = 100 - s1_cost;
    let s2_profit = 100 - s2_cost;

    // Tie-break S1 over S2.
    let (strategy, profit, cost, side_a, side_b, price_a, price_b) = if s1_profit >= s2_profit {
        (
            Strategy::S1,
            s1_profit,
            s1_cost,
            Side::Yes,
            Side::No,
            a.yes_price_cents,
            b.no_price_cents,
        )
    } else {
        (
            Strategy::S2,
            s2_profit,
            s2_cost,
            Side::No,
            Side::Yes,
            a.no_price_cents,
            b.yes_price_cents,
        )
    };

    if profit < cfg.min_profit_cents {
        return None;
    }
    // All four prices on both sides must exceed the floor, not just the two
    // legs actually traded.
    let prices = [
        a.yes_price_cents,
        a.no_price_cents,
        b.yes_price_cents,
        b.no_price_cents,
    ];
    if prices.iter().any(|p| *p <= cfg.min_price_threshold_cents) {
        return None;
    }

    Some(Opportunity {
        name: format!("{}::{}", a.market_id, b.market_id),
        strategy,
        side_a,
        side_b,
        price_a_cents: price_a,
        price_b_cents: price_b,
        fees_cents: cfg.fee_const_cents,
        net_profit_cents: profit,
        total_cost_cents: cost,
        contracts: None,
        total_volume_usd: a.volume_usd.min(b.volume_usd),
        detected_at: Utc::now(),
    })
}

/// Same-market evaluation: emits SM, or nothing (§4.4).
///
/// Walks the ask side of both the YES and NO books for `order_size` shares;
/// both walks must succeed. Emits iff `pairCost < targetPairCost` (strict)
/// and net profit after both-side taker fees is strictly positive.
#[must_use]
pub fn evaluate_same_market(
    market_id: &str,
    yes_book: &OrderBook,
    no_book: &OrderBook,
    order_size: Decimal,
    cfg: &EvaluatorConfig,
) -> Option<Opportunity> {
    let yes_fill = walk_buy(yes_book, order_size)?;
    let no_fill = walk_buy(no_book, order_size)?;

    let pair_cost = yes_fill.vwap_dec + no_fill.vwap_dec;
    let target = Decimal::from_f64_retain(cfg.target_pair_cost)?;
    if pair_cost >= target {
        return None;
    }

    let fee = same_market_fee(yes_fill.vwap_dec, no_fill.vwap_dec, order_size);
    let gross = (Decimal::ONE - pair_cost) * order_size;
    let net = gross - fee;
    if net <= Decimal::ZERO {
        return None;
    }

    let net_profit_cents = (net.to_f64().unwrap_or(0.0) * 100.0).round() as i64;
    let price_a_cents = (yes_fill.vwap_dec.to_f64().unwrap_or(0.0) * 100.0).round() as i64;
    let price_b_cents = (no_fill.vwap_dec.to_f64().unwrap_or(0.0) * 100.0).round() as i64;

    Some(Opportunity {
        name: market_id.to_string(),
        strategy: Strategy::Sm,
        side_a: Side::Yes,
        side_b: Side::No,
        price_a_cents,
        price_b_cents,
        fees_cents: (fee.to_f64().unwrap_or(0.0) * 100.0).round() as i64,
        net_profit_cents,
        total_cost_cents: price_a_cents + price_b_cents,
        contracts: order_size.to_i64(),
        total_volume_usd: 0.0,
        detected_at: Utc::now(),
    })
}

/// Helper used by the executor when it needs the standalone venue-A fee at
/// an arbitrary price/size, outside of a full evaluation pass.
#[must_use]
pub fn leg_fee(price: Decimal, shares: Decimal) -> Decimal {
    venue_a_taker_fee(price, shares)
}
