//! Book walker and fee model (C3).
//!
//! Walks a sorted ask ladder to compute a VWAP fill cost, and implements the
//! venue-A taker fee formula and the pair-arb profit math (§4.3).

use crate::types::{Fill, OrderBook};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// Flat cents-per-contract override for venue B, whose fees are implicit in
/// price quoting at the model layer.
pub const VENUE_B_FEE_CENTS_PER_CONTRACT: i64 = 0;

/// Walks `book`'s ask side for `target_size` shares. Returns `None` if the
/// ladder's total depth is insufficient — callers must treat that as a skip,
/// never as a partial order.
#[must_use]
pub fn walk_buy(book: &OrderBook, target_size: Decimal) -> Option<Fill> {
    if target_size <= Decimal::ZERO || book.asks.is_empty() {
        return None;
    }

    let mut filled = Decimal::ZERO;
    let mut total_cost = Decimal::ZERO;
    let mut worst_price = Decimal::ZERO;
    let best_price = *book.asks.keys().next()?;

    for (&price, &size) in &book.asks {
        if filled >= target_size {
            break;
        }
        let remaining = target_size - filled;
        let take = size.min(remaining);
        total_cost += take * price;
        filled += take;
        worst_price = price;
    }

    if filled < target_size {
        return None;
    }

    let vwap = total_cost / filled;
    Some(Fill {
        filled,
        total_cost_dollars: total_cost,
        vwap_dec: vwap,
        worst_price_dec: worst_price,
        best_price_dec: best_price,
    })
}

/// Venue-A taker fee for a single-side buy at decimal price `p` over `n`
/// shares: `fee = n * p * 0.25 * (p*(1-p))^2`.
#[must_use]
pub fn venue_a_taker_fee(price: Decimal, shares: Decimal) -> Decimal {
    let p = price.to_f64().unwrap_or(0.0);
    let n = shares.to_f64().unwrap_or(0.0);
    let spread_term = p * (1.0 - p);
    let fee = n * p * 0.25 * spread_term * spread_term;
    Decimal::from_f64_retain(fee).unwrap_or(Decimal::ZERO)
}

/// Flat per-contract venue-B fee override, in dollars, for `n` contracts.
#[must_use]
pub fn venue_b_fee(contracts: Decimal, cents_per_contract: i64) -> Decimal {
    contracts * Decimal::new(cents_per_contract, 2)
}

/// Fee for a same-market pair: the sum of both sides' venue-A taker fees.
#[must_use]
pub fn same_market_fee(price_yes: Decimal, price_no: Decimal, shares: Decimal) -> Decimal {
    venue_a_taker_fee(price_yes, shares) + venue_a_taker_fee(price_no, shares)
}

/// Pair arb math: `gross = (1 - (cA+cB)) * n`, `net = gross - total_fee`.
#[must_use]
pub fn calc_pair_arb(cost_a: Decimal, cost_b: Decimal, shares: Decimal, total_fee: Decimal) -> (Decimal, Decimal) {
    let gross = (Decimal::ONE - (cost_a + cost_b)) * shares;
    let net = gross - total_fee;
    (gross, net)
}
