//! Live order book state for venue A.
//!
//! [`L2OrderBook`] is the mutable book maintained by [`crate::websocket`] as
//! snapshot/delta messages arrive. The pure VWAP-walk and arbitrage-evaluation
//! logic that reads these books lives in `arbx_arbitrage` (C3/C4), which owns
//! the canonical `Fill`/`Opportunity`/`Position` types for the whole engine.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;

/// L2 order book with incremental update support.
///
/// Maintains sorted price levels for bids (descending) and asks (ascending).
/// Supports both full snapshots and incremental delta updates.
#[derive(Debug, Clone)]
pub struct L2OrderBook {
    /// Token ID this order book represents
    pub token_id: String,
    /// Bid levels: price -> size (sorted descending by price)
    pub bids: BTreeMap<Reverse<Decimal>, Decimal>,
    /// Ask levels: price -> size (sorted ascending by price)
    pub asks: BTreeMap<Decimal, Decimal>,
    /// Timestamp of last update in milliseconds
    pub last_update_ms: Option<i64>,
}

impl L2OrderBook {
    /// Creates a new empty order book for the given token.
    #[must_use]
    pub fn new(token_id: String) -> Self {
        Self {
            token_id,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            last_update_ms: None,
        }
    }

    /// Returns the best (highest) bid price.
    #[must_use]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Returns the best (lowest) ask price.
    #[must_use]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// Returns the bid-ask spread, if both sides have liquidity.
    #[must_use]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }

    /// Returns the mid price, if both sides have liquidity.
    #[must_use]
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }

    /// Applies a full snapshot, replacing all existing levels.
    pub fn apply_snapshot(&mut self, bids: Vec<(Decimal, Decimal)>, asks: Vec<(Decimal, Decimal)>) {
        self.bids.clear();
        self.asks.clear();
        for (price, size) in bids {
            if size > Decimal::ZERO {
                self.bids.insert(Reverse(price), size);
            }
        }
        for (price, size) in asks {
            if size > Decimal::ZERO {
                self.asks.insert(price, size);
            }
        }
    }

    /// Applies a delta update to a single price level.
    ///
    /// If size is zero or negative, the level is removed.
    pub fn apply_delta(&mut self, side: Side, price: Decimal, size: Decimal) {
        match side {
            Side::Buy => {
                if size <= Decimal::ZERO {
                    self.bids.remove(&Reverse(price));
                } else {
                    self.bids.insert(Reverse(price), size);
                }
            }
            Side::Sell => {
                if size <= Decimal::ZERO {
                    self.asks.remove(&price);
                } else {
                    self.asks.insert(price, size);
                }
            }
        }
    }

    /// Returns total bid depth (sum of all bid sizes).
    #[must_use]
    pub fn total_bid_depth(&self) -> Decimal {
        self.bids.values().copied().sum()
    }

    /// Returns total ask depth (sum of all ask sizes).
    #[must_use]
    pub fn total_ask_depth(&self) -> Decimal {
        self.asks.values().copied().sum()
    }

    /// Returns the number of bid levels.
    #[must_use]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Returns the number of ask levels.
    #[must_use]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    /// Checks if the order book has any liquidity.
    #[must_use]
    pub fn has_liquidity(&self) -> bool {
        !self.bids.is_empty() || !self.asks.is_empty()
    }
}

impl Default for L2OrderBook {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Order side (buy or sell), used for book-side deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Buying (taking from asks)
    Buy,
    /// Selling (taking from bids)
    Sell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn create_test_orderbook() -> L2OrderBook {
        let mut book = L2OrderBook::new("test-token".to_string());
        book.apply_snapshot(
            vec![(dec!(0.48), dec!(100)), (dec!(0.47), dec!(200))],
            vec![(dec!(0.50), dec!(150)), (dec!(0.51), dec!(250))],
        );
        book
    }

    #[test]
    fn test_orderbook_new() {
        let book = L2OrderBook::new("token-123".to_string());
        assert_eq!(book.token_id, "token-123");
        assert!(book.bids.is_empty());
        assert!(book.asks.is_empty());
        assert!(book.last_update_ms.is_none());
    }

    #[test]
    fn test_orderbook_best_bid() {
        let book = create_test_orderbook();
        assert_eq!(book.best_bid(), Some(dec!(0.48)));
    }

    #[test]
    fn test_orderbook_best_ask() {
        let book = create_test_orderbook();
        assert_eq!(book.best_ask(), Some(dec!(0.50)));
    }

    #[test]
    fn test_orderbook_spread() {
        let book = create_test_orderbook();
        assert_eq!(book.spread(), Some(dec!(0.02)));
    }

    #[test]
    fn test_orderbook_mid_price() {
        let book = create_test_orderbook();
        assert_eq!(book.mid_price(), Some(dec!(0.49)));
    }

    #[test]
    fn test_orderbook_apply_delta_add() {
        let mut book = create_test_orderbook();
        book.apply_delta(Side::Buy, dec!(0.49), dec!(50));
        assert_eq!(book.best_bid(), Some(dec!(0.49)));
    }

    #[test]
    fn test_orderbook_apply_delta_remove() {
        let mut book = create_test_orderbook();
        book.apply_delta(Side::Buy, dec!(0.48), Decimal::ZERO);
        assert_eq!(book.best_bid(), Some(dec!(0.47)));
    }

    #[test]
    fn test_orderbook_total_depth() {
        let book = create_test_orderbook();
        assert_eq!(book.total_bid_depth(), dec!(300));
        assert_eq!(book.total_ask_depth(), dec!(400));
    }

    #[test]
    fn test_orderbook_levels() {
        let book = create_test_orderbook();
        assert_eq!(book.bid_levels(), 2);
        assert_eq!(book.ask_levels(), 2);
    }

    #[test]
    fn test_orderbook_has_liquidity() {
        let book = create_test_orderbook();
        assert!(book.has_liquidity());

        let empty_book = L2OrderBook::new("empty".to_string());
        assert!(!empty_book.has_liquidity());
    }

    #[test]
    fn test_orderbook_spread_empty_returns_none() {
        let empty_book = L2OrderBook::new("empty".to_string());
        assert!(empty_book.spread().is_none());
    }

    #[test]
    fn test_orderbook_mid_price_empty_returns_none() {
        let empty_book = L2OrderBook::new("empty".to_string());
        assert!(empty_book.mid_price().is_none());
    }

    #[test]
    fn test_orderbook_spread_one_sided_returns_none() {
        let mut book = L2OrderBook::new("one-sided".to_string());
        book.apply_snapshot(vec![(dec!(0.48), dec!(100))], vec![]);
        assert!(book.spread().is_none());

        let mut book2 = L2OrderBook::new("one-sided".to_string());
        book2.apply_snapshot(vec![], vec![(dec!(0.52), dec!(100))]);
        assert!(book2.spread().is_none());
    }

    #[test]
    fn test_orderbook_mid_price_one_sided_returns_none() {
        let mut book = L2OrderBook::new("one-sided".to_string());
        book.apply_snapshot(vec![(dec!(0.48), dec!(100))], vec![]);
        assert!(book.mid_price().is_none());
    }

    #[test]
    fn test_orderbook_apply_snapshot_filters_zero_size() {
        let mut book = L2OrderBook::new("test".to_string());
        book.apply_snapshot(
            vec![(dec!(0.48), Decimal::ZERO), (dec!(0.47), dec!(100))],
            vec![(dec!(0.52), dec!(100)), (dec!(0.53), Decimal::ZERO)],
        );
        assert_eq!(book.bid_levels(), 1);
        assert_eq!(book.ask_levels(), 1);
    }

    #[test]
    fn test_orderbook_apply_delta_negative_size_removes() {
        let mut book = create_test_orderbook();
        book.apply_delta(Side::Buy, dec!(0.48), dec!(-1));
        assert_eq!(book.best_bid(), Some(dec!(0.47)));

        book.apply_delta(Side::Sell, dec!(0.50), dec!(-1));
        assert_eq!(book.best_ask(), Some(dec!(0.51)));
    }

    #[test]
    fn test_orderbook_default() {
        let book = L2OrderBook::default();
        assert!(book.token_id.is_empty());
        assert!(!book.has_liquidity());
    }
}
