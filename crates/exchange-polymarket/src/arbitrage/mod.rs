//! Live order book state for venue A.
//!
//! [`L2OrderBook`] is maintained incrementally by [`crate::websocket`] as
//! snapshot/delta messages arrive over the streaming feed. Consumers that
//! need VWAP fill cost, the fee model, or opportunity/position types use
//! `arbx_arbitrage` (C3/C4), which is the single owner of those types.
//!
//! # Example
//!
//! ```
//! use arbx_polymarket::arbitrage::{L2OrderBook, Side};
//! use rust_decimal_macros::dec;
//!
//! let mut book = L2OrderBook::new("yes-token-123".to_string());
//! book.apply_snapshot(
//!     vec![(dec!(0.46), dec!(200))],  // bids
//!     vec![(dec!(0.48), dec!(500))],  // asks
//! );
//!
//! assert_eq!(book.best_ask(), Some(dec!(0.48)));
//! ```

pub mod types;

pub use types::{L2OrderBook, Side};
