use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Trading aggressiveness preset. `Yolo` pins `trade_amount_cents` to a fixed
/// $10 regardless of the configured value, matching the source's behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradingMode {
    Conservative,
    Yolo,
}

impl Default for TradingMode {
    fn default() -> Self {
        Self::Conservative
    }
}

/// Full configuration surface for the engine (§6). Every field is optional at
/// the file/env layer and falls back to [`EngineConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub min_profit_cents: i64,
    pub min_price_threshold_cents: i64,
    pub top_n_opportunities: usize,
    pub poll_interval_seconds: u64,
    pub matching_threshold: f64,
    pub trade_amount_cents: i64,
    pub trading_mode: TradingMode,
    pub dry_run: bool,
    pub liquidity_safety_margin: f64,
    pub min_order_dollars: f64,
    pub alert_cooldown_ms: u64,
    pub trade_cooldown_ms: u64,
    pub alert_threshold_cents: i64,
    pub total_fee_cents: i64,

    pub market_refresh_ms: u64,
    pub kalshi_poll_ms: u64,
    pub scan_interval_ms: u64,
    pub order_timeout_secs: u64,
    pub webhook_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub stream_reconnect_backoff_secs: u64,
    pub audit_ring_capacity: usize,
    pub max_open_cross_positions: usize,

    pub resolution_watcher: ResolutionWatcherConfig,
    pub same_market: SameMarketConfig,

    pub alert_webhook_url: Option<String>,
    pub database_url: Option<String>,

    pub polymarket_base_url: Option<String>,
    pub polymarket_proxy_url: Option<String>,
    pub polymarket_proxy_token_env: String,
    pub polymarket_proxy_timeout_secs: u64,

    pub kalshi_use_demo: bool,
    pub kalshi_base_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_profit_cents: 1,
            min_price_threshold_cents: 2,
            top_n_opportunities: 10,
            poll_interval_seconds: 5,
            matching_threshold: 0.7,
            trade_amount_cents: 1000,
            trading_mode: TradingMode::default(),
            dry_run: true,
            liquidity_safety_margin: 0.5,
            min_order_dollars: 1.10,
            alert_cooldown_ms: 60_000,
            trade_cooldown_ms: 10_000,
            alert_threshold_cents: 5,
            total_fee_cents: 0,

            market_refresh_ms: 60_000,
            kalshi_poll_ms: 5_000,
            scan_interval_ms: 5_000,
            order_timeout_secs: 15,
            webhook_timeout_secs: 5,
            probe_timeout_secs: 10,
            stream_reconnect_backoff_secs: 5,
            audit_ring_capacity: 500,
            max_open_cross_positions: 1,

            resolution_watcher: ResolutionWatcherConfig::default(),
            same_market: SameMarketConfig::default(),

            alert_webhook_url: None,
            database_url: None,

            polymarket_base_url: None,
            polymarket_proxy_url: None,
            polymarket_proxy_token_env: "POLYMARKET_PROXY_TOKEN".to_string(),
            polymarket_proxy_timeout_secs: 10,

            kalshi_use_demo: false,
            kalshi_base_url: None,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn order_timeout(&self) -> Duration {
        Duration::from_secs(self.order_timeout_secs)
    }

    #[must_use]
    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }

    #[must_use]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    #[must_use]
    pub fn polymarket_proxy_timeout(&self) -> Duration {
        Duration::from_secs(self.polymarket_proxy_timeout_secs)
    }

    /// Resolves the effective per-trade dollar amount given the trading mode,
    /// matching the source's YOLO override of a fixed $10.
    #[must_use]
    pub fn effective_trade_amount_cents(&self) -> i64 {
        match self.trading_mode {
            TradingMode::Yolo => 1000,
            TradingMode::Conservative => self.trade_amount_cents,
        }
    }
}

/// Optional post-resolution settlement-lag watcher (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionWatcherConfig {
    pub enabled: bool,
    pub check_interval_secs: u64,
}

impl Default for ResolutionWatcherConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            check_interval_secs: 300,
        }
    }
}

/// Same-market (single-venue, both-sides) track configuration, the
/// `btc15min*` keys in §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SameMarketConfig {
    pub target_pair_cost: f64,
    pub order_size: i64,
    pub scan_interval_ms: u64,
    pub market_refresh_ms: u64,
    pub tickers: Vec<String>,
    pub max_positions_per_market: usize,
    pub min_time_remaining_ms: i64,
    pub cooldown_ms: u64,
}

impl Default for SameMarketConfig {
    fn default() -> Self {
        Self {
            target_pair_cost: 0.97,
            order_size: 10,
            scan_interval_ms: 5_000,
            market_refresh_ms: 60_000,
            tickers: Vec::new(),
            max_positions_per_market: 10,
            min_time_remaining_ms: 60_000,
            cooldown_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.min_profit_cents, 1);
        assert_eq!(cfg.min_price_threshold_cents, 2);
        assert_eq!(cfg.top_n_opportunities, 10);
        assert!((cfg.matching_threshold - 0.7).abs() < f64::EPSILON);
        assert!(cfg.dry_run);
        assert!((cfg.liquidity_safety_margin - 0.5).abs() < f64::EPSILON);
        assert!((cfg.min_order_dollars - 1.10).abs() < f64::EPSILON);
        assert_eq!(cfg.alert_cooldown_ms, 60_000);
        assert_eq!(cfg.trade_cooldown_ms, 10_000);
        assert_eq!(cfg.same_market.max_positions_per_market, 10);
        assert!((cfg.same_market.target_pair_cost - 0.97).abs() < f64::EPSILON);
    }

    #[test]
    fn yolo_mode_pins_fixed_amount() {
        let mut cfg = EngineConfig::default();
        cfg.trading_mode = TradingMode::Yolo;
        cfg.trade_amount_cents = 5_000;
        assert_eq!(cfg.effective_trade_amount_cents(), 1000);
    }

    #[test]
    fn conservative_mode_uses_configured_amount() {
        let mut cfg = EngineConfig::default();
        cfg.trade_amount_cents = 2_500;
        assert_eq!(cfg.effective_trade_amount_cents(), 2_500);
    }
}
