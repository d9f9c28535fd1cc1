//! Alert manager (C6).
//!
//! Multiplexes trade and system events into a cooldown-throttled, batched
//! webhook delivery stream with critical-bypass semantics (§4.6). The
//! cooldown map and outbound queue are owned by one [`AlertManager`]
//! instance, constructed once per process (§9).

use crate::types::{AlertEnvelope, AlertLevel};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct AlertManagerConfig {
    pub cooldown: Duration,
    pub batch_interval: Duration,
    pub webhook_timeout: Duration,
}

impl Default for AlertManagerConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(60),
            batch_interval: Duration::from_secs(5),
            webhook_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Default)]
pub struct AlertCounters {
    pub sent_info: AtomicU64,
    pub sent_warn: AtomicU64,
    pub sent_critical: AtomicU64,
    pub suppressed: AtomicU64,
    pub errors: AtomicU64,
}

struct Inner {
    last_sent_at: HashMap<String, Instant>,
    queue: VecDeque<AlertEnvelope>,
    flush_pending: bool,
}

/// Delivers a consolidated batch of alerts somewhere outbound — normally a
/// webhook POST, but swappable in tests.
#[async_trait::async_trait]
pub trait AlertSink: Send + Sync {
    async fn deliver(&self, payload: &str) -> Result<(), String>;
}

/// POSTs the consolidated payload to a webhook URL with the configured
/// timeout; a non-2xx response or a transport error is reported back to the
/// caller (which increments the error counter), matching §4.6's flush
/// behavior.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    #[must_use]
    pub fn new(url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, url }
    }
}

#[async_trait::async_trait]
impl AlertSink for WebhookSink {
    async fn deliver(&self, payload: &str) -> Result<(), String> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .body(payload.to_string())
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(format!("webhook returned {}", response.status()))
        }
    }
}

/// Discards every alert. Used when no webhook URL is configured; alerts
/// still flow through the cooldown/batching logic and counters so the audit
/// trail and logs stay meaningful.
pub struct NullSink;

#[async_trait::async_trait]
impl AlertSink for NullSink {
    async fn deliver(&self, _payload: &str) -> Result<(), String> {
        Ok(())
    }
}

pub struct AlertManager {
    config: AlertManagerConfig,
    sink: Arc<dyn AlertSink>,
    inner: Mutex<Inner>,
    pub counters: AlertCounters,
}

impl AlertManager {
    #[must_use]
    pub fn new(config: AlertManagerConfig, sink: Arc<dyn AlertSink>) -> Self {
        Self {
            config,
            sink,
            inner: Mutex::new(Inner {
                last_sent_at: HashMap::new(),
                queue: VecDeque::new(),
                flush_pending: false,
            }),
            counters: AlertCounters::default(),
        }
    }

    /// Enqueues an alert, honoring the cooldown for non-critical levels and
    /// bypassing it (with an immediate flush) for critical ones.
    pub async fn send(self: &Arc<Self>, alert_type: &str, message: &str, level: AlertLevel) {
        let envelope = AlertEnvelope {
            alert_type: alert_type.to_string(),
            message: message.to_string(),
            level,
            timestamp: Utc::now(),
            source: "arb-engine".to_string(),
        };

        if level == AlertLevel::Critical {
            {
                let mut inner = self.inner.lock();
                inner.queue.push_back(envelope);
            }
            self.flush().await;
            return;
        }

        let should_enqueue = {
            let mut inner = self.inner.lock();
            let now = Instant::now();
            let throttled = inner
                .last_sent_at
                .get(alert_type)
                .is_some_and(|last| now.duration_since(*last) < self.config.cooldown);
            if throttled {
                false
            } else {
                inner.last_sent_at.insert(alert_type.to_string(), now);
                inner.queue.push_back(envelope);
                true
            }
        };

        if !should_enqueue {
            self.counters.suppressed.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let needs_schedule = {
            let mut inner = self.inner.lock();
            if inner.flush_pending {
                false
            } else {
                inner.flush_pending = true;
                true
            }
        };

        if needs_schedule {
            let manager = Arc::clone(self);
            let delay = self.config.batch_interval;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                manager.flush().await;
            });
        }
    }

    /// Drains the queue, builds one consolidated payload preserving enqueue
    /// order, and delivers it. Always logs the consolidated text regardless
    /// of delivery outcome.
    pub async fn flush(&self) {
        let drained: Vec<AlertEnvelope> = {
            let mut inner = self.inner.lock();
            inner.flush_pending = false;
            inner.queue.drain(..).collect()
        };

        if drained.is_empty() {
            return;
        }

        let payload = build_payload(&drained);
        tracing::info!(alert_count = drained.len(), "{}", payload);

        match self.sink.deliver(&payload).await {
            Ok(()) => {
                for alert in &drained {
                    match alert.level {
                        AlertLevel::Info => self.counters.sent_info.fetch_add(1, Ordering::Relaxed),
                        AlertLevel::Warn => self.counters.sent_warn.fetch_add(1, Ordering::Relaxed),
                        AlertLevel::Critical => self.counters.sent_critical.fetch_add(1, Ordering::Relaxed),
                    };
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "alert webhook delivery failed");
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    // --- convenience adapters (§4.6) ---

    pub async fn trade_executed(self: &Arc<Self>, market: &str, net_profit_cents: i64) {
        self.send(
            "trade_executed",
            &format!("executed {market}: net profit {net_profit_cents}c"),
            AlertLevel::Info,
        )
        .await;
    }

    pub async fn trade_failed(self: &Arc<Self>, market: &str, reason: &str) {
        self.send("trade_failed", &format!("{market}: {reason}"), AlertLevel::Warn)
            .await;
    }

    pub async fn circuit_breaker_tripped(self: &Arc<Self>, reason: &str) {
        self.send("circuit_breaker_tripped", reason, AlertLevel::Critical).await;
    }

    pub async fn circuit_breaker_reset(self: &Arc<Self>) {
        self.send("circuit_breaker_reset", "circuit breaker reset", AlertLevel::Info)
            .await;
    }

    pub async fn position_redeemed(self: &Arc<Self>, market: &str, payout_cents: i64) {
        self.send(
            "position_redeemed",
            &format!("{market} redeemed for {payout_cents}c"),
            AlertLevel::Info,
        )
        .await;
    }

    pub async fn daily_summary(self: &Arc<Self>, summary: &str) {
        self.send("daily_summary", summary, AlertLevel::Info).await;
    }

    pub async fn bot_started(self: &Arc<Self>) {
        self.send("bot_started", "engine started", AlertLevel::Info).await;
    }

    pub async fn bot_stopped(self: &Arc<Self>) {
        self.send("bot_stopped", "engine stopped", AlertLevel::Info).await;
    }

    pub async fn big_opportunity(self: &Arc<Self>, market: &str, net_profit_cents: i64) {
        self.send(
            "big_opportunity",
            &format!("{market}: {net_profit_cents}c net profit"),
            AlertLevel::Warn,
        )
        .await;
    }
}

fn build_payload(alerts: &[AlertEnvelope]) -> String {
    let mut lines = Vec::with_capacity(alerts.len());
    for alert in alerts {
        let icon = match alert.level {
            AlertLevel::Info => "i",
            AlertLevel::Warn => "!",
            AlertLevel::Critical => "!!",
        };
        lines.push(format!("[{icon}] {}: {}", alert.alert_type, alert.message));
    }
    lines.join("\n")
}
