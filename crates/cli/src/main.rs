use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use arbx_arbitrage::{
    AlertManager, AlertManagerConfig, Executor, ExecutorConfig, KalshiMarket, NullSink,
    Orchestrator, OrchestratorConfig, PolymarketMarket, ResolutionWatcherConfig as OrchResolutionWatcherConfig,
    WebhookSink,
};
use arbx_arbitrage::detector::EvaluatorConfig;
use arbx_core::{ConfigLoader, EngineConfig};
use arbx_data::{DatabaseClient, Repositories};
use arbx_kalshi::{KalshiClient, KalshiClientConfig};
use arbx_polymarket::{OrderProxyClient, PolymarketClient};
use secrecy::SecretString;

/// Runs the cross-venue arbitrage engine.
#[derive(Parser)]
#[command(name = "arbx", about = "Cross-venue prediction-market arbitrage engine", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config/Config.toml")]
    config: String,

    /// Execution mode: `monitor` runs evaluation and alerting without placing
    /// orders, `paper` forces the dry-run executor path, `live` places real
    /// orders subject to the config's `dry_run` flag.
    #[arg(long, value_enum, default_value_t = Mode::Monitor)]
    mode: Mode,

    /// Overrides the scan interval, in milliseconds.
    #[arg(long)]
    scan_interval_ms: Option<u64>,

    /// Overrides the venue-B poll interval, in milliseconds.
    #[arg(long)]
    poll_interval_ms: Option<u64>,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Mode {
    Monitor,
    Paper,
    Live,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ConfigLoader::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;

    if let Some(ms) = cli.scan_interval_ms {
        config.scan_interval_ms = ms;
    }
    if let Some(ms) = cli.poll_interval_ms {
        config.kalshi_poll_ms = ms;
    }

    // `monitor` and `paper` both force dry-run regardless of the config
    // file; `live` defers to whatever the config says (defaulting to true).
    match cli.mode {
        Mode::Monitor | Mode::Paper => config.dry_run = true,
        Mode::Live => {}
    }

    tracing::info!(mode = ?cli.mode, config = %cli.config, "starting arbitrage engine");

    let orchestrator = build_orchestrator(&config).await?;

    let (shutdown_tx, _) = tokio::sync::broadcast::channel(1);
    let shutdown_tx_for_signal = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received");
            let _ = shutdown_tx_for_signal.send(());
        }
    });

    orchestrator.run(shutdown_tx).await;

    tracing::info!("engine stopped");
    Ok(())
}

async fn build_orchestrator(config: &EngineConfig) -> Result<Arc<Orchestrator>> {
    let polymarket_client = {
        let mut client = PolymarketClient::new();
        if let Some(url) = &config.polymarket_base_url {
            client = client.with_base_url(url.clone());
        }
        Arc::new(client)
    };

    let proxy_url = config
        .polymarket_proxy_url
        .clone()
        .context("polymarket_proxy_url must be configured to place venue-A orders")?;
    let proxy_token = std::env::var(&config.polymarket_proxy_token_env).unwrap_or_default();
    let order_proxy = Arc::new(OrderProxyClient::new(
        proxy_url,
        SecretString::new(proxy_token),
        config.polymarket_proxy_timeout(),
    ));
    let market_a = Arc::new(PolymarketMarket::new(polymarket_client, order_proxy));

    let kalshi_config = if config.kalshi_use_demo {
        KalshiClientConfig::demo()
    } else {
        KalshiClientConfig::production()
    };
    let kalshi_client = match KalshiClient::new(kalshi_config) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            // Auth degrade (§7): order placement is disabled but reads
            // continue via the demo client, and we surface a startup warning.
            tracing::warn!(error = %err, "kalshi credential load failed, falling back to demo client");
            Arc::new(KalshiClient::demo().context("failed to construct fallback demo Kalshi client")?)
        }
    };
    let market_b = Arc::new(KalshiMarket::new(kalshi_client));

    let alert_sink: Arc<dyn arbx_arbitrage::AlertSink> = match &config.alert_webhook_url {
        Some(url) => Arc::new(WebhookSink::new(url.clone(), config.webhook_timeout())),
        None => Arc::new(NullSink),
    };
    let alerts = Arc::new(AlertManager::new(
        AlertManagerConfig {
            cooldown: Duration::from_millis(config.alert_cooldown_ms),
            batch_interval: Duration::from_secs(5),
            webhook_timeout: config.webhook_timeout(),
        },
        alert_sink,
    ));

    let executor = Executor::new(
        ExecutorConfig {
            liquidity_margin: config.liquidity_safety_margin,
            min_order_dollars: config.min_order_dollars,
            order_timeout: config.order_timeout(),
            probe_timeout: config.probe_timeout(),
            dry_run: config.dry_run,
        },
        config.audit_ring_capacity,
    );

    let evaluator_cfg = EvaluatorConfig {
        min_profit_cents: config.min_profit_cents,
        min_price_threshold_cents: config.min_price_threshold_cents,
        fee_const_cents: config.total_fee_cents,
        target_pair_cost: config.same_market.target_pair_cost,
    };

    let orchestrator_cfg = OrchestratorConfig {
        market_refresh: Duration::from_millis(config.market_refresh_ms),
        venue_b_poll_interval: Duration::from_millis(config.kalshi_poll_ms),
        scan_interval: Duration::from_millis(config.scan_interval_ms),
        per_market_cooldown: Duration::from_millis(config.trade_cooldown_ms),
        matching_threshold: config.matching_threshold,
        alert_threshold_cents: config.alert_threshold_cents,
        // A contract never costs more than $1 (the payoff), so the dollar
        // trade-amount budget divided by 100 is a safe upper bound on
        // contract count; the executor's liquidity probe sizes down from
        // there.
        requested_contracts: (config.effective_trade_amount_cents() / 100).max(1),
        resolution_watcher: if config.resolution_watcher.enabled {
            Some(OrchResolutionWatcherConfig {
                check_interval: Duration::from_secs(config.resolution_watcher.check_interval_secs),
                min_profit_cents: config.min_profit_cents,
            })
        } else {
            None
        },
    };

    // Persistence degrades per §7: a connection failure logs a startup
    // warning and the engine runs in-memory only, rather than failing to
    // start.
    let repos = match &config.database_url {
        Some(url) => match DatabaseClient::new(url).await {
            Ok(db) => Some(Arc::new(Repositories::new(db.pool()))),
            Err(err) => {
                tracing::warn!(error = %err, "database connection failed, running without trade/stats persistence");
                None
            }
        },
        None => None,
    };

    Ok(Orchestrator::new(
        orchestrator_cfg,
        evaluator_cfg,
        executor,
        alerts,
        market_a.clone(),
        market_b.clone(),
        market_a,
        market_b,
        repos,
    ))
}
