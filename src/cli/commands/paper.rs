//! Paper trading command implementation.

use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use trading_broker::PaperLedger;
use trading_config::{load_config, AppConfig};
use trading_core::traits::{AuditSink, PriceFeed};
use trading_core::types::{AccountSnapshot, Timeframe};
use trading_data::{BinanceConfig, BinanceFeed, CsvCandleFeed};
use trading_engine::{
    BaseSelection, PipelineConfig, RegimeSelector, SetupHandle, SignalEngine, StrategySetup,
    TradingPipeline,
};
use trading_monitor::{CsvAuditLog, NullAuditLog};
use trading_risk::{OverlayKind, PositionSizer};
use trading_strategies::{StrategyKind, StrategyRegistry};
use tracing::info;

use crate::cli::PaperArgs;

pub async fn run(args: PaperArgs, config_path: &Path) -> Result<()> {
    let mut config = if config_path.exists() {
        load_config(config_path)
            .with_context(|| format!("loading {}", config_path.display()))?
    } else {
        info!(path = %config_path.display(), "config file not found, using defaults");
        AppConfig::default()
    };
    apply_overrides(&mut config, &args)?;
    config.validate()?;

    let registry = Arc::new(StrategyRegistry::new());
    let setup = setup_from(&config, &args)?;
    setup.validate(&registry)?;

    let regime = RegimeSelector::new(config.strategy.regime.clone(), &registry)?;
    let engine = SignalEngine::new(registry.clone(), regime, SetupHandle::new(setup)).await?;

    let interval = config.exchange.interval;
    let (feed, poll_interval): (Box<dyn PriceFeed>, Duration) = match &args.data {
        Some(path) => {
            let feed = CsvCandleFeed::open(path, interval)?;
            let poll = args
                .poll_secs
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_millis(1));
            (Box::new(feed), poll)
        }
        None => {
            let feed = BinanceFeed::new(BinanceConfig {
                base_url: config.exchange.base_url.clone(),
                symbol: config.exchange.symbol.clone(),
                interval,
                kind: config.exchange.feed,
                timeout: config.exchange.timeout(),
            })?;
            (Box::new(feed), config.engine.poll_interval())
        }
    };

    let ledger = PaperLedger::new(AccountSnapshot::new(
        config.paper.initial_quote,
        config.paper.initial_base,
    ));
    let audit: Arc<dyn AuditSink> = if config.audit.enabled {
        Arc::new(CsvAuditLog::open(&config.audit.path)?)
    } else {
        Arc::new(NullAuditLog)
    };

    let pipeline_config = PipelineConfig {
        symbol: config.exchange.symbol.clone(),
        window_capacity: config.engine.window_capacity,
        poll_interval: poll_interval.max(Duration::from_millis(1)),
        collaborator_timeout: config.engine.collaborator_timeout(),
    };

    let mut pipeline = TradingPipeline::new(
        pipeline_config,
        engine,
        feed,
        Arc::new(PositionSizer::new(config.sizing.clone())),
        Arc::new(ledger.clone()),
        Arc::new(ledger.clone()),
        audit,
    );

    info!(
        symbol = %config.exchange.symbol,
        quote = %config.paper.initial_quote,
        base = %config.paper.initial_base,
        "starting paper trading (ctrl-c to stop)"
    );

    let summary = pipeline
        .run(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    let account = ledger.snapshot().await;
    let last_price = pipeline
        .window()
        .last()
        .and_then(|c| Decimal::try_from(c.close).ok())
        .unwrap_or_default();

    println!();
    println!("Paper Trading Summary");
    println!("═══════════════════════════════════════════════════════════");
    println!("  Ticks:          {}", summary.ticks);
    println!("  Skipped:        {}", summary.skipped);
    println!("  Executed:       {}", summary.executed);
    println!("  Failures:       {}", summary.failures);
    println!("  Quote balance:  {}", account.quote);
    println!("  Base balance:   {}", account.base);
    match account.equity(last_price) {
        Some(equity) => println!("  Equity:         {}", equity.round_dp(2)),
        None => println!("  Equity:         overflow"),
    }

    Ok(())
}

fn apply_overrides(config: &mut AppConfig, args: &PaperArgs) -> Result<()> {
    if let Some(symbol) = &args.symbol {
        config.exchange.symbol = symbol.to_uppercase();
    }
    if let Some(timeframe) = &args.timeframe {
        config.exchange.interval = Timeframe::from_str(timeframe).map_err(anyhow::Error::msg)?;
    }
    if let Some(capital) = args.capital {
        config.paper.initial_quote = capital;
    }
    if let Some(secs) = args.poll_secs {
        config.engine.poll_interval_secs = secs.max(1);
    }
    if args.no_audit {
        config.audit.enabled = false;
    }
    Ok(())
}

/// Config setup with the CLI strategy and overlay choices applied.
fn setup_from(config: &AppConfig, args: &PaperArgs) -> Result<StrategySetup> {
    let mut setup = config.strategy.setup();

    if let Some(name) = &args.strategy {
        setup.selection = if name.eq_ignore_ascii_case("adaptive") {
            BaseSelection::Adaptive
        } else {
            BaseSelection::fixed(StrategyKind::from_str(name)?)
        };
    }

    if !args.overlays.is_empty() {
        setup.overlays = args
            .overlays
            .iter()
            .map(|s| parse_overlay(s))
            .collect::<Result<_>>()?;
    }

    Ok(setup)
}

/// Parse `crash:<drop>`, `high_risk` or `low_risk`.
fn parse_overlay(s: &str) -> Result<OverlayKind> {
    let lower = s.trim().to_lowercase();
    match lower.split_once(':') {
        Some(("crash" | "crash_protection", drop)) => {
            let drop_threshold: f64 = drop
                .parse()
                .with_context(|| format!("invalid crash threshold {:?}", drop))?;
            Ok(OverlayKind::CrashProtection { drop_threshold })
        }
        Some(_) => bail!("unknown overlay {:?}", s),
        None => match lower.replace('-', "_").as_str() {
            "high_risk" | "high" => Ok(OverlayKind::HighRisk),
            "low_risk" | "low" => Ok(OverlayKind::LowRisk),
            "crash" | "crash_protection" => Ok(OverlayKind::CrashProtection {
                drop_threshold: 0.05,
            }),
            _ => bail!("unknown overlay {:?}", s),
        },
    }
}
