//! Per-tick trading pipeline.
//!
//! One tick runs a fixed sequence:
//! 1. fetch a candle and append it to the window
//! 2. evaluate the strategy setup
//! 3. size an order against the account
//! 4. execute it (non-HOLD only)
//! 5. record the result
//!
//! A failed fetch or a malformed candle skips the tick and leaves the window
//! and regime state untouched. Failures after step 1 are collected in the
//! [`TickReport`] and never stop the pipeline.

use rust_decimal::Decimal;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::{timeout, MissedTickBehavior};
use trading_core::error::{AuditError, ExecutionError, FeedError};
use trading_core::traits::{AuditSink, BalanceSource, OrderExecutor, OrderSizer, PriceFeed};
use trading_core::types::{
    AccountSnapshot, Candle, CandleWindow, ExecutionReceipt, ExecutionRecord, Order, Signal,
    DEFAULT_WINDOW_CAPACITY,
};
use tracing::{debug, info, warn};

use crate::regime::RegimeTransition;
use crate::setup::SignalEngine;

/// Pipeline stage that talks to a collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Balance,
    Execute,
    Audit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Fetch => "fetch",
            Stage::Balance => "balance",
            Stage::Execute => "execute",
            Stage::Audit => "audit",
        };
        write!(f, "{}", s)
    }
}

/// Why a tick was skipped, or what went wrong in a completed one.
#[derive(Error, Debug)]
pub enum TickError {
    #[error("feed error: {0}")]
    Feed(FeedError),

    #[error("rejected candle: {0}")]
    Malformed(FeedError),

    #[error("{stage} timed out after {elapsed:?}")]
    Timeout { stage: Stage, elapsed: Duration },

    #[error("balance query failed: {0}")]
    Balance(ExecutionError),

    #[error("execution failed: {0}")]
    Execution(ExecutionError),

    #[error("audit write failed: {0}")]
    Audit(AuditError),
}

impl TickError {
    /// Check if the feed has no more candles.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, TickError::Feed(FeedError::Exhausted))
    }
}

impl From<FeedError> for TickError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::Malformed(_) | FeedError::OutOfOrder { .. } => TickError::Malformed(err),
            other => TickError::Feed(other),
        }
    }
}

/// Outcome of a completed tick.
#[derive(Debug)]
pub struct TickReport {
    pub candle: Candle,
    pub strategy: String,
    pub signal: Signal,
    pub transition: Option<RegimeTransition>,
    pub order: Order,
    pub receipt: Option<ExecutionReceipt>,
    /// Balances after execution
    pub balances: AccountSnapshot,
    /// Non-fatal collaborator failures
    pub failures: Vec<TickError>,
}

impl TickReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Pipeline settings.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub symbol: String,
    pub window_capacity: usize,
    /// Delay between ticks in [`TradingPipeline::run`]
    pub poll_interval: Duration,
    /// Upper bound on every collaborator call
    pub collaborator_timeout: Duration,
}

impl PipelineConfig {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            poll_interval: Duration::from_secs(60),
            collaborator_timeout: Duration::from_secs(10),
        }
    }
}

/// Counters from [`TradingPipeline::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub skipped: u64,
    pub executed: u64,
    pub failures: u64,
}

/// Drives one symbol through fetch, evaluate, size, execute and record.
pub struct TradingPipeline {
    config: PipelineConfig,
    window: CandleWindow,
    engine: SignalEngine,
    feed: Box<dyn PriceFeed>,
    sizer: Arc<dyn OrderSizer>,
    executor: Arc<dyn OrderExecutor>,
    balances: Arc<dyn BalanceSource>,
    audit: Arc<dyn AuditSink>,
    account_guard: Option<Arc<Mutex<()>>>,
}

impl TradingPipeline {
    pub fn new(
        config: PipelineConfig,
        engine: SignalEngine,
        feed: Box<dyn PriceFeed>,
        sizer: Arc<dyn OrderSizer>,
        executor: Arc<dyn OrderExecutor>,
        balances: Arc<dyn BalanceSource>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let window = CandleWindow::with_capacity(config.symbol.clone(), config.window_capacity);
        Self {
            config,
            window,
            engine,
            feed,
            sizer,
            executor,
            balances,
            audit,
            account_guard: None,
        }
    }

    /// Share an account lock with other pipelines using the same ledger.
    ///
    /// The lock is held from the balance read through execution.
    pub fn with_account_guard(mut self, guard: Arc<Mutex<()>>) -> Self {
        self.account_guard = Some(guard);
        self
    }

    pub fn window(&self) -> &CandleWindow {
        &self.window
    }

    pub fn engine(&self) -> &SignalEngine {
        &self.engine
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run a single tick.
    ///
    /// Returns `Err` only when the tick was skipped.
    pub async fn tick(&mut self) -> Result<TickReport, TickError> {
        let limit = self.config.collaborator_timeout;

        let candle = match timeout(limit, self.feed.next_candle()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(TickError::Timeout {
                    stage: Stage::Fetch,
                    elapsed: limit,
                })
            }
        };

        let price = Decimal::try_from(candle.close).map_err(|_| {
            TickError::Malformed(FeedError::Malformed(format!(
                "close {} not representable",
                candle.close
            )))
        })?;
        self.window.push(candle)?;

        let evaluation = self.engine.evaluate(self.window.candles()).await;

        let guard = match &self.account_guard {
            Some(guard) => Some(guard.lock().await),
            None => None,
        };

        let mut failures = Vec::new();

        let account = match timeout(limit, self.balances.balances()).await {
            Ok(Ok(account)) => account,
            Ok(Err(e)) => {
                failures.push(TickError::Balance(e));
                AccountSnapshot::default()
            }
            Err(_) => {
                failures.push(TickError::Timeout {
                    stage: Stage::Balance,
                    elapsed: limit,
                });
                AccountSnapshot::default()
            }
        };

        let order = self
            .sizer
            .size(&self.config.symbol, evaluation.signal, price, &account);

        let mut receipt = None;
        let mut post_trade = account;
        if !order.is_hold() {
            match timeout(limit, self.executor.execute(&order, price)).await {
                Ok(Ok(filled)) => {
                    info!(
                        order = %order,
                        %price,
                        strategy = %evaluation.strategy,
                        executor = self.executor.name(),
                        "order executed"
                    );
                    receipt = Some(filled);
                }
                Ok(Err(e)) => failures.push(TickError::Execution(e)),
                Err(_) => failures.push(TickError::Timeout {
                    stage: Stage::Execute,
                    elapsed: limit,
                }),
            }

            // Refresh from the collaborator rather than assuming the fill.
            match timeout(limit, self.balances.balances()).await {
                Ok(Ok(account)) => post_trade = account,
                Ok(Err(e)) => failures.push(TickError::Balance(e)),
                Err(_) => failures.push(TickError::Timeout {
                    stage: Stage::Balance,
                    elapsed: limit,
                }),
            }
        }
        drop(guard);

        let record = ExecutionRecord::new(&order, price, post_trade);
        match timeout(limit, self.audit.record(&record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => failures.push(TickError::Audit(e)),
            Err(_) => failures.push(TickError::Timeout {
                stage: Stage::Audit,
                elapsed: limit,
            }),
        }

        for failure in &failures {
            warn!(symbol = %self.config.symbol, error = %failure, "collaborator failure");
        }
        debug!(
            symbol = %self.config.symbol,
            close = candle.close,
            signal = %evaluation.signal,
            order = %order,
            "tick complete"
        );

        Ok(TickReport {
            candle,
            strategy: evaluation.strategy,
            signal: evaluation.signal,
            transition: evaluation.transition,
            order,
            receipt,
            balances: post_trade,
            failures,
        })
    }

    /// Tick on a fixed interval until the feed is exhausted or `shutdown`
    /// resolves.
    ///
    /// Shutdown is only observed between ticks; a tick in progress completes.
    pub async fn run<F>(&mut self, shutdown: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        let mut summary = RunSummary::default();
        let mut interval = tokio::time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        info!(
            symbol = %self.config.symbol,
            feed = self.feed.name(),
            interval = ?self.config.poll_interval,
            "pipeline started"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                _ = interval.tick() => {}
            }

            match self.tick().await {
                Ok(report) => {
                    summary.ticks += 1;
                    if report.receipt.is_some() {
                        summary.executed += 1;
                    }
                    summary.failures += report.failures.len() as u64;
                }
                Err(e) if e.is_exhausted() => {
                    info!(feed = self.feed.name(), "feed exhausted");
                    break;
                }
                Err(e) => {
                    summary.skipped += 1;
                    warn!(symbol = %self.config.symbol, error = %e, "tick skipped");
                }
            }
        }

        info!(
            ticks = summary.ticks,
            skipped = summary.skipped,
            executed = summary.executed,
            failures = summary.failures,
            "pipeline stopped"
        );
        summary
    }
}
