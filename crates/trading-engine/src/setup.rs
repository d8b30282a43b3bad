//! Strategy setup and the signal engine that evaluates it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use trading_core::error::StrategyError;
use trading_core::traits::Strategy;
use trading_core::types::{Candle, Signal};
use trading_risk::{build_overlays, GuardedStrategy, Overlay, OverlayKind};
use trading_strategies::{StrategyKind, StrategyRegistry};
use tracing::{debug, warn};

use crate::regime::{RegimeSelector, RegimeTransition};

/// How the base strategy is chosen each tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BaseSelection {
    /// Let the regime selector pick between the primary strategies
    #[default]
    Adaptive,
    /// Always use one catalog strategy
    Fixed {
        kind: StrategyKind,
        /// Strategy config; missing fields take their defaults
        #[serde(default)]
        params: serde_json::Value,
    },
}

impl BaseSelection {
    /// Fixed selection with the strategy's default config.
    pub fn fixed(kind: StrategyKind) -> Self {
        BaseSelection::Fixed {
            kind,
            params: serde_json::Value::Null,
        }
    }
}

/// The active strategy configuration: a base selection plus an overlay chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySetup {
    pub selection: BaseSelection,
    /// Overlays, innermost first
    pub overlays: Vec<OverlayKind>,
}

impl StrategySetup {
    pub fn new(selection: BaseSelection, overlays: Vec<OverlayKind>) -> Self {
        Self {
            selection,
            overlays,
        }
    }

    /// Check that the setup can be built.
    pub fn validate(&self, registry: &StrategyRegistry) -> Result<(), StrategyError> {
        CompiledSetup::build(self, registry).map(|_| ())
    }
}

/// Shared handle to the setup; any holder can swap it between ticks.
#[derive(Debug, Clone)]
pub struct SetupHandle {
    inner: Arc<RwLock<StrategySetup>>,
}

impl SetupHandle {
    pub fn new(setup: StrategySetup) -> Self {
        Self {
            inner: Arc::new(RwLock::new(setup)),
        }
    }

    /// Get a copy of the current setup.
    pub async fn current(&self) -> StrategySetup {
        self.inner.read().await.clone()
    }

    /// Validate and install a new setup. It applies from the next tick.
    pub async fn replace(
        &self,
        setup: StrategySetup,
        registry: &StrategyRegistry,
    ) -> Result<(), StrategyError> {
        setup.validate(registry)?;
        *self.inner.write().await = setup;
        Ok(())
    }

    /// The underlying lock, for callers that manage validation themselves.
    pub fn shared(&self) -> Arc<RwLock<StrategySetup>> {
        self.inner.clone()
    }
}

/// Result of evaluating one candle window.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Full strategy name including overlays
    pub strategy: String,
    pub signal: Signal,
    pub transition: Option<RegimeTransition>,
}

struct CompiledSetup {
    setup: StrategySetup,
    fixed: Option<Arc<dyn Strategy>>,
    overlays: Vec<Overlay>,
}

impl CompiledSetup {
    fn build(setup: &StrategySetup, registry: &StrategyRegistry) -> Result<Self, StrategyError> {
        let fixed = match &setup.selection {
            BaseSelection::Adaptive => None,
            BaseSelection::Fixed { kind, params } => Some(registry.create(*kind, params.clone())?),
        };
        Ok(Self {
            setup: setup.clone(),
            fixed,
            overlays: build_overlays(&setup.overlays)?,
        })
    }
}

/// Evaluates the current setup against a candle window.
///
/// The setup is rebuilt only when the shared handle's contents change. An
/// invalid setup written straight through the lock is logged and the last
/// good one stays in effect.
pub struct SignalEngine {
    registry: Arc<StrategyRegistry>,
    regime: RegimeSelector,
    handle: SetupHandle,
    compiled: CompiledSetup,
}

impl SignalEngine {
    pub async fn new(
        registry: Arc<StrategyRegistry>,
        regime: RegimeSelector,
        handle: SetupHandle,
    ) -> Result<Self, StrategyError> {
        let setup = handle.current().await;
        let compiled = CompiledSetup::build(&setup, &registry)?;
        Ok(Self {
            registry,
            regime,
            handle,
            compiled,
        })
    }

    pub fn handle(&self) -> &SetupHandle {
        &self.handle
    }

    pub fn regime(&self) -> &RegimeSelector {
        &self.regime
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    /// Pick the base strategy, apply the overlays and produce a signal.
    pub async fn evaluate(&mut self, candles: &[Candle]) -> Evaluation {
        self.refresh().await;

        let (base, transition) = match &self.compiled.fixed {
            Some(strategy) => (strategy.clone(), None),
            None => self.regime.select(candles),
        };

        let strategy = GuardedStrategy::with_overlays(base, self.compiled.overlays.clone());
        let signal = strategy.generate_signal(candles);
        debug!(strategy = strategy.name(), %signal, candles = candles.len(), "evaluated");

        Evaluation {
            strategy: strategy.name().to_string(),
            signal,
            transition,
        }
    }

    async fn refresh(&mut self) {
        let setup = self.handle.current().await;
        if setup == self.compiled.setup {
            return;
        }

        match CompiledSetup::build(&setup, &self.registry) {
            Ok(compiled) => {
                debug!(?setup, "strategy setup changed");
                self.compiled = compiled;
            }
            Err(e) => {
                warn!(error = %e, "ignoring invalid strategy setup");
                // Remember the rejected setup so the warning is not repeated
                // every tick.
                self.compiled.setup = setup;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regime::RegimeConfig;

    fn flat(n: usize) -> Vec<Candle> {
        (0..n).map(|i| Candle::from_price(100.0, i as i64)).collect()
    }

    async fn engine(setup: StrategySetup) -> SignalEngine {
        let registry = Arc::new(StrategyRegistry::new());
        let regime = RegimeSelector::new(RegimeConfig::default(), &registry).unwrap();
        SignalEngine::new(registry, regime, SetupHandle::new(setup))
            .await
            .unwrap()
    }

    #[test]
    fn test_setup_serde() {
        let setup: StrategySetup = serde_json::from_str(
            r#"{
                "selection": {"mode": "fixed", "kind": "risk_manager", "params": {"panic_threshold": 0.05}},
                "overlays": [{"type": "low_risk"}]
            }"#,
        )
        .unwrap();
        assert!(matches!(
            setup.selection,
            BaseSelection::Fixed {
                kind: StrategyKind::RiskManager,
                ..
            }
        ));
        assert_eq!(setup.overlays, vec![OverlayKind::LowRisk]);

        let adaptive: StrategySetup = serde_json::from_str("{}").unwrap();
        assert_eq!(adaptive.selection, BaseSelection::Adaptive);
    }

    #[test]
    fn test_invalid_setup_rejected() {
        let registry = StrategyRegistry::new();
        let setup = StrategySetup::new(
            BaseSelection::Fixed {
                kind: StrategyKind::RiskManager,
                params: serde_json::json!({"panic_threshold": 3.0}),
            },
            vec![],
        );
        assert!(setup.validate(&registry).is_err());
    }

    #[tokio::test]
    async fn test_fixed_selection_skips_regime() {
        let mut engine = engine(StrategySetup::new(
            BaseSelection::fixed(StrategyKind::Streak),
            vec![],
        ))
        .await;

        let evaluation = engine.evaluate(&flat(40)).await;
        assert_eq!(evaluation.strategy, "Streak (last 5)");
        assert_eq!(evaluation.signal, Signal::Buy);
        assert!(evaluation.transition.is_none());
        assert_eq!(engine.regime().cooldown(), 0);
    }

    #[tokio::test]
    async fn test_adaptive_reports_transition() {
        let mut engine = engine(StrategySetup::default()).await;
        let evaluation = engine.evaluate(&flat(40)).await;
        assert_eq!(evaluation.transition.unwrap().to, StrategyKind::MeanReversion);
        assert_eq!(evaluation.strategy, "Mean Reversion (RSI 14)");
    }

    #[tokio::test]
    async fn test_overlay_names_in_strategy() {
        let mut engine = engine(StrategySetup::new(
            BaseSelection::fixed(StrategyKind::RiskManager),
            vec![OverlayKind::HighRisk],
        ))
        .await;
        let evaluation = engine.evaluate(&flat(40)).await;
        assert_eq!(evaluation.strategy, "Risk Manager + High Risk");
    }

    #[tokio::test]
    async fn test_swap_applies_on_next_evaluation() {
        let mut engine = engine(StrategySetup::new(
            BaseSelection::fixed(StrategyKind::RiskManager),
            vec![],
        ))
        .await;
        let candles = flat(40);
        assert_eq!(engine.evaluate(&candles).await.signal, Signal::Hold);

        let registry = StrategyRegistry::new();
        engine
            .handle()
            .replace(
                StrategySetup::new(BaseSelection::fixed(StrategyKind::Streak), vec![]),
                &registry,
            )
            .await
            .unwrap();
        assert_eq!(engine.evaluate(&candles).await.signal, Signal::Buy);
    }

    #[tokio::test]
    async fn test_invalid_swap_keeps_previous_setup() {
        let mut engine = engine(StrategySetup::new(
            BaseSelection::fixed(StrategyKind::Streak),
            vec![],
        ))
        .await;

        let shared = engine.handle().shared();
        shared.write().await.overlays = vec![OverlayKind::CrashProtection {
            drop_threshold: -1.0,
        }];

        let evaluation = engine.evaluate(&flat(40)).await;
        assert_eq!(evaluation.strategy, "Streak (last 5)");
        assert_eq!(evaluation.signal, Signal::Buy);
    }
}
