//! Configuration structures.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use trading_core::types::{Timeframe, DEFAULT_WINDOW_CAPACITY};
use trading_core::TradingError;
use trading_data::{FeedKind, BINANCE_BASE_URL};
use trading_engine::{BaseSelection, RegimeConfig, StrategySetup};
use trading_risk::{build_overlays, OverlayKind, SizingConfig};
use trading_strategies::{StrategyKind, StrategyRegistry};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub exchange: ExchangeSettings,
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub sizing: SizingConfig,
    #[serde(default)]
    pub paper: PaperSettings,
    #[serde(default)]
    pub audit: AuditSettings,
}

impl AppConfig {
    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), TradingError> {
        if self.exchange.symbol.trim().is_empty() {
            return Err(TradingError::Config("exchange.symbol must not be empty".into()));
        }
        if self.exchange.timeout_ms == 0 {
            return Err(TradingError::Config("exchange.timeout_ms must be positive".into()));
        }
        if self.engine.window_capacity == 0 {
            return Err(TradingError::Config(
                "engine.window_capacity must be positive".into(),
            ));
        }
        if self.engine.poll_interval_secs == 0 {
            return Err(TradingError::Config(
                "engine.poll_interval_secs must be positive".into(),
            ));
        }
        if self.engine.collaborator_timeout_ms == 0 {
            return Err(TradingError::Config(
                "engine.collaborator_timeout_ms must be positive".into(),
            ));
        }
        if self.paper.initial_quote < Decimal::ZERO || self.paper.initial_base < Decimal::ZERO {
            return Err(TradingError::Config(
                "paper balances must not be negative".into(),
            ));
        }

        self.sizing.validate()?;
        self.strategy.regime.validate()?;
        self.strategy.setup().validate(&StrategyRegistry::new())?;
        build_overlays(&self.strategy.overlays)?;

        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "regimebot".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Optional JSON log file
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

/// Market-data source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeSettings {
    pub base_url: String,
    pub symbol: String,
    pub interval: Timeframe,
    pub feed: FeedKind,
    pub timeout_ms: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            base_url: BINANCE_BASE_URL.to_string(),
            symbol: "BTCUSDT".to_string(),
            interval: Timeframe::Minute1,
            feed: FeedKind::Klines,
            timeout_ms: 5_000,
        }
    }
}

impl ExchangeSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub window_capacity: usize,
    pub poll_interval_secs: u64,
    pub collaborator_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            poll_interval_secs: 60,
            collaborator_timeout_ms: 10_000,
        }
    }
}

impl EngineSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout_ms)
    }
}

/// How the base strategy is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Adaptive,
    Fixed,
}

/// Strategy selection and overlay chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    pub mode: SelectionMode,
    /// Base strategy when `mode = "fixed"`
    pub fixed: StrategyKind,
    /// Config for the fixed strategy; missing fields take their defaults
    pub params: Option<serde_json::Value>,
    /// Overlays, innermost first
    pub overlays: Vec<OverlayKind>,
    pub regime: RegimeConfig,
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            mode: SelectionMode::Adaptive,
            fixed: StrategyKind::RiskManager,
            params: None,
            overlays: Vec::new(),
            regime: RegimeConfig::default(),
        }
    }
}

impl StrategySettings {
    /// The initial strategy setup described by these settings.
    pub fn setup(&self) -> StrategySetup {
        let selection = match self.mode {
            SelectionMode::Adaptive => BaseSelection::Adaptive,
            SelectionMode::Fixed => BaseSelection::Fixed {
                kind: self.fixed,
                params: self.params.clone().unwrap_or_default(),
            },
        };
        StrategySetup::new(selection, self.overlays.clone())
    }
}

/// Simulated wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaperSettings {
    pub initial_quote: Decimal,
    pub initial_base: Decimal,
}

impl Default for PaperSettings {
    fn default() -> Self {
        Self {
            initial_quote: dec!(1000),
            initial_base: Decimal::ZERO,
        }
    }
}

/// Audit trail output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub enabled: bool,
    pub path: PathBuf,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("logs/trades.csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_to_toml_lists_sections() {
        let mut config = AppConfig::default();
        config.strategy.overlays = vec![OverlayKind::HighRisk];
        let rendered = config.to_toml().unwrap();
        for section in ["[app]", "[exchange]", "[engine]", "[sizing]", "[paper]", "[audit]"] {
            assert!(rendered.contains(section), "missing {section}");
        }
        assert!(rendered.contains("high_risk"));
    }

    #[test]
    fn test_default_setup_is_adaptive() {
        let setup = StrategySettings::default().setup();
        assert_eq!(setup.selection, BaseSelection::Adaptive);
        assert!(setup.overlays.is_empty());
    }

    #[test]
    fn test_fixed_setup_carries_params() {
        let settings = StrategySettings {
            mode: SelectionMode::Fixed,
            fixed: StrategyKind::Breakout,
            params: Some(serde_json::json!({"short_period": 3})),
            ..Default::default()
        };
        match settings.setup().selection {
            BaseSelection::Fixed { kind, params } => {
                assert_eq!(kind, StrategyKind::Breakout);
                assert_eq!(params["short_period"], 3);
            }
            other => panic!("unexpected selection {:?}", other),
        }
    }

    #[test]
    fn test_invalid_sections_rejected() {
        let mut config = AppConfig::default();
        config.engine.window_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.sizing.sell_fraction = dec!(0);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategy.overlays = vec![OverlayKind::CrashProtection {
            drop_threshold: 1.5,
        }];
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.strategy.mode = SelectionMode::Fixed;
        config.strategy.params = Some(serde_json::json!({"panic_threshold": -0.1}));
        assert!(config.validate().is_err());
    }
}
