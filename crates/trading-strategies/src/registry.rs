//! Strategy registry for building catalog strategies by kind.

use crate::{
    AdxConfig, AdxStrategy, MeanReversionConfig, MeanReversionStrategy, RiskManagerConfig,
    RiskManagerStrategy, SmaCrossoverConfig, SmaCrossoverStrategy, StreakConfig, StreakStrategy,
    TrendFollowingConfig, TrendFollowingStrategy,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use trading_core::{error::StrategyError, traits::Strategy, traits::StrategyConfig};

/// Catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// MACD crossover with histogram-reversal entry
    TrendFollowing,
    /// RSI with trend-adaptive thresholds
    MeanReversion,
    /// SMA golden/death cross
    Breakout,
    /// Hold unless the last bar crashed
    RiskManager,
    /// ADX with dominant directional indicator
    Adx,
    /// Run of non-decreasing closes
    Streak,
}

impl StrategyKind {
    /// Every kind, in listing order.
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::TrendFollowing,
        StrategyKind::MeanReversion,
        StrategyKind::Breakout,
        StrategyKind::RiskManager,
        StrategyKind::Adx,
        StrategyKind::Streak,
    ];

    /// Key used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::TrendFollowing => "trend_following",
            StrategyKind::MeanReversion => "mean_reversion",
            StrategyKind::Breakout => "breakout",
            StrategyKind::RiskManager => "risk_manager",
            StrategyKind::Adx => "adx",
            StrategyKind::Streak => "streak",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "trend_following" | "macd" => Ok(StrategyKind::TrendFollowing),
            "mean_reversion" | "rsi" => Ok(StrategyKind::MeanReversion),
            "breakout" | "sma_crossover" | "sma" => Ok(StrategyKind::Breakout),
            "risk_manager" | "default" => Ok(StrategyKind::RiskManager),
            "adx" => Ok(StrategyKind::Adx),
            "streak" => Ok(StrategyKind::Streak),
            _ => Err(StrategyError::NotFound(s.to_string())),
        }
    }
}

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Catalog key
    pub kind: StrategyKind,
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry for available trading strategies.
pub struct StrategyRegistry {
    strategies: HashMap<StrategyKind, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let strategies = StrategyKind::ALL
            .iter()
            .map(|&kind| (kind, Self::info(kind)))
            .collect();
        Self { strategies }
    }

    fn info(kind: StrategyKind) -> StrategyInfo {
        let strategy: Arc<dyn Strategy> = match kind {
            StrategyKind::TrendFollowing => Arc::new(TrendFollowingStrategy::default()),
            StrategyKind::MeanReversion => Arc::new(MeanReversionStrategy::default()),
            StrategyKind::Breakout => Arc::new(SmaCrossoverStrategy::default()),
            StrategyKind::RiskManager => Arc::new(RiskManagerStrategy::default()),
            StrategyKind::Adx => Arc::new(AdxStrategy::default()),
            StrategyKind::Streak => Arc::new(StreakStrategy::default()),
        };
        let default_config = match kind {
            StrategyKind::TrendFollowing => serde_json::to_value(TrendFollowingConfig::default()),
            StrategyKind::MeanReversion => serde_json::to_value(MeanReversionConfig::default()),
            StrategyKind::Breakout => serde_json::to_value(SmaCrossoverConfig::default()),
            StrategyKind::RiskManager => serde_json::to_value(RiskManagerConfig::default()),
            StrategyKind::Adx => serde_json::to_value(AdxConfig::default()),
            StrategyKind::Streak => serde_json::to_value(StreakConfig::default()),
        };

        StrategyInfo {
            kind,
            name: strategy.name().to_string(),
            description: strategy.description().to_string(),
            default_config: default_config.unwrap_or_default(),
        }
    }

    /// List all available strategies in catalog order.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        StrategyKind::ALL
            .iter()
            .filter_map(|kind| self.strategies.get(kind))
            .collect()
    }

    /// Get strategy info by kind.
    pub fn get(&self, kind: StrategyKind) -> Option<&StrategyInfo> {
        self.strategies.get(&kind)
    }

    /// Create a strategy instance from a JSON configuration.
    ///
    /// Missing fields take their defaults.
    pub fn create(
        &self,
        kind: StrategyKind,
        config: serde_json::Value,
    ) -> Result<Arc<dyn Strategy>, StrategyError> {
        let strategy: Arc<dyn Strategy> = match kind {
            StrategyKind::TrendFollowing => {
                Arc::new(TrendFollowingStrategy::new(parse_config(config)?))
            }
            StrategyKind::MeanReversion => {
                Arc::new(MeanReversionStrategy::new(parse_config(config)?))
            }
            StrategyKind::Breakout => Arc::new(SmaCrossoverStrategy::new(parse_config(config)?)),
            StrategyKind::RiskManager => Arc::new(RiskManagerStrategy::new(parse_config(config)?)),
            StrategyKind::Adx => Arc::new(AdxStrategy::new(parse_config(config)?)),
            StrategyKind::Streak => Arc::new(StreakStrategy::new(parse_config(config)?)),
        };
        Ok(strategy)
    }

    /// Create a strategy with default configuration.
    pub fn create_default(&self, kind: StrategyKind) -> Result<Arc<dyn Strategy>, StrategyError> {
        let info = self
            .get(kind)
            .ok_or_else(|| StrategyError::NotFound(kind.to_string()))?;
        self.create(kind, info.default_config.clone())
    }

    /// Create a strategy by its configuration key.
    pub fn create_by_name(
        &self,
        name: &str,
        config: Option<serde_json::Value>,
    ) -> Result<Arc<dyn Strategy>, StrategyError> {
        let kind: StrategyKind = name.parse()?;
        match config {
            Some(config) => self.create(kind, config),
            None => self.create_default(kind),
        }
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_config<C>(value: serde_json::Value) -> Result<C, StrategyError>
where
    C: StrategyConfig + DeserializeOwned,
{
    let value = match value {
        serde_json::Value::Null => serde_json::Value::Object(Default::default()),
        other => other,
    };
    let config: C =
        serde_json::from_value(value).map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
    config.validate()?;
    Ok(config)
}
