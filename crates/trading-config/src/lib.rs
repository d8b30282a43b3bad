//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, AuditSettings, EngineSettings, ExchangeSettings, LoggingConfig,
    PaperSettings, SelectionMode, StrategySettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// `TRADING__SECTION__KEY` variables override file values, e.g.
/// `TRADING__EXCHANGE__SYMBOL=ETHUSDT`.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("TRADING")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    config.try_deserialize()
}
