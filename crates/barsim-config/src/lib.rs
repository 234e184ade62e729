//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, BacktestSettings, LoggingConfig, RiskSettings, SettingsError,
    StrategySettings,
};

use config::{Config, Environment, File};
use std::path::Path;

/// Load configuration from file and environment.
///
/// Environment variables prefixed with `BARSIM__` override file values,
/// e.g. `BARSIM__BACKTEST__COMMISSION_RATE=0.002`.
pub fn load_config(path: &Path) -> Result<AppConfig, SettingsError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(
            Environment::with_prefix("BARSIM")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(config.try_deserialize()?)
}

/// Parse a standalone strategy parameter file.
pub fn load_strategy_params(path: &Path) -> Result<serde_json::Value, SettingsError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SettingsError::Invalid(format!("{}: {}", path.display(), e)))?;
    let value: toml::Value = toml::from_str(&text)?;
    serde_json::to_value(value).map_err(|e| SettingsError::Invalid(e.to_string()))
}
