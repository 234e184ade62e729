//! Configuration structures.

use barsim_core::StrategyConfig;
use barsim_engine::{EngineConfig, DEFAULT_COMMISSION_RATE};
use barsim_risk::RiskLimits;
use barsim_strategies::{MaRsiConfig, StrategyRegistry};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backtest: BacktestSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub risk: RiskSettings,
}

impl AppConfig {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let backtest = &self.backtest;
        if backtest.initial_capital <= Decimal::ZERO {
            return Err(SettingsError::Invalid(
                "backtest.initial_capital must be positive".into(),
            ));
        }
        if backtest.commission_rate < Decimal::ZERO || backtest.commission_rate >= Decimal::ONE {
            return Err(SettingsError::Invalid(format!(
                "backtest.commission_rate must be in [0, 1), got {}",
                backtest.commission_rate
            )));
        }
        if backtest.window_capacity == 0 {
            return Err(SettingsError::Invalid(
                "backtest.window_capacity must be positive".into(),
            ));
        }

        if !StrategyRegistry::new().exists(&self.strategy.name) {
            return Err(SettingsError::Invalid(format!(
                "unknown strategy: {}",
                self.strategy.name
            )));
        }
        if self.strategy.name == "ma_rsi" {
            self.strategy
                .ma_rsi()
                .validate()
                .map_err(|e| SettingsError::Invalid(format!("strategy: {}", e)))?;
        }

        if self.risk.enabled {
            if self.risk.max_positions == 0 {
                return Err(SettingsError::Invalid(
                    "risk.max_positions must be positive".into(),
                ));
            }
            if self.risk.risk_limit <= Decimal::ZERO {
                return Err(SettingsError::Invalid(
                    "risk.risk_limit must be positive".into(),
                ));
            }
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(SettingsError::Invalid(format!(
                "logging.format must be pretty or json, got {}",
                other
            ))),
        }
    }

    /// Engine settings for a run.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            initial_capital: self.backtest.initial_capital,
            commission_rate: self.backtest.commission_rate,
            window_capacity: self.backtest.window_capacity,
            risk_limits: self.risk.limits(),
        }
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
            name: "barsim".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
    /// Directory for the run log file
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            dir: None,
        }
    }
}

/// Backtest settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSettings {
    pub symbol: String,
    pub initial_capital: Decimal,
    pub commission_rate: Decimal,
    /// Bars kept by the indicator window
    pub window_capacity: usize,
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            initial_capital: dec!(1000000),
            commission_rate: DEFAULT_COMMISSION_RATE,
            window_capacity: 100,
        }
    }
}

/// Strategy selection and MA/RSI parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Registry name of the strategy to run
    pub name: String,
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_window: usize,
    pub rsi_entry: f64,
    pub rsi_exit: f64,
    pub order_quantity: Decimal,
}

impl Default for StrategySettings {
    fn default() -> Self {
        let defaults = MaRsiConfig::default();
        Self {
            name: "ma_rsi".to_string(),
            fast_window: defaults.fast_window,
            slow_window: defaults.slow_window,
            rsi_window: defaults.rsi_window,
            rsi_entry: defaults.rsi_entry,
            rsi_exit: defaults.rsi_exit,
            order_quantity: defaults.order_quantity,
        }
    }
}

impl StrategySettings {
    pub fn ma_rsi(&self) -> MaRsiConfig {
        MaRsiConfig {
            fast_window: self.fast_window,
            slow_window: self.slow_window,
            rsi_window: self.rsi_window,
            rsi_entry: self.rsi_entry,
            rsi_exit: self.rsi_exit,
            order_quantity: self.order_quantity,
        }
    }
}

/// Risk gate settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Install the position limit gate
    pub enabled: bool,
    pub max_positions: usize,
    /// Largest share of total position value one position may take
    pub risk_limit: Decimal,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            max_positions: 1,
            risk_limit: Decimal::ONE,
        }
    }
}

impl RiskSettings {
    /// Limits for the engine, or `None` when the gate is disabled.
    pub fn limits(&self) -> Option<RiskLimits> {
        self.enabled.then(|| RiskLimits {
            max_positions: self.max_positions,
            risk_limit: self.risk_limit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.strategy.ma_rsi(), MaRsiConfig::default());
        assert_eq!(config.engine_config(), EngineConfig::default());
    }

    #[test]
    fn test_rejects_inverted_windows() {
        let mut config = AppConfig::default();
        config.strategy.fast_window = 10;
        config.strategy.slow_window = 5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Fast window"));
    }

    #[test]
    fn test_rejects_out_of_range_commission() {
        let mut config = AppConfig::default();
        config.backtest.commission_rate = dec!(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_risk_limits_only_when_enabled() {
        let mut config = AppConfig::default();
        assert!(config.engine_config().risk_limits.is_none());

        config.risk.enabled = true;
        config.risk.risk_limit = dec!(0.5);
        let limits = config.engine_config().risk_limits.unwrap();
        assert_eq!(limits.max_positions, 1);
        assert_eq!(limits.risk_limit, dec!(0.5));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let mut config = AppConfig::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }
}
