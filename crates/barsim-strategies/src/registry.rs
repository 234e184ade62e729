//! Strategy registry for selecting strategies by name.

use crate::{MaRsiConfig, MaRsiStrategy, RsiReversionConfig, RsiReversionStrategy};
use barsim_core::{Strategy, StrategyConfig, StrategyError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy name
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry for available strategies.
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new strategy registry with all built-in strategies.
    pub fn new() -> Self {
        let mut strategies = BTreeMap::new();

        strategies.insert(
            "ma_rsi".to_string(),
            StrategyInfo {
                name: "MA RSI".to_string(),
                description: "Enters on fast/slow MA trend with low RSI, exits on RSI recovery or trend loss"
                    .to_string(),
                default_config: serde_json::to_value(MaRsiConfig::default()).unwrap_or_default(),
            },
        );

        strategies.insert(
            "rsi_reversion".to_string(),
            StrategyInfo {
                name: "RSI Reversion".to_string(),
                description: "Buys oversold RSI readings and sells overbought ones".to_string(),
                default_config: serde_json::to_value(RsiReversionConfig::default())
                    .unwrap_or_default(),
            },
        );

        Self { strategies }
    }

    /// List all available strategies, ordered by key.
    pub fn list(&self) -> Vec<(&String, &StrategyInfo)> {
        self.strategies.iter().collect()
    }

    /// Get strategy info by name.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.get(name)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Get all strategy names.
    pub fn names(&self) -> Vec<&String> {
        self.strategies.keys().collect()
    }

    /// Create a strategy instance from configuration.
    ///
    /// Missing fields in `config` take their default values.
    pub fn create(
        &self,
        name: &str,
        config: serde_json::Value,
    ) -> Result<Box<dyn Strategy>, StrategyError> {
        match name {
            "ma_rsi" => {
                let config: MaRsiConfig = serde_json::from_value(config)
                    .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
                config.validate()?;
                Ok(Box::new(MaRsiStrategy::new(config)))
            }
            "rsi_reversion" => {
                let config: RsiReversionConfig = serde_json::from_value(config)
                    .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
                config.validate()?;
                Ok(Box::new(RsiReversionStrategy::new(config)))
            }
            _ => Err(StrategyError::NotFound(name.to_string())),
        }
    }

    /// Create a strategy with default configuration.
    pub fn create_default(&self, name: &str) -> Result<Box<dyn Strategy>, StrategyError> {
        let info = self
            .get(name)
            .ok_or_else(|| StrategyError::NotFound(name.to_string()))?;
        self.create(name, info.default_config.clone())
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_list() {
        let registry = StrategyRegistry::new();
        let names: Vec<_> = registry.names().into_iter().cloned().collect();
        assert_eq!(names, vec!["ma_rsi", "rsi_reversion"]);
    }

    #[test]
    fn test_registry_get() {
        let registry = StrategyRegistry::new();

        assert!(registry.get("ma_rsi").is_some());
        assert!(registry.exists("rsi_reversion"));
        assert!(registry.get("unknown").is_none());
    }

    #[test]
    fn test_create_default() {
        let registry = StrategyRegistry::new();

        let strategy = registry.create_default("ma_rsi").unwrap();
        assert_eq!(strategy.name(), "MA RSI");
        assert_eq!(strategy.indicator_spec().warmup_bars(), 10);
    }

    #[test]
    fn test_create_with_config() {
        let registry = StrategyRegistry::new();

        let config = serde_json::json!({
            "fast_window": 2,
            "slow_window": 4,
            "rsi_window": 3,
            "rsi_entry": 40.0
        });

        let strategy = registry.create("ma_rsi", config).unwrap();
        assert_eq!(strategy.indicator_spec().warmup_bars(), 4);
    }

    #[test]
    fn test_create_rejects_invalid_config() {
        let registry = StrategyRegistry::new();
        let config = serde_json::json!({ "fast_window": 10, "slow_window": 5 });
        assert!(matches!(
            registry.create("ma_rsi", config),
            Err(StrategyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_create_unknown_strategy() {
        let registry = StrategyRegistry::new();

        let result = registry.create_default("unknown");
        assert!(matches!(result, Err(StrategyError::NotFound(_))));
    }
}
