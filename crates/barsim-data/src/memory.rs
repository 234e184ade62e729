//! In-memory bar provider.

use std::collections::HashMap;

use async_trait::async_trait;
use barsim_core::{Bar, BarProvider, DataError};
use chrono::{DateTime, Utc};

use crate::select_range;

/// Bars held in memory, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    bars: HashMap<String, Vec<Bar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register bars for `symbol`, replacing any held before.
    pub fn with_bars(mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        self.insert(symbol, bars);
        self
    }

    pub fn insert(&mut self, symbol: impl Into<String>, bars: Vec<Bar>) {
        self.bars.insert(symbol.into(), bars);
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.bars.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}

#[async_trait]
impl BarProvider for InMemoryProvider {
    async fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let bars = self
            .bars
            .get(symbol)
            .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))?;
        select_range(bars.clone(), start, end)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars() -> Vec<Bar> {
        [100.0, 102.0, 101.0]
            .iter()
            .enumerate()
            .map(|(i, c)| Bar::new(i as i64 * 60_000, *c, *c, *c, *c, 1.0))
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_range() {
        let provider = InMemoryProvider::new().with_bars("BTCUSDT", bars());
        let start = DateTime::UNIX_EPOCH;
        let end = DateTime::from_timestamp(120, 0).unwrap();

        let fetched = provider.fetch("BTCUSDT", start, end).await.unwrap();
        assert_eq!(fetched.len(), 2);
        assert_eq!(provider.symbols(), vec!["BTCUSDT"]);
    }

    #[tokio::test]
    async fn test_empty_range_and_unknown_symbol() {
        let provider = InMemoryProvider::new().with_bars("BTCUSDT", bars());
        let later = DateTime::from_timestamp(3600, 0).unwrap();
        let much_later = DateTime::from_timestamp(7200, 0).unwrap();

        assert_eq!(
            provider.fetch("BTCUSDT", later, much_later).await,
            Err(DataError::NoDataAvailable)
        );
        assert_eq!(
            provider.fetch("ETHUSDT", later, much_later).await,
            Err(DataError::SymbolNotFound("ETHUSDT".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unordered_input_is_sorted_then_validated() {
        let mut unordered = bars();
        unordered.reverse();
        let provider = InMemoryProvider::new().with_bars("BTCUSDT", unordered);
        let fetched = provider
            .fetch(
                "BTCUSDT",
                DateTime::UNIX_EPOCH,
                DateTime::from_timestamp(3600, 0).unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(fetched[0].close, 100.0);
    }
}
