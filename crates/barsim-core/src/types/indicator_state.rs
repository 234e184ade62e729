//! Per-bar indicator values handed to strategies.

use serde::{Deserialize, Serialize};

/// Indicator values computed for one bar.
///
/// Each value stays `None` until the rolling window holds enough history for
/// it; `initialized` becomes true only once every value is available.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndicatorState {
    /// Index of the bar these values were computed on
    pub bar_index: usize,
    /// Timestamp of that bar (Unix milliseconds)
    pub timestamp: i64,
    pub fast_ma: Option<f64>,
    pub slow_ma: Option<f64>,
    pub rsi: Option<f64>,
    pub initialized: bool,
}

/// Fully available indicator values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadyIndicators {
    pub fast_ma: f64,
    pub slow_ma: f64,
    pub rsi: f64,
}

/// Lookback windows a strategy needs from the indicator window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSpec {
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_window: usize,
}

impl IndicatorSpec {
    /// Closes needed before every indicator is available.
    ///
    /// RSI over `n` price changes needs `n + 1` closes.
    pub fn warmup_bars(&self) -> usize {
        self.fast_window
            .max(self.slow_window)
            .max(self.rsi_window + 1)
    }
}

impl IndicatorState {
    /// All values, or `None` while the window is still warming up.
    pub fn ready(&self) -> Option<ReadyIndicators> {
        if !self.initialized {
            return None;
        }
        Some(ReadyIndicators {
            fast_ma: self.fast_ma?,
            slow_ma: self.slow_ma?,
            rsi: self.rsi?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_bars() {
        let spec = IndicatorSpec {
            fast_window: 2,
            slow_window: 4,
            rsi_window: 3,
        };
        assert_eq!(spec.warmup_bars(), 4);

        let spec = IndicatorSpec {
            fast_window: 5,
            slow_window: 10,
            rsi_window: 14,
        };
        assert_eq!(spec.warmup_bars(), 15);
    }

    #[test]
    fn test_not_ready_until_initialized() {
        let mut state = IndicatorState {
            fast_ma: Some(1.0),
            slow_ma: Some(2.0),
            rsi: Some(30.0),
            ..Default::default()
        };
        assert!(state.ready().is_none());

        state.initialized = true;
        let ready = state.ready().unwrap();
        assert_eq!(ready.rsi, 30.0);
    }
}
