//! Bounded rolling window of bars with on-demand indicator evaluation.

use std::collections::VecDeque;

use barsim_core::traits::Indicator;
use barsim_core::{Bar, IndicatorError, IndicatorSpec, IndicatorState};

use crate::{Rsi, Sma};

/// Default number of bars retained by the window.
pub const DEFAULT_CAPACITY: usize = 100;

/// Rolling window of the most recent bars.
///
/// Holds at most `capacity` bars, evicting the oldest when full. Indicator
/// values are computed from the retained closes each time they are asked for.
#[derive(Debug, Clone)]
pub struct IndicatorWindow {
    spec: IndicatorSpec,
    capacity: usize,
    bars: VecDeque<Bar>,
    bars_seen: usize,
    fast: Sma,
    slow: Sma,
    rsi: Rsi,
}

impl IndicatorWindow {
    /// Create an empty window for `spec` retaining up to `capacity` bars.
    pub fn new(spec: IndicatorSpec, capacity: usize) -> Result<Self, IndicatorError> {
        if spec.fast_window == 0 || spec.slow_window == 0 || spec.rsi_window == 0 {
            return Err(IndicatorError::InvalidParameter(
                "indicator windows must be positive".to_string(),
            ));
        }
        let warmup = spec.warmup_bars();
        if capacity < warmup {
            return Err(IndicatorError::InvalidParameter(format!(
                "window capacity {} is smaller than the {} bars needed for warmup",
                capacity, warmup
            )));
        }

        Ok(Self {
            spec,
            capacity,
            bars: VecDeque::with_capacity(capacity),
            bars_seen: 0,
            fast: Sma::new(spec.fast_window),
            slow: Sma::new(spec.slow_window),
            rsi: Rsi::new(spec.rsi_window),
        })
    }

    pub fn spec(&self) -> IndicatorSpec {
        self.spec
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of bars currently retained.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Total bars pushed since creation, including evicted ones.
    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    /// Most recent bar.
    pub fn latest(&self) -> Option<&Bar> {
        self.bars.back()
    }

    /// Append a bar, evicting the oldest when the window is full.
    pub fn update(&mut self, bar: Bar) {
        if self.bars.len() == self.capacity {
            self.bars.pop_front();
        }
        self.bars.push_back(bar);
        self.bars_seen += 1;
    }

    /// Mean close over the last `window` bars, or `None` with less history.
    pub fn simple_moving_average(&self, window: usize) -> Option<f64> {
        if window == 0 {
            return None;
        }
        let closes = self.trailing_closes(window)?;
        Some(closes.iter().sum::<f64>() / window as f64)
    }

    /// RSI over the last `window` price changes, or `None` with fewer than
    /// `window + 1` bars.
    pub fn rsi(&self, window: usize) -> Option<f64> {
        if window == 0 {
            return None;
        }
        let closes = self.trailing_closes(window + 1)?;
        Rsi::new(window).latest(&closes)
    }

    /// True once every configured indicator has enough history.
    pub fn is_initialized(&self) -> bool {
        self.bars.len() >= self.spec.warmup_bars()
    }

    /// Indicator values for the most recent bar.
    pub fn state(&self, bar_index: usize) -> IndicatorState {
        let closes = self.trailing_closes(self.bars.len()).unwrap_or_default();
        let fast_ma = self.fast.latest(&closes);
        let slow_ma = self.slow.latest(&closes);
        let rsi = self.rsi.latest(&closes);

        IndicatorState {
            bar_index,
            timestamp: self.bars.back().map(|b| b.timestamp).unwrap_or_default(),
            fast_ma,
            slow_ma,
            rsi,
            initialized: fast_ma.is_some() && slow_ma.is_some() && rsi.is_some(),
        }
    }

    /// Drop all retained bars.
    pub fn clear(&mut self) {
        self.bars.clear();
        self.bars_seen = 0;
    }

    fn trailing_closes(&self, count: usize) -> Option<Vec<f64>> {
        if self.bars.len() < count {
            return None;
        }
        Some(
            self.bars
                .iter()
                .skip(self.bars.len() - count)
                .map(|b| b.close)
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(fast: usize, slow: usize, rsi: usize) -> IndicatorSpec {
        IndicatorSpec {
            fast_window: fast,
            slow_window: slow,
            rsi_window: rsi,
        }
    }

    fn bar(i: usize, close: f64) -> Bar {
        Bar::new(i as i64 * 60_000, close, close, close, close, 1.0)
    }

    #[test]
    fn test_initializes_after_warmup() {
        let closes = [100.0, 102.0, 101.0, 105.0, 103.0];
        let mut window = IndicatorWindow::new(spec(2, 4, 3), DEFAULT_CAPACITY).unwrap();

        for (i, close) in closes.iter().enumerate() {
            window.update(bar(i, *close));
            let state = window.state(i);
            assert_eq!(state.initialized, i >= 3, "bar {}", i);
            assert_eq!(window.is_initialized(), state.initialized);
        }

        let state = window.state(4);
        assert!((state.fast_ma.unwrap() - 104.0).abs() < 1e-10);
        assert!((state.slow_ma.unwrap() - 102.75).abs() < 1e-10);
    }

    #[test]
    fn test_partial_values_before_initialization() {
        let mut window = IndicatorWindow::new(spec(2, 4, 3), DEFAULT_CAPACITY).unwrap();
        window.update(bar(0, 100.0));
        window.update(bar(1, 102.0));

        let state = window.state(1);
        assert_eq!(state.fast_ma, Some(101.0));
        assert!(state.slow_ma.is_none());
        assert!(state.rsi.is_none());
        assert!(state.ready().is_none());
    }

    #[test]
    fn test_eviction_keeps_capacity() {
        let mut window = IndicatorWindow::new(spec(2, 3, 2), 3).unwrap();
        for i in 0..10 {
            window.update(bar(i, i as f64 + 1.0));
        }
        assert_eq!(window.len(), 3);
        assert_eq!(window.bars_seen(), 10);
        assert_eq!(window.latest().unwrap().close, 10.0);
        assert_eq!(window.simple_moving_average(3), Some(9.0));
    }

    #[test]
    fn test_rsi_on_demand() {
        let mut window = IndicatorWindow::new(spec(2, 4, 3), DEFAULT_CAPACITY).unwrap();
        for (i, close) in [100.0, 99.0, 102.0, 98.0].iter().enumerate() {
            window.update(bar(i, *close));
        }
        assert!((window.rsi(3).unwrap() - 37.5).abs() < 1e-10);
        assert!(window.rsi(4).is_none());
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(IndicatorWindow::new(spec(0, 4, 3), 10).is_err());
        assert!(IndicatorWindow::new(spec(2, 20, 3), 10).is_err());
        assert!(IndicatorWindow::new(spec(2, 4, 3), 4).is_ok());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn rsi_stays_in_bounds(closes in prop::collection::vec(1.0f64..1000.0, 5..60)) {
                let mut window = IndicatorWindow::new(spec(2, 4, 3), 16).unwrap();
                for (i, close) in closes.iter().enumerate() {
                    window.update(bar(i, *close));
                    if let Some(rsi) = window.state(i).rsi {
                        prop_assert!((0.0..=100.0).contains(&rsi));
                    }
                }
                prop_assert!(window.len() <= 16);
            }

            #[test]
            fn sma_lies_within_window_range(closes in prop::collection::vec(1.0f64..1000.0, 4..40)) {
                let mut window = IndicatorWindow::new(spec(2, 4, 3), DEFAULT_CAPACITY).unwrap();
                for (i, close) in closes.iter().enumerate() {
                    window.update(bar(i, *close));
                }
                let tail = &closes[closes.len() - 4..];
                let lo = tail.iter().cloned().fold(f64::INFINITY, f64::min);
                let hi = tail.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                let sma = window.simple_moving_average(4).unwrap();
                prop_assert!(sma >= lo - 1e-9 && sma <= hi + 1e-9);
            }
        }
    }
}
