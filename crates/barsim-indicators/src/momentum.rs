//! Momentum indicators.

use barsim_core::traits::Indicator;

/// RSI reported for a window with no price movement at all.
pub const FLAT_RSI: f64 = 50.0;

/// Relative Strength Index (RSI).
///
/// Measures the speed and magnitude of recent price changes
/// to evaluate overbought or oversold conditions.
///
/// The first value is seeded with the plain average gain and loss over
/// `period` changes; later values use Wilder's smoothing. Degenerate
/// windows are fixed by policy rather than division:
/// - average loss zero, average gain positive: 100
/// - average loss zero, average gain zero (flat): 50
#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
}

impl Rsi {
    /// Create a new RSI over `period` price changes.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Period must be greater than 0");
        Self { period }
    }

    /// Calculate using Wilder's smoothing method.
    fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
        if values.len() < period {
            return vec![];
        }

        let mut result = Vec::with_capacity(values.len() - period + 1);
        let period_f64 = period as f64;

        // Initial average
        let mut avg: f64 = values[..period].iter().sum::<f64>() / period_f64;
        result.push(avg);

        // Wilder's smoothing: avg = (prev_avg * (period-1) + value) / period
        for &value in &values[period..] {
            avg = (avg * (period_f64 - 1.0) + value) / period_f64;
            result.push(avg);
        }

        result
    }

    /// RSI from average gain and average loss.
    pub fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            if avg_gain > 0.0 {
                100.0
            } else {
                FLAT_RSI
            }
        } else {
            100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
        }
    }
}

impl Indicator for Rsi {
    type Output = f64;

    fn calculate(&self, data: &[f64]) -> Vec<f64> {
        if data.len() <= self.period {
            return vec![];
        }

        let (gains, losses): (Vec<f64>, Vec<f64>) = data
            .windows(2)
            .map(|pair| {
                let change = pair[1] - pair[0];
                if change > 0.0 {
                    (change, 0.0)
                } else {
                    (0.0, -change)
                }
            })
            .unzip();

        let avg_gains = Self::wilder_smooth(&gains, self.period);
        let avg_losses = Self::wilder_smooth(&losses, self.period);

        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(&gain, &loss)| Self::from_averages(gain, loss))
            .collect()
    }

    fn period(&self) -> usize {
        self.period + 1 // Need period+1 data points
    }

    fn name(&self) -> &str {
        "RSI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_bounds() {
        let rsi = Rsi::new(14);
        let data: Vec<f64> = (0..30)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();

        let result = rsi.calculate(&data);
        assert_eq!(result.len(), 30 - 14);
        for value in &result {
            assert!(*value >= 0.0 && *value <= 100.0);
        }
    }

    #[test]
    fn test_rsi_all_gains_is_100() {
        let rsi = Rsi::new(5);
        let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let result = rsi.calculate(&data);

        assert!(!result.is_empty());
        assert!(result.iter().all(|v| (v - 100.0).abs() < 1e-10));
    }

    #[test]
    fn test_rsi_all_losses_is_0() {
        let rsi = Rsi::new(5);
        let data = vec![7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0];
        let result = rsi.calculate(&data);

        assert!(result[0].abs() < 1e-10);
    }

    #[test]
    fn test_rsi_flat_is_50() {
        let rsi = Rsi::new(3);
        let result = rsi.calculate(&[10.0, 10.0, 10.0, 10.0, 10.0]);
        assert_eq!(result, vec![FLAT_RSI, FLAT_RSI]);
    }

    #[test]
    fn test_rsi_latest_uses_plain_window_average() {
        // changes over the last 3: -1, +3, -4 -> gain 1, loss 5/3
        let rsi = Rsi::new(3);
        let value = rsi.latest(&[50.0, 100.0, 99.0, 102.0, 98.0]).unwrap();
        assert!((value - 37.5).abs() < 1e-10);
    }

    #[test]
    fn test_rsi_needs_period_plus_one_points() {
        let rsi = Rsi::new(3);
        assert!(rsi.latest(&[1.0, 2.0, 3.0]).is_none());
        assert!(rsi.latest(&[1.0, 2.0, 3.0, 4.0]).is_some());
    }
}
