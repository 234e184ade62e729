//! OHLCV (Open, High, Low, Close, Volume) data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Timeframe;
use crate::error::DataError;

/// Compact OHLCV bar.
/// Uses f64 for fast indicator calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Opening price
    pub open: f64,
    /// Highest price
    pub high: f64,
    /// Lowest price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Trading volume
    pub volume: f64,
}

impl Bar {
    /// Create a new bar.
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Get the timestamp as a DateTime.
    ///
    /// Out-of-range timestamps clamp to the Unix epoch.
    pub fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or(DateTime::UNIX_EPOCH)
    }

    /// Check the bar's own fields: positive finite prices, non-negative volume.
    pub fn validate(&self, index: usize) -> Result<(), DataError> {
        let prices = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ];
        for (field, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(DataError::InvalidBar {
                    index,
                    reason: format!("{} must be a positive number, got {}", field, value),
                });
            }
        }
        if !self.volume.is_finite() || self.volume < 0.0 {
            return Err(DataError::InvalidBar {
                index,
                reason: format!("volume must be non-negative, got {}", self.volume),
            });
        }
        if self.high < self.low {
            return Err(DataError::InvalidBar {
                index,
                reason: format!("high {} is below low {}", self.high, self.low),
            });
        }
        Ok(())
    }
}

/// Ordered bar sequence for one instrument.
///
/// Construction validates the whole sequence once: it must be non-empty,
/// every bar must be well-formed and timestamps must be strictly increasing.
/// After that the series is read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarSeries {
    /// Symbol identifier
    pub symbol: String,
    /// Nominal spacing of the bars
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Validate and wrap a bar sequence.
    pub fn new(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: Vec<Bar>,
    ) -> Result<Self, DataError> {
        validate_bars(&bars)?;
        Ok(Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        })
    }

    /// Get the number of bars.
    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for slice-like ergonomics.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Get a bar by index (0 = oldest).
    #[inline]
    pub fn at(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Get all bars as a slice.
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Get the first bar.
    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// Get the last bar.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Extract close prices as a vector.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Get an iterator over the bars.
    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    /// Indices of bars that arrive later than one timeframe after their predecessor.
    ///
    /// Gaps are legal input; they are reported so callers can decide whether
    /// the series is dense enough for their purpose.
    pub fn gaps(&self) -> Vec<usize> {
        let step = self.timeframe.step_millis();
        self.bars
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[1].timestamp - pair[0].timestamp > step)
            .map(|(i, _)| i + 1)
            .collect()
    }
}

/// Validate a raw bar sequence: non-empty, well-formed, strictly increasing.
pub fn validate_bars(bars: &[Bar]) -> Result<(), DataError> {
    if bars.is_empty() {
        return Err(DataError::EmptySeries);
    }

    for (index, bar) in bars.iter().enumerate() {
        bar.validate(index)?;
        if index == 0 {
            continue;
        }
        let previous = bars[index - 1].timestamp;
        if bar.timestamp == previous {
            return Err(DataError::DuplicateTimestamp {
                index,
                timestamp: bar.timestamp,
            });
        }
        if bar.timestamp < previous {
            return Err(DataError::NonMonotonic {
                index,
                previous,
                current: bar.timestamp,
            });
        }
    }

    Ok(())
}
