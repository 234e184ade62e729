//! Bar interval definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Nominal interval between consecutive bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1m")]
    #[default]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[serde(rename = "1d")]
    Daily,
}

const MINUTE_MS: i64 = 60_000;

/// Label and step of every supported interval, shortest first.
const INTERVALS: [(Timeframe, &str, i64); 6] = [
    (Timeframe::Minute1, "1m", MINUTE_MS),
    (Timeframe::Minute5, "5m", 5 * MINUTE_MS),
    (Timeframe::Minute15, "15m", 15 * MINUTE_MS),
    (Timeframe::Hour1, "1h", 60 * MINUTE_MS),
    (Timeframe::Hour4, "4h", 240 * MINUTE_MS),
    (Timeframe::Daily, "1d", 1440 * MINUTE_MS),
];

impl Timeframe {
    fn entry(&self) -> (Timeframe, &'static str, i64) {
        INTERVALS
            .iter()
            .copied()
            .find(|(tf, _, _)| tf == self)
            .unwrap_or(INTERVALS[0])
    }

    /// Spacing between bars in milliseconds.
    pub fn step_millis(&self) -> i64 {
        self.entry().2
    }

    /// The interval whose step is exactly `millis`, if any.
    pub fn from_step_millis(millis: i64) -> Option<Self> {
        INTERVALS
            .iter()
            .find(|(_, _, step)| *step == millis)
            .map(|(tf, _, _)| *tf)
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry().1)
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        let canonical = match s.as_str() {
            "1min" | "minute" => "1m",
            "5min" => "5m",
            "15min" => "15m",
            "1hour" | "hour" => "1h",
            "4hour" => "4h",
            "day" | "daily" => "1d",
            other => other,
        };
        INTERVALS
            .iter()
            .find(|(_, label, _)| *label == canonical)
            .map(|(tf, _, _)| *tf)
            .ok_or_else(|| format!("Invalid timeframe: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps() {
        assert_eq!(Timeframe::Minute1.step_millis(), 60_000);
        assert_eq!(Timeframe::Daily.step_millis(), 86_400_000);
        assert_eq!(Timeframe::from_step_millis(14_400_000), Some(Timeframe::Hour4));
        assert_eq!(Timeframe::from_step_millis(90_000), None);
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("1m".parse::<Timeframe>().unwrap(), Timeframe::Minute1);
        assert_eq!("Daily".parse::<Timeframe>().unwrap(), Timeframe::Daily);
        assert!("3w".parse::<Timeframe>().is_err());
        assert_eq!(Timeframe::Hour4.to_string(), "4h");
    }
}
