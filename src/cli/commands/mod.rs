//! CLI command implementations.

pub mod backtest;
pub mod strategies;
pub mod sweep;
pub mod validate;

use anyhow::{bail, Context, Result};
use barsim_config::{load_config, AppConfig};
use barsim_core::{Bar, BarProvider, BarSeries, Timeframe};
use barsim_data::CsvBarProvider;
use chrono::{DateTime, NaiveDate, Utc};
use std::path::Path;
use tracing::{info, warn};

use crate::cli::DataArgs;

/// Load the configuration file, or defaults when none is given.
pub fn load_settings(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(AppConfig::default()),
    }
}

/// Parse `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("Invalid time '{}': expected YYYY-MM-DD or RFC 3339", value))
}

/// Load and validate the bar series selected by `args`.
pub async fn load_series(args: &DataArgs, config: &AppConfig) -> Result<BarSeries> {
    if !args.data.exists() {
        bail!("Data file '{}' does not exist", args.data.display());
    }

    let symbol = args
        .symbol
        .clone()
        .unwrap_or_else(|| config.backtest.symbol.clone());
    let start = match &args.start {
        Some(s) => parse_time(s)?,
        None => DateTime::<Utc>::MIN_UTC,
    };
    let end = match &args.end {
        Some(s) => parse_time(s)?,
        None => DateTime::<Utc>::MAX_UTC,
    };
    if start >= end {
        bail!("Start time must be before end time");
    }

    let provider = CsvBarProvider::new(&args.data)?;
    let bars = provider
        .fetch(&symbol, start, end)
        .await
        .with_context(|| format!("Failed to load bars for {}", symbol))?;
    info!(
        symbol = %symbol,
        bars = bars.len(),
        provider = provider.name(),
        "Loaded bars"
    );

    let timeframe = args.timeframe.unwrap_or_else(|| infer_timeframe(&bars));
    let series = BarSeries::new(symbol, timeframe, bars)?;
    let gaps = series.gaps();
    if !gaps.is_empty() {
        warn!(
            gaps = gaps.len(),
            first_gap_at = gaps[0],
            %timeframe,
            "Series has gaps longer than one bar"
        );
    }
    Ok(series)
}

/// Timeframe matching the spacing of the first two bars, one minute otherwise.
fn infer_timeframe(bars: &[Bar]) -> Timeframe {
    match bars {
        [first, second, ..] => {
            Timeframe::from_step_millis(second.timestamp - first.timestamp).unwrap_or_default()
        }
        _ => Timeframe::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(
            parse_time("2024-01-02").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time("2024-01-02T09:30:00+01:00").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 8, 30, 0).unwrap()
        );
        assert!(parse_time("02/01/2024").is_err());
    }

    #[test]
    fn test_infer_timeframe() {
        let bar = |ts| Bar::new(ts, 1.0, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(
            infer_timeframe(&[bar(0), bar(3_600_000)]),
            Timeframe::Hour1
        );
        assert_eq!(infer_timeframe(&[bar(0), bar(7_000)]), Timeframe::Minute1);
        assert_eq!(infer_timeframe(&[bar(0)]), Timeframe::Minute1);
    }

    #[test]
    fn test_defaults_without_config_file() {
        let config = load_settings(None).unwrap();
        assert_eq!(config.backtest.symbol, "BTCUSDT");
    }
}
