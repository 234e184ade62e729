//! CSV bar provider.

use async_trait::async_trait;
use barsim_core::{Bar, BarProvider, DataError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::select_range;

/// CSV record format.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(
        alias = "Date",
        alias = "date",
        alias = "datetime",
        alias = "Datetime",
        alias = "timestamp",
        alias = "Timestamp"
    )]
    date: String,
    #[serde(alias = "Symbol", alias = "symbol", default)]
    symbol: Option<String>,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Bars read from a CSV file.
///
/// Files with a `symbol` column may hold several instruments; rows are
/// selected by symbol. Files without one are taken to hold the requested
/// symbol only.
#[derive(Debug, Clone)]
pub struct CsvBarProvider {
    path: PathBuf,
}

impl CsvBarProvider {
    /// Create a provider over an existing CSV file.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::Io(format!(
                "CSV file not found: {}",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every bar for `symbol`, sorted by timestamp.
    pub fn load_all(&self, symbol: &str) -> Result<Vec<Bar>, DataError> {
        load_from_path(&self.path, symbol)
    }
}

#[async_trait]
impl BarProvider for CsvBarProvider {
    async fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError> {
        let path = self.path.clone();
        let owned_symbol = symbol.to_string();
        let bars = tokio::task::spawn_blocking(move || load_from_path(&path, &owned_symbol))
            .await
            .map_err(|e| DataError::Io(e.to_string()))??;

        let selected = select_range(bars, start, end)?;
        info!(
            symbol,
            bars = selected.len(),
            source = %self.path.display(),
            "Loaded bars from CSV"
        );
        Ok(selected)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

fn load_from_path(path: &Path, symbol: &str) -> Result<Vec<Bar>, DataError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Io(e.to_string()))?;

    let mut bars = Vec::new();
    let mut saw_symbol_column = false;

    for (line, result) in reader.deserialize().enumerate() {
        let record: CsvRecord =
            result.map_err(|e| DataError::ParseError(format!("row {}: {}", line + 1, e)))?;

        if let Some(row_symbol) = record.symbol.as_deref() {
            saw_symbol_column = true;
            if !row_symbol.eq_ignore_ascii_case(symbol) {
                continue;
            }
        }

        let timestamp = parse_timestamp(&record.date)?;
        bars.push(Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
        ));
    }

    if bars.is_empty() && saw_symbol_column {
        return Err(DataError::SymbolNotFound(symbol.to_string()));
    }

    bars.sort_by_key(|b| b.timestamp);
    debug!(path = %path.display(), rows = bars.len(), "Parsed CSV bars");
    Ok(bars)
}

/// Parse various timestamp formats into Unix milliseconds.
pub(crate) fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date_str) {
        return Ok(dt.timestamp_millis());
    }

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
    ];
    for format in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    for format in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            return Ok(d.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis());
        }
    }

    // Try parsing as Unix timestamp
    if let Ok(ts) = date_str.parse::<i64>() {
        // Assume milliseconds if > 10 digits
        if ts > 10_000_000_000 {
            return Ok(ts);
        } else {
            return Ok(ts * 1000);
        }
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-01-15").is_ok());
        assert!(parse_timestamp("2024-01-15 10:30:00").is_ok());
        assert!(parse_timestamp("2024-01-15T10:30:00Z").is_ok());
        assert_eq!(parse_timestamp("1705312800000").unwrap(), 1_705_312_800_000);
        assert_eq!(parse_timestamp("1705312800").unwrap(), 1_705_312_800_000);
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CsvBarProvider::new("/nonexistent/bars.csv"),
            Err(DataError::Io(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_filters_half_open_range() {
        let file = write_csv(
            "datetime,open,high,low,close,volume\n\
             2024-01-01 00:02:00,101,101,101,101,1\n\
             2024-01-01 00:00:00,100,100,100,100,1\n\
             2024-01-01 00:01:00,102,102,102,102,1\n\
             2024-01-01 00:03:00,105,105,105,105,1\n",
        );
        let provider = CsvBarProvider::new(file.path()).unwrap();

        let bars = provider
            .fetch(
                "BTCUSDT",
                utc("2024-01-01T00:01:00Z"),
                utc("2024-01-01T00:03:00Z"),
            )
            .await
            .unwrap();

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![102.0, 101.0]);
    }

    #[tokio::test]
    async fn test_fetch_selects_symbol() {
        let file = write_csv(
            "symbol,timestamp,open,high,low,close,volume\n\
             BTCUSDT,1704067200000,100,100,100,100,1\n\
             ETHUSDT,1704067200000,5,5,5,5,1\n\
             BTCUSDT,1704067260000,101,101,101,101,1\n",
        );
        let provider = CsvBarProvider::new(file.path()).unwrap();
        let start = utc("2024-01-01T00:00:00Z");
        let end = utc("2024-01-02T00:00:00Z");

        let bars = provider.fetch("BTCUSDT", start, end).await.unwrap();
        assert_eq!(bars.len(), 2);

        let err = provider.fetch("SOLUSDT", start, end).await.unwrap_err();
        assert_eq!(err, DataError::SymbolNotFound("SOLUSDT".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_rejects_duplicate_timestamps() {
        let file = write_csv(
            "date,open,high,low,close,volume\n\
             2024-01-01,100,100,100,100,1\n\
             2024-01-01,101,101,101,101,1\n",
        );
        let provider = CsvBarProvider::new(file.path()).unwrap();
        let err = provider
            .fetch(
                "BTCUSDT",
                utc("2023-12-31T00:00:00Z"),
                utc("2024-01-02T00:00:00Z"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::DuplicateTimestamp { index: 1, .. }));
    }
}
