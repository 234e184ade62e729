//! Trade sinks.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use barsim_core::{CapitalPoint, DataError, Trade, TradeSink};
use serde::Serialize;
use tracing::info;

/// Writes `<symbol>_trades.csv` and `<symbol>_capital.csv` into a directory.
///
/// Trade rows keep the `Trade` field names so they read back unchanged with
/// [`read_trades_csv`].
#[derive(Debug, Clone)]
pub struct CsvTradeSink {
    dir: PathBuf,
}

impl CsvTradeSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn trades_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}_trades.csv", symbol))
    }

    pub fn capital_path(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}_capital.csv", symbol))
    }
}

impl TradeSink for CsvTradeSink {
    fn accept(
        &mut self,
        symbol: &str,
        trades: &[Trade],
        capital_curve: &[CapitalPoint],
    ) -> Result<(), DataError> {
        fs::create_dir_all(&self.dir).map_err(|e| DataError::Io(e.to_string()))?;

        let trades_path = self.trades_path(symbol);
        write_csv(&trades_path, trades)?;
        write_csv(&self.capital_path(symbol), capital_curve)?;

        info!(
            symbol,
            trades = trades.len(),
            path = %trades_path.display(),
            "Wrote trade log"
        );
        Ok(())
    }
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| DataError::Io(e.to_string()))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| DataError::ParseError(e.to_string()))?;
    }
    writer.flush().map_err(|e| DataError::Io(e.to_string()))
}

/// Read a trade log written by [`CsvTradeSink`].
pub fn read_trades_csv(path: impl AsRef<Path>) -> Result<Vec<Trade>, DataError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| DataError::Io(e.to_string()))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|e| DataError::ParseError(e.to_string())))
        .collect()
}

#[derive(Serialize)]
struct RunRecord<'a> {
    symbol: &'a str,
    trades: &'a [Trade],
    capital_curve: &'a [CapitalPoint],
}

/// Writes one pretty-printed JSON document per run.
#[derive(Debug, Clone)]
pub struct JsonTradeSink {
    path: PathBuf,
}

impl JsonTradeSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TradeSink for JsonTradeSink {
    fn accept(
        &mut self,
        symbol: &str,
        trades: &[Trade],
        capital_curve: &[CapitalPoint],
    ) -> Result<(), DataError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DataError::Io(e.to_string()))?;
        }
        let file = File::create(&self.path).map_err(|e| DataError::Io(e.to_string()))?;
        let record = RunRecord {
            symbol,
            trades,
            capital_curve,
        };
        serde_json::to_writer_pretty(file, &record)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        info!(symbol, path = %self.path.display(), "Wrote run record");
        Ok(())
    }
}

/// Keeps accepted runs in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTradeSink {
    pub runs: Vec<(String, Vec<Trade>, Vec<CapitalPoint>)>,
}

impl TradeSink for MemoryTradeSink {
    fn accept(
        &mut self,
        symbol: &str,
        trades: &[Trade],
        capital_curve: &[CapitalPoint],
    ) -> Result<(), DataError> {
        self.runs
            .push((symbol.to_string(), trades.to_vec(), capital_curve.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barsim_core::{Direction, OrderId};
    use chrono::DateTime;
    use rust_decimal_macros::dec;

    fn trades() -> Vec<Trade> {
        vec![
            Trade {
                order_id: OrderId(1),
                symbol: "BTCUSDT".to_string(),
                timestamp: DateTime::from_timestamp(180, 0).unwrap(),
                bar_index: 3,
                direction: Direction::Long,
                price: dec!(98),
                quantity: dec!(1),
                commission: dec!(0.098),
            },
            Trade {
                order_id: OrderId(2),
                symbol: "BTCUSDT".to_string(),
                timestamp: DateTime::from_timestamp(240, 0).unwrap(),
                bar_index: 4,
                direction: Direction::Short,
                price: dec!(101),
                quantity: dec!(1),
                commission: dec!(0.101),
            },
        ]
    }

    fn curve() -> Vec<CapitalPoint> {
        vec![
            CapitalPoint {
                timestamp: DateTime::from_timestamp(180, 0).unwrap(),
                capital: dec!(999901.902),
            },
            CapitalPoint {
                timestamp: DateTime::from_timestamp(240, 0).unwrap(),
                capital: dec!(1000002.801),
            },
        ]
    }

    #[test]
    fn test_csv_sink_preserves_trade_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = CsvTradeSink::new(dir.path().join("out"));
        sink.accept("BTCUSDT", &trades(), &curve()).unwrap();

        let read = read_trades_csv(sink.trades_path("BTCUSDT")).unwrap();
        assert_eq!(read, trades());

        let header = fs::read_to_string(sink.trades_path("BTCUSDT")).unwrap();
        assert!(header.starts_with(
            "order_id,symbol,timestamp,bar_index,direction,price,quantity,commission"
        ));
        assert!(sink.capital_path("BTCUSDT").exists());
    }

    #[test]
    fn test_json_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        let mut sink = JsonTradeSink::new(&path);
        sink.accept("BTCUSDT", &trades(), &curve()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["symbol"], "BTCUSDT");
        assert_eq!(value["trades"].as_array().unwrap().len(), 2);
        assert_eq!(value["trades"][0]["direction"], "long");
        assert_eq!(value["capital_curve"][1]["capital"], "1000002.801");
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemoryTradeSink::default();
        sink.accept("BTCUSDT", &trades(), &[]).unwrap();
        assert_eq!(sink.runs.len(), 1);
        assert_eq!(sink.runs[0].1.len(), 2);
    }
}
