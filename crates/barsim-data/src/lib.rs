//! Bar providers and trade sinks.
//!
//! Providers implement [`BarProvider`](barsim_core::BarProvider) and always
//! hand back a validated, ascending sequence. Sinks implement
//! [`TradeSink`](barsim_core::TradeSink) and persist a finished run.

mod csv_provider;
mod memory;
mod sink;

pub use csv_provider::CsvBarProvider;
pub use memory::InMemoryProvider;
pub use sink::{read_trades_csv, CsvTradeSink, JsonTradeSink, MemoryTradeSink};

use barsim_core::{validate_bars, Bar, DataError};
use chrono::{DateTime, Utc};

/// Keep bars with `start <= timestamp < end`, sorted ascending and validated.
pub(crate) fn select_range(
    mut bars: Vec<Bar>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<Bar>, DataError> {
    let (start, end) = (start.timestamp_millis(), end.timestamp_millis());
    bars.retain(|b| b.timestamp >= start && b.timestamp < end);
    if bars.is_empty() {
        return Err(DataError::NoDataAvailable);
    }
    bars.sort_by_key(|b| b.timestamp);
    validate_bars(&bars)?;
    Ok(bars)
}
