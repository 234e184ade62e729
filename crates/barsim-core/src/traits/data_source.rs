//! Collaborator interfaces for bar input and trade output.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::DataError;
use crate::types::{Bar, CapitalPoint, Trade};

/// Source of historical bars.
#[async_trait]
pub trait BarProvider: Send + Sync {
    /// Fetch bars for `symbol` with `start <= timestamp < end`.
    ///
    /// # Returns
    /// Bars ordered from oldest to newest. Implementations must return a
    /// monotonic sequence without duplicates, or fail with [`DataError`].
    async fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Bar>, DataError>;

    /// Get the provider name.
    fn name(&self) -> &str;
}

/// Destination for a finished run's trade log and capital curve.
pub trait TradeSink {
    /// Persist the results of one run.
    fn accept(
        &mut self,
        symbol: &str,
        trades: &[Trade],
        capital_curve: &[CapitalPoint],
    ) -> Result<(), DataError>;
}
