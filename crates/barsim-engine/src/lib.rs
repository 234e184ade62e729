//! Simulation engine.
//!
//! Drives a strategy over a validated bar series one bar at a time, fills its
//! intents at the close, keeps the ledger and derives statistics from the
//! resulting trade log.

mod engine;
mod fill;
mod report;
mod statistics;
mod sweep;

pub use engine::{EngineConfig, SimulationEngine, StopHandle};
pub use fill::{FillModel, DEFAULT_COMMISSION_RATE};
pub use report::RunResult;
pub use statistics::{RunWarning, Stats};
pub use sweep::{sweep, SweepGrid, SweepOutcome};
