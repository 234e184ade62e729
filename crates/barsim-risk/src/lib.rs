//! Pre-trade risk checks.
//!
//! Provides the position-count and capital-share gate strategies consult
//! before issuing an intent, plus historical value-at-risk.

mod position_limits;
mod var;

pub use position_limits::{LimitCheck, PositionLimitGate, RiskLimits};
pub use var::historical_var;
