//! Core traits for the simulation engine.

mod data_source;
mod indicator;
mod risk;
mod strategy;

pub use data_source::{BarProvider, TradeSink};
pub use indicator::Indicator;
pub use risk::{AllowAll, RiskGate};
pub use strategy::{Strategy, StrategyConfig, StrategyContext, StrategyState};
