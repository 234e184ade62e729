//! Core types and traits for the bar simulation engine.
//!
//! This crate provides the foundational building blocks including:
//! - Market data types (Bar, validated BarSeries, Timeframe)
//! - Order intents, resolutions and the immutable Trade record
//! - The Ledger, the only owner of capital and position state
//! - Core traits for strategies, indicators, bar providers, trade sinks and risk gates

pub mod error;
pub mod traits;
pub mod types;

pub use error::{
    DataError, IndicatorError, InvariantViolation, SimResult, SimulationError, StrategyError,
};
pub use traits::*;
pub use types::*;
