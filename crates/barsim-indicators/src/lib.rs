//! Technical indicators for the simulation loop.
//!
//! This crate provides:
//! - Simple moving average
//! - Relative strength index with a fixed policy for flat and one-sided windows
//! - [`IndicatorWindow`], the bounded rolling buffer the simulation loop
//!   updates once per bar and strategies read from

pub mod momentum;
pub mod moving_average;
pub mod window;

pub use momentum::Rsi;
pub use moving_average::Sma;
pub use window::{IndicatorWindow, DEFAULT_CAPACITY};
