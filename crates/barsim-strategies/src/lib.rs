//! Strategy implementations for the simulation loop.
//!
//! This crate provides:
//! - [`ActiveOrderSet`] and [`OrderLifecycle`], the Flat/Entering/Long/Exiting
//!   state machine with its audit log
//! - MA/RSI trend-with-pullback strategy
//! - RSI reversion strategy
//! - A registry for creating strategies by name

mod ma_rsi;
mod order_tracker;
mod registry;
mod rsi_reversion;

pub use ma_rsi::{MaRsiConfig, MaRsiStrategy};
pub use order_tracker::{ActiveOrderSet, OrderLifecycle, Phase};
pub use registry::{StrategyInfo, StrategyRegistry};
pub use rsi_reversion::{RsiReversionConfig, RsiReversionStrategy};
