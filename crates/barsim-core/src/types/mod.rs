//! Core data types for the simulation engine.

mod event;
mod indicator_state;
mod ledger;
mod ohlcv;
mod order;
mod timeframe;

pub use event::{EventKind, StrategyEvent};
pub use indicator_state::{IndicatorSpec, IndicatorState, ReadyIndicators};
pub use ledger::{CapitalPoint, FillEffect, Ledger, LedgerState, Position};
pub use ohlcv::{validate_bars, Bar, BarSeries};
pub use order::{Direction, OrderId, OrderIntent, OrderResolution, ResolutionStatus, Trade};
pub use timeframe::Timeframe;
