//! Error types for the simulation engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level simulation error.
#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Invariant violation: {0}")]
    Invariant(#[from] InvariantViolation),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Indicator error: {0}")]
    Indicator(#[from] IndicatorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Malformed or unusable input bar data.
///
/// Fatal to a run and never retried by the core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Bar series is empty")]
    EmptySeries,

    #[error("Non-monotonic timestamp at bar {index}: {current} follows {previous}")]
    NonMonotonic {
        index: usize,
        previous: i64,
        current: i64,
    },

    #[error("Duplicate timestamp {timestamp} at bar {index}")]
    DuplicateTimestamp { index: usize, timestamp: i64 },

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: String },

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Internal consistency failure.
///
/// These are programming defects: a run that hits one aborts instead of
/// continuing with corrupted state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    #[error("Fill requested at bar {bar_index} before indicators were initialized")]
    IndicatorsNotReady { bar_index: usize },

    #[error("Close {price} at bar {bar_index} cannot be represented as a decimal price")]
    UnrepresentablePrice { bar_index: usize, price: f64 },

    #[error("Order quantity must be positive, got {quantity}")]
    NonPositiveQuantity { quantity: Decimal },

    #[error("Closing trade for {symbol} without an open position")]
    ClosingWithoutPosition { symbol: String },

    #[error("Opening trade for {symbol} while a position is already open")]
    PositionAlreadyOpen { symbol: String },

    #[error("Closing quantity {requested} does not match open position {open}")]
    QuantityMismatch { requested: Decimal, open: Decimal },

    #[error("Ledger replay diverged at trade {index}: expected {expected}, replayed {replayed}")]
    LedgerReplayMismatch {
        index: usize,
        expected: Decimal,
        replayed: Decimal,
    },

    #[error("Strategy emitted an intent while order {order_id} is still active")]
    DuplicateActiveOrder { order_id: u64 },
}

/// Strategy-specific errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Strategy not found: {0}")]
    NotFound(String),
}

/// Indicator calculation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Insufficient data: need {required} points, have {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for simulation operations.
pub type SimResult<T> = Result<T, SimulationError>;
