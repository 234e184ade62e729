//! Append-only audit log of strategy decisions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Direction, IndicatorState, OrderId, ResolutionStatus};

/// What happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// The strategy issued an order intent
    IntentEmitted {
        order_id: OrderId,
        direction: Direction,
        quantity: Decimal,
        reason: String,
    },
    /// The risk gate refused an intent before it was issued
    IntentBlocked {
        direction: Direction,
        quantity: Decimal,
        reason: String,
    },
    /// An active order reached a terminal state
    OrderResolved {
        order_id: OrderId,
        direction: Direction,
        status: ResolutionStatus,
        price: Option<Decimal>,
        reason: Option<String>,
    },
}

/// One audit record: the bar, the indicator values that drove the decision,
/// and the position after the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyEvent {
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub indicators: IndicatorState,
    /// Units held after this event
    pub position: Decimal,
    #[serde(flatten)]
    pub kind: EventKind,
}
