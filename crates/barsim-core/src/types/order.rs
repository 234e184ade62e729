//! Order intents, resolutions and executed trades.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction. `Long` opens a position, `Short` closes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Get the opposite direction.
    pub fn opposite(&self) -> Self {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Identifier of an order within one run. Allocated sequentially, so runs
/// over the same input produce the same ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A request from a strategy to trade at the current bar's close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Id allocated by the strategy's active-order set
    pub order_id: OrderId,
    /// Buy to open or sell to close
    pub direction: Direction,
    /// Quantity to trade, always positive
    pub quantity: Decimal,
    /// Index of the bar the intent was issued on
    pub bar_index: usize,
}

/// Terminal state of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStatus {
    /// Completely filled
    Filled,
    /// Withdrawn before execution
    Cancelled,
    /// Refused by the fill model or ledger
    Rejected,
}

impl fmt::Display for ResolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStatus::Filled => write!(f, "FILLED"),
            ResolutionStatus::Cancelled => write!(f, "CANCELLED"),
            ResolutionStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Outcome of an order intent, fed back to the strategy in the same bar step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResolution {
    pub order_id: OrderId,
    pub direction: Direction,
    pub status: ResolutionStatus,
    /// Bar on which the order resolved
    pub bar_index: usize,
    /// The executed trade, present only for `Filled`
    pub trade: Option<Trade>,
    /// Human-readable cause for cancellations and rejections
    pub reason: Option<String>,
}

impl OrderResolution {
    /// Resolution for a completed fill.
    pub fn filled(trade: Trade) -> Self {
        Self {
            order_id: trade.order_id,
            direction: trade.direction,
            status: ResolutionStatus::Filled,
            bar_index: trade.bar_index,
            trade: Some(trade),
            reason: None,
        }
    }

    /// Resolution for an order the engine refused.
    pub fn rejected(intent: &OrderIntent, reason: impl Into<String>) -> Self {
        Self {
            order_id: intent.order_id,
            direction: intent.direction,
            status: ResolutionStatus::Rejected,
            bar_index: intent.bar_index,
            trade: None,
            reason: Some(reason.into()),
        }
    }

    /// Resolution for an order withdrawn before execution.
    pub fn cancelled(intent: &OrderIntent, reason: impl Into<String>) -> Self {
        Self {
            order_id: intent.order_id,
            direction: intent.direction,
            status: ResolutionStatus::Cancelled,
            bar_index: intent.bar_index,
            trade: None,
            reason: Some(reason.into()),
        }
    }

    /// Check if the order was completely filled.
    pub fn is_filled(&self) -> bool {
        self.status == ResolutionStatus::Filled
    }
}

/// An executed fill. Immutable and append-only: the authoritative record
/// from which capital and statistics are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub order_id: OrderId,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub bar_index: usize,
    pub direction: Direction,
    pub price: Decimal,
    pub quantity: Decimal,
    pub commission: Decimal,
}

impl Trade {
    /// Gross traded value (price * quantity).
    pub fn value(&self) -> Decimal {
        self.price * self.quantity
    }

    /// Cash effect of the trade on the ledger.
    ///
    /// Opening: `-(price*quantity + commission)`.
    /// Closing: `price*quantity - commission`.
    pub fn net_cash_flow(&self) -> Decimal {
        match self.direction {
            Direction::Long => -(self.value() + self.commission),
            Direction::Short => self.value() - self.commission,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn trade(direction: Direction, price: Decimal) -> Trade {
        Trade {
            order_id: OrderId(1),
            symbol: "BTCUSDT".to_string(),
            timestamp: DateTime::UNIX_EPOCH,
            bar_index: 0,
            direction,
            price,
            quantity: dec!(2),
            commission: price * dec!(2) * dec!(0.001),
        }
    }

    #[test]
    fn test_net_cash_flow() {
        let buy = trade(Direction::Long, dec!(100));
        assert_eq!(buy.value(), dec!(200));
        assert_eq!(buy.net_cash_flow(), dec!(-200.2));

        let sell = trade(Direction::Short, dec!(110));
        assert_eq!(sell.net_cash_flow(), dec!(219.78));
    }

    #[test]
    fn test_filled_resolution_carries_trade() {
        let resolution = OrderResolution::filled(trade(Direction::Long, dec!(100)));
        assert!(resolution.is_filled());
        assert_eq!(resolution.order_id, OrderId(1));
        assert!(resolution.reason.is_none());
    }

    #[test]
    fn test_direction_serde() {
        let json = serde_json::to_string(&Direction::Short).unwrap();
        assert_eq!(json, "\"short\"");
        assert_eq!(Direction::Long.opposite(), Direction::Short);
    }
}
