//! Position-count and capital-share limits.

use std::collections::HashMap;

use barsim_core::{Direction, RiskGate, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Result of a limit check.
#[derive(Debug, Clone, PartialEq)]
pub enum LimitCheck {
    /// Trade allowed
    Allowed,
    /// Trade blocked with reason
    Blocked { reason: String },
}

impl LimitCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, LimitCheck::Allowed)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, LimitCheck::Blocked { .. })
    }
}

/// Limit configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskLimits {
    /// Maximum number of open positions
    pub max_positions: usize,
    /// Maximum share of total position value a new position may take (0..=1)
    pub risk_limit: Decimal,
}

impl Default for RiskLimits {
    fn default() -> Self {
        Self {
            max_positions: 1,
            risk_limit: Decimal::ONE,
        }
    }
}

#[derive(Debug, Clone)]
struct OpenPosition {
    quantity: Decimal,
    value: Decimal,
}

/// Gate that limits how many positions may be open and how concentrated a
/// new one may be.
///
/// Open positions are learned from fill notifications: a buy records the
/// position at its fill value, a sell removes it. Closing intents are always
/// allowed.
#[derive(Debug, Clone)]
pub struct PositionLimitGate {
    limits: RiskLimits,
    positions: HashMap<String, OpenPosition>,
}

impl PositionLimitGate {
    pub fn new(limits: RiskLimits) -> Self {
        Self {
            limits,
            positions: HashMap::new(),
        }
    }

    pub fn limits(&self) -> &RiskLimits {
        &self.limits
    }

    /// Number of positions the gate believes are open.
    pub fn open_positions(&self) -> usize {
        self.positions.len()
    }

    /// Quantity recorded for `symbol`, if open.
    pub fn position_quantity(&self, symbol: &str) -> Option<Decimal> {
        self.positions.get(symbol).map(|p| p.quantity)
    }

    /// Check a prospective order against the limits.
    pub fn check(
        &self,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
        direction: Direction,
    ) -> LimitCheck {
        if direction == Direction::Short {
            return LimitCheck::Allowed;
        }

        if self.positions.len() >= self.limits.max_positions {
            return LimitCheck::Blocked {
                reason: format!(
                    "Max positions reached: {} (limit: {})",
                    self.positions.len(),
                    self.limits.max_positions
                ),
            };
        }

        let position_value = price * quantity;
        let total_value: Decimal = self.positions.values().map(|p| p.value).sum();
        let denominator = total_value + position_value;
        if denominator > Decimal::ZERO {
            let share = position_value / denominator;
            if share > self.limits.risk_limit {
                return LimitCheck::Blocked {
                    reason: format!(
                        "Position in {} would be {:.2}% of position value (limit: {:.2}%)",
                        symbol,
                        share * Decimal::ONE_HUNDRED,
                        self.limits.risk_limit * Decimal::ONE_HUNDRED
                    ),
                };
            }
        }

        LimitCheck::Allowed
    }
}

impl Default for PositionLimitGate {
    fn default() -> Self {
        Self::new(RiskLimits::default())
    }
}

impl RiskGate for PositionLimitGate {
    fn allow(&self, symbol: &str, price: Decimal, quantity: Decimal, direction: Direction) -> bool {
        match self.check(symbol, price, quantity, direction) {
            LimitCheck::Allowed => true,
            LimitCheck::Blocked { reason } => {
                debug!(symbol, %price, %quantity, %reason, "Order blocked by position limits");
                false
            }
        }
    }

    fn refusal_reason(
        &self,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
        direction: Direction,
    ) -> Option<String> {
        match self.check(symbol, price, quantity, direction) {
            LimitCheck::Allowed => None,
            LimitCheck::Blocked { reason } => Some(reason),
        }
    }

    fn on_fill(&mut self, trade: &Trade) {
        match trade.direction {
            Direction::Long => {
                self.positions.insert(
                    trade.symbol.clone(),
                    OpenPosition {
                        quantity: trade.quantity,
                        value: trade.value(),
                    },
                );
            }
            Direction::Short => {
                self.positions.remove(&trade.symbol);
            }
        }
    }

    fn reset(&mut self) {
        self.positions.clear();
    }

    fn name(&self) -> &str {
        "position-limits"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barsim_core::OrderId;
    use chrono::DateTime;
    use rust_decimal_macros::dec;

    fn trade(symbol: &str, direction: Direction, price: Decimal) -> Trade {
        Trade {
            order_id: OrderId(1),
            symbol: symbol.to_string(),
            timestamp: DateTime::UNIX_EPOCH,
            bar_index: 0,
            direction,
            price,
            quantity: dec!(1),
            commission: dec!(0),
        }
    }

    #[test]
    fn test_max_positions() {
        let mut gate = PositionLimitGate::default();
        assert!(gate.allow("BTCUSDT", dec!(100), dec!(1), Direction::Long));

        gate.on_fill(&trade("BTCUSDT", Direction::Long, dec!(100)));
        assert_eq!(gate.open_positions(), 1);
        assert!(gate
            .check("BTCUSDT", dec!(100), dec!(1), Direction::Long)
            .is_blocked());

        gate.on_fill(&trade("BTCUSDT", Direction::Short, dec!(110)));
        assert_eq!(gate.open_positions(), 0);
        assert!(gate.allow("BTCUSDT", dec!(100), dec!(1), Direction::Long));
    }

    #[test]
    fn test_closing_always_allowed() {
        let gate = PositionLimitGate::new(RiskLimits {
            max_positions: 0,
            risk_limit: dec!(0),
        });
        assert!(gate.allow("BTCUSDT", dec!(100), dec!(1), Direction::Short));
        assert!(!gate.allow("BTCUSDT", dec!(100), dec!(1), Direction::Long));
    }

    #[test]
    fn test_concentration_limit() {
        let mut gate = PositionLimitGate::new(RiskLimits {
            max_positions: 5,
            risk_limit: dec!(0.5),
        });
        gate.on_fill(&trade("ETHUSDT", Direction::Long, dec!(100)));

        // 100 / (100 + 100) = 50%
        assert!(gate
            .check("BTCUSDT", dec!(100), dec!(1), Direction::Long)
            .is_allowed());
        // 300 / (100 + 300) = 75%
        let check = gate.check("BTCUSDT", dec!(300), dec!(1), Direction::Long);
        assert!(matches!(check, LimitCheck::Blocked { ref reason } if reason.contains("75.00%")));
    }

    #[test]
    fn test_first_position_under_fractional_limit_is_blocked() {
        // With nothing open, any new position is 100% of position value.
        let gate = PositionLimitGate::new(RiskLimits {
            max_positions: 5,
            risk_limit: dec!(0.8),
        });
        assert!(!gate.allow("BTCUSDT", dec!(100), dec!(1), Direction::Long));
    }

    #[test]
    fn test_refusal_reason_carries_limit_message() {
        let gate = PositionLimitGate::new(RiskLimits {
            max_positions: 5,
            risk_limit: dec!(0.8),
        });
        let reason = gate
            .refusal_reason("BTCUSDT", dec!(100), dec!(1), Direction::Long)
            .unwrap();
        assert!(reason.contains("100.00% of position value"));
        assert!(gate
            .refusal_reason("BTCUSDT", dec!(100), dec!(1), Direction::Short)
            .is_none());
    }

    #[test]
    fn test_reset_forgets_open_positions() {
        let mut gate = PositionLimitGate::default();
        gate.on_fill(&trade("BTCUSDT", Direction::Long, dec!(100)));
        assert!(!gate.allow("ETHUSDT", dec!(100), dec!(1), Direction::Long));

        gate.reset();
        assert_eq!(gate.open_positions(), 0);
        assert!(gate.allow("ETHUSDT", dec!(100), dec!(1), Direction::Long));
    }
}
