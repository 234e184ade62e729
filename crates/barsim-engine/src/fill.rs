//! Market-at-close fill model.

use barsim_core::{Bar, IndicatorState, InvariantViolation, OrderIntent, Trade};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Default commission rate (0.1% of traded value).
pub const DEFAULT_COMMISSION_RATE: Decimal = dec!(0.001);

/// Fills every intent completely at the bar's close.
///
/// Commission is `price * quantity * commission_rate`. There is no slippage
/// and no partial fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillModel {
    pub commission_rate: Decimal,
}

impl Default for FillModel {
    fn default() -> Self {
        Self::new(DEFAULT_COMMISSION_RATE)
    }
}

impl FillModel {
    pub fn new(commission_rate: Decimal) -> Self {
        Self { commission_rate }
    }

    /// Commission charged on a fill of `quantity` at `price`.
    pub fn commission(&self, price: Decimal, quantity: Decimal) -> Decimal {
        price * quantity * self.commission_rate
    }

    /// Turn an intent into a trade at `bar.close`.
    ///
    /// Asking for a fill before the indicators are initialized, or with a
    /// non-positive quantity, is a defect in the caller.
    pub fn execute(
        &self,
        intent: &OrderIntent,
        bar: &Bar,
        indicators: &IndicatorState,
        symbol: &str,
    ) -> Result<Trade, InvariantViolation> {
        if !indicators.initialized {
            return Err(InvariantViolation::IndicatorsNotReady {
                bar_index: indicators.bar_index,
            });
        }
        if intent.quantity <= Decimal::ZERO {
            return Err(InvariantViolation::NonPositiveQuantity {
                quantity: intent.quantity,
            });
        }

        let price = Decimal::try_from(bar.close).map_err(|_| {
            InvariantViolation::UnrepresentablePrice {
                bar_index: indicators.bar_index,
                price: bar.close,
            }
        })?;

        Ok(Trade {
            order_id: intent.order_id,
            symbol: symbol.to_string(),
            timestamp: bar.datetime(),
            bar_index: indicators.bar_index,
            direction: intent.direction,
            price,
            quantity: intent.quantity,
            commission: self.commission(price, intent.quantity),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use barsim_core::{Direction, OrderId};

    fn intent(quantity: Decimal) -> OrderIntent {
        OrderIntent {
            order_id: OrderId(1),
            direction: Direction::Long,
            quantity,
            bar_index: 3,
        }
    }

    fn ready(bar_index: usize) -> IndicatorState {
        IndicatorState {
            bar_index,
            timestamp: 180_000,
            fast_ma: Some(100.0),
            slow_ma: Some(99.75),
            rsi: Some(37.5),
            initialized: true,
        }
    }

    #[test]
    fn test_fills_at_close_with_commission() {
        let bar = Bar::new(180_000, 99.0, 103.0, 97.0, 98.0, 10.0);
        let trade = FillModel::default()
            .execute(&intent(dec!(2)), &bar, &ready(3), "BTCUSDT")
            .unwrap();

        assert_eq!(trade.price, dec!(98));
        assert_eq!(trade.quantity, dec!(2));
        assert_eq!(trade.commission, dec!(0.196));
        assert_eq!(trade.bar_index, 3);
        assert_eq!(trade.timestamp.timestamp(), 180);
    }

    #[test]
    fn test_refuses_before_initialization() {
        let bar = Bar::new(0, 100.0, 100.0, 100.0, 100.0, 1.0);
        let state = IndicatorState {
            bar_index: 1,
            ..Default::default()
        };
        let err = FillModel::default()
            .execute(&intent(dec!(1)), &bar, &state, "BTCUSDT")
            .unwrap_err();
        assert_eq!(err, InvariantViolation::IndicatorsNotReady { bar_index: 1 });
    }

    #[test]
    fn test_refuses_non_positive_quantity() {
        let bar = Bar::new(0, 100.0, 100.0, 100.0, 100.0, 1.0);
        let err = FillModel::default()
            .execute(&intent(Decimal::ZERO), &bar, &ready(0), "BTCUSDT")
            .unwrap_err();
        assert!(matches!(err, InvariantViolation::NonPositiveQuantity { .. }));
    }
}
