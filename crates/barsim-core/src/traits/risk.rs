//! Pre-trade risk gate.

use rust_decimal::Decimal;

use crate::types::{Direction, Trade};

/// External pre-trade check consulted by strategies before emitting an intent.
///
/// The engine owns the gate and forwards every executed trade to
/// [`RiskGate::on_fill`] so stateful gates can track exposure.
pub trait RiskGate: Send + Sync {
    /// Whether an order of `quantity` at `price` may be issued.
    fn allow(&self, symbol: &str, price: Decimal, quantity: Decimal, direction: Direction) -> bool;

    /// Why an order would be refused, or `None` when [`allow`](Self::allow) passes it.
    fn refusal_reason(
        &self,
        symbol: &str,
        price: Decimal,
        quantity: Decimal,
        direction: Direction,
    ) -> Option<String> {
        (!self.allow(symbol, price, quantity, direction)).then(|| "order not allowed".to_string())
    }

    /// Observe an executed trade.
    fn on_fill(&mut self, _trade: &Trade) {}

    /// Forget everything learned from fills; called at the start of each run.
    fn reset(&mut self) {}

    /// Name used in logs and audit events.
    fn name(&self) -> &str {
        "risk-gate"
    }
}

/// Gate used when no risk limits are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl RiskGate for AllowAll {
    fn allow(&self, _symbol: &str, _price: Decimal, _quantity: Decimal, _direction: Direction) -> bool {
        true
    }

    fn name(&self) -> &str {
        "allow-all"
    }
}
