//! Order lifecycle tracking shared by the built-in strategies.

use std::collections::BTreeMap;

use barsim_core::{
    Bar, Direction, EventKind, IndicatorState, InvariantViolation, LedgerState, OrderId,
    OrderIntent, OrderResolution, ResolutionStatus, StrategyContext, StrategyEvent,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Orders issued by a strategy and not yet resolved.
///
/// Holds at most one order: `issue` refuses while another is outstanding.
/// Ids are allocated sequentially from 1 and restart on `clear`.
#[derive(Debug, Clone, Default)]
pub struct ActiveOrderSet {
    orders: BTreeMap<OrderId, Direction>,
    next_id: u64,
}

impl ActiveOrderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an id for a new order in `direction`.
    pub fn issue(&mut self, direction: Direction) -> Result<OrderId, InvariantViolation> {
        if let Some(existing) = self.orders.keys().next() {
            return Err(InvariantViolation::DuplicateActiveOrder {
                order_id: existing.0,
            });
        }
        self.next_id += 1;
        let id = OrderId(self.next_id);
        self.orders.insert(id, direction);
        Ok(id)
    }

    /// Remove a resolved order, returning its direction if it was active.
    pub fn resolve(&mut self, id: OrderId) -> Option<Direction> {
        self.orders.remove(&id)
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.orders.contains_key(&id)
    }

    /// Check whether an order in `direction` is outstanding.
    pub fn has_direction(&self, direction: Direction) -> bool {
        self.orders.values().any(|d| *d == direction)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Forget all orders and restart id allocation.
    pub fn clear(&mut self) {
        self.orders.clear();
        self.next_id = 0;
    }
}

/// Where a strategy stands in its entry/exit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// No position, no active orders
    Flat,
    /// Buy issued, awaiting resolution
    Entering,
    /// Position open, no active orders
    Long,
    /// Sell issued, awaiting resolution
    Exiting,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Flat => "flat",
            Phase::Entering => "entering",
            Phase::Long => "long",
            Phase::Exiting => "exiting",
        }
    }
}

/// The Flat/Entering/Long/Exiting state machine plus its audit log.
///
/// Strategies decide *when* to enter or exit; this type issues the intent,
/// consults the risk gate, tracks the active order and records every
/// emission and resolution.
#[derive(Debug, Clone)]
pub struct OrderLifecycle {
    phase: Phase,
    active: ActiveOrderSet,
    events: Vec<StrategyEvent>,
    last_indicators: IndicatorState,
    intents_emitted: usize,
}

impl Default for OrderLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderLifecycle {
    pub fn new() -> Self {
        Self {
            phase: Phase::Flat,
            active: ActiveOrderSet::new(),
            events: Vec::new(),
            last_indicators: IndicatorState::default(),
            intents_emitted: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_orders(&self) -> usize {
        self.active.len()
    }

    pub fn intents_emitted(&self) -> usize {
        self.intents_emitted
    }

    /// Remember the indicator values of the bar being processed.
    pub fn observe(&mut self, indicators: &IndicatorState) {
        self.last_indicators = *indicators;
    }

    /// Issue an intent if the strategy is idle in the matching phase.
    ///
    /// Buys are only issued from `Flat`, sells only from `Long`, and nothing
    /// is issued while an order is active. Returns `None` when the intent was
    /// not issued, including when the risk gate refuses it.
    pub fn emit(
        &mut self,
        direction: Direction,
        quantity: Decimal,
        bar: &Bar,
        ctx: &StrategyContext<'_>,
        reason: String,
    ) -> Option<OrderIntent> {
        let ready_phase = match direction {
            Direction::Long => Phase::Flat,
            Direction::Short => Phase::Long,
        };
        if self.phase != ready_phase || !self.active.is_empty() {
            return None;
        }

        let timestamp = bar.datetime();
        let price = Decimal::try_from(bar.close).unwrap_or(Decimal::ZERO);
        if let Some(refusal) = ctx.risk.refusal_reason(ctx.symbol, price, quantity, direction) {
            debug!(
                gate = ctx.risk.name(),
                direction = %direction,
                %quantity,
                %refusal,
                "Intent blocked by risk gate"
            );
            self.record(
                self.last_indicators.bar_index,
                timestamp,
                ctx.ledger.position_quantity(),
                EventKind::IntentBlocked {
                    direction,
                    quantity,
                    reason: format!("{} blocked by {}: {}", reason, ctx.risk.name(), refusal),
                },
            );
            return None;
        }

        let order_id = match self.active.issue(direction) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Refusing to issue a second active order");
                return None;
            }
        };

        self.phase = match direction {
            Direction::Long => Phase::Entering,
            Direction::Short => Phase::Exiting,
        };
        self.intents_emitted += 1;

        let bar_index = self.last_indicators.bar_index;
        debug!(order_id = %order_id, direction = %direction, %quantity, bar_index, "Intent emitted");
        self.record(
            bar_index,
            timestamp,
            ctx.ledger.position_quantity(),
            EventKind::IntentEmitted {
                order_id,
                direction,
                quantity,
                reason,
            },
        );

        Some(OrderIntent {
            order_id,
            direction,
            quantity,
            bar_index,
        })
    }

    /// Apply the terminal outcome of an active order.
    ///
    /// A fill moves Entering to Long and Exiting to Flat. A cancellation or
    /// rejection returns to whichever idle phase matches the ledger.
    pub fn resolve(&mut self, resolution: &OrderResolution, ledger: &LedgerState) {
        if self.active.resolve(resolution.order_id).is_none() {
            warn!(order_id = %resolution.order_id, "Resolution for unknown order ignored");
            return;
        }

        self.phase = match (self.phase, resolution.status) {
            (Phase::Entering, ResolutionStatus::Filled) => Phase::Long,
            (Phase::Exiting, ResolutionStatus::Filled) => Phase::Flat,
            _ if ledger.is_flat() => Phase::Flat,
            _ => Phase::Long,
        };

        let timestamp = resolution
            .trade
            .as_ref()
            .map(|t| t.timestamp)
            .unwrap_or_else(|| millis_to_datetime(self.last_indicators.timestamp));
        self.record(
            resolution.bar_index,
            timestamp,
            ledger.position_quantity(),
            EventKind::OrderResolved {
                order_id: resolution.order_id,
                direction: resolution.direction,
                status: resolution.status,
                price: resolution.trade.as_ref().map(|t| t.price),
                reason: resolution.reason.clone(),
            },
        );
    }

    pub fn drain_events(&mut self) -> Vec<StrategyEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn record(
        &mut self,
        bar_index: usize,
        timestamp: DateTime<Utc>,
        position: Decimal,
        kind: EventKind,
    ) {
        self.events.push(StrategyEvent {
            bar_index,
            timestamp,
            indicators: self.last_indicators,
            position,
            kind,
        });
    }
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use barsim_core::{AllowAll, RiskGate, Trade};
    use rust_decimal_macros::dec;

    struct DenyAll;

    impl RiskGate for DenyAll {
        fn allow(&self, _: &str, _: Decimal, _: Decimal, _: Direction) -> bool {
            false
        }

        fn name(&self) -> &str {
            "deny-all"
        }
    }

    fn flat() -> LedgerState {
        LedgerState {
            capital: dec!(1000),
            position: None,
        }
    }

    fn bar() -> Bar {
        Bar::new(60_000, 100.0, 100.0, 100.0, 100.0, 1.0)
    }

    fn fill(intent: &OrderIntent) -> OrderResolution {
        OrderResolution::filled(Trade {
            order_id: intent.order_id,
            symbol: "TEST".to_string(),
            timestamp: DateTime::UNIX_EPOCH,
            bar_index: intent.bar_index,
            direction: intent.direction,
            price: dec!(100),
            quantity: intent.quantity,
            commission: dec!(0.1),
        })
    }

    #[test]
    fn test_active_order_set_allows_one_order() {
        let mut set = ActiveOrderSet::new();
        let id = set.issue(Direction::Long).unwrap();
        assert_eq!(id, OrderId(1));
        assert!(set.has_direction(Direction::Long));

        let err = set.issue(Direction::Short).unwrap_err();
        assert!(matches!(
            err,
            InvariantViolation::DuplicateActiveOrder { order_id: 1 }
        ));

        assert_eq!(set.resolve(id), Some(Direction::Long));
        assert!(set.is_empty());
        assert_eq!(set.issue(Direction::Short).unwrap(), OrderId(2));
    }

    #[test]
    fn test_full_cycle() {
        let ledger = flat();
        let ctx = StrategyContext {
            symbol: "TEST",
            ledger: &ledger,
            risk: &AllowAll,
        };
        let mut lifecycle = OrderLifecycle::new();

        let buy = lifecycle
            .emit(Direction::Long, dec!(1), &bar(), &ctx, "entry".into())
            .unwrap();
        assert_eq!(lifecycle.phase(), Phase::Entering);
        assert!(lifecycle
            .emit(Direction::Long, dec!(1), &bar(), &ctx, "again".into())
            .is_none());

        let long = LedgerState {
            capital: dec!(899.9),
            position: Some(barsim_core::Position {
                symbol: "TEST".to_string(),
                quantity: dec!(1),
                cost_basis: dec!(100),
                opened_at: DateTime::UNIX_EPOCH,
            }),
        };
        lifecycle.resolve(&fill(&buy), &long);
        assert_eq!(lifecycle.phase(), Phase::Long);

        let ctx = StrategyContext {
            symbol: "TEST",
            ledger: &long,
            risk: &AllowAll,
        };
        let sell = lifecycle
            .emit(Direction::Short, dec!(1), &bar(), &ctx, "exit".into())
            .unwrap();
        assert_eq!(lifecycle.phase(), Phase::Exiting);

        lifecycle.resolve(&fill(&sell), &ledger);
        assert_eq!(lifecycle.phase(), Phase::Flat);

        let events = lifecycle.drain_events();
        assert_eq!(events.len(), 4);
        assert!(matches!(events[0].kind, EventKind::IntentEmitted { .. }));
        assert!(matches!(
            events[3].kind,
            EventKind::OrderResolved {
                status: ResolutionStatus::Filled,
                ..
            }
        ));
        assert!(lifecycle.drain_events().is_empty());
    }

    #[test]
    fn test_rejected_entry_returns_to_flat() {
        let ledger = flat();
        let ctx = StrategyContext {
            symbol: "TEST",
            ledger: &ledger,
            risk: &AllowAll,
        };
        let mut lifecycle = OrderLifecycle::new();
        let buy = lifecycle
            .emit(Direction::Long, dec!(1), &bar(), &ctx, "entry".into())
            .unwrap();

        lifecycle.resolve(&OrderResolution::rejected(&buy, "insufficient capital"), &ledger);
        assert_eq!(lifecycle.phase(), Phase::Flat);
        assert_eq!(lifecycle.active_orders(), 0);
    }

    #[test]
    fn test_blocked_intent_is_logged_not_issued() {
        let ledger = flat();
        let ctx = StrategyContext {
            symbol: "TEST",
            ledger: &ledger,
            risk: &DenyAll,
        };
        let mut lifecycle = OrderLifecycle::new();

        assert!(lifecycle
            .emit(Direction::Long, dec!(1), &bar(), &ctx, "entry".into())
            .is_none());
        assert_eq!(lifecycle.phase(), Phase::Flat);

        let events = lifecycle.drain_events();
        assert_eq!(events.len(), 1);
        match &events[0].kind {
            EventKind::IntentBlocked { reason, .. } => {
                assert_eq!(reason, "entry blocked by deny-all: order not allowed")
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_unknown_resolution_is_ignored() {
        let mut lifecycle = OrderLifecycle::new();
        let intent = OrderIntent {
            order_id: OrderId(42),
            direction: Direction::Long,
            quantity: dec!(1),
            bar_index: 0,
        };
        lifecycle.resolve(&fill(&intent), &flat());
        assert_eq!(lifecycle.phase(), Phase::Flat);
        assert!(lifecycle.drain_events().is_empty());
    }
}
