//! Strategy trait definitions.

use crate::error::StrategyError;
use crate::traits::RiskGate;
use crate::types::{
    Bar, IndicatorSpec, IndicatorState, LedgerState, OrderIntent, OrderResolution, StrategyEvent,
};
use serde::{Deserialize, Serialize};

/// Configuration trait for strategies.
pub trait StrategyConfig: Send + Sync + Clone + 'static {
    /// Validate the configuration.
    fn validate(&self) -> Result<(), StrategyError>;
}

/// Read-only view of the world a strategy decides against.
pub struct StrategyContext<'a> {
    /// Instrument being simulated
    pub symbol: &'a str,
    /// Ledger snapshot taken before this bar's intents
    pub ledger: &'a LedgerState,
    /// Pre-trade gate to consult before emitting an intent
    pub risk: &'a dyn RiskGate,
}

/// State of a strategy for monitoring and serialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyState {
    /// Strategy name
    pub name: String,
    /// Current lifecycle phase (e.g. "flat", "entering")
    pub phase: String,
    /// Number of bars the strategy was consulted on
    pub bars_processed: usize,
    /// Number of intents emitted
    pub intents_emitted: usize,
    /// Orders issued and not yet resolved
    pub active_orders: usize,
    /// Custom strategy-specific state
    pub custom: serde_json::Value,
}

/// Core strategy trait.
///
/// A strategy is a decision unit plugged into the simulation loop. It sees
/// one bar at a time together with that bar's indicator values, emits order
/// intents, and is told synchronously how each intent resolved.
pub trait Strategy: Send {
    /// Get the unique name of this strategy.
    fn name(&self) -> &str;

    /// Lookback windows the indicator window must provide.
    fn indicator_spec(&self) -> IndicatorSpec;

    /// Process a bar whose indicators are initialized.
    ///
    /// # Returns
    /// Zero or more intents to execute at this bar's close
    fn on_bar(
        &mut self,
        bar: &Bar,
        indicators: &IndicatorState,
        ctx: &StrategyContext<'_>,
    ) -> Vec<OrderIntent>;

    /// Called once per emitted intent with its terminal outcome.
    fn on_fill_resolved(&mut self, resolution: &OrderResolution, ledger: &LedgerState);

    /// Number of orders issued and not yet resolved.
    fn active_orders(&self) -> usize;

    /// Drain the audit events recorded since the last call.
    fn drain_events(&mut self) -> Vec<StrategyEvent>;

    /// Reset the strategy state before a new run.
    fn reset(&mut self);

    /// Get the current strategy state for monitoring.
    fn state(&self) -> StrategyState;

    /// Get a description of the strategy.
    fn description(&self) -> &str {
        ""
    }
}
