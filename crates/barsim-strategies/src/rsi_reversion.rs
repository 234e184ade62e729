//! RSI Reversion Strategy.
//!
//! Buys when RSI drops below the oversold level and sells the position once
//! RSI climbs above the overbought level. Moving averages are ignored.

use barsim_core::{
    Bar, Direction, IndicatorSpec, IndicatorState, LedgerState, OrderIntent, OrderResolution,
    Strategy, StrategyConfig, StrategyContext, StrategyError, StrategyEvent, StrategyState,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order_tracker::OrderLifecycle;

/// Configuration for the RSI reversion strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiReversionConfig {
    /// RSI calculation period
    pub period: usize,
    /// Buy below this
    pub oversold: f64,
    /// Sell above this
    pub overbought: f64,
    /// Units bought per entry
    pub order_quantity: Decimal,
}

impl Default for RsiReversionConfig {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
            order_quantity: Decimal::ONE,
        }
    }
}

impl StrategyConfig for RsiReversionConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.period < 2 {
            return Err(StrategyError::InvalidConfig(
                "RSI period must be at least 2".into(),
            ));
        }
        if self.overbought <= self.oversold {
            return Err(StrategyError::InvalidConfig(
                "Overbought must be greater than oversold".into(),
            ));
        }
        if self.overbought > 100.0 || self.oversold < 0.0 {
            return Err(StrategyError::InvalidConfig(
                "RSI thresholds must be between 0 and 100".into(),
            ));
        }
        if self.order_quantity <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(
                "Order quantity must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// RSI Reversion Strategy.
pub struct RsiReversionStrategy {
    config: RsiReversionConfig,
    lifecycle: OrderLifecycle,
    bars_processed: usize,
}

impl RsiReversionStrategy {
    /// Create a new RSI reversion strategy.
    pub fn new(config: RsiReversionConfig) -> Self {
        Self {
            config,
            lifecycle: OrderLifecycle::new(),
            bars_processed: 0,
        }
    }
}

impl Strategy for RsiReversionStrategy {
    fn name(&self) -> &str {
        "RSI Reversion"
    }

    fn description(&self) -> &str {
        "Buys oversold RSI readings and sells overbought ones"
    }

    fn indicator_spec(&self) -> IndicatorSpec {
        // Averages are unused; keep them inside the RSI warmup.
        IndicatorSpec {
            fast_window: 1,
            slow_window: self.config.period,
            rsi_window: self.config.period,
        }
    }

    fn on_bar(
        &mut self,
        bar: &Bar,
        indicators: &IndicatorState,
        ctx: &StrategyContext<'_>,
    ) -> Vec<OrderIntent> {
        self.bars_processed += 1;
        self.lifecycle.observe(indicators);

        let Some(rsi) = indicators.ready().map(|v| v.rsi) else {
            return Vec::new();
        };

        let intent = if ctx.ledger.is_flat() && rsi < self.config.oversold {
            self.lifecycle.emit(
                Direction::Long,
                self.config.order_quantity,
                bar,
                ctx,
                format!("RSI {:.2} below oversold {:.2}", rsi, self.config.oversold),
            )
        } else if !ctx.ledger.is_flat() && rsi > self.config.overbought {
            self.lifecycle.emit(
                Direction::Short,
                ctx.ledger.position_quantity(),
                bar,
                ctx,
                format!(
                    "RSI {:.2} above overbought {:.2}",
                    rsi, self.config.overbought
                ),
            )
        } else {
            None
        };

        intent.into_iter().collect()
    }

    fn on_fill_resolved(&mut self, resolution: &OrderResolution, ledger: &LedgerState) {
        self.lifecycle.resolve(resolution, ledger);
    }

    fn active_orders(&self) -> usize {
        self.lifecycle.active_orders()
    }

    fn drain_events(&mut self) -> Vec<StrategyEvent> {
        self.lifecycle.drain_events()
    }

    fn reset(&mut self) {
        self.lifecycle.reset();
        self.bars_processed = 0;
    }

    fn state(&self) -> StrategyState {
        StrategyState {
            name: self.name().to_string(),
            phase: self.lifecycle.phase().as_str().to_string(),
            bars_processed: self.bars_processed,
            intents_emitted: self.lifecycle.intents_emitted(),
            active_orders: self.lifecycle.active_orders(),
            custom: serde_json::json!({
                "period": self.config.period,
                "oversold": self.config.oversold,
                "overbought": self.config.overbought,
            }),
        }
    }
}
