//! Moving Average / RSI Strategy.
//!
//! Enters long when the fast moving average is above the slow one and RSI is
//! below the entry threshold. Exits when RSI rises above the exit threshold
//! or the fast average falls below the slow one.

use barsim_core::{
    Bar, Direction, IndicatorSpec, IndicatorState, LedgerState, OrderIntent, OrderResolution,
    Strategy, StrategyConfig, StrategyContext, StrategyError, StrategyEvent, StrategyState,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order_tracker::OrderLifecycle;

/// Configuration for the MA/RSI strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaRsiConfig {
    /// Fast moving average window
    pub fast_window: usize,
    /// Slow moving average window
    pub slow_window: usize,
    /// RSI window (number of price changes)
    pub rsi_window: usize,
    /// Enter when RSI is below this
    pub rsi_entry: f64,
    /// Exit when RSI is above this
    pub rsi_exit: f64,
    /// Units bought per entry
    pub order_quantity: Decimal,
}

impl Default for MaRsiConfig {
    fn default() -> Self {
        Self {
            fast_window: 5,
            slow_window: 10,
            rsi_window: 6,
            rsi_entry: 40.0,
            rsi_exit: 50.0,
            order_quantity: Decimal::ONE,
        }
    }
}

impl StrategyConfig for MaRsiConfig {
    fn validate(&self) -> Result<(), StrategyError> {
        if self.fast_window == 0 || self.slow_window == 0 || self.rsi_window == 0 {
            return Err(StrategyError::InvalidConfig(
                "Indicator windows must be greater than 0".into(),
            ));
        }
        if self.fast_window >= self.slow_window {
            return Err(StrategyError::InvalidConfig(
                "Fast window must be less than slow window".into(),
            ));
        }
        for (name, value) in [("rsi_entry", self.rsi_entry), ("rsi_exit", self.rsi_exit)] {
            if !(0.0..=100.0).contains(&value) {
                return Err(StrategyError::InvalidConfig(format!(
                    "{} must be between 0 and 100, got {}",
                    name, value
                )));
            }
        }
        if self.order_quantity <= Decimal::ZERO {
            return Err(StrategyError::InvalidConfig(
                "Order quantity must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Moving Average / RSI Strategy.
pub struct MaRsiStrategy {
    config: MaRsiConfig,
    lifecycle: OrderLifecycle,
    bars_processed: usize,
}

impl MaRsiStrategy {
    /// Create a new MA/RSI strategy.
    pub fn new(config: MaRsiConfig) -> Self {
        Self {
            config,
            lifecycle: OrderLifecycle::new(),
            bars_processed: 0,
        }
    }

    pub fn config(&self) -> &MaRsiConfig {
        &self.config
    }
}

impl Strategy for MaRsiStrategy {
    fn name(&self) -> &str {
        "MA RSI"
    }

    fn description(&self) -> &str {
        "Buys when the fast MA is above the slow MA with RSI below the entry level"
    }

    fn indicator_spec(&self) -> IndicatorSpec {
        IndicatorSpec {
            fast_window: self.config.fast_window,
            slow_window: self.config.slow_window,
            rsi_window: self.config.rsi_window,
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

        let Some(values) = indicators.ready() else {
            return Vec::new();
        };
        if self.lifecycle.active_orders() > 0 {
            return Vec::new();
        }

        let intent = if ctx.ledger.is_flat() {
            if values.fast_ma > values.slow_ma && values.rsi < self.config.rsi_entry {
                self.lifecycle.emit(
                    Direction::Long,
                    self.config.order_quantity,
                    bar,
                    ctx,
                    format!(
                        "fast MA {:.4} above slow MA {:.4}, RSI {:.2} below {:.2}",
                        values.fast_ma, values.slow_ma, values.rsi, self.config.rsi_entry
                    ),
                )
            } else {
                None
            }
        } else if values.rsi > self.config.rsi_exit || values.fast_ma < values.slow_ma {
            let reason = if values.rsi > self.config.rsi_exit {
                format!("RSI {:.2} above {:.2}", values.rsi, self.config.rsi_exit)
            } else {
                format!(
                    "fast MA {:.4} below slow MA {:.4}",
                    values.fast_ma, values.slow_ma
                )
            };
            self.lifecycle.emit(
                Direction::Short,
                ctx.ledger.position_quantity(),
                bar,
                ctx,
                reason,
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
                "fast_window": self.config.fast_window,
                "slow_window": self.config.slow_window,
                "rsi_window": self.config.rsi_window,
                "rsi_entry": self.config.rsi_entry,
                "rsi_exit": self.config.rsi_exit,
            }),
        }
    }
}
