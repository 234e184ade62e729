//! Bar-by-bar simulation loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use barsim_core::{
    AllowAll, Bar, BarSeries, IndicatorState, InvariantViolation, Ledger, OrderIntent,
    OrderResolution, RiskGate, SimResult, SimulationError, Strategy, StrategyContext,
    StrategyEvent, Timeframe, Trade,
};
use barsim_indicators::{IndicatorWindow, DEFAULT_CAPACITY};
use barsim_risk::{PositionLimitGate, RiskLimits};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::fill::{FillModel, DEFAULT_COMMISSION_RATE};
use crate::report::RunResult;
use crate::statistics::Stats;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Starting cash
    pub initial_capital: Decimal,
    /// Commission as a fraction of traded value
    pub commission_rate: Decimal,
    /// Bars retained by the indicator window
    pub window_capacity: usize,
    /// Position limits; `None` allows every intent
    pub risk_limits: Option<RiskLimits>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            initial_capital: dec!(1000000),
            commission_rate: DEFAULT_COMMISSION_RATE,
            window_capacity: DEFAULT_CAPACITY,
            risk_limits: None,
        }
    }
}

impl EngineConfig {
    /// Check the configuration before a run.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.initial_capital <= Decimal::ZERO {
            return Err(SimulationError::Config(
                "initial capital must be positive".into(),
            ));
        }
        if self.commission_rate < Decimal::ZERO || self.commission_rate >= Decimal::ONE {
            return Err(SimulationError::Config(format!(
                "commission rate must be in [0, 1), got {}",
                self.commission_rate
            )));
        }
        if self.window_capacity == 0 {
            return Err(SimulationError::Config(
                "window capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Cooperative stop signal for a running simulation.
///
/// Checked before each bar; a stopped run returns its partial results with
/// `aborted` set.
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the run to stop before its next bar.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Single-instrument simulation engine.
///
/// Each call to [`run`](Self::run) owns a fresh ledger and indicator window,
/// and resets the strategy and risk gate, so one engine may be reused for
/// several runs.
pub struct SimulationEngine {
    config: EngineConfig,
    fill_model: FillModel,
    risk: Box<dyn RiskGate>,
    stop: StopHandle,
}

impl SimulationEngine {
    /// Create an engine; installs a [`PositionLimitGate`] when limits are configured.
    pub fn new(config: EngineConfig) -> Self {
        let risk: Box<dyn RiskGate> = match &config.risk_limits {
            Some(limits) => Box::new(PositionLimitGate::new(limits.clone())),
            None => Box::new(AllowAll),
        };
        Self {
            fill_model: FillModel::new(config.commission_rate),
            config,
            risk,
            stop: StopHandle::new(),
        }
    }

    /// Replace the risk gate.
    pub fn with_risk_gate(mut self, gate: Box<dyn RiskGate>) -> Self {
        self.risk = gate;
        self
    }

    /// Share an externally created stop handle.
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate raw bars into a series, then run.
    ///
    /// Malformed input fails with a data error before any indicator is computed.
    pub fn run_bars(
        &mut self,
        symbol: &str,
        timeframe: Timeframe,
        bars: Vec<Bar>,
        strategy: &mut dyn Strategy,
    ) -> SimResult<RunResult> {
        let series = BarSeries::new(symbol, timeframe, bars)?;
        self.run(&series, strategy)
    }

    /// Replay `series` through `strategy`.
    pub fn run(&mut self, series: &BarSeries, strategy: &mut dyn Strategy) -> SimResult<RunResult> {
        self.config.validate()?;
        strategy.reset();
        self.risk.reset();

        let symbol = series.symbol.as_str();
        let mut window = IndicatorWindow::new(strategy.indicator_spec(), self.config.window_capacity)?;
        let mut ledger = Ledger::new(symbol, self.config.initial_capital);
        let mut trades: Vec<Trade> = Vec::new();
        let mut events: Vec<StrategyEvent> = Vec::new();
        let mut bars_processed = 0;
        let mut aborted = false;

        info!(
            symbol,
            strategy = strategy.name(),
            bars = series.len(),
            initial_capital = %self.config.initial_capital,
            commission_rate = %self.config.commission_rate,
            risk_gate = self.risk.name(),
            "Starting simulation"
        );

        for (index, bar) in series.iter().enumerate() {
            if self.stop.is_stopped() {
                warn!(symbol, bar_index = index, "Simulation stopped before completion");
                aborted = true;
                break;
            }

            window.update(*bar);
            bars_processed += 1;

            let indicators = window.state(index);
            if !indicators.initialized {
                continue;
            }

            let snapshot = ledger.state();
            let intents = {
                let ctx = StrategyContext {
                    symbol,
                    ledger: &snapshot,
                    risk: self.risk.as_ref(),
                };
                strategy.on_bar(bar, &indicators, &ctx)
            };

            for intent in intents {
                let resolution =
                    self.resolve_intent(&intent, bar, &indicators, &mut ledger, &mut trades)?;
                strategy.on_fill_resolved(&resolution, &ledger.state());
            }

            events.extend(strategy.drain_events());
        }
        events.extend(strategy.drain_events());

        verify_replay(&ledger, &trades)?;

        let stats = Stats::compute(&trades, self.config.initial_capital);
        let last_close = series.last().and_then(|b| Decimal::try_from(b.close).ok());

        info!(
            symbol,
            trades = trades.len(),
            final_capital = %ledger.capital(),
            total_return = %stats.total_return,
            max_drawdown = %stats.max_drawdown,
            aborted,
            "Simulation finished"
        );

        Ok(RunResult {
            symbol: symbol.to_string(),
            strategy: strategy.name().to_string(),
            bars_processed,
            aborted,
            trades,
            capital_curve: ledger.capital_curve().to_vec(),
            events,
            stats,
            final_capital: ledger.capital(),
            open_position: ledger.position().cloned(),
            last_close,
        })
    }

    /// Fill one intent and apply it, or reject it without touching the ledger.
    fn resolve_intent(
        &mut self,
        intent: &OrderIntent,
        bar: &Bar,
        indicators: &IndicatorState,
        ledger: &mut Ledger,
        trades: &mut Vec<Trade>,
    ) -> Result<OrderResolution, InvariantViolation> {
        let trade = self
            .fill_model
            .execute(intent, bar, indicators, ledger.symbol())?;

        if let Some(reason) = ledger.admit(&trade) {
            warn!(
                order_id = %intent.order_id,
                direction = %intent.direction,
                price = %trade.price,
                %reason,
                "Order rejected"
            );
            return Ok(OrderResolution::rejected(intent, reason));
        }

        let effect = ledger.apply_fill(&trade)?;
        self.risk.on_fill(&trade);
        debug!(
            order_id = %trade.order_id,
            direction = %trade.direction,
            price = %trade.price,
            quantity = %trade.quantity,
            commission = %trade.commission,
            capital = %effect.capital_after,
            timestamp = %trade.timestamp,
            "Order filled"
        );

        trades.push(trade.clone());
        Ok(OrderResolution::filled(trade))
    }
}

/// Rebuild the capital curve from the trade log and compare with the ledger's.
fn verify_replay(ledger: &Ledger, trades: &[Trade]) -> Result<(), InvariantViolation> {
    let replayed = Ledger::replay(ledger.initial_capital(), trades)?;
    let live = ledger.capital_curve();

    for (index, (expected, actual)) in live.iter().zip(replayed.iter()).enumerate() {
        if expected.capital != actual.capital {
            return Err(InvariantViolation::LedgerReplayMismatch {
                index,
                expected: expected.capital,
                replayed: actual.capital,
            });
        }
    }
    if live.len() != replayed.len() {
        let index = live.len().min(replayed.len());
        return Err(InvariantViolation::LedgerReplayMismatch {
            index,
            expected: live.last().map(|p| p.capital).unwrap_or(ledger.initial_capital()),
            replayed: replayed
                .last()
                .map(|p| p.capital)
                .unwrap_or(ledger.initial_capital()),
        });
    }
    Ok(())
}
