//! Parallel parameter sweeps.

use barsim_core::{BarSeries, SimulationError, StrategyConfig};
use barsim_strategies::{MaRsiConfig, MaRsiStrategy};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::{EngineConfig, SimulationEngine};
use crate::statistics::Stats;

/// Window values to combine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub fast_windows: Vec<usize>,
    pub slow_windows: Vec<usize>,
    pub rsi_windows: Vec<usize>,
}

impl SweepGrid {
    /// Every combination with `fast < slow`, in grid order.
    pub fn combinations(&self, base: &MaRsiConfig) -> Vec<MaRsiConfig> {
        let mut configs = Vec::new();
        for &fast_window in &self.fast_windows {
            for &slow_window in &self.slow_windows {
                if fast_window >= slow_window {
                    continue;
                }
                for &rsi_window in &self.rsi_windows {
                    configs.push(MaRsiConfig {
                        fast_window,
                        slow_window,
                        rsi_window,
                        ..base.clone()
                    });
                }
            }
        }
        configs
    }
}

/// Result of one grid point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepOutcome {
    pub config: MaRsiConfig,
    /// Statistics, or `None` when the run failed
    pub stats: Option<Stats>,
    pub error: Option<String>,
}

/// Run the MA/RSI strategy for every grid point in parallel.
///
/// Each run builds its own engine, ledger, indicator window and strategy.
/// Outcomes are returned in grid order.
pub fn sweep(
    series: &BarSeries,
    grid: &SweepGrid,
    base: &MaRsiConfig,
    engine_config: &EngineConfig,
) -> Vec<SweepOutcome> {
    let configs = grid.combinations(base);
    info!(
        symbol = %series.symbol,
        combinations = configs.len(),
        "Starting parameter sweep"
    );

    configs
        .into_par_iter()
        .map(|config| {
            let outcome = config
                .validate()
                .map_err(SimulationError::from)
                .and_then(|_| {
                    let mut strategy = MaRsiStrategy::new(config.clone());
                    SimulationEngine::new(engine_config.clone()).run(series, &mut strategy)
                });
            match outcome {
                Ok(result) => SweepOutcome {
                    config,
                    stats: Some(result.stats),
                    error: None,
                },
                Err(e) => SweepOutcome {
                    config,
                    stats: None,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect()
}
