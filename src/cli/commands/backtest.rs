//! Backtest command implementation.

use anyhow::{Context, Result};
use barsim_config::{load_strategy_params, AppConfig};
use barsim_core::{Direction, Strategy, Trade, TradeSink};
use barsim_data::CsvTradeSink;
use barsim_engine::{RunResult, SimulationEngine, StopHandle};
use barsim_risk::historical_var;
use barsim_strategies::StrategyRegistry;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use tracing::{info, warn};

use crate::cli::{BacktestArgs, OutputFormat};

const VAR_CONFIDENCE: f64 = 0.95;

pub async fn run(args: BacktestArgs, config: AppConfig) -> Result<()> {
    let series = super::load_series(&args.data, &config).await?;

    let mut engine_config = config.engine_config();
    if let Some(capital) = args.capital {
        engine_config.initial_capital = capital;
    }
    if let Some(rate) = args.commission_rate {
        engine_config.commission_rate = rate;
    }

    let name = args
        .strategy
        .clone()
        .unwrap_or_else(|| config.strategy.name.clone());
    let mut strategy = create_strategy(&name, args.strategy_config.as_deref(), &config)?;
    info!(strategy = %name, symbol = %series.symbol, "Starting backtest");

    let stop = StopHandle::new();
    let interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping simulation");
            interrupt.stop();
        }
    });

    let result = tokio::task::spawn_blocking(move || {
        let mut engine = SimulationEngine::new(engine_config).with_stop_handle(stop);
        engine.run(&series, strategy.as_mut())
    })
    .await
    .context("Simulation task failed")??;

    match args.output {
        OutputFormat::Json => println!("{}", result.to_json()?),
        OutputFormat::Text => {
            print!("{}", result.summary());
            let returns = round_trip_returns(&result.trades);
            if let Some(var) = historical_var(&returns, VAR_CONFIDENCE) {
                println!(
                    "  Historical VaR ({:.0}%): {:.4}% per round trip over {} trades",
                    VAR_CONFIDENCE * 100.0,
                    var * 100.0,
                    returns.len()
                );
            }
        }
    }

    if let Some(save_path) = &args.save {
        std::fs::write(save_path, result.to_json()?)
            .with_context(|| format!("Failed to write {}", save_path.display()))?;
        info!(path = %save_path.display(), "Results saved");
    }

    if let Some(dir) = &args.trades_csv {
        save_trades(dir, &result)?;
    }

    Ok(())
}

/// Build the named strategy from a parameter file, the config file or defaults.
fn create_strategy(
    name: &str,
    params_path: Option<&Path>,
    config: &AppConfig,
) -> Result<Box<dyn Strategy>> {
    let registry = StrategyRegistry::new();
    let params = match params_path {
        Some(path) => load_strategy_params(path)?,
        None if name == "ma_rsi" => serde_json::to_value(config.strategy.ma_rsi())?,
        None => registry
            .get(name)
            .map(|info| info.default_config.clone())
            .unwrap_or_default(),
    };
    registry
        .create(name, params)
        .with_context(|| format!("Failed to create strategy '{}'", name))
}

/// Net return of each completed buy/sell pair, as a fraction of the cash paid.
fn round_trip_returns(trades: &[Trade]) -> Vec<f64> {
    let mut returns = Vec::new();
    let mut entry = None;
    for trade in trades {
        match trade.direction {
            Direction::Long => entry = Some(trade.net_cash_flow()),
            Direction::Short => {
                if let Some(paid) = entry.take() {
                    let cost = -paid;
                    if cost.is_zero() {
                        continue;
                    }
                    if let Some(r) = ((trade.net_cash_flow() - cost) / cost).to_f64() {
                        returns.push(r);
                    }
                }
            }
        }
    }
    returns
}

fn save_trades(dir: &Path, result: &RunResult) -> Result<()> {
    let mut sink = CsvTradeSink::new(dir);
    sink.accept(&result.symbol, &result.trades, &result.capital_curve)
        .with_context(|| format!("Failed to write trade log to {}", dir.display()))?;
    Ok(())
}
