//! Parameter sweep command implementation.

use anyhow::{Context, Result};
use barsim_config::AppConfig;
use barsim_engine::{sweep, SweepGrid, SweepOutcome};
use std::cmp::Ordering;
use tracing::info;

use crate::cli::{OutputFormat, SweepArgs};

pub async fn run(args: SweepArgs, config: AppConfig) -> Result<()> {
    let series = super::load_series(&args.data, &config).await?;
    let grid = SweepGrid {
        fast_windows: args.fast.clone(),
        slow_windows: args.slow.clone(),
        rsi_windows: args.rsi.clone(),
    };
    let base = config.strategy.ma_rsi();
    let engine_config = config.engine_config();

    let outcomes = tokio::task::spawn_blocking(move || sweep(&series, &grid, &base, &engine_config))
        .await
        .context("Sweep task failed")?;
    info!(combinations = outcomes.len(), "Sweep finished");

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Text => print_table(&outcomes, args.top),
    }
    Ok(())
}

/// Successful outcomes ordered by total return, best first.
fn ranked(outcomes: &[SweepOutcome]) -> Vec<&SweepOutcome> {
    let mut ranked: Vec<&SweepOutcome> = outcomes.iter().filter(|o| o.stats.is_some()).collect();
    ranked.sort_by(|a, b| match (&a.stats, &b.stats) {
        (Some(a), Some(b)) => b.total_return.cmp(&a.total_return),
        _ => Ordering::Equal,
    });
    ranked
}

fn print_table(outcomes: &[SweepOutcome], top: usize) {
    println!("Parameter Sweep");
    println!("═══════════════════════════════════════════════════════════");
    println!(
        "  {:>4} {:>4} {:>4}  {:>12} {:>12} {:>8} {:>7}",
        "fast", "slow", "rsi", "return %", "drawdown %", "win %", "trades"
    );
    println!("  ───────────────────────────────────────────────────────");

    for outcome in ranked(outcomes).into_iter().take(top) {
        let Some(stats) = &outcome.stats else {
            continue;
        };
        println!(
            "  {:>4} {:>4} {:>4}  {:>12.4} {:>12.4} {:>8.2} {:>7}",
            outcome.config.fast_window,
            outcome.config.slow_window,
            outcome.config.rsi_window,
            stats.total_return,
            stats.max_drawdown,
            stats.win_rate,
            stats.trade_count
        );
    }

    for outcome in outcomes.iter().filter(|o| o.error.is_some()) {
        println!(
            "  {}/{}/{} failed: {}",
            outcome.config.fast_window,
            outcome.config.slow_window,
            outcome.config.rsi_window,
            outcome.error.as_deref().unwrap_or_default()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use barsim_engine::Stats;
    use barsim_strategies::MaRsiConfig;
    use rust_decimal_macros::dec;

    fn outcome(fast_window: usize, total_return: Option<rust_decimal::Decimal>) -> SweepOutcome {
        SweepOutcome {
            config: MaRsiConfig {
                fast_window,
                ..Default::default()
            },
            stats: total_return.map(|r| Stats {
                total_return: r,
                ..Stats::empty(dec!(1000))
            }),
            error: total_return.is_none().then(|| "failed".to_string()),
        }
    }

    #[test]
    fn test_ranked_best_first_without_failures() {
        let outcomes = vec![
            outcome(2, Some(dec!(1.5))),
            outcome(3, None),
            outcome(4, Some(dec!(4.0))),
        ];
        let ranked = ranked(&outcomes);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].config.fast_window, 4);
        assert_eq!(ranked[1].config.fast_window, 2);
    }
}
