//! Validate configuration command.

use anyhow::Result;
use barsim_config::AppConfig;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, config: &AppConfig) -> Result<()> {
    match config_path {
        Some(path) => println!("Validating configuration: {}", path.display()),
        None => println!("No configuration file given; validating defaults"),
    }

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Symbol: {}", config.backtest.symbol);
    println!("Initial capital: {}", config.backtest.initial_capital);
    println!("Commission rate: {}", config.backtest.commission_rate);
    println!(
        "Strategy: {} (fast {}, slow {}, rsi {})",
        config.strategy.name,
        config.strategy.fast_window,
        config.strategy.slow_window,
        config.strategy.rsi_window
    );
    if config.risk.enabled {
        println!(
            "Risk gate: max {} positions, risk limit {}",
            config.risk.max_positions, config.risk.risk_limit
        );
    } else {
        println!("Risk gate: disabled");
    }

    Ok(())
}
