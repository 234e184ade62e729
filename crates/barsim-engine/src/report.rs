//! Run results and report generation.

use barsim_core::{CapitalPoint, Position, StrategyEvent, Trade};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::statistics::{RunWarning, Stats};

/// Everything a simulation run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub symbol: String,
    /// Name of the strategy that ran
    pub strategy: String,
    /// Bars fed to the indicator window
    pub bars_processed: usize,
    /// True when the run was stopped before the last bar
    pub aborted: bool,
    /// Executed trades in order
    pub trades: Vec<Trade>,
    /// Capital after each trade
    pub capital_curve: Vec<CapitalPoint>,
    /// Audit log of intents and resolutions
    pub events: Vec<StrategyEvent>,
    pub stats: Stats,
    /// Cash at the end of the run
    pub final_capital: Decimal,
    /// Position still open after the last bar, if any
    pub open_position: Option<Position>,
    /// Close of the last processed series bar
    pub last_close: Option<Decimal>,
}

impl RunResult {
    /// Cash plus the open position marked at the last close.
    pub fn equity(&self) -> Decimal {
        let mark = match (&self.open_position, self.last_close) {
            (Some(position), Some(close)) => position.quantity * close,
            _ => Decimal::ZERO,
        };
        self.final_capital + mark
    }

    /// Generate a text summary.
    pub fn summary(&self) -> String {
        let stats = &self.stats;
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════\n");
        s.push_str("                    SIMULATION REPORT                       \n");
        s.push_str("═══════════════════════════════════════════════════════════\n\n");

        s.push_str(&format!("  Symbol:              {}\n", self.symbol));
        s.push_str(&format!("  Strategy:            {}\n", self.strategy));
        if self.aborted {
            s.push_str("  Status:              ABORTED (partial results)\n");
        }
        s.push('\n');

        s.push_str("PERFORMANCE\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!(
            "  Initial Capital:     {:.2}\n",
            stats.initial_capital
        ));
        s.push_str(&format!("  Final Capital:       {:.2}\n", stats.final_capital));
        s.push_str(&format!("  Total Return:        {:.4}%\n", stats.total_return));
        s.push_str(&format!("  Annual Return:       {:.4}%\n", stats.annual_return));
        s.push_str(&format!("  Sharpe Ratio:        {:.2}\n", stats.sharpe_ratio));
        s.push_str(&format!("  Max Drawdown:        {:.4}%\n", stats.max_drawdown));
        s.push('\n');

        s.push_str("TRADE STATISTICS\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Total Trades:        {}\n", stats.trade_count));
        s.push_str(&format!("  Winning Trades:      {}\n", stats.winning_trades));
        s.push_str(&format!("  Losing Trades:       {}\n", stats.losing_trades));
        s.push_str(&format!("  Win Rate:            {:.2}%\n", stats.win_rate));
        if let (Some(first), Some(last)) = (stats.first_trade_at, stats.last_trade_at) {
            s.push_str(&format!(
                "  First Trade:         {}\n",
                first.format("%Y-%m-%d %H:%M:%S")
            ));
            s.push_str(&format!(
                "  Last Trade:          {}\n",
                last.format("%Y-%m-%d %H:%M:%S")
            ));
        }
        s.push_str(&format!("  Trading Days:        {}\n", stats.elapsed_days));
        if stats.warning == Some(RunWarning::EmptyResult) {
            s.push_str("  Note:                no trades; ratios reported as zero\n");
        }
        s.push('\n');

        if let Some(position) = &self.open_position {
            s.push_str("OPEN POSITION\n");
            s.push_str("───────────────────────────────────────────────────────────\n");
            s.push_str(&format!("  Quantity:            {}\n", position.quantity));
            s.push_str(&format!("  Cost Basis:          {:.2}\n", position.cost_basis));
            if let Some(close) = self.last_close {
                s.push_str(&format!(
                    "  Unrealized P&L:      {:.2}\n",
                    position.unrealized_pnl(close)
                ));
            }
            s.push_str(&format!("  Equity:              {:.2}\n", self.equity()));
            s.push('\n');
        }

        s.push_str("EXECUTION\n");
        s.push_str("───────────────────────────────────────────────────────────\n");
        s.push_str(&format!("  Bars Processed:      {}\n", self.bars_processed));
        s.push_str(&format!("  Audit Events:        {}\n", self.events.len()));
        s.push('\n');

        s.push_str("═══════════════════════════════════════════════════════════\n");

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export the capital curve as CSV.
    pub fn capital_curve_to_csv(&self) -> String {
        let mut csv = String::from("timestamp,capital\n");
        for point in &self.capital_curve {
            csv.push_str(&format!("{},{}\n", point.timestamp.to_rfc3339(), point.capital));
        }
        csv
    }
}
