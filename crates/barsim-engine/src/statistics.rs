//! Run statistics derived from the trade log.

use barsim_core::{Direction, Trade};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Condition callers must check before trusting the ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunWarning {
    /// The run produced no trades; every ratio is reported as zero.
    EmptyResult,
}

/// Performance statistics of one run.
///
/// All percentages are expressed in percent (`12.5` means 12.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Initial capital
    pub initial_capital: Decimal,
    /// Cash after the last trade
    pub final_capital: Decimal,
    /// `(final - initial) / initial * 100`
    pub total_return: Decimal,
    /// `total_return * 365 / elapsed_days`, zero when no whole day elapsed
    pub annual_return: Decimal,
    /// Always 0.0: no per-period return series is derived from a trade log
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline of capital, in percent
    pub max_drawdown: Decimal,
    /// Winning closes over `trade_count / 2`, in percent
    pub win_rate: Decimal,
    /// Number of trades (opening and closing)
    pub trade_count: usize,
    /// Closing trades priced above their opening price
    pub winning_trades: usize,
    /// Closing trades priced at or below their opening price
    pub losing_trades: usize,
    /// Whole days between the first and last trade
    pub elapsed_days: i64,
    pub first_trade_at: Option<DateTime<Utc>>,
    pub last_trade_at: Option<DateTime<Utc>>,
    /// Set when the ratios are not meaningful
    pub warning: Option<RunWarning>,
}

impl Stats {
    /// Statistics for a run that produced no trades.
    pub fn empty(initial_capital: Decimal) -> Self {
        Self {
            initial_capital,
            final_capital: initial_capital,
            total_return: Decimal::ZERO,
            annual_return: Decimal::ZERO,
            sharpe_ratio: 0.0,
            max_drawdown: Decimal::ZERO,
            win_rate: Decimal::ZERO,
            trade_count: 0,
            winning_trades: 0,
            losing_trades: 0,
            elapsed_days: 0,
            first_trade_at: None,
            last_trade_at: None,
            warning: Some(RunWarning::EmptyResult),
        }
    }

    /// Compute statistics by replaying `trades` against `initial_capital`.
    ///
    /// Capital moves by each trade's net cash flow. A close wins when its
    /// price exceeds the price of the most recent opening trade. The running
    /// peak starts at the initial capital.
    pub fn compute(trades: &[Trade], initial_capital: Decimal) -> Self {
        let (Some(first), Some(last)) = (trades.first(), trades.last()) else {
            return Self::empty(initial_capital);
        };

        let mut capital = initial_capital;
        let mut peak = initial_capital;
        let mut max_drawdown = Decimal::ZERO;
        let mut open_price: Option<Decimal> = None;
        let mut winning_trades = 0;
        let mut losing_trades = 0;

        for trade in trades {
            match trade.direction {
                Direction::Long => open_price = Some(trade.price),
                Direction::Short => {
                    if let Some(open) = open_price {
                        if trade.price > open {
                            winning_trades += 1;
                        } else {
                            losing_trades += 1;
                        }
                    }
                }
            }

            capital += trade.net_cash_flow();
            if peak > Decimal::ZERO {
                let drawdown = (peak - capital) / peak * dec!(100);
                max_drawdown = max_drawdown.max(drawdown);
            }
            peak = peak.max(capital);
        }

        let total_return = if initial_capital > Decimal::ZERO {
            (capital - initial_capital) / initial_capital * dec!(100)
        } else {
            Decimal::ZERO
        };

        let elapsed_days = (last.timestamp - first.timestamp).num_days();
        let annual_return = if elapsed_days > 0 {
            total_return * dec!(365) / Decimal::from(elapsed_days)
        } else {
            Decimal::ZERO
        };

        let pairs = trades.len() / 2;
        let win_rate = if pairs > 0 {
            Decimal::from(winning_trades) / Decimal::from(pairs) * dec!(100)
        } else {
            Decimal::ZERO
        };

        Self {
            initial_capital,
            final_capital: capital,
            total_return,
            annual_return,
            sharpe_ratio: 0.0,
            max_drawdown,
            win_rate,
            trade_count: trades.len(),
            winning_trades,
            losing_trades,
            elapsed_days,
            first_trade_at: Some(first.timestamp),
            last_trade_at: Some(last.timestamp),
            warning: None,
        }
    }

    /// Check whether the ratios were computed from at least one trade.
    pub fn is_defined(&self) -> bool {
        self.warning.is_none()
    }
}
