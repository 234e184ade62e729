//! Cash and position bookkeeping for a single instrument.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Direction, Trade};
use crate::error::InvariantViolation;

/// An open long position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Symbol
    pub symbol: String,
    /// Units held, always positive while the position exists
    pub quantity: Decimal,
    /// Price of the last opening fill
    pub cost_basis: Decimal,
    /// When the position was opened
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Mark-to-market P&L at `price`, before closing commission.
    pub fn unrealized_pnl(&self, price: Decimal) -> Decimal {
        (price - self.cost_basis) * self.quantity
    }
}

/// Capital after a trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapitalPoint {
    pub timestamp: DateTime<Utc>,
    pub capital: Decimal,
}

/// Read-only snapshot of the ledger handed to strategies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    /// Cash balance
    pub capital: Decimal,
    /// Open position, if any
    pub position: Option<Position>,
}

impl LedgerState {
    /// Check if there is no open position.
    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Units currently held (zero when flat).
    pub fn position_quantity(&self) -> Decimal {
        self.position
            .as_ref()
            .map(|p| p.quantity)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Effect of applying one trade.
#[derive(Debug, Clone, PartialEq)]
pub struct FillEffect {
    /// Cash balance after the trade
    pub capital_after: Decimal,
    /// Realized profit for closing trades: `(price - cost_basis) * quantity`
    pub realized_pnl: Option<Decimal>,
}

/// Running cash balance, open position and cost basis.
///
/// `apply_fill` is the only mutator. Every trade appends one point to the
/// capital curve, so the curve can always be rebuilt from the trade log.
#[derive(Debug, Clone)]
pub struct Ledger {
    symbol: String,
    initial_capital: Decimal,
    capital: Decimal,
    position: Option<Position>,
    realized_pnl: Decimal,
    curve: Vec<CapitalPoint>,
}

impl Ledger {
    /// Create a flat ledger holding `initial_capital` in cash.
    pub fn new(symbol: impl Into<String>, initial_capital: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            initial_capital,
            capital: initial_capital,
            position: None,
            realized_pnl: Decimal::ZERO,
            curve: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    /// Current cash balance.
    pub fn capital(&self) -> Decimal {
        self.capital
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Sum of realized profit over all closed positions, excluding commission.
    pub fn realized_pnl(&self) -> Decimal {
        self.realized_pnl
    }

    /// Capital after each applied trade, in order.
    pub fn capital_curve(&self) -> &[CapitalPoint] {
        &self.curve
    }

    /// Snapshot for read-only consumers.
    pub fn state(&self) -> LedgerState {
        LedgerState {
            capital: self.capital,
            position: self.position.clone(),
        }
    }

    /// Check whether `trade` could be applied, without touching the ledger.
    ///
    /// Returns the reason the trade must be rejected, if any.
    pub fn admit(&self, trade: &Trade) -> Option<String> {
        match (trade.direction, &self.position) {
            (Direction::Long, Some(_)) => {
                Some(format!("position in {} already open", self.symbol))
            }
            (Direction::Long, None) => {
                let required = trade.value() + trade.commission;
                (required > self.capital).then(|| {
                    format!(
                        "insufficient capital: required {}, available {}",
                        required, self.capital
                    )
                })
            }
            (Direction::Short, None) => Some(format!("no open position in {}", self.symbol)),
            (Direction::Short, Some(position)) => (trade.quantity != position.quantity)
                .then(|| {
                    format!(
                        "close quantity {} does not match open quantity {}",
                        trade.quantity, position.quantity
                    )
                }),
        }
    }

    /// Apply an executed trade to cash and position.
    ///
    /// Opening: `capital -= price*quantity + commission`, cost basis = price.
    /// Closing: `capital += price*quantity - commission`, position cleared.
    pub fn apply_fill(&mut self, trade: &Trade) -> Result<FillEffect, InvariantViolation> {
        if trade.quantity <= Decimal::ZERO {
            return Err(InvariantViolation::NonPositiveQuantity {
                quantity: trade.quantity,
            });
        }

        let realized_pnl = match trade.direction {
            Direction::Long => {
                if self.position.is_some() {
                    return Err(InvariantViolation::PositionAlreadyOpen {
                        symbol: self.symbol.clone(),
                    });
                }
                self.position = Some(Position {
                    symbol: self.symbol.clone(),
                    quantity: trade.quantity,
                    cost_basis: trade.price,
                    opened_at: trade.timestamp,
                });
                None
            }
            Direction::Short => {
                let position = self.position.take().ok_or_else(|| {
                    InvariantViolation::ClosingWithoutPosition {
                        symbol: self.symbol.clone(),
                    }
                })?;
                if position.quantity != trade.quantity {
                    let open = position.quantity;
                    self.position = Some(position);
                    return Err(InvariantViolation::QuantityMismatch {
                        requested: trade.quantity,
                        open,
                    });
                }
                let pnl = (trade.price - position.cost_basis) * trade.quantity;
                self.realized_pnl += pnl;
                Some(pnl)
            }
        };

        self.capital += trade.net_cash_flow();
        self.curve.push(CapitalPoint {
            timestamp: trade.timestamp,
            capital: self.capital,
        });

        Ok(FillEffect {
            capital_after: self.capital,
            realized_pnl,
        })
    }

    /// Rebuild the capital curve by replaying `trades` against `initial_capital`.
    pub fn replay(
        initial_capital: Decimal,
        trades: &[Trade],
    ) -> Result<Vec<CapitalPoint>, InvariantViolation> {
        let symbol = trades.first().map(|t| t.symbol.as_str()).unwrap_or_default();
        let mut ledger = Ledger::new(symbol, initial_capital);
        for trade in trades {
            ledger.apply_fill(trade)?;
        }
        Ok(ledger.curve)
    }
}
