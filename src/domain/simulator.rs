//! Single-position trade simulator.
//!
//! Consumes the bar sequence plus the entry/exit signal series and runs a
//! two-state machine (Flat / InPosition). Returns compound across trades:
//! each trade's return is applied to the realized equity captured at its
//! entry. The equity curve holds realized values only; unrealized
//! mark-to-market feeds the drawdown tracker alone.
//!
//! Per bar, in order:
//! 1. append the previous equity value (overwritten on exit in the same bar)
//! 2. if in position, mark to market against the drawdown tracker
//! 3. exit on signal (takes priority over entry), else
//! 4. enter on signal when flat, at this bar's close
//!
//! A position still open after the last bar is force-closed at that bar's
//! close, so every simulation ends flat.

use chrono::NaiveDate;

use crate::domain::bar::Bar;
use crate::domain::error::RulebtError;
use crate::domain::signal::SignalSeries;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 100.0;

/// A completed round trip, immutable once recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub pnl: f64,
    pub return_pct: f64,
}

#[derive(Debug, Clone)]
struct OpenPosition {
    entry_date: NaiveDate,
    entry_price: f64,
    /// Realized equity at the moment of entry; the compounding base for
    /// this trade. Captured once, never updated while open.
    base_equity: f64,
}

enum PositionState {
    Flat,
    InPosition(OpenPosition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub trades: Vec<Trade>,
    /// One value per bar plus the leading initial capital.
    pub equity_curve: Vec<f64>,
    /// Largest fractional decline from the running peak, unrealized marks
    /// included.
    pub max_drawdown: f64,
    pub log: Vec<String>,
}

/// Reject inputs the simulator is not defined over.
pub fn validate_inputs(bars: &[Bar], signals: &SignalSeries) -> Result<(), RulebtError> {
    if signals.entry.len() != bars.len() || signals.exit.len() != bars.len() {
        return Err(RulebtError::InvalidInput {
            reason: format!(
                "signal lengths (entry {}, exit {}) do not match bar count {}",
                signals.entry.len(),
                signals.exit.len(),
                bars.len()
            ),
        });
    }

    for (i, bar) in bars.iter().enumerate() {
        let prices = [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ];
        for (name, value) in prices {
            if !value.is_finite() || value <= 0.0 {
                return Err(RulebtError::InvalidInput {
                    reason: format!("bar {} ({}): {} price {} is not positive", i, bar.date, name, value),
                });
            }
        }
    }

    Ok(())
}

pub fn run_simulation(
    bars: &[Bar],
    signals: &SignalSeries,
    initial_capital: f64,
) -> Result<SimulationResult, RulebtError> {
    validate_inputs(bars, signals)?;

    let mut equity_curve = vec![initial_capital];
    let mut running_peak = initial_capital;
    let mut max_drawdown = 0.0_f64;
    let mut trades: Vec<Trade> = Vec::new();
    let mut log: Vec<String> = Vec::new();
    let mut state = PositionState::Flat;

    for (i, bar) in bars.iter().enumerate() {
        let prev_equity = equity_curve[equity_curve.len() - 1];
        equity_curve.push(prev_equity);

        if let PositionState::InPosition(pos) = &state {
            let unrealized_return = (bar.close - pos.entry_price) / pos.entry_price;
            let unrealized_equity = pos.base_equity * (1.0 + unrealized_return);
            running_peak = running_peak.max(unrealized_equity);
            max_drawdown = max_drawdown.max((running_peak - unrealized_equity) / running_peak);
        }

        state = match state {
            PositionState::InPosition(pos) if signals.exit[i] => {
                let (trade, realized) = close_position(pos, bar);
                let last = equity_curve.len() - 1;
                equity_curve[last] = realized;
                running_peak = realized;
                trades.push(trade);
                log.push(format!("Exit: {} at {}", bar.date, bar.close));
                PositionState::Flat
            }
            PositionState::Flat if signals.entry[i] => {
                log.push(format!("Enter: {} at {}", bar.date, bar.close));
                PositionState::InPosition(OpenPosition {
                    entry_date: bar.date,
                    entry_price: bar.close,
                    // The value before this bar's placeholder: the last
                    // realized equity.
                    base_equity: equity_curve[equity_curve.len() - 2],
                })
            }
            unchanged => unchanged,
        };
    }

    if let PositionState::InPosition(pos) = state {
        let bar = &bars[bars.len() - 1];
        let (trade, realized) = close_position(pos, bar);
        let last = equity_curve.len() - 1;
        equity_curve[last] = realized;
        trades.push(trade);
        log.push(format!(
            "Trade closed at end of data: {} at {}",
            bar.date, bar.close
        ));
    }

    Ok(SimulationResult {
        trades,
        equity_curve,
        max_drawdown,
        log,
    })
}

fn close_position(pos: OpenPosition, bar: &Bar) -> (Trade, f64) {
    let pnl = bar.close - pos.entry_price;
    let return_pct = pnl / pos.entry_price * 100.0;
    let realized = pos.base_equity * (1.0 + return_pct / 100.0);
    let trade = Trade {
        entry_date: pos.entry_date,
        entry_price: pos.entry_price,
        exit_date: bar.date,
        exit_price: bar.close,
        pnl,
        return_pct,
    };
    (trade, realized)
}
