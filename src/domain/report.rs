//! Backtest result summary.

use crate::domain::simulator::{SimulationResult, Trade};

/// Everything the reporting boundary needs from a run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub trade_count: usize,
    pub trades: Vec<Trade>,
    pub log: Vec<String>,
}

impl BacktestReport {
    pub fn from_simulation(result: SimulationResult, initial_capital: f64) -> Self {
        let final_equity = result
            .equity_curve
            .last()
            .copied()
            .unwrap_or(initial_capital);
        let total_return_pct = if initial_capital > 0.0 {
            (final_equity / initial_capital - 1.0) * 100.0
        } else {
            0.0
        };

        BacktestReport {
            total_return_pct,
            max_drawdown_pct: result.max_drawdown * 100.0,
            trade_count: result.trades.len(),
            trades: result.trades,
            log: result.log,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn empty_result(equity_curve: Vec<f64>, max_drawdown: f64) -> SimulationResult {
        SimulationResult {
            trades: vec![],
            equity_curve,
            max_drawdown,
            log: vec![],
        }
    }

    #[test]
    fn total_return_from_final_equity() {
        let report = BacktestReport::from_simulation(empty_result(vec![100.0, 110.0], 0.0), 100.0);
        assert_relative_eq!(report.total_return_pct, 10.0);
        assert_eq!(report.trade_count, 0);
    }

    #[test]
    fn negative_return() {
        let report = BacktestReport::from_simulation(empty_result(vec![100.0, 80.0], 0.2), 100.0);
        assert_relative_eq!(report.total_return_pct, -20.0);
        assert_relative_eq!(report.max_drawdown_pct, 20.0);
    }

    #[test]
    fn trade_count_matches_trades() {
        let trade = Trade {
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            entry_price: 50.0,
            exit_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            exit_price: 55.0,
            pnl: 5.0,
            return_pct: 10.0,
        };
        let result = SimulationResult {
            trades: vec![trade.clone()],
            equity_curve: vec![100.0, 110.0],
            max_drawdown: 0.0,
            log: vec!["Enter: 2024-01-01 at 50".into()],
        };
        let report = BacktestReport::from_simulation(result, 100.0);
        assert_eq!(report.trade_count, 1);
        assert_eq!(report.trades, vec![trade]);
        assert_eq!(report.log.len(), 1);
    }
}
