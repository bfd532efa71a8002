//! Signal generation.
//!
//! Walks the entry and exit rules across the whole bar sequence, producing
//! one boolean per bar per rule. Pure: identical inputs always yield
//! identical signal series.

use crate::domain::bar::Bar;
use crate::domain::indicator::compute_all;
use crate::domain::rule::{extract_indicators, Strategy};
use crate::domain::rule_eval::evaluate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSeries {
    pub entry: Vec<bool>,
    pub exit: Vec<bool>,
}

pub fn generate_signals(strategy: &Strategy, bars: &[Bar]) -> SignalSeries {
    let specs = extract_indicators(strategy);
    let indicators = compute_all(bars, &specs);

    let mut entry = Vec::with_capacity(bars.len());
    let mut exit = Vec::with_capacity(bars.len());
    for i in 0..bars.len() {
        entry.push(evaluate(&strategy.entry, bars, &indicators, i));
        exit.push(evaluate(&strategy.exit, bars, &indicators, i));
    }

    SignalSeries { entry, exit }
}
