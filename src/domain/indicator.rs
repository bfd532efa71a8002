//! Technical indicator computation.
//!
//! Indicators are precomputed once per backtest into an [`IndicatorSeries`]
//! keyed by [`IndicatorSpec`]; rule evaluation then resolves values by
//! index. A `None` slot means the bar is inside the warm-up span.
//!
//! Definitions:
//! - SMA(s, n) at bar i: arithmetic mean of `s` over `[i-n+1, i]`.
//! - RSI(s, n) at bar i: windowed average of the last n bar-to-bar deltas
//!   of `s` ending at i. `RSI = 100 - 100/(1 + avg_gain/avg_loss)`, with
//!   100 when avg_loss is 0 and 50 when the window is flat.

use crate::domain::bar::{Bar, SeriesField};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma,
    Rsi,
}

/// Identity of an indicator instance; serves as the precomputation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndicatorSpec {
    pub kind: IndicatorKind,
    pub source: SeriesField,
    pub period: usize,
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub spec: IndicatorSpec,
    pub values: Vec<Option<f64>>,
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.kind {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Rsi => "RSI",
        };
        write!(f, "{}({},{})", name, self.source, self.period)
    }
}

pub fn compute(bars: &[Bar], spec: IndicatorSpec) -> IndicatorSeries {
    let source: Vec<f64> = bars.iter().map(|b| spec.source.of(b)).collect();
    let values = match spec.kind {
        IndicatorKind::Sma => sma(&source, spec.period),
        IndicatorKind::Rsi => rsi(&source, spec.period),
    };
    IndicatorSeries { spec, values }
}

/// Compute every spec once, deduplicating repeated references.
pub fn compute_all(bars: &[Bar], specs: &[IndicatorSpec]) -> HashMap<IndicatorSpec, IndicatorSeries> {
    let mut out = HashMap::new();
    for &spec in specs {
        out.entry(spec).or_insert_with(|| compute(bars, spec));
    }
    out
}

fn sma(source: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(source.len());
    for i in 0..source.len() {
        if period == 0 || i + 1 < period {
            values.push(None);
        } else {
            let window = &source[i + 1 - period..=i];
            values.push(Some(window.iter().sum::<f64>() / period as f64));
        }
    }
    values
}

fn rsi(source: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut values = Vec::with_capacity(source.len());
    for i in 0..source.len() {
        // The window ends at bar i and spans the deltas of the `period`
        // preceding bar pairs, so the earliest bar touched is i - period.
        if period == 0 || i < period {
            values.push(None);
            continue;
        }

        let mut gain_sum = 0.0;
        let mut loss_sum = 0.0;
        for j in i + 1 - period..=i {
            let delta = source[j] - source[j - 1];
            if delta > 0.0 {
                gain_sum += delta;
            } else {
                loss_sum += -delta;
            }
        }
        let avg_gain = gain_sum / period as f64;
        let avg_loss = loss_sum / period as f64;

        let rsi = if avg_loss == 0.0 {
            if avg_gain > 0.0 { 100.0 } else { 50.0 }
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        values.push(Some(rsi));
    }
    values
}
