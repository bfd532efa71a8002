//! Rule evaluation engine.
//!
//! Evaluates rules against OHLCV data and pre-computed indicator values.
//!
//! # Evaluation Semantics
//!
//! - Comparison rules: evaluate both operands at the given bar index
//! - `==`/`!=`: compared within an epsilon of 1e-9
//! - `CROSSES_ABOVE`/`CROSSES_BELOW`: require `index >= 1`, `false` at index 0
//! - `AND` short-circuits on `false`, `OR` on `true`
//! - An operand without enough history makes its comparison `false` for
//!   that bar ([`InsufficientHistory`] is consumed here, never propagated)

use crate::domain::bar::Bar;
use crate::domain::error::InsufficientHistory;
use crate::domain::indicator::{IndicatorSeries, IndicatorSpec};
use crate::domain::rule::{CompareOp, Operand, Rule};
use std::collections::HashMap;

const EPSILON: f64 = 1e-9;

pub fn evaluate(
    rule: &Rule,
    bars: &[Bar],
    indicators: &HashMap<IndicatorSpec, IndicatorSeries>,
    bar_index: usize,
) -> bool {
    match rule {
        Rule::Compare { op, left, right } => match op {
            CompareOp::CrossesAbove | CompareOp::CrossesBelow => {
                if bar_index == 0 {
                    return false;
                }
                let resolved = (
                    resolve_operand(left, bars, indicators, bar_index - 1),
                    resolve_operand(right, bars, indicators, bar_index - 1),
                    resolve_operand(left, bars, indicators, bar_index),
                    resolve_operand(right, bars, indicators, bar_index),
                );
                let (Ok(left_prev), Ok(right_prev), Ok(left_curr), Ok(right_curr)) = resolved
                else {
                    return false;
                };

                match op {
                    CompareOp::CrossesAbove => {
                        left_prev <= right_prev && left_curr > right_curr
                    }
                    _ => left_prev >= right_prev && left_curr < right_curr,
                }
            }
            _ => {
                let left_val = resolve_operand(left, bars, indicators, bar_index);
                let right_val = resolve_operand(right, bars, indicators, bar_index);
                let (Ok(left_val), Ok(right_val)) = (left_val, right_val) else {
                    return false;
                };
                match op {
                    CompareOp::Gt => left_val > right_val,
                    CompareOp::Ge => left_val >= right_val,
                    CompareOp::Lt => left_val < right_val,
                    CompareOp::Le => left_val <= right_val,
                    CompareOp::Eq => (left_val - right_val).abs() < EPSILON,
                    CompareOp::Ne => (left_val - right_val).abs() >= EPSILON,
                    // Handled by the crossing arm above.
                    CompareOp::CrossesAbove | CompareOp::CrossesBelow => false,
                }
            }
        },
        Rule::And(left, right) => {
            evaluate(left, bars, indicators, bar_index)
                && evaluate(right, bars, indicators, bar_index)
        }
        Rule::Or(left, right) => {
            evaluate(left, bars, indicators, bar_index)
                || evaluate(right, bars, indicators, bar_index)
        }
    }
}

fn resolve_operand(
    operand: &Operand,
    bars: &[Bar],
    indicators: &HashMap<IndicatorSpec, IndicatorSeries>,
    bar_index: usize,
) -> Result<f64, InsufficientHistory> {
    match operand {
        Operand::Constant(v) => Ok(*v),
        Operand::Series { field, lookback } => {
            if *lookback > bar_index {
                return Err(InsufficientHistory);
            }
            Ok(field.of(&bars[bar_index - lookback]))
        }
        Operand::Indicator(spec) => indicators
            .get(spec)
            .and_then(|series| series.values.get(bar_index).copied().flatten())
            .ok_or(InsufficientHistory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bar::SeriesField;
    use crate::domain::indicator::{compute_all, IndicatorKind};
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close - 1.0,
                high: close + 1.0,
                low: close - 2.0,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn close() -> Operand {
        Operand::Series {
            field: SeriesField::Close,
            lookback: 0,
        }
    }

    fn constant(v: f64) -> Operand {
        Operand::Constant(v)
    }

    fn cmp(op: CompareOp, left: Operand, right: Operand) -> Rule {
        Rule::Compare { op, left, right }
    }

    fn no_indicators() -> HashMap<IndicatorSpec, IndicatorSeries> {
        HashMap::new()
    }

    #[test]
    fn compare_numeric_ops() {
        let bars = make_bars(&[105.0]);
        let ind = no_indicators();

        assert!(evaluate(&cmp(CompareOp::Gt, close(), constant(100.0)), &bars, &ind, 0));
        assert!(!evaluate(&cmp(CompareOp::Gt, close(), constant(105.0)), &bars, &ind, 0));
        assert!(evaluate(&cmp(CompareOp::Ge, close(), constant(105.0)), &bars, &ind, 0));
        assert!(evaluate(&cmp(CompareOp::Lt, close(), constant(110.0)), &bars, &ind, 0));
        assert!(evaluate(&cmp(CompareOp::Le, close(), constant(105.0)), &bars, &ind, 0));
        assert!(evaluate(&cmp(CompareOp::Eq, close(), constant(105.0)), &bars, &ind, 0));
        assert!(evaluate(&cmp(CompareOp::Ne, close(), constant(104.0)), &bars, &ind, 0));
    }

    #[test]
    fn equality_uses_epsilon() {
        let bars = make_bars(&[100.0]);
        let ind = no_indicators();
        assert!(evaluate(
            &cmp(CompareOp::Eq, close(), constant(100.0 + 1e-12)),
            &bars,
            &ind,
            0
        ));
        assert!(!evaluate(
            &cmp(CompareOp::Eq, close(), constant(100.01)),
            &bars,
            &ind,
            0
        ));
    }

    #[test]
    fn series_lookback_reads_earlier_bar() {
        let bars = make_bars(&[90.0, 110.0]);
        let rule = cmp(
            CompareOp::Gt,
            close(),
            Operand::Series {
                field: SeriesField::Close,
                lookback: 1,
            },
        );
        let ind = no_indicators();
        // Bar 0 has no prior bar: the comparison is false.
        assert!(!evaluate(&rule, &bars, &ind, 0));
        assert!(evaluate(&rule, &bars, &ind, 1));
    }

    #[test]
    fn other_fields_resolve() {
        let bars = make_bars(&[100.0]);
        let ind = no_indicators();
        let high = Operand::Series {
            field: SeriesField::High,
            lookback: 0,
        };
        let low = Operand::Series {
            field: SeriesField::Low,
            lookback: 0,
        };
        assert!(evaluate(&cmp(CompareOp::Gt, high, low), &bars, &ind, 0));
        let volume = Operand::Series {
            field: SeriesField::Volume,
            lookback: 0,
        };
        assert!(evaluate(&cmp(CompareOp::Eq, volume, constant(1000.0)), &bars, &ind, 0));
    }

    #[test]
    fn crosses_above_edge_exact() {
        // left=[1,1,3] vs right=2: false at 0 (no prior bar),
        // false at 1 (below on both bars), true at 2.
        let bars = make_bars(&[1.0, 1.0, 3.0]);
        let rule = cmp(CompareOp::CrossesAbove, close(), constant(2.0));
        let ind = no_indicators();
        assert!(!evaluate(&rule, &bars, &ind, 0));
        assert!(!evaluate(&rule, &bars, &ind, 1));
        assert!(evaluate(&rule, &bars, &ind, 2));
    }

    #[test]
    fn crosses_above_requires_prior_at_or_below() {
        // Already above on both bars: no cross.
        let bars = make_bars(&[3.0, 4.0]);
        let rule = cmp(CompareOp::CrossesAbove, close(), constant(2.0));
        assert!(!evaluate(&rule, &bars, &no_indicators(), 1));
    }

    #[test]
    fn crosses_above_from_equality() {
        // Touching then exceeding counts as a cross.
        let bars = make_bars(&[2.0, 3.0]);
        let rule = cmp(CompareOp::CrossesAbove, close(), constant(2.0));
        assert!(evaluate(&rule, &bars, &no_indicators(), 1));
    }

    #[test]
    fn crosses_below_mirrors() {
        let bars = make_bars(&[3.0, 3.0, 1.0]);
        let rule = cmp(CompareOp::CrossesBelow, close(), constant(2.0));
        let ind = no_indicators();
        assert!(!evaluate(&rule, &bars, &ind, 0));
        assert!(!evaluate(&rule, &bars, &ind, 1));
        assert!(evaluate(&rule, &bars, &ind, 2));
    }

    #[test]
    fn and_or_combinations() {
        let bars = make_bars(&[105.0]);
        let ind = no_indicators();
        let t = cmp(CompareOp::Gt, close(), constant(100.0));
        let f = cmp(CompareOp::Gt, close(), constant(200.0));

        assert!(evaluate(&Rule::And(Box::new(t.clone()), Box::new(t.clone())), &bars, &ind, 0));
        assert!(!evaluate(&Rule::And(Box::new(t.clone()), Box::new(f.clone())), &bars, &ind, 0));
        assert!(evaluate(&Rule::Or(Box::new(f.clone()), Box::new(t.clone())), &bars, &ind, 0));
        assert!(!evaluate(&Rule::Or(Box::new(f.clone()), Box::new(f)), &bars, &ind, 0));
    }

    #[test]
    fn warmup_comparison_is_false_but_or_still_works() {
        // One arm needs history it does not have; the other is decisive.
        let bars = make_bars(&[105.0]);
        let ind = no_indicators();
        let warmup = cmp(
            CompareOp::Gt,
            Operand::Series {
                field: SeriesField::Close,
                lookback: 5,
            },
            constant(0.0),
        );
        let t = cmp(CompareOp::Gt, close(), constant(100.0));

        assert!(!evaluate(&warmup, &bars, &ind, 0));
        assert!(evaluate(&Rule::Or(Box::new(warmup.clone()), Box::new(t)), &bars, &ind, 0));
        assert!(!evaluate(
            &Rule::And(Box::new(warmup), Box::new(cmp(CompareOp::Gt, close(), constant(0.0)))),
            &bars,
            &ind,
            0
        ));
    }

    #[test]
    fn indicator_resolution_through_map() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let spec = IndicatorSpec {
            kind: IndicatorKind::Sma,
            source: SeriesField::Close,
            period: 2,
        };
        let indicators = compute_all(&bars, &[spec]);
        let rule = cmp(CompareOp::Gt, close(), Operand::Indicator(spec));

        // Warm-up bar: indicator undefined, comparison false.
        assert!(!evaluate(&rule, &bars, &indicators, 0));
        // close 2.0 > sma 1.5, close 4.0 > sma 3.5
        assert!(evaluate(&rule, &bars, &indicators, 1));
        assert!(evaluate(&rule, &bars, &indicators, 3));
    }

    #[test]
    fn sma_cross_golden_cross() {
        // Fast SMA crosses above slow SMA when the price jumps.
        let bars = make_bars(&[10.0, 10.0, 10.0, 10.0, 30.0]);
        let fast = IndicatorSpec {
            kind: IndicatorKind::Sma,
            source: SeriesField::Close,
            period: 2,
        };
        let slow = IndicatorSpec {
            kind: IndicatorKind::Sma,
            source: SeriesField::Close,
            period: 4,
        };
        let indicators = compute_all(&bars, &[fast, slow]);
        let rule = cmp(
            CompareOp::CrossesAbove,
            Operand::Indicator(fast),
            Operand::Indicator(slow),
        );

        assert!(!evaluate(&rule, &bars, &indicators, 3));
        assert!(evaluate(&rule, &bars, &indicators, 4));
    }

    #[test]
    fn cross_with_unwarmed_previous_bar_is_false() {
        // At index 3 the slow SMA(4) is defined, but not at index 2, so a
        // cross cannot be established yet.
        let bars = make_bars(&[10.0, 10.0, 10.0, 30.0]);
        let slow = IndicatorSpec {
            kind: IndicatorKind::Sma,
            source: SeriesField::Close,
            period: 4,
        };
        let indicators = compute_all(&bars, &[slow]);
        let rule = cmp(CompareOp::CrossesAbove, close(), Operand::Indicator(slow));
        assert!(!evaluate(&rule, &bars, &indicators, 3));
    }

    #[test]
    fn missing_indicator_series_is_false() {
        let bars = make_bars(&[100.0]);
        let spec = IndicatorSpec {
            kind: IndicatorKind::Rsi,
            source: SeriesField::Close,
            period: 14,
        };
        let rule = cmp(CompareOp::Gt, Operand::Indicator(spec), constant(50.0));
        assert!(!evaluate(&rule, &bars, &no_indicators(), 0));
    }
}
