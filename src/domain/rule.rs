//! Rule AST data structures.
//!
//! Two levels, enforced by the type system: [`Operand`] is the numeric
//! layer (constants, series references, indicators) and [`Rule`] is the
//! boolean layer (comparisons combined with AND/OR). A rule root is
//! therefore always boolean-producing, and operands can only appear under
//! a comparison.

use crate::domain::bar::SeriesField;
use crate::domain::indicator::IndicatorSpec;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Constant(f64),
    /// A named series, `lookback` bars before the current one (0 = current).
    Series {
        field: SeriesField,
        lookback: usize,
    },
    Indicator(IndicatorSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
    Eq,
    Ne,
    CrossesAbove,
    CrossesBelow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    And(Box<Rule>, Box<Rule>),
    Or(Box<Rule>, Box<Rule>),
}

/// A parsed strategy: one entry rule, one exit rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub entry: Rule,
    pub exit: Rule,
}

impl Rule {
    fn collect_indicators(&self, out: &mut Vec<IndicatorSpec>) {
        match self {
            Rule::Compare { left, right, .. } => {
                for operand in [left, right] {
                    if let Operand::Indicator(spec) = operand {
                        if !out.contains(spec) {
                            out.push(*spec);
                        }
                    }
                }
            }
            Rule::And(left, right) | Rule::Or(left, right) => {
                left.collect_indicators(out);
                right.collect_indicators(out);
            }
        }
    }
}

/// Every distinct indicator referenced by either rule of a strategy.
pub fn extract_indicators(strategy: &Strategy) -> Vec<IndicatorSpec> {
    let mut specs = Vec::new();
    strategy.entry.collect_indicators(&mut specs);
    strategy.exit.collect_indicators(&mut specs);
    specs
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::CrossesAbove => "CROSSES_ABOVE",
            CompareOp::CrossesBelow => "CROSSES_BELOW",
        };
        write!(f, "{}", symbol)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Series { field, lookback: 0 } => write!(f, "{}", field),
            Operand::Series { field, lookback } => write!(f, "{}[-{}]", field, lookback),
            Operand::Indicator(spec) => write!(f, "{}", spec),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Compare { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Rule::And(left, right) => write!(f, "({}) AND ({})", left, right),
            Rule::Or(left, right) => write!(f, "({}) OR ({})", left, right),
        }
    }
}
