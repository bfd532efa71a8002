//! Report output port trait.

use crate::domain::error::RulebtError;
use crate::domain::report::BacktestReport;

pub trait ReportPort {
    fn write(&self, report: &BacktestReport) -> Result<(), RulebtError>;
}
