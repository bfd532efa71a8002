//! Plain-text report adapter.

use crate::domain::error::RulebtError;
use crate::domain::report::BacktestReport;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Renders a backtest report as text, to stdout or to a file.
pub struct TextReportAdapter {
    output: Option<PathBuf>,
}

impl TextReportAdapter {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }

    pub fn render(report: &BacktestReport) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Total Return: {:.1}%", report.total_return_pct);
        let _ = writeln!(out, "Max Drawdown: {:.1}%", report.max_drawdown_pct);
        let _ = writeln!(out, "Trades: {}", report.trade_count);
        let _ = writeln!(out);
        let _ = writeln!(out, "Entry/Exit Log:");
        for entry in &report.log {
            let _ = writeln!(out, "- {}", entry);
        }
        out
    }
}

impl ReportPort for TextReportAdapter {
    fn write(&self, report: &BacktestReport) -> Result<(), RulebtError> {
        let rendered = Self::render(report);
        match &self.output {
            Some(path) => fs::write(path, rendered)?,
            None => print!("{}", rendered),
        }
        Ok(())
    }
}
