//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvFileAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::error::RulebtError;
use crate::domain::report::BacktestReport;
use crate::domain::rule_parser;
use crate::domain::signal::generate_signals;
use crate::domain::simulator::{run_simulation, DEFAULT_INITIAL_CAPITAL};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "rulebt", about = "Rule-language strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        strategy: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Parse a strategy file and show the resulting rules
    Validate {
        #[arg(short, long)]
        strategy: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            strategy,
            output,
        } => run_backtest(&config, &strategy, output),
        Command::Validate { strategy } => run_validate(&strategy),
    }
}

/// Settings resolved from the backtest config file.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestSettings {
    pub data_file: PathBuf,
    pub initial_capital: f64,
}

pub fn build_settings(config: &dyn ConfigPort) -> Result<BacktestSettings, RulebtError> {
    let data_file = config
        .get_string("data", "file")
        .ok_or_else(|| RulebtError::ConfigMissing {
            section: "data".into(),
            key: "file".into(),
        })?;

    let initial_capital =
        config.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL);
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(RulebtError::ConfigInvalid {
            section: "backtest".into(),
            key: "initial_capital".into(),
            reason: format!("must be a positive number, got {}", initial_capital),
        });
    }

    Ok(BacktestSettings {
        data_file: PathBuf::from(data_file),
        initial_capital,
    })
}

fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = RulebtError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn load_strategy(path: &PathBuf) -> Result<crate::domain::rule::Strategy, ExitCode> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            let err = RulebtError::Io(e);
            eprintln!("error: {err}");
            return Err(ExitCode::from(&err));
        }
    };

    match rule_parser::parse(text.trim()) {
        Ok(strategy) => Ok(strategy),
        Err(e) => {
            eprintln!("{}", e.display_with_context(text.trim()));
            let err = RulebtError::RuleParse(e);
            eprintln!("error: {err}");
            Err(ExitCode::from(&err))
        }
    }
}

fn run_backtest(config_path: &PathBuf, strategy_path: &PathBuf, output: Option<PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let settings = match build_settings(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!("Loading strategy from {}", strategy_path.display());
    let strategy = match load_strategy(strategy_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let data_port = CsvFileAdapter::new(settings.data_file.clone());
    let bars = match data_port.load_bars() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loaded {} bars from {}", bars.len(), settings.data_file.display());

    let signals = generate_signals(&strategy, &bars);
    let result = match run_simulation(&bars, &signals, settings.initial_capital) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let report = BacktestReport::from_simulation(result, settings.initial_capital);
    let report_port = TextReportAdapter::new(output);
    if let Err(e) = report_port.write(&report) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    ExitCode::SUCCESS
}

fn run_validate(strategy_path: &PathBuf) -> ExitCode {
    let strategy = match load_strategy(strategy_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    println!("entry: {}", strategy.entry);
    println!("exit:  {}", strategy.exit);
    ExitCode::SUCCESS
}
