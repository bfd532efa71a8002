use clap::Parser;
use rulebt::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
