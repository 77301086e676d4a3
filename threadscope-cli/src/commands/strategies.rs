//! Strategies command - list retrieval strategies in execution order.

use anyhow::Result;
use threadscope_extract::default_pipeline;

use crate::output::JsonFormatter;
use crate::{Cli, ExitCode};

/// Runs the strategies command. Needs no upstream.
pub fn run(cli: &Cli) -> Result<ExitCode> {
    let strategies = default_pipeline().strategy_info();
    println!("{}", JsonFormatter::new(cli.pretty).format_strategies(&strategies)?);
    Ok(ExitCode::Success)
}
