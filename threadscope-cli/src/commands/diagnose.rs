//! Diagnose command - explain why a post cannot be retrieved.

use anyhow::Result;
use clap::Args;
use threadscope_extract::resolve_post_ref;

use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, upstream};

/// Arguments for the diagnose command.
#[derive(Args)]
pub struct DiagnoseArgs {
    /// Post id or post URL.
    pub post: String,
}

/// Runs the diagnose command. Always exits successfully once probes ran.
pub async fn run(args: &DiagnoseArgs, cli: &Cli) -> Result<ExitCode> {
    let post_id = resolve_post_ref(&args.post)?;
    let extractor = upstream::connect(cli, upstream::settings(cli))?;

    let diagnosis = extractor.diagnose(&post_id).await;
    println!("{}", JsonFormatter::new(cli.pretty).format(&diagnosis)?);

    Ok(ExitCode::Success)
}
