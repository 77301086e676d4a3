//! Search-threads command - rebuild threads for search hits with replies.

use anyhow::{Result, bail};
use clap::Args;
use threadscope_extract::thread::SEARCH_THREAD_DEPTH;
use tracing::info;

use crate::output::{JsonFormatter, SearchThreadsOutput};
use crate::{Cli, ExitCode, upstream};

/// Arguments for the search-threads command.
#[derive(Args)]
pub struct SearchArgs {
    /// Search query, passed to the platform unchanged.
    pub query: String,

    /// Maximum search hits considered.
    #[arg(long, short, default_value = "10")]
    pub limit: usize,

    /// Maximum reply depth below each hit.
    #[arg(long, short, default_value_t = SEARCH_THREAD_DEPTH)]
    pub depth: u32,
}

/// Runs the search-threads command. No hits is not an error.
pub async fn run(args: &SearchArgs, cli: &Cli) -> Result<ExitCode> {
    if args.query.trim().is_empty() {
        bail!(threadscope_core::CoreError::InvalidData(
            "search query must not be empty".to_string()
        ));
    }
    let extractor = upstream::connect(cli, upstream::settings(cli))?;

    info!(query = %args.query, limit = args.limit, "Searching threads");
    let threads = extractor
        .search_threads(&args.query, args.limit, args.depth)
        .await;

    let output = SearchThreadsOutput {
        query: args.query.clone(),
        max_depth: args.depth,
        threads,
    };
    println!("{}", JsonFormatter::new(cli.pretty).format(&output)?);

    Ok(ExitCode::Success)
}
