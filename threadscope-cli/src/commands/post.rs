//! Post command - extract a single post.

use anyhow::Result;
use clap::Args;
use threadscope_extract::resolve_post_ref;
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, upstream};

/// Arguments for the post command.
#[derive(Args)]
pub struct PostArgs {
    /// Post id or post URL.
    pub post: String,
}

/// Runs the post command. A post that cannot be retrieved still prints its
/// diagnosis, but exits with [`ExitCode::NotFound`].
pub async fn run(args: &PostArgs, cli: &Cli) -> Result<ExitCode> {
    let post_id = resolve_post_ref(&args.post)?;
    let extractor = upstream::connect(cli, upstream::settings(cli))?;

    info!(post_id = %post_id, "Extracting post");
    let outcome = extractor.extract_post(&post_id).await;

    println!("{}", JsonFormatter::new(cli.pretty).format(&outcome)?);

    Ok(if outcome.is_success() {
        ExitCode::Success
    } else {
        ExitCode::NotFound
    })
}
