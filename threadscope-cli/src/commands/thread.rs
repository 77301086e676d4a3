//! Thread command - rebuild the reply thread under a post.

use anyhow::Result;
use clap::Args;
use threadscope_extract::resolve_post_ref;
use threadscope_fetch::FetchSettings;
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, ExitCode, upstream};

/// Arguments for the thread command.
#[derive(Args)]
pub struct ThreadArgs {
    /// Post id or post URL of the thread root.
    pub post: String,

    /// Maximum reply depth below the root (0 fetches no replies).
    #[arg(long, short)]
    pub depth: Option<u32>,

    /// Maximum replies fetched per post.
    #[arg(long)]
    pub reply_limit: Option<usize>,

    /// Maximum concurrent upstream requests.
    #[arg(long, short)]
    pub concurrency: Option<usize>,

    /// Maximum sibling subtrees expanded at once.
    #[arg(long)]
    pub fan_out: Option<usize>,
}

impl ThreadArgs {
    /// Layers the command flags over the global settings.
    fn apply(&self, mut settings: FetchSettings) -> FetchSettings {
        if let Some(limit) = self.reply_limit {
            settings = settings.with_reply_limit(limit);
        }
        if let Some(max) = self.concurrency {
            settings = settings.with_max_concurrent_requests(max);
        }
        if let Some(fan_out) = self.fan_out {
            settings = settings.with_reply_fan_out(fan_out);
        }
        if let Some(depth) = self.depth {
            settings = settings.with_default_max_depth(depth);
        }
        settings
    }
}

/// Runs the thread command. An unresolved root prints the result with its
/// diagnosis and exits with [`ExitCode::NotFound`].
pub async fn run(args: &ThreadArgs, cli: &Cli) -> Result<ExitCode> {
    let post_id = resolve_post_ref(&args.post)?;
    let settings = args.apply(upstream::settings(cli));
    let max_depth = settings.default_max_depth;
    let extractor = upstream::connect(cli, settings)?;

    info!(post_id = %post_id, max_depth, "Reconstructing thread");
    let thread = extractor.reconstruct_thread(&post_id, max_depth).await;

    println!("{}", JsonFormatter::new(cli.pretty).format(&thread)?);

    Ok(if thread.is_resolved() {
        ExitCode::Success
    } else {
        ExitCode::NotFound
    })
}
