// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! ThreadScope CLI - post and thread extraction from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Extract one post through a bridge
//! threadscope --endpoint http://localhost:8080/api post 1234567890
//!
//! # Post URLs work too
//! threadscope post https://x.com/someone/status/1234567890
//!
//! # Rebuild a reply thread, three levels deep
//! threadscope thread 1234567890 --depth 3 --pretty
//!
//! # Explain why a post cannot be retrieved
//! threadscope diagnose 1234567890
//!
//! # Replay captured payloads instead of calling the bridge
//! threadscope --fixtures ./captures thread 1234567890
//!
//! # Threads for every search hit with replies
//! threadscope search-threads "from:someone" --limit 10
//! ```

mod commands;
mod output;
mod upstream;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use threadscope_core::CoreError;
use threadscope_fetch::{FetchError, TransportError};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{diagnose, post, search, strategies, thread};

// ============================================================================
// CLI Definition
// ============================================================================

/// ThreadScope CLI - resilient post and thread extraction.
#[derive(Parser)]
#[command(name = "threadscope")]
#[command(about = "Resilient post and reply-thread extraction")]
#[command(long_about = r#"
ThreadScope retrieves posts from an unreliable platform API.

Each post is tried through three retrieval paths in order:
  1. Detail fetch   (post.detail)
  2. Search by id   (post.search)
  3. Raw protocol   (post.raw_protocol)

When all three fail, the post is diagnosed and the reasons are reported.

Examples:
  threadscope post 1234567890                 # Extract one post
  threadscope thread 1234567890 --depth 2     # Reply thread
  threadscope diagnose 1234567890             # Why is it missing?
  threadscope --fixtures ./captures post 42   # Offline replay
"#)]
#[command(version)]
#[command(author = "ThreadScope Contributors")]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the platform bridge.
    #[arg(long, short, global = true, env = "THREADSCOPE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Directory of captured payloads to replay instead of a bridge.
    #[arg(
        long,
        global = true,
        env = "THREADSCOPE_FIXTURES",
        conflicts_with = "endpoint"
    )]
    pub fixtures: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, default_value = "30")]
    pub timeout: u64,

    /// Transport attempts per request (1 disables retries).
    #[arg(long, global = true, default_value = "3")]
    pub retries: u32,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Quiet mode (no logging).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Extract a single post.
    #[command(visible_alias = "p")]
    Post(post::PostArgs),

    /// Rebuild the reply thread under a post.
    #[command(visible_alias = "t")]
    Thread(thread::ThreadArgs),

    /// Explain why a post cannot be retrieved.
    #[command(visible_alias = "d")]
    Diagnose(diagnose::DiagnoseArgs),

    /// Search and rebuild a thread for every hit with replies.
    #[command(visible_alias = "s")]
    SearchThreads(search::SearchArgs),

    /// List the retrieval strategies in execution order.
    Strategies,
}

/// CLI exit codes.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The post could not be retrieved.
    NotFound = 2,
    /// Malformed id, URL, flag value or endpoint.
    InvalidInput = 3,
}

impl ExitCode {
    /// Picks the exit code for an error that aborted a command.
    pub fn for_error(error: &anyhow::Error) -> Self {
        if error.downcast_ref::<CoreError>().is_some() {
            return Self::InvalidInput;
        }
        match error.downcast_ref::<FetchError>() {
            Some(FetchError::InvalidSettings(_)) => return Self::InvalidInput,
            Some(FetchError::NotFound { .. }) => return Self::NotFound,
            _ => {}
        }
        match error.downcast_ref::<TransportError>() {
            Some(TransportError::InvalidEndpoint(_)) => Self::InvalidInput,
            _ => Self::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("threadscope=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("threadscope=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Post(args) => post::run(args, &cli).await,
        Commands::Thread(args) => thread::run(args, &cli).await,
        Commands::Diagnose(args) => diagnose::run(args, &cli).await,
        Commands::SearchThreads(args) => search::run(args, &cli).await,
        Commands::Strategies => strategies::run(&cli),
    };

    let code = match result {
        Ok(code) => code,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::for_error(&e)
        }
    };

    if code != ExitCode::Success {
        std::process::exit(code as i32);
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use threadscope_core::PostId;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_endpoint_conflicts_with_fixtures() {
        let parsed = Cli::try_parse_from([
            "threadscope",
            "--endpoint",
            "http://localhost",
            "--fixtures",
            "/tmp",
            "post",
            "1",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_thread_flags_parse() {
        let cli = Cli::try_parse_from([
            "threadscope",
            "thread",
            "42",
            "--depth",
            "0",
            "--concurrency",
            "2",
        ])
        .unwrap();

        match cli.command {
            Commands::Thread(args) => {
                assert_eq!(args.depth, Some(0));
                assert_eq!(args.concurrency, Some(2));
                assert_eq!(args.reply_limit, None);
            }
            _ => panic!("expected thread command"),
        }
    }

    #[test]
    fn test_exit_codes_for_errors() {
        let invalid = anyhow::Error::new(CoreError::InvalidId("abc".into()));
        assert_eq!(ExitCode::for_error(&invalid), ExitCode::InvalidInput);

        let settings = anyhow::Error::new(FetchError::InvalidSettings("reply_limit".into()));
        assert_eq!(ExitCode::for_error(&settings), ExitCode::InvalidInput);

        let missing = anyhow::Error::new(FetchError::NotFound {
            diagnosis: Box::new(threadscope_core::Diagnosis::new(PostId::from(1))),
        });
        assert_eq!(ExitCode::for_error(&missing), ExitCode::NotFound);

        let other = anyhow::anyhow!("connection reset");
        assert_eq!(ExitCode::for_error(&other), ExitCode::Error);
    }
}
