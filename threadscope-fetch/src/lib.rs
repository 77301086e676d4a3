// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # `ThreadScope` Fetch
//!
//! Retrieval infrastructure for the `ThreadScope` extractor.
//!
//! ## Platform Client
//!
//! The upstream platform is consumed through one injected capability,
//! [`client::PlatformClient`], exposing four operations: detail fetch,
//! search, reply fetch, and raw protocol fetch. The core holds no global
//! state; the caller owns the client and passes it in through a
//! [`context::FetchContext`].
//!
//! ## Host Transports
//!
//! - [`host::bridge`] - HTTP client for a JSON bridge in front of the platform
//! - [`host::fixture`] - Replays captured payloads from a directory
//! - [`host::memory`] - In-memory scripted client
//!
//! ## Strategy Chain
//!
//! - [`strategy::FetchStrategy`] - One named way of retrieving a post
//! - [`pipeline::FetchPipeline`] - Tries strategies in priority order
//! - [`context::FetchContext`] - Client, settings, and the concurrency cap
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use threadscope_fetch::{BridgeClient, FetchContext, FetchPipeline};
//!
//! let client = BridgeClient::new("http://localhost:8080/api")?;
//! let ctx = FetchContext::new(Arc::new(client));
//!
//! let pipeline = FetchPipeline::with_strategies(vec![
//!     Box::new(DetailStrategy::new()),
//!     Box::new(SearchStrategy::new()),
//! ]);
//!
//! let outcome = pipeline.execute(&ctx, &post_id).await;
//! ```

// Core modules
pub mod client;
pub mod context;
pub mod error;
pub mod host;
pub mod pipeline;
pub mod retry;
pub mod strategy;

// Re-export key types at crate root

// Errors
pub use error::{FetchError, TransportError};

// Platform client
pub use client::{
    PlatformClient, PostObject, PostUser, RawProtocolResponse, count_from_json, decode_post_list,
    parse_timestamp,
};

// Host transports
pub use host::{
    bridge::BridgeClient,
    fixture::FixtureClient,
    memory::{MemoryClient, MemoryFailure, Operation},
};

// Strategy & Pipeline
pub use context::{FetchContext, FetchContextBuilder, FetchSettings};
pub use pipeline::{FetchAttempt, FetchOutcome, FetchPipeline};
pub use retry::RetryPolicy;
pub use strategy::{FetchResult, FetchStrategy, StrategyInfo, StrategyKind};
