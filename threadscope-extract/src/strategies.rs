//! Post fetch strategies.
//!
//! This module provides the three retrieval paths, tried in this order:
//!
//! 1. **Detail Strategy** - Direct fetch of the typed post object
//! 2. **Search Strategy** - Search scoped to the post id
//! 3. **Raw Protocol Strategy** - Raw instruction/entry graph

use async_trait::async_trait;
use threadscope_core::PostId;
use threadscope_fetch::{
    FetchContext, FetchError, FetchPipeline, FetchResult, FetchStrategy, StrategyKind,
    TransportError,
};
use tracing::{debug, instrument, warn};

use crate::normalize::{parse_post_object, parse_raw_protocol, parse_search_results};

/// Builds the search query that targets a single post.
pub fn search_query(post_id: &PostId) -> String {
    format!("id:{post_id}")
}

/// Builds a pipeline with all three strategies in their default order.
pub fn default_pipeline() -> FetchPipeline {
    FetchPipeline::with_strategies(vec![
        Box::new(DetailStrategy::new()),
        Box::new(SearchStrategy::new()),
        Box::new(RawProtocolStrategy::new()),
    ])
}

// ============================================================================
// Detail Strategy (Highest Priority)
// ============================================================================

/// Direct detail fetch, parsed with the direct-object parser.
pub struct DetailStrategy;

impl DetailStrategy {
    /// Strategy id.
    pub const ID: &'static str = "post.detail";

    /// Creates a new detail strategy.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DetailStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchStrategy for DetailStrategy {
    fn id(&self) -> &str {
        Self::ID
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Detail
    }

    #[instrument(skip_all, fields(post_id = %post_id))]
    async fn fetch(&self, ctx: &FetchContext, post_id: &PostId) -> Result<FetchResult, FetchError> {
        debug!("Fetching post detail");

        let object = ctx.fetch_post_by_id(post_id).await?;
        let post = object
            .as_ref()
            .and_then(parse_post_object)
            .ok_or_else(|| FetchError::no_match(self.id()))?;

        Ok(FetchResult::new(post, self.id(), self.kind()))
    }
}

// ============================================================================
// Search Strategy (Fallback)
// ============================================================================

/// Identifier-scoped search, parsed with the search-result parser.
pub struct SearchStrategy;

impl SearchStrategy {
    /// Strategy id.
    pub const ID: &'static str = "post.search";

    /// Creates a new search strategy.
    pub fn new() -> Self {
        Self
    }
}

impl Default for SearchStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchStrategy for SearchStrategy {
    fn id(&self) -> &str {
        Self::ID
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::Search
    }

    #[instrument(skip_all, fields(post_id = %post_id))]
    async fn fetch(&self, ctx: &FetchContext, post_id: &PostId) -> Result<FetchResult, FetchError> {
        let query = search_query(post_id);
        debug!(query = %query, "Searching for post");

        let results = ctx.search_posts(&query, ctx.settings.search_limit).await?;
        let post = parse_search_results(&results).ok_or_else(|| FetchError::no_match(self.id()))?;

        Ok(FetchResult::new(post, self.id(), self.kind()))
    }
}

// ============================================================================
// Raw Protocol Strategy (Last Resort)
// ============================================================================

/// Raw protocol fetch, parsed with the raw-protocol parser.
///
/// A non-2xx status fails the strategy before the body is looked at.
pub struct RawProtocolStrategy;

impl RawProtocolStrategy {
    /// Strategy id.
    pub const ID: &'static str = "post.raw_protocol";

    /// Creates a new raw protocol strategy.
    pub fn new() -> Self {
        Self
    }
}

impl Default for RawProtocolStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchStrategy for RawProtocolStrategy {
    fn id(&self) -> &str {
        Self::ID
    }

    fn kind(&self) -> StrategyKind {
        StrategyKind::RawProtocol
    }

    #[instrument(skip_all, fields(post_id = %post_id))]
    async fn fetch(&self, ctx: &FetchContext, post_id: &PostId) -> Result<FetchResult, FetchError> {
        debug!("Fetching raw protocol response");

        let response = ctx.fetch_raw_protocol_response(post_id).await?;
        if !response.is_success() {
            return Err(TransportError::Status {
                status: response.status,
                message: "raw protocol request failed".to_string(),
            }
            .into());
        }

        let post = parse_raw_protocol(&response.body).ok_or_else(|| FetchError::no_match(self.id()))?;
        if post.id != *post_id {
            // The first post entry wins, even when it is an ancestor of the requested post.
            warn!(returned_id = %post.id, "Raw protocol response led with a different post");
        }
        Ok(FetchResult::new(post, self.id(), self.kind()))
    }
}

// ============================================================================
// Tests
// ============================================================================
