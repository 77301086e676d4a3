//! The post extractor facade.
//!
//! [`PostExtractor`] bundles a fetch context with the strategy pipeline and
//! exposes the four operations callers use. Every operation returns a typed
//! outcome; only [`PostExtractor::require_post`] turns a failure into an
//! error, for callers that want `?`.

use std::sync::Arc;

use threadscope_core::{CanonicalPost, Diagnosis, ExtractionOutcome, PostId, ThreadResult};
use threadscope_fetch::{FetchContext, FetchError, FetchPipeline, PlatformClient, StrategyInfo};
use tracing::{info, instrument, warn};

use crate::diagnose::diagnose;
use crate::strategies::default_pipeline;
use crate::thread::{reconstruct_thread, search_threads};

/// Extracts posts and threads through an injected platform client.
pub struct PostExtractor {
    ctx: FetchContext,
    pipeline: FetchPipeline,
}

impl PostExtractor {
    /// Creates an extractor with default settings and the default pipeline.
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self::with_context(FetchContext::new(client))
    }

    /// Creates an extractor around an existing context.
    pub fn with_context(ctx: FetchContext) -> Self {
        Self::with_pipeline(ctx, default_pipeline())
    }

    /// Creates an extractor with a custom pipeline.
    pub fn with_pipeline(ctx: FetchContext, pipeline: FetchPipeline) -> Self {
        Self { ctx, pipeline }
    }

    /// Returns the fetch context.
    pub fn context(&self) -> &FetchContext {
        &self.ctx
    }

    /// Returns the strategies in execution order.
    pub fn strategies(&self) -> Vec<StrategyInfo> {
        self.pipeline.strategy_info()
    }

    /// Retrieves one post through the strategy chain.
    ///
    /// On exhaustion the post is diagnosed. A diagnosis that finds the post
    /// reachable does not turn the failure into a success.
    #[instrument(skip(self, post_id), fields(post_id = %post_id))]
    pub async fn extract_post(&self, post_id: &PostId) -> ExtractionOutcome {
        let outcome = self.pipeline.execute(&self.ctx, post_id).await;
        let rate_limited = outcome.hit_rate_limit();

        match outcome.result {
            Ok(result) => {
                info!(
                    strategy = %result.strategy_id,
                    attempts = outcome.attempts.len(),
                    "Post extracted"
                );
                ExtractionOutcome::Success {
                    post: result.post,
                    strategy: result.strategy_id,
                }
            }
            Err(error) => {
                warn!(
                    error = %error,
                    attempts = outcome.attempts.len(),
                    rate_limited,
                    "Extraction failed"
                );
                ExtractionOutcome::Failure(diagnose(&self.ctx, post_id).await)
            }
        }
    }

    /// Like [`extract_post`](Self::extract_post), but fails with
    /// [`FetchError::NotFound`].
    pub async fn require_post(&self, post_id: &PostId) -> Result<CanonicalPost, FetchError> {
        self.extract_post(post_id)
            .await
            .into_result()
            .map(|(post, _)| post)
            .map_err(|diagnosis| FetchError::NotFound {
                diagnosis: Box::new(diagnosis),
            })
    }

    /// Explains why a post cannot be retrieved.
    pub async fn diagnose(&self, post_id: &PostId) -> Diagnosis {
        diagnose(&self.ctx, post_id).await
    }

    /// Rebuilds the reply tree under a post, down to `max_depth`.
    pub async fn reconstruct_thread(&self, root_id: &PostId, max_depth: u32) -> ThreadResult {
        reconstruct_thread(&self.pipeline, &self.ctx, root_id, max_depth).await
    }

    /// Searches and rebuilds a thread for every hit that has replies.
    pub async fn search_threads(
        &self,
        query: &str,
        limit: usize,
        max_depth: u32,
    ) -> Vec<ThreadResult> {
        search_threads(&self.ctx, query, limit, max_depth).await
    }
}

impl std::fmt::Debug for PostExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostExtractor")
            .field("ctx", &self.ctx)
            .field("strategies", &self.pipeline.len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
