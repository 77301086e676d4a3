//! The strategy chain.
//!
//! A [`FetchPipeline`] holds the retrieval strategies for one post and runs
//! them highest priority first until one produces a post. A failing
//! strategy never aborts the chain: its error is recorded and the next
//! strategy starts at once, with no waiting in between. Transport-level
//! retries happen inside the client, not here.

use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use threadscope_core::PostId;

use crate::context::FetchContext;
use crate::error::FetchError;
use crate::strategy::{FetchResult, FetchStrategy, StrategyInfo, StrategyKind};

// ============================================================================
// Attempts
// ============================================================================

/// What happened when one strategy ran.
#[derive(Debug, Clone)]
pub struct FetchAttempt {
    /// Strategy that ran.
    pub strategy_id: String,
    /// Retrieval path it used.
    pub kind: StrategyKind,
    /// Time spent in the strategy.
    pub elapsed: Duration,
    /// Rendered error, absent when the strategy produced a post.
    pub failure: Option<String>,
    /// True when the failure was a rate limit.
    pub rate_limited: bool,
}

impl FetchAttempt {
    fn record(
        strategy: &dyn FetchStrategy,
        elapsed: Duration,
        result: &Result<FetchResult, FetchError>,
    ) -> Self {
        let (failure, rate_limited) = match result {
            Ok(_) => (None, false),
            Err(error) => (Some(error.to_string()), error.is_rate_limited()),
        };
        Self {
            strategy_id: strategy.id().to_string(),
            kind: strategy.kind(),
            elapsed,
            failure,
            rate_limited,
        }
    }

    /// Returns true if this attempt produced the post.
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

/// Result of running the chain once, with every attempt in execution order.
#[derive(Debug)]
pub struct FetchOutcome {
    /// The winning result, or why the chain produced nothing.
    pub result: Result<FetchResult, FetchError>,
    /// One record per strategy that ran.
    pub attempts: Vec<FetchAttempt>,
    /// Wall time for the whole chain.
    pub elapsed: Duration,
}

impl FetchOutcome {
    /// Returns true if some strategy produced the post.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Id of the strategy that produced the post.
    pub fn winner(&self) -> Option<&str> {
        self.result.as_ref().ok().map(|r| r.strategy_id.as_str())
    }

    /// Failed attempts as `(strategy, error)` pairs.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attempts.iter().filter_map(|attempt| {
            attempt
                .failure
                .as_deref()
                .map(|failure| (attempt.strategy_id.as_str(), failure))
        })
    }

    /// Returns true if any strategy was turned away by a rate limit.
    pub fn hit_rate_limit(&self) -> bool {
        self.attempts.iter().any(|attempt| attempt.rate_limited)
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Ordered retrieval strategies for a post.
///
/// Ordering is by descending priority; equal priorities keep insertion
/// order.
pub struct FetchPipeline {
    strategies: Vec<Box<dyn FetchStrategy>>,
}

impl FetchPipeline {
    /// Creates an empty pipeline. Running it yields [`FetchError::NoStrategies`].
    pub fn new() -> Self {
        Self::with_strategies(Vec::new())
    }

    /// Creates a pipeline from strategies in any order.
    pub fn with_strategies(mut strategies: Vec<Box<dyn FetchStrategy>>) -> Self {
        // `sort_by_key` is stable, so ties keep insertion order.
        strategies.sort_by_key(|s| std::cmp::Reverse(s.priority()));
        Self { strategies }
    }

    /// Inserts a strategy after every strategy of equal or higher priority.
    pub fn add_strategy(&mut self, strategy: Box<dyn FetchStrategy>) {
        let priority = strategy.priority();
        let at = self
            .strategies
            .iter()
            .position(|s| s.priority() < priority)
            .unwrap_or(self.strategies.len());
        self.strategies.insert(at, strategy);
    }

    /// Number of strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Returns true if no strategy is registered.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Strategy descriptions in execution order.
    pub fn strategy_info(&self) -> Vec<StrategyInfo> {
        self.strategies
            .iter()
            .map(|s| StrategyInfo::from_strategy(s.as_ref()))
            .collect()
    }

    /// Runs the chain for one post.
    #[instrument(skip(self, ctx, post_id), fields(post_id = %post_id, strategies = self.strategies.len()))]
    pub async fn execute(&self, ctx: &FetchContext, post_id: &PostId) -> FetchOutcome {
        let started = Instant::now();
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            debug!(strategy = strategy.id(), kind = %strategy.kind(), "Trying strategy");

            let attempt_started = Instant::now();
            let result = strategy.fetch(ctx, post_id).await;
            let attempt = FetchAttempt::record(strategy.as_ref(), attempt_started.elapsed(), &result);

            match result {
                Ok(found) => {
                    info!(strategy = %found.strategy_id, duration = ?attempt.elapsed, "Post retrieved");
                    attempts.push(attempt);
                    return FetchOutcome {
                        result: Ok(found),
                        attempts,
                        elapsed: started.elapsed(),
                    };
                }
                Err(error) => {
                    warn!(
                        strategy = strategy.id(),
                        error = %error,
                        duration = ?attempt.elapsed,
                        "Strategy failed, falling through"
                    );
                    attempts.push(attempt);
                }
            }
        }

        let error = if attempts.is_empty() {
            FetchError::NoStrategies
        } else {
            warn!(tried = attempts.len(), "Strategy chain exhausted");
            FetchError::AllStrategiesFailed
        };
        FetchOutcome {
            result: Err(error),
            attempts,
            elapsed: started.elapsed(),
        }
    }
}

impl Default for FetchPipeline {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::host::memory::MemoryClient;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use threadscope_core::CanonicalPost;

    /// Strategy that either finds the post or fails with a fixed error.
    struct Scripted {
        id: &'static str,
        priority: u32,
        failure: Option<fn() -> FetchError>,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn finds(id: &'static str, priority: u32) -> Self {
            Self {
                id,
                priority,
                failure: None,
                calls: Arc::default(),
            }
        }

        fn fails(id: &'static str, priority: u32, failure: fn() -> FetchError) -> Self {
            Self {
                failure: Some(failure),
                ..Self::finds(id, priority)
            }
        }
    }

    #[async_trait]
    impl FetchStrategy for Scripted {
        fn id(&self) -> &str {
            self.id
        }

        fn kind(&self) -> StrategyKind {
            StrategyKind::Search
        }

        async fn fetch(&self, _ctx: &FetchContext, post_id: &PostId) -> Result<FetchResult, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.failure {
                Some(failure) => Err(failure()),
                None => Ok(FetchResult::new(
                    CanonicalPost::new(post_id.clone()),
                    self.id,
                    StrategyKind::Search,
                )),
            }
        }

        fn priority(&self) -> u32 {
            self.priority
        }
    }

    fn ctx() -> FetchContext {
        FetchContext::new(Arc::new(MemoryClient::new()))
    }

    fn rate_limited() -> FetchError {
        TransportError::RateLimited { retry_after: Some(60) }.into()
    }

    fn no_match() -> FetchError {
        FetchError::no_match("scripted")
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let outcome = FetchPipeline::new().execute(&ctx(), &PostId::from(1)).await;

        assert!(matches!(outcome.result, Err(FetchError::NoStrategies)));
        assert!(outcome.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_every_error_falls_through() {
        let pipeline = FetchPipeline::with_strategies(vec![
            Box::new(Scripted::finds("last", 10)),
            Box::new(Scripted::fails("limited", 90, rate_limited)),
            Box::new(Scripted::fails("missed", 50, no_match)),
        ]);

        let outcome = pipeline.execute(&ctx(), &PostId::from(7)).await;

        assert_eq!(outcome.winner(), Some("last"));
        assert_eq!(outcome.result.as_ref().unwrap().post.id.as_str(), "7");
        let failed: Vec<_> = outcome.failures().map(|(id, _)| id).collect();
        assert_eq!(failed, ["limited", "missed"]);
        assert!(outcome.hit_rate_limit());
        assert!(outcome.attempts[2].succeeded());
    }

    #[tokio::test]
    async fn test_stops_at_first_success() {
        let trailing = Scripted::fails("never", 10, rate_limited);
        let calls = Arc::clone(&trailing.calls);
        let mut pipeline = FetchPipeline::new();
        pipeline.add_strategy(Box::new(trailing));
        pipeline.add_strategy(Box::new(Scripted::finds("first", 200)));

        let outcome = pipeline.execute(&ctx(), &PostId::from(1)).await;

        assert_eq!(outcome.winner(), Some("first"));
        assert_eq!(outcome.attempts.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhaustion_keeps_every_error() {
        let pipeline = FetchPipeline::with_strategies(vec![
            Box::new(Scripted::fails("a", 2, rate_limited)),
            Box::new(Scripted::fails("b", 1, no_match)),
        ]);

        let outcome = pipeline.execute(&ctx(), &PostId::from(1)).await;

        assert!(matches!(outcome.result, Err(FetchError::AllStrategiesFailed)));
        assert_eq!(outcome.failures().count(), 2);
        assert!(outcome.winner().is_none());
    }

    #[test]
    fn test_priority_ties_keep_insertion_order() {
        let mut pipeline = FetchPipeline::with_strategies(vec![
            Box::new(Scripted::finds("low", 10)),
            Box::new(Scripted::finds("tie.first", 50)),
            Box::new(Scripted::finds("tie.second", 50)),
        ]);
        pipeline.add_strategy(Box::new(Scripted::finds("tie.third", 50)));

        let ids: Vec<_> = pipeline.strategy_info().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, ["tie.first", "tie.second", "tie.third", "low"]);
    }
}
