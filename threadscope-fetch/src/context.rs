//! Fetch context providing access to the platform client.
//!
//! The fetch context is passed to all strategies and to the thread
//! reconstructor. It bundles the injected client, the settings, and the
//! global concurrency cap shared by every upstream call made through it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::debug;

use threadscope_core::PostId;

use crate::client::{PlatformClient, PostObject, RawProtocolResponse};
use crate::error::{FetchError, TransportError};
use crate::retry::RetryPolicy;

// ============================================================================
// Fetch Settings
// ============================================================================

/// Settings for fetch operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSettings {
    /// Maximum replies fetched per node.
    pub reply_limit: usize,
    /// Result limit for the identifier-scoped search.
    pub search_limit: usize,
    /// Sibling subtrees expanded concurrently per node.
    pub reply_fan_out: usize,
    /// Upstream calls allowed in flight at once, across the whole context.
    pub max_concurrent_requests: usize,
    /// Depth used when the caller does not pass one.
    pub default_max_depth: u32,
    /// Timeout for a single upstream request.
    pub timeout: Duration,
    /// Transport-level retry policy.
    pub retry: RetryPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            reply_limit: 20,
            search_limit: 1,
            reply_fan_out: 20,
            max_concurrent_requests: 4,
            default_max_depth: 3,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl FetchSettings {
    /// Sets the per-node reply limit.
    pub fn with_reply_limit(mut self, limit: usize) -> Self {
        self.reply_limit = limit;
        self
    }

    /// Sets the sibling fan-out.
    pub fn with_reply_fan_out(mut self, fan_out: usize) -> Self {
        self.reply_fan_out = fan_out;
        self
    }

    /// Sets the global concurrency cap.
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max;
        self
    }

    /// Sets the default thread depth.
    pub fn with_default_max_depth(mut self, depth: u32) -> Self {
        self.default_max_depth = depth;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Checks that every limit is at least one.
    pub fn validate(&self) -> Result<(), FetchError> {
        let limits = [
            ("reply_limit", self.reply_limit),
            ("search_limit", self.search_limit),
            ("reply_fan_out", self.reply_fan_out),
            ("max_concurrent_requests", self.max_concurrent_requests),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(FetchError::InvalidSettings(format!(
                "{name} must be at least 1"
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(FetchError::InvalidSettings(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Fetch Context
// ============================================================================

/// Context provided to fetch strategies, giving access to the platform.
///
/// Every upstream call goes through the permit-gated wrappers below, so the
/// number of requests in flight never exceeds `max_concurrent_requests`,
/// however the calls are spread over strategies and subtrees. A permit is
/// held only for the duration of one client call.
pub struct FetchContext {
    /// The injected platform client.
    pub client: Arc<dyn PlatformClient>,
    /// Fetch settings.
    pub settings: FetchSettings,
    limiter: Arc<Semaphore>,
}

impl FetchContext {
    /// Creates a new fetch context with default settings.
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self::builder(client).build()
    }

    /// Replaces the settings, resizing the concurrency cap.
    pub fn with_settings(self, settings: FetchSettings) -> Self {
        Self::builder(self.client).settings(settings).build()
    }

    /// Creates a builder for customizing the context.
    pub fn builder(client: Arc<dyn PlatformClient>) -> FetchContextBuilder {
        FetchContextBuilder::new(client)
    }

    /// Returns the request timeout.
    pub fn timeout(&self) -> Duration {
        self.settings.timeout
    }

    /// Returns the number of free request permits.
    pub fn available_permits(&self) -> usize {
        self.limiter.available_permits()
    }

    /// Detail fetch under a concurrency permit.
    pub async fn fetch_post_by_id(&self, id: &PostId) -> Result<Option<PostObject>, TransportError> {
        let _permit = self.limiter.acquire().await.ok();
        debug!(client = self.client.name(), post_id = %id, "fetch_post_by_id");
        self.client.fetch_post_by_id(id).await
    }

    /// Search under a concurrency permit.
    pub async fn search_posts(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError> {
        let _permit = self.limiter.acquire().await.ok();
        debug!(client = self.client.name(), query, limit, "search_posts");
        self.client.search_posts(query, limit).await
    }

    /// Reply fetch under a concurrency permit.
    pub async fn fetch_replies_by_id(
        &self,
        id: &PostId,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError> {
        let _permit = self.limiter.acquire().await.ok();
        debug!(client = self.client.name(), post_id = %id, limit, "fetch_replies_by_id");
        self.client.fetch_replies_by_id(id, limit).await
    }

    /// Raw protocol fetch under a concurrency permit.
    pub async fn fetch_raw_protocol_response(
        &self,
        id: &PostId,
    ) -> Result<RawProtocolResponse, TransportError> {
        let _permit = self.limiter.acquire().await.ok();
        debug!(client = self.client.name(), post_id = %id, "fetch_raw_protocol_response");
        self.client.fetch_raw_protocol_response(id).await
    }
}

impl std::fmt::Debug for FetchContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchContext")
            .field("client", &self.client.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Fetch Context Builder
// ============================================================================

/// Builder for constructing a `FetchContext`.
pub struct FetchContextBuilder {
    client: Arc<dyn PlatformClient>,
    settings: FetchSettings,
}

impl FetchContextBuilder {
    /// Creates a new builder around a client.
    pub fn new(client: Arc<dyn PlatformClient>) -> Self {
        Self {
            client,
            settings: FetchSettings::default(),
        }
    }

    /// Sets the fetch settings.
    pub fn settings(mut self, settings: FetchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the per-node reply limit.
    pub fn reply_limit(mut self, limit: usize) -> Self {
        self.settings.reply_limit = limit;
        self
    }

    /// Sets the sibling fan-out.
    pub fn reply_fan_out(mut self, fan_out: usize) -> Self {
        self.settings.reply_fan_out = fan_out;
        self
    }

    /// Sets the global concurrency cap.
    pub fn max_concurrent_requests(mut self, max: usize) -> Self {
        self.settings.max_concurrent_requests = max;
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Builds the fetch context.
    pub fn build(self) -> FetchContext {
        // A zero cap would park every call forever.
        let permits = self.settings.max_concurrent_requests.max(1);
        FetchContext {
            client: self.client,
            settings: self.settings,
            limiter: Arc::new(Semaphore::new(permits)),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryClient;

    fn client() -> Arc<dyn PlatformClient> {
        Arc::new(MemoryClient::new())
    }

    #[test]
    fn test_default_settings() {
        let settings = FetchSettings::default();
        assert_eq!(settings.reply_limit, 20);
        assert_eq!(settings.search_limit, 1);
        assert_eq!(settings.reply_fan_out, 20);
        assert_eq!(settings.max_concurrent_requests, 4);
        assert_eq!(settings.default_max_depth, 3);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let err = FetchSettings::default()
            .with_reply_fan_out(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("reply_fan_out"));

        let settings = FetchSettings::default().with_retry(RetryPolicy::new(0));
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_context_builder() {
        let ctx = FetchContext::builder(client())
            .reply_limit(5)
            .max_concurrent_requests(2)
            .timeout(Duration::from_secs(60))
            .build();

        assert_eq!(ctx.settings.reply_limit, 5);
        assert_eq!(ctx.available_permits(), 2);
        assert_eq!(ctx.timeout(), Duration::from_secs(60));
    }

    #[test]
    fn test_with_settings_resizes_cap() {
        let ctx = FetchContext::new(client())
            .with_settings(FetchSettings::default().with_max_concurrent_requests(7));
        assert_eq!(ctx.available_permits(), 7);
    }

    #[tokio::test]
    async fn test_permit_released_after_call() {
        let ctx = FetchContext::builder(client())
            .max_concurrent_requests(1)
            .build();
        let id = PostId::from(1);

        assert!(ctx.fetch_post_by_id(&id).await.unwrap().is_none());
        assert!(ctx.fetch_replies_by_id(&id, 5).await.unwrap().is_empty());
        assert_eq!(ctx.available_permits(), 1);
    }
}
