//! In-memory scripted platform client.
//!
//! Responses and failures are registered up front; every call is recorded
//! so callers can assert which upstream operations ran. An optional latency
//! makes concurrent calls overlap, and the peak number of calls in flight is
//! tracked.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use threadscope_core::PostId;

use crate::client::{PlatformClient, PostObject, RawProtocolResponse};
use crate::error::TransportError;

// ============================================================================
// Operation & Failure
// ============================================================================

/// One of the four upstream operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `fetch_post_by_id`
    Detail,
    /// `search_posts`
    Search,
    /// `fetch_replies_by_id`
    Replies,
    /// `fetch_raw_protocol_response`
    Raw,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Detail => "detail",
            Self::Search => "search",
            Self::Replies => "replies",
            Self::Raw => "raw",
        };
        f.write_str(name)
    }
}

/// A scripted failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryFailure {
    /// Rate limited.
    RateLimited,
    /// Generic transport failure with a message.
    Unavailable(String),
    /// Unexpected HTTP status.
    Status(u16),
    /// Request timed out.
    Timeout,
}

impl MemoryFailure {
    fn to_error(&self) -> TransportError {
        match self {
            Self::RateLimited => TransportError::RateLimited { retry_after: None },
            Self::Unavailable(msg) => TransportError::Unavailable(msg.clone()),
            Self::Status(status) => TransportError::Status {
                status: *status,
                message: "scripted failure".to_string(),
            },
            Self::Timeout => TransportError::Timeout(Duration::from_secs(1)),
        }
    }
}

// ============================================================================
// Memory Client
// ============================================================================

/// Platform client serving registered responses from memory.
///
/// Searches answer only registered queries; unknown queries return an empty
/// list. Raw fetches of unknown ids answer 404.
#[derive(Debug, Default)]
pub struct MemoryClient {
    posts: HashMap<String, PostObject>,
    searches: HashMap<String, Vec<PostObject>>,
    replies: HashMap<String, Vec<PostObject>>,
    raw: HashMap<String, RawProtocolResponse>,
    failures: HashMap<(Operation, String), MemoryFailure>,
    latency: Option<Duration>,
    calls: Mutex<Vec<(Operation, String)>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MemoryClient {
    /// Creates an empty client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a post for detail fetches, keyed by its id.
    pub fn with_post(mut self, post: PostObject) -> Self {
        if let Some(id) = post.id.clone() {
            self.posts.insert(id.as_str().to_string(), post);
        }
        self
    }

    /// Registers a post for detail fetches and for the `id:<id>` search.
    pub fn with_searchable_post(self, post: PostObject) -> Self {
        match post.id.clone() {
            Some(id) => self
                .with_search(format!("id:{id}"), vec![post.clone()])
                .with_post(post),
            None => self,
        }
    }

    /// Registers the results of a search query.
    pub fn with_search(mut self, query: impl Into<String>, results: Vec<PostObject>) -> Self {
        self.searches.insert(query.into(), results);
        self
    }

    /// Registers the direct replies of a post, in upstream order.
    pub fn with_replies(mut self, parent: impl Into<PostId>, replies: Vec<PostObject>) -> Self {
        self.replies
            .insert(parent.into().as_str().to_string(), replies);
        self
    }

    /// Registers a raw protocol response.
    pub fn with_raw(mut self, id: impl Into<PostId>, response: RawProtocolResponse) -> Self {
        self.raw.insert(id.into().as_str().to_string(), response);
        self
    }

    /// Makes one operation fail for one key (post id, or query for searches).
    pub fn with_failure(
        mut self,
        operation: Operation,
        key: impl Into<String>,
        failure: MemoryFailure,
    ) -> Self {
        self.failures.insert((operation, key.into()), failure);
        self
    }

    /// Delays every call, so concurrent calls overlap.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Returns every recorded call, in order.
    pub fn calls(&self) -> Vec<(Operation, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Counts recorded calls of one operation.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }

    /// Returns the highest number of calls that were in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Records the call, waits out the latency, and returns the scripted
    /// failure for it, if any.
    async fn enter(&self, operation: Operation, key: &str) -> Result<(), TransportError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((operation, key.to_string()));

        let _guard = InFlight::enter(self);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.failures.get(&(operation, key.to_string())) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

/// Decrements the in-flight count on drop, including on cancellation.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(client: &'a MemoryClient) -> Self {
        let now = client.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        client.peak_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(&client.in_flight)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlatformClient for MemoryClient {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_post_by_id(&self, id: &PostId) -> Result<Option<PostObject>, TransportError> {
        self.enter(Operation::Detail, id.as_str()).await?;
        Ok(self.posts.get(id.as_str()).cloned())
    }

    async fn search_posts(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError> {
        self.enter(Operation::Search, query).await?;
        Ok(self
            .searches
            .get(query)
            .map(|posts| posts.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_replies_by_id(
        &self,
        id: &PostId,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError> {
        self.enter(Operation::Replies, id.as_str()).await?;
        Ok(self
            .replies
            .get(id.as_str())
            .map(|posts| posts.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn fetch_raw_protocol_response(
        &self,
        id: &PostId,
    ) -> Result<RawProtocolResponse, TransportError> {
        self.enter(Operation::Raw, id.as_str()).await?;
        Ok(self
            .raw
            .get(id.as_str())
            .cloned()
            .unwrap_or(RawProtocolResponse {
                status: 404,
                body: Value::Null,
            }))
    }
}

// ============================================================================
// Tests
// ============================================================================
