//! HTTP client for a JSON bridge in front of the platform.
//!
//! The bridge exposes one route per client operation:
//!
//! | Operation | Route |
//! |-----------|-------|
//! | detail | `GET {base}/posts/{id}` |
//! | search | `GET {base}/search?q={query}&limit={n}` |
//! | replies | `GET {base}/posts/{id}/replies?limit={n}` |
//! | raw protocol | `GET {base}/posts/{id}/raw` |
//!
//! Status mapping: 404 means "nothing" (`None`, empty list, or a 404 raw
//! response), 429 is a rate limit, 401/403 a rejected session. Connection
//! errors, timeouts and 5xx answers are retried per [`RetryPolicy`].

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use threadscope_core::PostId;

use crate::client::{PlatformClient, PostObject, RawProtocolResponse, decode_post_list};
use crate::error::TransportError;
use crate::retry::RetryPolicy;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User agent string for `ThreadScope`.
const USER_AGENT: &str = concat!("ThreadScope/", env!("CARGO_PKG_VERSION"));

/// Longest body excerpt kept in a status error.
const EXCERPT_LEN: usize = 200;

// ============================================================================
// Bridge Client
// ============================================================================

/// Platform client backed by an HTTP JSON bridge.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    inner: Client,
    base: Url,
    retry: RetryPolicy,
}

impl BridgeClient {
    /// Creates a client for the given base URL with default timeout and retry.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_options(
            base_url,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            RetryPolicy::default(),
        )
    }

    /// Creates a client with a custom timeout and retry policy.
    pub fn with_options(
        base_url: &str,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, TransportError> {
        let base =
            Url::parse(base_url).map_err(|e| TransportError::InvalidEndpoint(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(TransportError::InvalidEndpoint(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }

        let inner = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { inner, base, retry })
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Builds `{base}/{segments...}`. Each segment is percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| TransportError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends one GET, mapping rate limits, auth failures and 5xx to errors.
    async fn send_once(&self, url: &Url) -> Result<Response, TransportError> {
        let response = self.inner.get(url.clone()).send().await?;
        let status = response.status();
        debug!(status = %status, "Response received");

        if response.is_rate_limited() {
            return Err(TransportError::RateLimited {
                retry_after: response.retry_after_secs(),
            });
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TransportError::Unauthorized(status.to_string()));
        }
        if status.is_server_error() {
            return Err(status_error(response).await);
        }
        Ok(response)
    }

    /// Sends a GET, retrying transient failures.
    #[instrument(skip(self), fields(url = %url))]
    async fn send(&self, url: &Url) -> Result<Response, TransportError> {
        let mut attempt = 1;
        loop {
            match self.send_once(url).await {
                Err(error) if self.retry.should_retry(attempt, &error) => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    warn!(attempt, delay = ?delay, error = %error, "Retrying bridge request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// GETs a JSON document; `None` on 404.
    async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<Option<T>, TransportError> {
        let response = self.send(url).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let bytes = response.bytes().await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }
}

#[async_trait]
impl PlatformClient for BridgeClient {
    fn name(&self) -> &str {
        "bridge"
    }

    async fn fetch_post_by_id(&self, id: &PostId) -> Result<Option<PostObject>, TransportError> {
        let url = self.endpoint(&["posts", id.as_str()])?;
        self.get_json(&url).await
    }

    async fn search_posts(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("limit", &limit.to_string());
        let mut posts = match self.get_json(&url).await? {
            Some(list) => decode_post_list(list)?,
            None => Vec::new(),
        };
        posts.truncate(limit);
        Ok(posts)
    }

    async fn fetch_replies_by_id(
        &self,
        id: &PostId,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError> {
        let mut url = self.endpoint(&["posts", id.as_str(), "replies"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        let mut replies = match self.get_json(&url).await? {
            Some(list) => decode_post_list(list)?,
            None => Vec::new(),
        };
        replies.truncate(limit);
        Ok(replies)
    }

    async fn fetch_raw_protocol_response(
        &self,
        id: &PostId,
    ) -> Result<RawProtocolResponse, TransportError> {
        let url = self.endpoint(&["posts", id.as_str(), "raw"])?;
        let response = match self.send(&url).await {
            Ok(response) => response,
            // Retries exhausted on a 5xx: report the status, not a transport failure.
            Err(TransportError::Status { status, .. }) => {
                return Ok(RawProtocolResponse {
                    status,
                    body: Value::Null,
                });
            }
            Err(e) => return Err(e),
        };

        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        Ok(RawProtocolResponse { status, body })
    }
}

async fn status_error(response: Response) -> TransportError {
    let status = response.status().as_u16();
    let mut message = response.text().await.unwrap_or_default();
    if message.len() > EXCERPT_LEN {
        let cut = (0..=EXCERPT_LEN)
            .rev()
            .find(|i| message.is_char_boundary(*i))
            .unwrap_or(0);
        message.truncate(cut);
    }
    TransportError::Status { status, message }
}

// ============================================================================
// Response Extensions
// ============================================================================

/// Extension trait for Response handling.
pub trait ResponseExt {
    /// Check if the response indicates rate limiting.
    fn is_rate_limited(&self) -> bool;

    /// Get the Retry-After header value in seconds.
    fn retry_after_secs(&self) -> Option<u64>;
}

impl ResponseExt for Response {
    fn is_rate_limited(&self) -> bool {
        self.status() == StatusCode::TOO_MANY_REQUESTS
    }

    fn retry_after_secs(&self) -> Option<u64> {
        self.headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let client = BridgeClient::new("http://localhost:8080/api/").unwrap();
        let url = client.endpoint(&["posts", "42", "raw"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/posts/42/raw");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = BridgeClient::new("http://localhost:8080").unwrap();
        let url = client.endpoint(&["posts", "../admin"]).unwrap();
        assert_eq!(url.path(), "/posts/..%2Fadmin");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            BridgeClient::new("not a url"),
            Err(TransportError::InvalidEndpoint(_))
        ));
        assert!(matches!(
            BridgeClient::new("mailto:someone@example.com"),
            Err(TransportError::InvalidEndpoint(_))
        ));
    }
}
