//! Platform client capability and its raw response types.
//!
//! The platform exposes the same logical post in three shapes:
//!
//! 1. **Post objects** from the detail and reply endpoints ([`PostObject`])
//! 2. **Search results**, a sequence of the same post objects
//! 3. **Raw protocol responses**, a nested instruction/entry graph
//!    ([`RawProtocolResponse`])
//!
//! Post objects are decoded leniently: ids may be strings or integers,
//! counters may be missing or negative, and an unparseable timestamp or a
//! wrongly typed field is dropped instead of failing the whole object.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use threadscope_core::PostId;

use crate::error::TransportError;

/// Timestamp layout used by the platform's legacy fields,
/// e.g. `Wed Oct 10 20:19:24 +0000 2018`.
const PLATFORM_TIME_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

// ============================================================================
// Platform Client Trait
// ============================================================================

/// The four upstream operations the extractor consumes.
///
/// Implementations own session handling, authentication, and transport-level
/// retry. Every error they return is treated by the extractor as an ordinary
/// "this attempt failed" signal.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Fetches a single post. `Ok(None)` means the platform returned nothing.
    async fn fetch_post_by_id(&self, id: &PostId) -> Result<Option<PostObject>, TransportError>;

    /// Runs a search query, returning at most `limit` posts.
    async fn search_posts(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError>;

    /// Fetches direct replies to a post, at most `limit`, in upstream order.
    async fn fetch_replies_by_id(
        &self,
        id: &PostId,
        limit: usize,
    ) -> Result<Vec<PostObject>, TransportError>;

    /// Fetches the raw protocol payload for a post.
    async fn fetch_raw_protocol_response(
        &self,
        id: &PostId,
    ) -> Result<RawProtocolResponse, TransportError>;
}

// ============================================================================
// Post Object
// ============================================================================

/// A post as returned by the detail, search, and reply endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostObject {
    /// Post id.
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<PostId>,
    /// Post body.
    #[serde(default, alias = "raw_content", deserialize_with = "de_opt_text")]
    pub raw_content: Option<String>,
    /// Author.
    #[serde(default, deserialize_with = "de_opt_user")]
    pub user: Option<PostUser>,
    /// Creation time.
    #[serde(default, deserialize_with = "de_opt_timestamp")]
    pub date: Option<DateTime<Utc>>,
    /// Likes.
    #[serde(default, alias = "like_count", deserialize_with = "de_opt_count")]
    pub like_count: Option<u64>,
    /// Reposts.
    #[serde(default, alias = "retweet_count", deserialize_with = "de_opt_count")]
    pub retweet_count: Option<u64>,
    /// Replies.
    #[serde(default, alias = "reply_count", deserialize_with = "de_opt_count")]
    pub reply_count: Option<u64>,
    /// Quotes.
    #[serde(default, alias = "quote_count", deserialize_with = "de_opt_count")]
    pub quote_count: Option<u64>,
    /// Parent post, for replies.
    #[serde(default, alias = "in_reply_to_tweet_id", deserialize_with = "de_opt_id")]
    pub in_reply_to_tweet_id: Option<PostId>,
}

impl PostObject {
    /// Creates an object with only an id set.
    pub fn with_id(id: impl Into<PostId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }
}

/// The author block of a [`PostObject`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUser {
    /// Author's platform id.
    #[serde(default, deserialize_with = "de_opt_id")]
    pub id: Option<PostId>,
    /// Handle without the leading `@`.
    #[serde(default, alias = "screen_name", deserialize_with = "de_opt_text")]
    pub username: Option<String>,
    /// Display name.
    #[serde(default, alias = "displayname", deserialize_with = "de_opt_text")]
    pub display_name: Option<String>,
}

impl PostUser {
    /// Creates a user with a handle and id.
    pub fn new(username: impl Into<String>, id: impl Into<PostId>) -> Self {
        Self {
            id: Some(id.into()),
            username: Some(username.into()),
            display_name: None,
        }
    }
}

// ============================================================================
// Raw Protocol Response
// ============================================================================

/// An unprocessed protocol response: status code plus JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProtocolResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded body (`Null` when the body was not JSON).
    #[serde(default)]
    pub body: Value,
}

impl RawProtocolResponse {
    /// Creates a 200 response with the given body.
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// Returns true for a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// ============================================================================
// Lenient Decoding
// ============================================================================

/// Parses a timestamp in RFC 3339 or the platform's legacy layout.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_str(raw, PLATFORM_TIME_FORMAT))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Decodes a list of post objects one element at a time.
///
/// A wrongly typed field only loses that field. An element that is not an
/// object at all becomes an empty [`PostObject`], which no parser accepts,
/// so it is dropped later without taking its siblings with it.
pub fn decode_post_list(value: Value) -> Result<Vec<PostObject>, TransportError> {
    let elements: Vec<Value> = serde_json::from_value(value)?;
    Ok(elements
        .into_iter()
        .map(|element| serde_json::from_value(element).unwrap_or_default())
        .collect())
}

fn de_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

fn de_opt_user<'de, D>(deserializer: D) -> Result<Option<PostUser>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(user @ Value::Object(_)) => serde_json::from_value(user).ok(),
        _ => None,
    })
}

fn de_opt_id<'de, D>(deserializer: D) -> Result<Option<PostId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(PostId::from_json))
}

fn de_opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => parse_timestamp(&s),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        _ => None,
    })
}

fn de_opt_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(count_from_json))
}

/// Reads a non-negative counter from a number or numeric string.
pub fn count_from_json(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|v| u64::try_from(v.max(0)).unwrap_or(0))),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
