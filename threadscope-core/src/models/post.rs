//! Post types.
//!
//! - [`PostId`] - Platform-assigned identifier, never empty
//! - [`PostMetrics`] - Engagement counters
//! - [`CanonicalPost`] - Normalized post shared by every parser

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;

/// Author handle used when a source omits the author.
pub const UNKNOWN_AUTHOR: &str = "unknown";

// ============================================================================
// Post Id
// ============================================================================

/// An opaque, platform-assigned post identifier.
///
/// Upstream sends ids as strings or integers; both collapse to the decimal
/// string form. An empty or whitespace-only id cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PostId(String);

impl PostId {
    /// Parses an id from text, trimming surrounding whitespace.
    ///
    /// Returns `None` for empty input.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Reads an id out of a JSON value that may be a string or an integer.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => Self::parse(&n.to_string()),
            _ => None,
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PostId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(CoreError::InvalidId(value))
    }
}

impl From<PostId> for String {
    fn from(id: PostId) -> Self {
        id.0
    }
}

impl From<u64> for PostId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for PostId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Engagement counters for a post. Missing counters are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostMetrics {
    /// Likes / favorites.
    #[serde(default)]
    pub like_count: u64,
    /// Reposts / retweets.
    #[serde(default)]
    pub share_count: u64,
    /// Direct replies.
    #[serde(default)]
    pub reply_count: u64,
    /// Quote posts.
    #[serde(default)]
    pub quote_count: u64,
}

// ============================================================================
// Canonical Post
// ============================================================================

/// The normalized post every response parser produces.
///
/// Only `id` is mandatory. Every other field has a documented default:
/// `author_handle` falls back to [`UNKNOWN_AUTHOR`], `body_text` to the empty
/// string, counters to zero, and the optional fields to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalPost {
    /// Platform-assigned identifier.
    pub id: PostId,
    /// Author handle without the leading `@`.
    pub author_handle: String,
    /// Author's platform id, when the source carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    /// Post body. May be empty.
    #[serde(default)]
    pub body_text: String,
    /// Creation time, when the source carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Engagement counters.
    #[serde(default)]
    pub metrics: PostMetrics,
    /// The post this one replies to. Present iff the post is a reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<PostId>,
}

impl CanonicalPost {
    /// Creates a post with every optional field at its default.
    pub fn new(id: PostId) -> Self {
        Self {
            id,
            author_handle: UNKNOWN_AUTHOR.to_string(),
            author_id: None,
            body_text: String::new(),
            created_at: None,
            metrics: PostMetrics::default(),
            parent_id: None,
        }
    }

    /// Returns true if this post is a reply to another post.
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_post_id_rejects_empty() {
        assert!(PostId::parse("").is_none());
        assert!(PostId::parse("   ").is_none());
        assert_eq!(PostId::parse(" 42 ").unwrap().as_str(), "42");
    }

    #[test]
    fn test_post_id_from_json() {
        assert_eq!(PostId::from_json(&json!("123")).unwrap().as_str(), "123");
        assert_eq!(
            PostId::from_json(&json!(1943393540538798263_u64)).unwrap().as_str(),
            "1943393540538798263"
        );
        assert!(PostId::from_json(&json!("")).is_none());
        assert!(PostId::from_json(&json!(null)).is_none());
        assert!(PostId::from_json(&json!({"id": 1})).is_none());
    }

    #[test]
    fn test_new_post_defaults() {
        let post = CanonicalPost::new(PostId::from(7));
        assert_eq!(post.author_handle, UNKNOWN_AUTHOR);
        assert!(post.body_text.is_empty());
        assert_eq!(post.metrics, PostMetrics::default());
        assert!(!post.is_reply());
    }
}
