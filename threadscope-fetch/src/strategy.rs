//! Fetch strategy trait and types.
//!
//! A strategy represents one named way of retrieving a post. Each strategy
//! pairs one upstream operation with exactly one response parser, so the shape
//! of a payload is always known from the strategy that produced it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use threadscope_core::{CanonicalPost, PostId, ProbeKind};

use crate::context::FetchContext;
use crate::error::FetchError;

// ============================================================================
// Strategy Kind
// ============================================================================

/// The retrieval path a strategy uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Direct detail fetch of a typed post object.
    Detail,
    /// Identifier-scoped search.
    Search,
    /// Raw protocol fetch of the instruction/entry graph.
    RawProtocol,
}

impl StrategyKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Detail => "Detail",
            Self::Search => "Search",
            Self::RawProtocol => "Raw Protocol",
        }
    }

    /// The diagnostic probe that repeats this retrieval path.
    pub fn probe_kind(&self) -> ProbeKind {
        match self {
            Self::Detail => ProbeKind::Detail,
            Self::Search => ProbeKind::Search,
            Self::RawProtocol => ProbeKind::RawProtocol,
        }
    }

    /// Default priority (higher = tried first).
    ///
    /// - Detail: 100
    /// - Search: 80
    /// - Raw Protocol: 60
    pub fn default_priority(&self) -> u32 {
        match self {
            Self::Detail => 100,
            Self::Search => 80,
            Self::RawProtocol => 60,
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Fetch Result
// ============================================================================

/// The result of a successful strategy.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The normalized post.
    pub post: CanonicalPost,
    /// The strategy that succeeded.
    pub strategy_id: String,
    /// The kind of retrieval used.
    pub kind: StrategyKind,
}

impl FetchResult {
    /// Creates a new fetch result.
    pub fn new(post: CanonicalPost, strategy_id: impl Into<String>, kind: StrategyKind) -> Self {
        Self {
            post,
            strategy_id: strategy_id.into(),
            kind,
        }
    }
}

// ============================================================================
// Fetch Strategy Trait
// ============================================================================

/// A strategy for retrieving and normalizing a single post.
///
/// A strategy succeeds only when its retrieval succeeds *and* its paired
/// parser recognizes the payload. Any failure is reported as a `FetchError`;
/// the pipeline always moves on to the next strategy.
///
/// ## Implementing a Strategy
///
/// ```ignore
/// struct DetailStrategy;
///
/// #[async_trait]
/// impl FetchStrategy for DetailStrategy {
///     fn id(&self) -> &str {
///         "post.detail"
///     }
///
///     fn kind(&self) -> StrategyKind {
///         StrategyKind::Detail
///     }
///
///     async fn fetch(&self, ctx: &FetchContext, id: &PostId) -> Result<FetchResult, FetchError> {
///         let object = ctx.fetch_post_by_id(id).await?;
///         // Normalize and return FetchResult
///     }
/// }
/// ```
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    /// Unique identifier for this strategy (e.g., "post.detail").
    fn id(&self) -> &str;

    /// The retrieval path this strategy uses.
    fn kind(&self) -> StrategyKind;

    /// Human-readable name for this strategy.
    fn display_name(&self) -> String {
        format!("{} ({})", self.id(), self.kind().display_name())
    }

    /// Retrieve and normalize the post.
    async fn fetch(&self, ctx: &FetchContext, post_id: &PostId) -> Result<FetchResult, FetchError>;

    /// Priority of this strategy (higher = try first).
    fn priority(&self) -> u32 {
        self.kind().default_priority()
    }
}

// ============================================================================
// Strategy Info
// ============================================================================

/// Information about a strategy (for reporting).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Strategy ID.
    pub id: String,
    /// Strategy kind.
    pub kind: StrategyKind,
    /// Priority.
    pub priority: u32,
}

impl StrategyInfo {
    /// Creates strategy info from a strategy implementation.
    pub fn from_strategy(strategy: &dyn FetchStrategy) -> Self {
        Self {
            id: strategy.id().to_string(),
            kind: strategy.kind(),
            priority: strategy.priority(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(StrategyKind::Detail.display_name(), "Detail");
        assert_eq!(StrategyKind::RawProtocol.to_string(), "Raw Protocol");
    }

    #[test]
    fn test_default_priorities_are_ordered() {
        assert!(StrategyKind::Detail.default_priority() > StrategyKind::Search.default_priority());
        assert!(
            StrategyKind::Search.default_priority() > StrategyKind::RawProtocol.default_priority()
        );
    }

    #[test]
    fn test_probe_kind_mapping() {
        assert_eq!(StrategyKind::Search.probe_kind(), ProbeKind::Search);
        assert_eq!(StrategyKind::RawProtocol.probe_kind(), ProbeKind::RawProtocol);
    }
}
