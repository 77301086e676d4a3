//! Diagnosis types.
//!
//! A [`Diagnosis`] explains why every retrieval strategy failed for a post.
//! Each diagnostic probe yields a typed [`FailureCause`]; the human-readable
//! reasons are rendered from those causes rather than parsed back out of text.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::post::PostId;

// ============================================================================
// Probe Kind
// ============================================================================

/// Which diagnostic probe produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// Direct detail fetch.
    Detail,
    /// Identifier-scoped search.
    Search,
    /// Raw protocol fetch.
    RawProtocol,
}

impl ProbeKind {
    /// Returns the display name for this probe.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Detail => "detail fetch",
            Self::Search => "search",
            Self::RawProtocol => "raw protocol fetch",
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ============================================================================
// Failure Cause
// ============================================================================

/// The typed result of a single diagnostic probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", content = "detail", rename_all = "snake_case")]
pub enum FailureCause {
    /// The probe retrieved the post.
    Succeeded,
    /// The call completed but produced no post.
    ReturnedNothing,
    /// The transport reported rate limiting.
    RateLimited(String),
    /// Any other transport failure.
    Transport(String),
    /// The raw request completed with a non-success status.
    HttpStatus(u16),
    /// The raw body had no post-detail object.
    MissingDetail,
    /// The post-detail object had no instruction list.
    MissingInstructions,
    /// The instruction list was present but empty.
    EmptyInstructions,
    /// Instructions were present but no post could be extracted.
    UnrecognizedShape,
}

impl FailureCause {
    /// Returns true if this cause proves the post is reachable.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if this cause points at deleted or private content.
    pub fn suggests_unavailable(&self) -> bool {
        matches!(self, Self::EmptyInstructions)
    }

    /// Returns true if this cause is a rate limit.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => f.write_str("succeeded"),
            Self::ReturnedNothing => f.write_str("returned no post"),
            Self::RateLimited(msg) => write!(f, "failed: rate limit reached ({msg})"),
            Self::Transport(msg) => write!(f, "failed: {msg}"),
            Self::HttpStatus(code) => write!(f, "failed with status {code}"),
            Self::MissingDetail => f.write_str("response missing post detail data"),
            Self::MissingInstructions => f.write_str("post detail missing instructions"),
            Self::EmptyInstructions => {
                f.write_str("post detail has no instructions - likely deleted or private")
            }
            Self::UnrecognizedShape => {
                f.write_str("succeeded but the response shape was not recognized")
            }
        }
    }
}

// ============================================================================
// Probe Finding
// ============================================================================

/// One probe's typed result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeFinding {
    /// The probe that ran.
    pub probe: ProbeKind,
    /// What it found.
    pub cause: FailureCause,
}

impl ProbeFinding {
    /// Creates a finding.
    pub fn new(probe: ProbeKind, cause: FailureCause) -> Self {
        Self { probe, cause }
    }

    /// Human-readable reason line for this finding.
    pub fn reason(&self) -> String {
        format!("{} {}", self.probe, self.cause)
    }
}

// ============================================================================
// Diagnosis
// ============================================================================

/// Structured explanation of a failed extraction.
///
/// `reasons` holds one line per executed probe in execution order and is never
/// deduplicated. `suggestions` is a deduplicated set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnosis {
    /// The post that was diagnosed.
    pub post_id: PostId,
    /// Whether any probe reached the post.
    pub accessible: bool,
    /// Typed probe results, in execution order.
    pub findings: Vec<ProbeFinding>,
    /// Human-readable probe results, in execution order.
    pub reasons: Vec<String>,
    /// Deduplicated advice.
    pub suggestions: BTreeSet<String>,
}

impl Diagnosis {
    /// Creates an empty diagnosis for a post.
    pub fn new(post_id: PostId) -> Self {
        Self {
            post_id,
            accessible: false,
            findings: Vec::new(),
            reasons: Vec::new(),
            suggestions: BTreeSet::new(),
        }
    }

    /// Appends a probe result. A successful probe marks the post accessible.
    pub fn record(&mut self, probe: ProbeKind, cause: FailureCause) {
        let finding = ProbeFinding::new(probe, cause);
        if finding.cause.is_success() {
            self.accessible = true;
        }
        self.reasons.push(finding.reason());
        self.findings.push(finding);
    }

    /// Adds a suggestion. Duplicates are ignored.
    pub fn suggest(&mut self, suggestion: impl Into<String>) {
        self.suggestions.insert(suggestion.into());
    }

    /// Number of probes that ran.
    pub fn probes_run(&self) -> usize {
        self.findings.len()
    }

    /// Returns true if any probe produced the given cause.
    pub fn has_cause(&self, predicate: impl Fn(&FailureCause) -> bool) -> bool {
        self.findings.iter().any(|f| predicate(&f.cause))
    }

    /// Single-line summary suitable for a top-level error message.
    pub fn summary(&self) -> String {
        if self.reasons.is_empty() {
            format!("post {} could not be retrieved", self.post_id)
        } else {
            format!(
                "post {} could not be retrieved: {}",
                self.post_id,
                self.reasons.join("; ")
            )
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> PostId {
        PostId::from(99)
    }

    #[test]
    fn test_record_keeps_order_and_duplicates() {
        let mut diagnosis = Diagnosis::new(id());
        diagnosis.record(ProbeKind::Detail, FailureCause::ReturnedNothing);
        diagnosis.record(ProbeKind::Search, FailureCause::ReturnedNothing);

        assert_eq!(diagnosis.probes_run(), 2);
        assert_eq!(diagnosis.reasons[0], "detail fetch returned no post");
        assert_eq!(diagnosis.reasons[1], "search returned no post");
        assert!(!diagnosis.accessible);
    }

    #[test]
    fn test_success_marks_accessible() {
        let mut diagnosis = Diagnosis::new(id());
        diagnosis.record(ProbeKind::Search, FailureCause::Succeeded);
        assert!(diagnosis.accessible);
    }

    #[test]
    fn test_suggestions_deduplicate() {
        let mut diagnosis = Diagnosis::new(id());
        diagnosis.suggest("same");
        diagnosis.suggest("same".to_string());
        assert_eq!(diagnosis.suggestions.len(), 1);
    }

    #[test]
    fn test_empty_instructions_reason_text() {
        let finding = ProbeFinding::new(ProbeKind::RawProtocol, FailureCause::EmptyInstructions);
        assert!(finding.reason().contains("likely deleted or private"));
        assert!(finding.cause.suggests_unavailable());
    }

    #[test]
    fn test_summary() {
        let mut diagnosis = Diagnosis::new(id());
        assert_eq!(diagnosis.summary(), "post 99 could not be retrieved");

        diagnosis.record(ProbeKind::RawProtocol, FailureCause::HttpStatus(404));
        assert_eq!(
            diagnosis.summary(),
            "post 99 could not be retrieved: raw protocol fetch failed with status 404"
        );
    }
}
