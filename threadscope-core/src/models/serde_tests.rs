//! Serde behaviour of the core types.
//!
//! The CLI emits these types as JSON, so their wire shape is part of the
//! public surface.

use chrono::{TimeZone, Utc};
use serde_json::json;

use crate::{
    CanonicalPost, Diagnosis, ExtractionOutcome, FailureCause, PostId, PostMetrics, ProbeKind,
    ThreadNode, ThreadResult,
};

fn sample_post() -> CanonicalPost {
    CanonicalPost {
        id: PostId::from(1943393540538798263),
        author_handle: "alice".to_string(),
        author_id: Some("12".to_string()),
        body_text: "hello world".to_string(),
        created_at: Some(Utc.with_ymd_and_hms(2025, 7, 10, 18, 4, 5).unwrap()),
        metrics: PostMetrics {
            like_count: 10,
            share_count: 2,
            reply_count: 3,
            quote_count: 1,
        },
        parent_id: None,
    }
}

// ============================================================================
// PostId
// ============================================================================

#[test]
fn test_post_id_serializes_as_string() {
    let json = serde_json::to_value(PostId::from(42)).unwrap();
    assert_eq!(json, json!("42"));
}

#[test]
fn test_post_id_rejects_empty_on_deserialize() {
    let result: Result<PostId, _> = serde_json::from_value(json!(""));
    assert!(result.is_err());

    let result: Result<PostId, _> = serde_json::from_value(json!("  "));
    assert!(result.is_err());
}

// ============================================================================
// CanonicalPost
// ============================================================================

#[test]
fn test_post_omits_absent_optionals() {
    let post = CanonicalPost::new(PostId::from(5));
    let json = serde_json::to_value(&post).unwrap();

    assert!(json.get("author_id").is_none());
    assert!(json.get("created_at").is_none());
    assert!(json.get("parent_id").is_none());
    assert_eq!(json["body_text"], json!(""));
    assert_eq!(json["metrics"]["like_count"], json!(0));
}

#[test]
fn test_post_deserializes_with_missing_defaults() {
    let post: CanonicalPost =
        serde_json::from_value(json!({"id": "9", "author_handle": "bob"})).unwrap();
    assert_eq!(post.id.as_str(), "9");
    assert!(post.body_text.is_empty());
    assert_eq!(post.metrics, PostMetrics::default());
}

// ============================================================================
// ExtractionOutcome
// ============================================================================

#[test]
fn test_outcome_success_shape() {
    let outcome = ExtractionOutcome::Success {
        post: sample_post(),
        strategy: "post.detail".to_string(),
    };
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["status"], json!("success"));
    assert_eq!(json["strategy"], json!("post.detail"));
    assert_eq!(json["post"]["author_handle"], json!("alice"));
}

#[test]
fn test_outcome_failure_shape() {
    let mut diagnosis = Diagnosis::new(PostId::from(3));
    diagnosis.record(ProbeKind::RawProtocol, FailureCause::EmptyInstructions);
    diagnosis.suggest("Check later");

    let json = serde_json::to_value(ExtractionOutcome::Failure(diagnosis.clone())).unwrap();
    assert_eq!(json["status"], json!("failure"));
    assert_eq!(json["post_id"], json!("3"));
    assert_eq!(json["findings"][0]["probe"], json!("raw_protocol"));
    assert_eq!(json["findings"][0]["cause"]["cause"], json!("empty_instructions"));

    let back: ExtractionOutcome = serde_json::from_value(json).unwrap();
    assert_eq!(back.diagnosis(), Some(&diagnosis));
}

// ============================================================================
// ThreadResult
// ============================================================================

#[test]
fn test_thread_result_nested_children() {
    let mut reply = sample_post();
    reply.id = PostId::from(2);
    reply.parent_id = Some(PostId::from(1943393540538798263));

    let root = ThreadNode::with_children(sample_post(), 0, vec![ThreadNode::leaf(reply, 1)]);
    let result = ThreadResult::resolved(root, 3, "post.search");
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["total_nodes"], json!(2));
    assert_eq!(json["root"]["children"][0]["depth"], json!(1));
    assert_eq!(
        json["root"]["children"][0]["post"]["parent_id"],
        json!("1943393540538798263")
    );
    assert!(json.get("error").is_none());
}
