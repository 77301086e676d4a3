//! Response normalizers.
//!
//! Each retrieval path has exactly one parser. A parser returns `None` when
//! the payload holds no recognizable post; that is an ordinary outcome, not
//! an error. Parsers never panic and never do I/O.
//!
//! Defaults for absent fields:
//!
//! | Field | Default |
//! |-------|---------|
//! | `author_handle` | `"unknown"` |
//! | `author_id` | `None` |
//! | `body_text` | `""` |
//! | metrics | `0` |
//! | `created_at`, `parent_id` | `None` |
//!
//! A post with no usable id is never produced.

use serde_json::Value;
use threadscope_core::{CanonicalPost, PostId, PostMetrics, UNKNOWN_AUTHOR};
use threadscope_fetch::{PostObject, count_from_json, parse_timestamp};

/// Entry types in a raw instruction list that carry a post.
const POST_ENTRY_TYPES: &[&str] = &["Tweet", "TimelineTimelineItem"];

/// Instruction type whose entries are scanned.
const ADD_ENTRIES: &str = "TimelineAddEntries";

/// Wrapper type the platform uses for posts with visibility restrictions.
const VISIBILITY_WRAPPER: &str = "TweetWithVisibilityResults";

/// Locations of the post-detail object, newest layout last.
const DETAIL_POINTERS: &[&str] = &[
    "/data/tweet_detail",
    "/data/threaded_conversation_with_injections_v2",
];

// ============================================================================
// Direct Object & Search Parsers
// ============================================================================

/// Normalizes a typed post object from the detail or reply endpoint.
pub fn parse_post_object(object: &PostObject) -> Option<CanonicalPost> {
    let id = object.id.clone()?;
    let user = object.user.as_ref();

    let mut post = CanonicalPost::new(id);
    post.author_handle = handle_or_default(user.and_then(|u| u.username.as_deref()));
    post.author_id = user
        .and_then(|u| u.id.as_ref())
        .map(|id| id.as_str().to_string());
    post.body_text = object.raw_content.clone().unwrap_or_default();
    post.created_at = object.date;
    post.metrics = PostMetrics {
        like_count: object.like_count.unwrap_or(0),
        share_count: object.retweet_count.unwrap_or(0),
        reply_count: object.reply_count.unwrap_or(0),
        quote_count: object.quote_count.unwrap_or(0),
    };
    post.parent_id = object.in_reply_to_tweet_id.clone();
    Some(post)
}

/// Normalizes the first item of a search result. Later items are ignored.
pub fn parse_search_results(results: &[PostObject]) -> Option<CanonicalPost> {
    results.first().and_then(parse_post_object)
}

// ============================================================================
// Raw Protocol Parser
// ============================================================================

/// Normalizes a raw protocol body.
///
/// Scans `TimelineAddEntries` instructions in order and returns the first
/// post entry that yields a post. Entries missing their tweet result,
/// `legacy` block, or id are skipped.
pub fn parse_raw_protocol(body: &Value) -> Option<CanonicalPost> {
    let instructions = detail_object(body).and_then(instruction_list)?;

    instructions
        .iter()
        .filter(|instruction| str_at(instruction, "type") == Some(ADD_ENTRIES))
        .filter_map(|instruction| instruction.get("entries").and_then(Value::as_array))
        .flatten()
        .find_map(parse_entry)
}

/// Returns the post-detail object of a raw body, if present.
pub fn detail_object(body: &Value) -> Option<&Value> {
    DETAIL_POINTERS
        .iter()
        .find_map(|pointer| body.pointer(pointer))
        .filter(|detail| detail.is_object())
}

/// Returns the instruction list of a post-detail object, if present.
pub fn instruction_list(detail: &Value) -> Option<&[Value]> {
    detail
        .get("instructions")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
}

fn parse_entry(entry: &Value) -> Option<CanonicalPost> {
    let content = entry.get("content")?;
    let entry_type = str_at(content, "entryType")?;
    if !POST_ENTRY_TYPES.contains(&entry_type) {
        return None;
    }

    let mut result = content.pointer("/itemContent/tweet_results/result")?;
    if str_at(result, "__typename") == Some(VISIBILITY_WRAPPER) {
        result = result.get("tweet")?;
    }

    let legacy = result.get("legacy")?;
    let id = result
        .get("rest_id")
        .and_then(PostId::from_json)
        .or_else(|| legacy.get("id_str").and_then(PostId::from_json))?;

    let user = result.pointer("/core/user_results/result");
    let user_legacy = user.and_then(|u| u.get("legacy"));
    // Newer payloads move the handle out of `legacy`.
    let handle = user_legacy
        .and_then(|l| str_at(l, "screen_name"))
        .or_else(|| user.and_then(|u| u.pointer("/core/screen_name")).and_then(Value::as_str));

    let count = |key: &str| legacy.get(key).and_then(count_from_json).unwrap_or(0);

    let mut post = CanonicalPost::new(id);
    post.author_handle = handle_or_default(handle);
    post.author_id = user
        .and_then(|u| u.get("rest_id"))
        .and_then(PostId::from_json)
        .map(String::from);
    post.body_text = str_at(legacy, "full_text").unwrap_or_default().to_string();
    post.created_at = str_at(legacy, "created_at").and_then(parse_timestamp);
    post.metrics = PostMetrics {
        like_count: count("favorite_count"),
        share_count: count("retweet_count"),
        reply_count: count("reply_count"),
        quote_count: count("quote_count"),
    };
    post.parent_id = legacy
        .get("in_reply_to_status_id_str")
        .and_then(PostId::from_json);
    Some(post)
}

// ============================================================================
// Helpers
// ============================================================================

fn str_at<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn handle_or_default(handle: Option<&str>) -> String {
    handle
        .map(|h| h.trim().trim_start_matches('@'))
        .filter(|h| !h.is_empty())
        .map_or_else(|| UNKNOWN_AUTHOR.to_string(), str::to_string)
}

// ============================================================================
// Tests
// ============================================================================
