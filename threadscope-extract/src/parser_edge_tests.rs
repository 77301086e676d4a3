//! Parser edge case and error handling tests.
//!
//! These tests verify parser behavior with malformed, partial, or edge case inputs.

mod raw_protocol_edge_tests {
    use crate::normalize::parse_raw_protocol;
    use serde_json::{Value, json};
    use threadscope_core::UNKNOWN_AUTHOR;

    fn wrap(entries: Value) -> Value {
        json!({
            "data": {"tweet_detail": {"instructions": [
                {"type": "TimelineAddEntries", "entries": entries}
            ]}}
        })
    }

    fn entry(entry_type: &str, result: Value) -> Value {
        json!({
            "content": {
                "entryType": entry_type,
                "itemContent": {"tweet_results": {"result": result}}
            }
        })
    }

    // ========================================================================
    // Structural Edge Cases
    // ========================================================================

    #[test]
    fn test_parse_non_object_bodies() {
        assert!(parse_raw_protocol(&Value::Null).is_none());
        assert!(parse_raw_protocol(&json!([])).is_none());
        assert!(parse_raw_protocol(&json!("data")).is_none());
    }

    #[test]
    fn test_parse_instructions_wrong_type() {
        let body = json!({"data": {"tweet_detail": {"instructions": {"type": "TimelineAddEntries"}}}});
        assert!(parse_raw_protocol(&body).is_none());
    }

    #[test]
    fn test_parse_ignores_other_instruction_types() {
        let body = json!({
            "data": {"tweet_detail": {"instructions": [
                {"type": "TimelineClearCache", "entries": [
                    entry("Tweet", json!({"rest_id": "1", "legacy": {}}))
                ]}
            ]}}
        });
        assert!(parse_raw_protocol(&body).is_none());
    }

    #[test]
    fn test_parse_ignores_non_post_entries() {
        let body = wrap(json!([
            entry("TimelineTimelineCursor", json!({"rest_id": "1", "legacy": {}}))
        ]));
        assert!(parse_raw_protocol(&body).is_none());
    }

    // ========================================================================
    // Entry Degradation
    // ========================================================================

    #[test]
    fn test_broken_entries_are_skipped() {
        let body = wrap(json!([
            {"content": {"entryType": "Tweet"}},
            entry("Tweet", json!({"rest_id": "1"})),
            entry("Tweet", json!({"legacy": {"full_text": "no id anywhere"}})),
            entry("Tweet", json!({"rest_id": "", "legacy": {"id_str": "  "}})),
            entry("Tweet", json!({"rest_id": "4", "legacy": {"full_text": "fourth"}}))
        ]));

        let post = parse_raw_protocol(&body).unwrap();
        assert_eq!(post.id.as_str(), "4");
        assert_eq!(post.body_text, "fourth");
    }

    #[test]
    fn test_first_match_wins() {
        let body = wrap(json!([
            entry("Tweet", json!({"rest_id": "10", "legacy": {"full_text": "focal"}})),
            entry("Tweet", json!({"rest_id": "11", "legacy": {"full_text": "reply"}}))
        ]));
        assert_eq!(parse_raw_protocol(&body).unwrap().id.as_str(), "10");
    }

    #[test]
    fn test_id_falls_back_to_legacy_id_str() {
        let body = wrap(json!([entry("Tweet", json!({"legacy": {"id_str": "55"}}))]));
        assert_eq!(parse_raw_protocol(&body).unwrap().id.as_str(), "55");
    }

    #[test]
    fn test_missing_user_chain_uses_default_handle() {
        let body = wrap(json!([entry("Tweet", json!({"rest_id": "1", "legacy": {}}))]));
        let post = parse_raw_protocol(&body).unwrap();
        assert_eq!(post.author_handle, UNKNOWN_AUTHOR);
        assert!(post.author_id.is_none());
        assert_eq!(post.body_text, "");
    }

    // ========================================================================
    // Field Values
    // ========================================================================

    #[test]
    fn test_counts_are_lenient() {
        let body = wrap(json!([entry("Tweet", json!({
            "rest_id": "1",
            "legacy": {
                "favorite_count": "12",
                "retweet_count": -1,
                "reply_count": null,
                "quote_count": 2.5
            }
        }))]));

        let metrics = parse_raw_protocol(&body).unwrap().metrics;
        assert_eq!(metrics.like_count, 12);
        assert_eq!(metrics.share_count, 0);
        assert_eq!(metrics.reply_count, 0);
        assert_eq!(metrics.quote_count, 0);
    }

    #[test]
    fn test_bad_timestamp_and_null_parent() {
        let body = wrap(json!([entry("Tweet", json!({
            "rest_id": "1",
            "legacy": {
                "created_at": "sometime last week",
                "in_reply_to_status_id_str": null
            }
        }))]));

        let post = parse_raw_protocol(&body).unwrap();
        assert!(post.created_at.is_none());
        assert!(!post.is_reply());
    }

    #[test]
    fn test_numeric_ids_become_strings() {
        let body = wrap(json!([entry("Tweet", json!({
            "rest_id": 99,
            "core": {"user_results": {"result": {"rest_id": 7, "legacy": {"screen_name": "@dave"}}}},
            "legacy": {"in_reply_to_status_id_str": 98}
        }))]));

        let post = parse_raw_protocol(&body).unwrap();
        assert_eq!(post.id.as_str(), "99");
        assert_eq!(post.author_id.as_deref(), Some("7"));
        assert_eq!(post.author_handle, "dave");
        assert_eq!(post.parent_id.unwrap().as_str(), "98");
    }
}

mod post_object_edge_tests {
    use crate::normalize::{parse_post_object, parse_search_results};
    use serde_json::json;
    use threadscope_core::UNKNOWN_AUTHOR;
    use threadscope_fetch::PostObject;

    fn decode(value: serde_json::Value) -> PostObject {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_parse_empty_object() {
        assert!(parse_post_object(&decode(json!({}))).is_none());
    }

    #[test]
    fn test_parse_whitespace_id() {
        assert!(parse_post_object(&decode(json!({"id": "   "}))).is_none());
    }

    #[test]
    fn test_parse_null_values() {
        let post = parse_post_object(&decode(json!({
            "id": 3,
            "rawContent": null,
            "user": null,
            "date": null,
            "likeCount": null
        })))
        .unwrap();

        assert_eq!(post.author_handle, UNKNOWN_AUTHOR);
        assert_eq!(post.body_text, "");
        assert_eq!(post.metrics.like_count, 0);
    }

    #[test]
    fn test_blank_username_uses_default() {
        let post = parse_post_object(&decode(json!({"id": 3, "user": {"username": "  "}}))).unwrap();
        assert_eq!(post.author_handle, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_search_with_empty_first_item() {
        let results = vec![decode(json!({})), decode(json!({"id": 2}))];
        assert!(parse_search_results(&results).is_none());
    }
}
