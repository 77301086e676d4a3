//! Thread reconstruction.
//!
//! A thread is rebuilt top-down: the root goes through the strategy chain,
//! then each node's direct replies are fetched and expanded until the depth
//! bound. Depth is the only termination guarantee; reply graphs are not
//! checked for cycles or duplicates.
//!
//! Sibling subtrees expand concurrently with an ordered, bounded fan-out
//! (`reply_fan_out`), and every upstream call waits for a permit from the
//! context's global cap (`max_concurrent_requests`). Nothing is spawned:
//! dropping the returned future cancels every in-flight fetch.

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use threadscope_core::{CanonicalPost, PostId, ThreadNode, ThreadResult};
use threadscope_fetch::{FetchContext, FetchError, FetchPipeline, PostObject};
use tracing::{debug, info, instrument, warn};

use crate::diagnose::diagnose;
use crate::normalize::parse_post_object;
use crate::strategies::SearchStrategy;

/// Default depth for threads found through [`search_threads`].
pub const SEARCH_THREAD_DEPTH: u32 = 2;

/// Rebuilds the reply tree under `root_id`, down to `max_depth`.
///
/// An unresolvable root yields a result with no tree, the diagnosis summary
/// as `error`, and the diagnosis attached. No reply is fetched in that case.
#[instrument(skip(pipeline, ctx, root_id), fields(root_id = %root_id))]
pub async fn reconstruct_thread(
    pipeline: &FetchPipeline,
    ctx: &FetchContext,
    root_id: &PostId,
    max_depth: u32,
) -> ThreadResult {
    let outcome = pipeline.execute(ctx, root_id).await;

    match outcome.result {
        Ok(resolved) => {
            let root = expand(ctx, resolved.post, 0, max_depth).await;
            let thread = ThreadResult::resolved(root, max_depth, resolved.strategy_id);
            info!(
                total_nodes = thread.total_nodes,
                strategy = thread.root_strategy.as_deref().unwrap_or_default(),
                "Thread reconstructed"
            );
            thread
        }
        Err(error) => {
            warn!(error = %error, "Thread root could not be resolved");
            let diagnosis = diagnose(ctx, root_id).await;
            ThreadResult::unresolved(diagnosis, max_depth)
        }
    }
}

/// Searches for posts and reconstructs a thread for every hit with replies.
///
/// Hits are used as roots directly, so their threads report the search
/// strategy. A failed search yields no threads.
#[instrument(skip(ctx))]
pub async fn search_threads(
    ctx: &FetchContext,
    query: &str,
    limit: usize,
    max_depth: u32,
) -> Vec<ThreadResult> {
    let hits = match ctx.search_posts(query, limit).await {
        Ok(hits) => hits,
        Err(error) => {
            warn!(error = %error, "Thread search failed");
            return Vec::new();
        }
    };

    let roots: Vec<CanonicalPost> = hits
        .iter()
        .filter_map(parse_post_object)
        .filter(|post| post.metrics.reply_count > 0)
        .collect();
    debug!(hits = hits.len(), with_replies = roots.len(), "Search finished");

    stream::iter(roots)
        .map(move |post| async move {
            let root = expand(ctx, post, 0, max_depth).await;
            ThreadResult::resolved(root, max_depth, SearchStrategy::ID)
        })
        .buffered(ctx.settings.reply_fan_out.max(1))
        .collect::<Vec<_>>()
        .await
}

/// Expands one node and, recursively, its replies.
fn expand(
    ctx: &FetchContext,
    post: CanonicalPost,
    depth: u32,
    max_depth: u32,
) -> BoxFuture<'_, ThreadNode> {
    async move {
        if depth >= max_depth {
            return ThreadNode::leaf(post, depth);
        }

        let children = match ctx
            .fetch_replies_by_id(&post.id, ctx.settings.reply_limit)
            .await
        {
            Ok(replies) => normalize_replies(&post.id, &replies),
            Err(error) => {
                warn!(post_id = %post.id, depth, error = %error, "Reply fetch failed");
                Vec::new()
            }
        };
        debug!(post_id = %post.id, depth, replies = children.len(), "Expanding replies");

        let children: Vec<ThreadNode> = stream::iter(children)
            .map(|child| expand(ctx, child, depth + 1, max_depth))
            .buffered(ctx.settings.reply_fan_out.max(1))
            .collect()
            .await;

        ThreadNode::with_children(post, depth, children)
    }
    .boxed()
}

fn normalize_replies(
    parent: &PostId,
    replies: &[PostObject],
) -> Vec<CanonicalPost> {
    replies
        .iter()
        .enumerate()
        .filter_map(|(index, reply)| {
            let post = parse_post_object(reply);
            if post.is_none() {
                let error = FetchError::MalformedReply {
                    post_id: parent.clone(),
                    reason: format!("reply #{index} has no usable id"),
                };
                warn!(error = %error, "Skipping reply");
            }
            post
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategies::default_pipeline;
    use std::sync::Arc;
    use threadscope_fetch::{MemoryClient, MemoryFailure, Operation};

    fn reply(id: u64, parent: u64) -> PostObject {
        PostObject {
            in_reply_to_tweet_id: Some(PostId::from(parent)),
            ..PostObject::with_id(id)
        }
    }

    #[tokio::test]
    async fn test_depth_zero_fetches_no_replies() {
        let memory = Arc::new(
            MemoryClient::new()
                .with_post(PostObject::with_id(1))
                .with_replies(1, vec![reply(2, 1)]),
        );
        let ctx = FetchContext::new(memory.clone());

        let thread = reconstruct_thread(&default_pipeline(), &ctx, &PostId::from(1), 0).await;

        assert_eq!(thread.total_nodes, 1);
        assert!(thread.root.unwrap().children.is_empty());
        assert_eq!(memory.call_count(Operation::Replies), 0);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_skipped() {
        let ctx = FetchContext::new(Arc::new(
            MemoryClient::new()
                .with_post(PostObject::with_id(1))
                .with_replies(1, vec![PostObject::default(), reply(3, 1)]),
        ));

        let thread = reconstruct_thread(&default_pipeline(), &ctx, &PostId::from(1), 1).await;

        let root = thread.root.unwrap();
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].post.id.as_str(), "3");
        assert_eq!(thread.total_nodes, 2);
    }

    #[tokio::test]
    async fn test_root_reply_failure_keeps_root() {
        let ctx = FetchContext::new(Arc::new(
            MemoryClient::new()
                .with_post(PostObject::with_id(1))
                .with_failure(Operation::Replies, "1", MemoryFailure::Unavailable("down".into())),
        ));

        let thread = reconstruct_thread(&default_pipeline(), &ctx, &PostId::from(1), 3).await;

        assert!(thread.is_resolved());
        assert!(thread.error.is_none());
        assert_eq!(thread.total_nodes, 1);
    }

    #[tokio::test]
    async fn test_search_threads_keeps_hits_with_replies() {
        let with_replies = PostObject {
            reply_count: Some(1),
            ..PostObject::with_id(10)
        };
        let quiet = PostObject::with_id(20);
        let memory = Arc::new(
            MemoryClient::new()
                .with_search("rust", vec![with_replies, quiet])
                .with_replies(10, vec![reply(11, 10)]),
        );
        let ctx = FetchContext::new(memory.clone());

        let threads = search_threads(&ctx, "rust", 5, SEARCH_THREAD_DEPTH).await;

        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].total_nodes, 2);
        assert_eq!(threads[0].root_strategy.as_deref(), Some("post.search"));
        assert_eq!(memory.call_count(Operation::Detail), 0);
    }

    #[tokio::test]
    async fn test_search_threads_failure_is_empty() {
        let ctx = FetchContext::new(Arc::new(MemoryClient::new().with_failure(
            Operation::Search,
            "rust",
            MemoryFailure::RateLimited,
        )));

        assert!(search_threads(&ctx, "rust", 5, 2).await.is_empty());
    }
}
