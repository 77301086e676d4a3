//! Reply tree types.

use serde::{Deserialize, Serialize};

use super::diagnosis::Diagnosis;
use super::post::CanonicalPost;

// ============================================================================
// Thread Node
// ============================================================================

/// A post together with its replies.
///
/// The tree is owned top-down; nodes hold no reference to their parent.
/// Children keep the order the platform returned them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadNode {
    /// The post at this node.
    pub post: CanonicalPost,
    /// Distance from the root (root = 0).
    pub depth: u32,
    /// Direct replies, in upstream order.
    #[serde(default)]
    pub children: Vec<ThreadNode>,
}

impl ThreadNode {
    /// Creates a childless node.
    pub fn leaf(post: CanonicalPost, depth: u32) -> Self {
        Self {
            post,
            depth,
            children: Vec::new(),
        }
    }

    /// Creates a node with the given children.
    pub fn with_children(post: CanonicalPost, depth: u32, children: Vec<ThreadNode>) -> Self {
        Self {
            post,
            depth,
            children,
        }
    }

    /// Number of nodes below this one.
    pub fn descendant_count(&self) -> usize {
        self.children.iter().map(ThreadNode::node_count).sum()
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.descendant_count()
    }

    /// Deepest depth value found in this subtree.
    pub fn max_depth_reached(&self) -> u32 {
        self.children
            .iter()
            .map(ThreadNode::max_depth_reached)
            .max()
            .unwrap_or(self.depth)
    }

    /// Pre-order iterator over this subtree.
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }
}

/// Pre-order traversal over a [`ThreadNode`] subtree.
pub struct Walk<'a> {
    stack: Vec<&'a ThreadNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a ThreadNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

// ============================================================================
// Thread Result
// ============================================================================

/// The result of reconstructing a reply thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadResult {
    /// Root of the tree, absent when the root post could not be resolved.
    pub root: Option<ThreadNode>,
    /// Root plus every descendant.
    pub total_nodes: usize,
    /// The depth bound that was requested.
    pub max_depth: u32,
    /// Strategy that resolved the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_strategy: Option<String>,
    /// Set only when the root post could not be resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Diagnosis for an unresolved root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<Diagnosis>,
}

impl ThreadResult {
    /// Builds a result around a resolved root.
    pub fn resolved(root: ThreadNode, max_depth: u32, strategy: impl Into<String>) -> Self {
        Self {
            total_nodes: root.node_count(),
            root: Some(root),
            max_depth,
            root_strategy: Some(strategy.into()),
            error: None,
            diagnosis: None,
        }
    }

    /// Builds a result for a root that could not be resolved.
    pub fn unresolved(diagnosis: Diagnosis, max_depth: u32) -> Self {
        Self {
            root: None,
            total_nodes: 0,
            max_depth,
            root_strategy: None,
            error: Some(diagnosis.summary()),
            diagnosis: Some(diagnosis),
        }
    }

    /// Returns true if the root was resolved.
    pub fn is_resolved(&self) -> bool {
        self.root.is_some()
    }

    /// Number of replies in the tree (excludes the root).
    pub fn reply_count(&self) -> usize {
        self.total_nodes.saturating_sub(1)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post::PostId;

    fn post(id: u64) -> CanonicalPost {
        CanonicalPost::new(PostId::from(id))
    }

    fn sample_tree() -> ThreadNode {
        ThreadNode::with_children(
            post(1),
            0,
            vec![
                ThreadNode::with_children(post(2), 1, vec![ThreadNode::leaf(post(4), 2)]),
                ThreadNode::leaf(post(3), 1),
            ],
        )
    }

    #[test]
    fn test_counts() {
        let tree = sample_tree();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.descendant_count(), 3);
        assert_eq!(tree.max_depth_reached(), 2);
    }

    #[test]
    fn test_walk_is_pre_order() {
        let tree = sample_tree();
        let ids: Vec<_> = tree.walk().map(|n| n.post.id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2", "4", "3"]);
    }

    #[test]
    fn test_resolved_result_totals() {
        let result = ThreadResult::resolved(sample_tree(), 3, "post.detail");
        assert!(result.is_resolved());
        assert_eq!(result.total_nodes, 4);
        assert_eq!(result.reply_count(), 3);
        assert!(result.error.is_none());
    }

    #[test]
    fn test_unresolved_result_carries_error() {
        let result = ThreadResult::unresolved(Diagnosis::new(PostId::from(5)), 2);
        assert!(!result.is_resolved());
        assert_eq!(result.total_nodes, 0);
        assert_eq!(result.error.as_deref(), Some("post 5 could not be retrieved"));
    }
}
