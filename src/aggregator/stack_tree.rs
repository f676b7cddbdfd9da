//! Stack-trace tree reconstruction from profile chunks.
//!
//! Stack traces arrive as partial chains of bottom-up links spread over
//! many chunks:
//!
//! ```text
//! Chunk 1: [A, B <- A, C <- B]
//! Chunk 2: [D <- A, E <- D]
//! Chunk 3: [G, H <- G]
//! ```
//!
//! ...which are collected into a forest whose roots are the bottommost
//! frames of every stack trace:
//!
//! ```text
//!     A     G
//!    / \    |
//!   B   D   H
//!   |   |
//!   C   E
//! ```
//!
//! Nodes live in an arena keyed by node id. Parent and children are stored
//! as ids.

use super::call_frame::is_allowed;
use crate::parser::{CallFrame, NodeId, ProfileChunkData};
use crate::utils::config::FilterOptions;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One stack frame of the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileNode {
    pub id: NodeId,
    pub call_frame: CallFrame,

    /// Calling frame, `None` for roots
    pub parent_id: Option<NodeId>,

    /// Frames called from this one
    pub children_ids: BTreeSet<NodeId>,
}

impl ProfileNode {
    fn new(id: NodeId, call_frame: CallFrame) -> Self {
        Self {
            id,
            call_frame,
            parent_id: None,
            children_ids: BTreeSet::new(),
        }
    }
}

/// All complete stack traces of one thread
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileTree {
    pub nodes: BTreeMap<NodeId, ProfileNode>,
}

impl ProfileTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> Option<&ProfileNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of the bottommost frames, in id order
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .values()
            .filter(|node| node.parent_id.is_none())
            .map(|node| node.id)
    }

    /// Walk from `id` towards the root through nodes present in the tree.
    ///
    /// Yields `id` first. Stops at a missing node or a missing parent, and
    /// after `len()` steps, so a malformed cyclic chain cannot loop forever.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: Some(id),
            remaining: self.len(),
        }
    }
}

/// Iterator returned by [`ProfileTree::ancestors`]
pub struct Ancestors<'a> {
    tree: &'a ProfileTree,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a ProfileNode;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = self.tree.get(self.next?)?;
        self.remaining -= 1;
        self.next = node.parent_id;
        Some(node)
    }
}

impl Ancestors<'_> {
    /// True when the walk stopped because of the step bound rather than
    /// reaching a root or a missing node
    pub fn exhausted(&self) -> bool {
        self.remaining == 0 && self.next.is_some_and(|id| self.tree.contains(id))
    }
}

/// Build the stack-trace tree from a thread's ordered chunk payloads
///
/// **Public** - step 2 of the hierarchy build
///
/// # Algorithm
/// 1. Skip links whose call frame fails the filter
/// 2. Get or create the node for the link's id
/// 3. Record the declared parent and register the node as its child
///
/// A node may learn its parent from a later chunk than the one that
/// introduced it; links seen again are idempotent. Complexity is linear in
/// the number of links.
pub fn collect_stack_traces(chunks: &[ProfileChunkData], options: FilterOptions) -> ProfileTree {
    let mut tree = ProfileTree::new();
    // Child links whose parent had not been admitted yet
    let mut pending: Vec<(NodeId, NodeId)> = Vec::new();
    let mut skipped = 0usize;

    for link in chunks.iter().flat_map(|chunk| chunk.links()) {
        if !is_allowed(&link.call_frame, options) {
            skipped += 1;
            continue;
        }

        let node = tree
            .nodes
            .entry(link.id)
            .or_insert_with(|| ProfileNode::new(link.id, link.call_frame.clone()));

        let Some(parent_id) = link.parent else {
            continue;
        };

        match node.parent_id {
            None => node.parent_id = Some(parent_id),
            Some(existing) if existing != parent_id => {
                warn!(
                    "Node {} re-declared with parent {} (keeping {})",
                    link.id, parent_id, existing
                );
                continue;
            }
            Some(_) => {}
        }

        match tree.nodes.get_mut(&parent_id) {
            Some(parent) => {
                parent.children_ids.insert(link.id);
            }
            None => pending.push((link.id, parent_id)),
        }
    }

    for (child_id, parent_id) in pending {
        if let Some(parent) = tree.nodes.get_mut(&parent_id) {
            parent.children_ids.insert(child_id);
        }
    }

    debug!(
        "Collected {} stack frames ({} links filtered out)",
        tree.len(),
        skipped
    );

    tree
}

/// Node ids of the stack trace ending at `node_id`, root first
///
/// Returns an empty list when `node_id` is not part of the tree.
pub fn stack_trace_ids(tree: &ProfileTree, node_id: NodeId) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = tree.ancestors(node_id).map(|node| node.id).collect();
    ids.reverse();
    ids
}

/// Call frames of the stack trace ending at `node_id`, root first
///
/// **Public** - used by callers presenting hot functions
pub fn stack_trace_from_id(tree: &ProfileTree, node_id: NodeId) -> Vec<&CallFrame> {
    let mut frames: Vec<&CallFrame> = tree.ancestors(node_id).map(|node| &node.call_frame).collect();
    frames.reverse();
    frames
}
