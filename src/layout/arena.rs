//! Layout node arena - pooled allocation for layout tree nodes.
//!
//! Nodes are slots in a contiguous arena addressed by [`NodeId`]. Released
//! slots go onto a free list for O(1) reuse, so building and re-resolving
//! trees within a pass does not allocate per node once the arena has warmed
//! up. One arena backs one layout pass; releasing never invalidates other
//! ids.

use crate::component::ComponentContext;
use crate::layout::node::InternalNode;

// =============================================================================
// NodeId
// =============================================================================

/// Handle to a node in a [`LayoutArena`].
///
/// [`NodeId::NULL`] is the canonical "null layout": a component that renders
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The canonical empty layout.
    pub const NULL: NodeId = NodeId(usize::MAX);

    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Pool-backed storage for the nodes of one layout tree.
#[derive(Debug, Default)]
pub struct LayoutArena {
    nodes: Vec<Option<InternalNode>>,
    free: Vec<usize>,
}

impl LayoutArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire a pristine node bound to the given context, reusing a freed
    /// slot when one is available.
    pub fn acquire(&mut self, context: ComponentContext) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                self.nodes[index] = Some(InternalNode::new(context));
                NodeId(index)
            }
            None => {
                self.nodes.push(Some(InternalNode::new(context)));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    /// Release a node and its entire subtree back to the pool.
    pub fn release_tree(&mut self, id: NodeId) {
        if id.is_null() {
            return;
        }
        let Some(node) = self.nodes.get_mut(id.0).and_then(Option::take) else {
            return;
        };

        for child in node.children() {
            self.release_tree(*child);
        }
        if let Some((nested, _, _)) = node.nested_tree() {
            self.release_tree(nested);
        }
        self.free.push(id.0);
    }

    pub fn node(&self, id: NodeId) -> &InternalNode {
        self.nodes
            .get(id.0)
            .and_then(Option::as_ref)
            .expect("stale or null NodeId")
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut InternalNode {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .expect("stale or null NodeId")
    }

    /// Append `child` to `parent`'s child list.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        if child.is_null() {
            return;
        }
        self.node_mut(parent).push_child(child);
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Tests
// =============================================================================
