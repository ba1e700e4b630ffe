//! Layout - flexbox layout computation for component trees.
//!
//! # Architecture
//!
//! The layout module uses [Taffy](https://github.com/DioxusLabs/taffy) for
//! W3C-compliant flexbox computation. One pass:
//!
//! 1. `create_layout` builds an [`InternalNode`] tree in a [`LayoutArena`]
//! 2. The bridge converts node styles to Taffy styles and builds a Taffy tree
//! 3. Nodes with a measure binding resolve through the measure bridge
//!    (nested trees, cached diff records, or the component's `on_measure`)
//! 4. Computed geometry is written back and finalized into absolute bounds
//!
//! [`LayoutState::calculate`] drives the whole pass and is the public entry
//! point.

mod arena;
mod bridge;
mod layout_state;
mod measure;
mod node;

pub use arena::{LayoutArena, NodeId};
pub use layout_state::LayoutState;
pub use node::{DiffNode, InternalNode, NodeFlags};

use crate::component::{Component, ComponentContext};
use crate::types::FlexStyle;

// =============================================================================
// LayoutContext
// =============================================================================

/// Everything a layout-creation callback needs: the arena new nodes are
/// allocated from and the ambient component context (tree props, size specs)
/// for the subtree being built.
pub struct LayoutContext<'a> {
    arena: &'a mut LayoutArena,
    context: ComponentContext,
}

impl<'a> LayoutContext<'a> {
    pub fn new(arena: &'a mut LayoutArena, context: ComponentContext) -> Self {
        Self { arena, context }
    }

    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ComponentContext {
        &mut self.context
    }

    pub fn arena(&self) -> &LayoutArena {
        self.arena
    }

    pub fn arena_mut(&mut self) -> &mut LayoutArena {
        self.arena
    }

    /// Allocate a bare node bound to the current context.
    pub fn acquire_node(&mut self) -> NodeId {
        self.arena.acquire(self.context.clone())
    }

    /// Allocate a container node with the given style.
    pub fn container(&mut self, style: FlexStyle) -> NodeId {
        let id = self.acquire_node();
        self.arena.node_mut(id).set_style(style);
        id
    }

    pub fn set_style(&mut self, id: NodeId, style: FlexStyle) {
        self.arena.node_mut(id).set_style(style);
    }

    /// Append `child` to `parent`'s child list. A null child is ignored.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.arena.add_child(parent, child);
    }

    /// Create the layout of a child component in this context.
    ///
    /// Nested-tree kinds come back as deferred holder nodes; their
    /// sub-layout is resolved at measure time.
    pub fn child_component(&mut self, component: &Component) -> NodeId {
        component.create_layout(self, false)
    }
}
