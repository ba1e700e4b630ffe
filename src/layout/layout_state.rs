//! LayoutState - one resolved layout pass.
//!
//! `calculate` drives the whole pass: build the node tree from the root
//! component, carry cached measurements over from the previous pass by
//! positional correspondence, run the flexbox engine, then finalize
//! (absolute bounds, `on_bounds_defined`, baselines).
//!
//! Nested trees are resolved here as well, on demand from the measure
//! bridge, memoized per holder and exact spec pair.

use std::collections::HashMap;

use log::{debug, error, trace};

use crate::component::{Component, ComponentContext};
use crate::error::LayoutError;
use crate::layout::arena::{LayoutArena, NodeId};
use crate::layout::bridge::measure_tree;
use crate::layout::node::{DiffNode, InternalNode};
use crate::layout::LayoutContext;
use crate::types::{Rect, SizeSpec};

// =============================================================================
// Tree traversal
// =============================================================================

/// Depth-first walk over a tree, descending into resolved nested trees.
///
/// The coordinate passed to `f` is the path of child indices from the root;
/// a resolved nested tree continues its holder's path (holders have no
/// regular children).
pub(crate) fn walk_nodes(
    arena: &LayoutArena,
    id: NodeId,
    coord: &mut Vec<usize>,
    f: &mut impl FnMut(&[usize], NodeId, &InternalNode),
) {
    if id.is_null() {
        return;
    }
    let node = arena.node(id);
    f(coord, id, node);

    for (i, &child) in node.children().iter().enumerate() {
        coord.push(i);
        walk_nodes(arena, child, coord, f);
        coord.pop();
    }
    if let Some((nested, _, _)) = node.nested_tree() {
        coord.push(0);
        walk_nodes(arena, nested, coord, f);
        coord.pop();
    }
}

// =============================================================================
// Nested tree resolution
// =============================================================================

/// Resolve (or reuse) the nested sub-tree of a holder node for the given
/// size specs.
///
/// Memoized per `(holder, width_spec, height_spec)`: re-resolving with the
/// same specs returns the cached sub-tree; different specs release the stale
/// sub-tree back to the arena pool and resolve a fresh one.
pub(crate) fn resolve_nested_tree(
    arena: &mut LayoutArena,
    holder: NodeId,
    width_spec: SizeSpec,
    height_spec: SizeSpec,
) -> NodeId {
    if let Some((root, last_width, last_height)) = arena.node(holder).nested_tree() {
        if last_width == width_spec && last_height == height_spec {
            trace!("nested tree reused for unchanged specs");
            return root;
        }
        arena.release_tree(root);
        arena.node_mut(holder).set_nested_tree(None);
    }

    let (component, context) = {
        let node = arena.node(holder);
        let component = node
            .component()
            .cloned()
            .expect("nested-tree holder has no component");
        let mut context = node.context().with_size_specs(width_spec, height_spec);
        if let Some(pending) = node.pending_tree_props() {
            context.set_tree_props(pending.clone());
        }
        (component, context)
    };

    debug!(
        "resolving nested tree: {} [{:?} x {:?}]",
        component.name(),
        width_spec,
        height_spec
    );

    let root = {
        let mut lc = LayoutContext::new(arena, context);
        component.create_layout(&mut lc, true)
    };

    if !root.is_null() {
        if let Err(e) = measure_tree(arena, root, width_spec, height_spec) {
            error!("nested tree layout of {} failed: {e}", component.name());
        }
    }

    arena
        .node_mut(holder)
        .set_nested_tree(Some((root, width_spec, height_spec)));
    root
}

// =============================================================================
// LayoutState
// =============================================================================

/// The finished (or in-progress) result of one layout pass: a tree of
/// measured, positioned nodes ready to mount.
#[derive(Debug)]
pub struct LayoutState {
    arena: LayoutArena,
    root: NodeId,
    width_spec: SizeSpec,
    height_spec: SizeSpec,
}

impl LayoutState {
    /// Compute a layout for `root_component` under the given constraints.
    ///
    /// `previous` is the last pass for the same tree, if any; its
    /// measurements are carried over by positional correspondence so
    /// unchanged nodes skip remeasurement entirely.
    pub fn calculate(
        context: &ComponentContext,
        root_component: Component,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
        previous: Option<&LayoutState>,
    ) -> Result<LayoutState, LayoutError> {
        debug!(
            "calculate: {} [{:?} x {:?}]",
            root_component.name(),
            width_spec,
            height_spec
        );

        let mut arena = LayoutArena::new();
        let pass_context = context.with_size_specs(width_spec, height_spec);

        let root = {
            let mut lc = LayoutContext::new(&mut arena, pass_context);
            root_component.create_layout(&mut lc, true)
        };

        let mut state = LayoutState {
            arena,
            root,
            width_spec,
            height_spec,
        };

        if state.root.is_null() {
            return Ok(state);
        }

        if let Some(previous) = previous {
            state.apply_diff_records(previous);
        }

        measure_tree(&mut state.arena, state.root, width_spec, height_spec)?;
        state.finalize();

        Ok(state)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether this pass produced no layout at all.
    pub fn is_empty(&self) -> bool {
        self.root.is_null()
    }

    pub fn width_spec(&self) -> SizeSpec {
        self.width_spec
    }

    pub fn height_spec(&self) -> SizeSpec {
        self.height_spec
    }

    /// Resolved width of the root, zero for an empty layout.
    pub fn width(&self) -> i32 {
        if self.root.is_null() {
            0
        } else {
            self.arena.node(self.root).width()
        }
    }

    /// Resolved height of the root, zero for an empty layout.
    pub fn height(&self) -> i32 {
        if self.root.is_null() {
            0
        } else {
            self.arena.node(self.root).height()
        }
    }

    pub fn node(&self, id: NodeId) -> &InternalNode {
        self.arena.node(id)
    }

    /// Visit every node of the finished tree (nested trees included) with
    /// its positional coordinate.
    pub fn visit(&self, mut f: impl FnMut(&[usize], NodeId, &InternalNode)) {
        walk_nodes(&self.arena, self.root, &mut Vec::new(), &mut f);
    }

    // -------------------------------------------------------------------------
    // Cross-pass diffing
    // -------------------------------------------------------------------------

    /// Carry measurement records over from the previous pass.
    ///
    /// Records are matched by tree coordinate and reused only when the
    /// component kind at that position is unchanged.
    fn apply_diff_records(&mut self, previous: &LayoutState) {
        let mut records: HashMap<Vec<usize>, DiffNode> = HashMap::new();
        walk_nodes(
            &previous.arena,
            previous.root,
            &mut Vec::new(),
            &mut |coord, _id, node| {
                let record = node.diff().or_else(|| {
                    // A node measured this pass but never diffed before
                    // still yields a usable record.
                    Some(DiffNode {
                        lifecycle_id: node.component()?.id(),
                        last_width_spec: node.last_width_spec()?,
                        last_height_spec: node.last_height_spec()?,
                        last_measured_width: node.last_measured_width()?,
                        last_measured_height: node.last_measured_height()?,
                    })
                });
                if let Some(record) = record {
                    records.insert(coord.to_vec(), record);
                }
            },
        );

        if records.is_empty() {
            return;
        }

        let mut matched: Vec<(NodeId, DiffNode)> = Vec::new();
        walk_nodes(&self.arena, self.root, &mut Vec::new(), &mut |coord,
                                                                  id,
                                                                  node| {
            let Some(component) = node.component() else {
                return;
            };
            if let Some(record) = records.get(coord) {
                if record.lifecycle_id == component.id() {
                    matched.push((id, *record));
                }
            }
        });

        debug!("carrying over {} cached measurements", matched.len());
        for (id, record) in matched {
            let node = self.arena.node_mut(id);
            node.set_diff(record);
            node.set_cached_measures_valid(true);
        }
    }

    // -------------------------------------------------------------------------
    // Finalization
    // -------------------------------------------------------------------------

    /// Assign absolute bounds, fire `on_bounds_defined`, and run the
    /// baseline bridge for nodes that carry the baseline binding.
    fn finalize(&mut self) {
        finalize_node(&mut self.arena, self.root, 0, 0);
    }
}

fn finalize_node(arena: &mut LayoutArena, id: NodeId, parent_x: i32, parent_y: i32) {
    if id.is_null() {
        return;
    }

    let bounds = {
        let node = arena.node(id);
        Rect::new(
            parent_x + node.x(),
            parent_y + node.y(),
            node.width(),
            node.height(),
        )
    };
    arena.node_mut(id).set_absolute_bounds(bounds);

    if let Some(component) = arena.node(id).component().cloned() {
        {
            let node = arena.node(id);
            component
                .lifecycle()
                .on_bounds_defined(node.context(), node, &component);
        }

        if arena.node(id).has_baseline_binding() {
            let baseline = {
                let node = arena.node(id);
                component
                    .lifecycle()
                    .on_measure_baseline(node.context(), bounds.width, bounds.height)
            };
            arena.node_mut(id).set_baseline(baseline);
        }
    }

    let children: Vec<NodeId> = arena.node(id).children().to_vec();
    for child in children {
        finalize_node(arena, child, bounds.x, bounds.y);
    }
    if let Some((nested, _, _)) = arena.node(id).nested_tree() {
        finalize_node(arena, nested, bounds.x, bounds.y);
    }
}

// =============================================================================
// Tests
// =============================================================================
