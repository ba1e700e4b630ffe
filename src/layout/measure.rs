//! Measure bridge - custom measurement between the flexbox engine and
//! component lifecycles.
//!
//! The flexbox engine calls [`measure_node`] for every node carrying a
//! measure binding. Resolution order, first match wins:
//!
//! 1. Nested-tree kind: resolve (or reuse) the nested sub-tree for these
//!    exact specs and take its size.
//! 2. Valid diff record whose stored specs equal the request bitwise: reuse
//!    the cached size without invoking the component at all.
//! 3. Invoke the component's `on_measure` with a pooled, sentinel-poisoned
//!    [`Size`], validate the result, and record it for future reuse.
//!
//! All pooled objects are released before returning, including when a
//! component callback panics.

use log::trace;
use taffy::AvailableSpace;

use crate::layout::arena::{LayoutArena, NodeId};
use crate::layout::layout_state::resolve_nested_tree;
use crate::layout::node::DiffNode;
use crate::pools;
use crate::types::SizeSpec;

/// Convert one axis of the engine's measurement request into a size spec.
///
/// A known dimension is an exact constraint; a definite available space is
/// an upper bound; anything else leaves the axis unconstrained.
pub(crate) fn to_size_spec(known: Option<f32>, available: AvailableSpace) -> SizeSpec {
    if let Some(value) = known {
        return SizeSpec::exactly(value.round() as i32);
    }
    match available {
        AvailableSpace::Definite(value) => SizeSpec::at_most(value.round() as i32),
        AvailableSpace::MinContent | AvailableSpace::MaxContent => SizeSpec::unspecified(),
    }
}

/// Measure one node for the flexbox engine.
///
/// Mutates the node's last-requested specs, last-measured size, and diff
/// record; resolving a nested tree additionally allocates its sub-tree in
/// the arena.
pub(crate) fn measure_node(
    arena: &mut LayoutArena,
    id: NodeId,
    known_dimensions: taffy::Size<Option<f32>>,
    available_space: taffy::Size<AvailableSpace>,
) -> taffy::Size<f32> {
    let width_spec = to_size_spec(known_dimensions.width, available_space.width);
    let height_spec = to_size_spec(known_dimensions.height, available_space.height);

    let (component, cached_diff) = {
        let node = arena.node_mut(id);
        debug_assert!(
            node.has_measure_binding(),
            "measure requested for a node without a measure binding"
        );
        node.set_last_specs(width_spec, height_spec);

        let cached = if node.are_cached_measures_valid() {
            node.diff()
        } else {
            None
        };
        (node.component().cloned(), cached)
    };

    let Some(component) = component else {
        return taffy::Size::ZERO;
    };

    trace!("measure: {}", component.name());

    let output_width;
    let output_height;

    if component.is_nested_tree() {
        let nested = resolve_nested_tree(arena, id, width_spec, height_spec);
        if nested.is_null() {
            output_width = 0;
            output_height = 0;
        } else {
            let tree = arena.node(nested);
            output_width = tree.width();
            output_height = tree.height();
        }
    } else if let Some(diff) = cached_diff.filter(|d| d.matches(width_spec, height_spec)) {
        trace!("measure cache hit: {}", component.name());
        output_width = diff.last_measured_width;
        output_height = diff.last_measured_height;
    } else {
        let mut size = pools::acquire_size();
        {
            let node = arena.node(id);
            component.lifecycle().on_measure(
                node.context(),
                node,
                width_spec,
                height_spec,
                &mut size,
                &component,
            );
        }

        if size.width < 0 || size.height < 0 {
            panic!(
                "on_measure of {} did not set a non-negative size (got {} x {})",
                component.name(),
                size.width,
                size.height
            );
        }

        output_width = size.width;
        output_height = size.height;

        let node = arena.node_mut(id);
        node.set_diff(DiffNode {
            lifecycle_id: component.id(),
            last_width_spec: width_spec,
            last_height_spec: height_spec,
            last_measured_width: output_width,
            last_measured_height: output_height,
        });
        node.set_cached_measures_valid(true);
        // `size` is released back to the pool here, panic or not.
    }

    arena
        .node_mut(id)
        .set_last_measured(output_width, output_height);

    taffy::Size {
        width: output_width as f32,
        height: output_height as f32,
    }
}

// =============================================================================
// Tests
// =============================================================================
