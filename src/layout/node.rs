//! InternalNode - one node of the resolved layout tree.
//!
//! A node holds its owning component, flexbox style, resolved geometry, the
//! size specs and measurements from its most recent measure call, and the
//! diff record carried over from the previous pass. Measure/baseline
//! bindings are capability flags: the bridge only measures nodes that carry
//! the measure flag, which `create_layout` attaches for measurable mount
//! specs and deferred nested-tree holders.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::component::{Component, ComponentContext, LifecycleId, TreeProps};
use crate::layout::arena::NodeId;
use crate::types::{FlexStyle, Rect, SizeSpec};

bitflags! {
    /// Per-node capability and state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        /// The flexbox engine must call the measure bridge for this node.
        const MEASURE_FUNCTION = 1 << 0;
        /// The baseline bridge runs for this node once geometry is known.
        const BASELINE_FUNCTION = 1 << 1;
        /// Placeholder for a nested tree resolved later, at measure time.
        const NESTED_TREE_HOLDER = 1 << 2;
        /// The diff record's cached measurement may be reused.
        const CACHED_MEASURES_VALID = 1 << 3;
    }
}

// =============================================================================
// DiffNode
// =============================================================================

/// Cached outcome of a previous measurement, matched positionally across
/// passes.
///
/// The cached size is reusable only when both stored specs equal a new
/// request exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffNode {
    pub lifecycle_id: LifecycleId,
    pub last_width_spec: SizeSpec,
    pub last_height_spec: SizeSpec,
    pub last_measured_width: i32,
    pub last_measured_height: i32,
}

impl DiffNode {
    /// Whether the cached measurement answers the given request.
    pub fn matches(&self, width_spec: SizeSpec, height_spec: SizeSpec) -> bool {
        self.last_width_spec == width_spec && self.last_height_spec == height_spec
    }
}

// =============================================================================
// InternalNode
// =============================================================================

/// One node of the resolved layout tree.
#[derive(Debug)]
pub struct InternalNode {
    context: ComponentContext,
    component: Option<Component>,
    style: FlexStyle,
    children: SmallVec<[NodeId; 4]>,
    flags: NodeFlags,

    // Geometry relative to the parent, assigned by the flexbox pass.
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    /// Bounds in tree-absolute coordinates, assigned by the finalize walk.
    absolute_bounds: Rect,
    baseline: Option<i32>,

    last_width_spec: Option<SizeSpec>,
    last_height_spec: Option<SizeSpec>,
    last_measured_width: Option<i32>,
    last_measured_height: Option<i32>,

    diff: Option<DiffNode>,
    /// Resolved nested sub-tree, memoized by the specs it was resolved for.
    nested_tree: Option<(NodeId, SizeSpec, SizeSpec)>,
    /// Tree props captured when this node was marked as a nested-tree holder.
    pending_tree_props: Option<TreeProps>,
}

impl InternalNode {
    pub(crate) fn new(context: ComponentContext) -> Self {
        Self {
            context,
            component: None,
            style: FlexStyle::default(),
            children: SmallVec::new(),
            flags: NodeFlags::empty(),
            x: 0,
            y: 0,
            width: 0,
            height: 0,
            absolute_bounds: Rect::default(),
            baseline: None,
            last_width_spec: None,
            last_height_spec: None,
            last_measured_width: None,
            last_measured_height: None,
            diff: None,
            nested_tree: None,
            pending_tree_props: None,
        }
    }

    // -------------------------------------------------------------------------
    // Component and context
    // -------------------------------------------------------------------------

    pub fn component(&self) -> Option<&Component> {
        self.component.as_ref()
    }

    /// Attach the owning component. Set exactly once per layout pass.
    pub fn set_component(&mut self, component: Component) {
        debug_assert!(
            self.component.is_none(),
            "component set twice on one node in a single pass"
        );
        self.component = Some(component);
    }

    pub fn context(&self) -> &ComponentContext {
        &self.context
    }

    // -------------------------------------------------------------------------
    // Style and children
    // -------------------------------------------------------------------------

    pub fn style(&self) -> &FlexStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: FlexStyle) {
        self.style = style;
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn push_child(&mut self, child: NodeId) {
        self.children.push(child);
    }

    // -------------------------------------------------------------------------
    // Bindings and flags
    // -------------------------------------------------------------------------

    pub fn set_measure_binding(&mut self) {
        self.flags.insert(NodeFlags::MEASURE_FUNCTION);
    }

    pub fn has_measure_binding(&self) -> bool {
        self.flags.contains(NodeFlags::MEASURE_FUNCTION)
    }

    pub fn set_baseline_binding(&mut self) {
        self.flags.insert(NodeFlags::BASELINE_FUNCTION);
    }

    pub fn has_baseline_binding(&self) -> bool {
        self.flags.contains(NodeFlags::BASELINE_FUNCTION)
    }

    /// Mark this node as a deferred nested-tree placeholder, capturing the
    /// tree props its sub-tree will be resolved under.
    pub fn mark_nested_tree_holder(&mut self, pending_props: TreeProps) {
        self.flags.insert(NodeFlags::NESTED_TREE_HOLDER);
        self.pending_tree_props = Some(pending_props);
    }

    pub fn is_nested_tree_holder(&self) -> bool {
        self.flags.contains(NodeFlags::NESTED_TREE_HOLDER)
    }

    pub fn pending_tree_props(&self) -> Option<&TreeProps> {
        self.pending_tree_props.as_ref()
    }

    pub fn set_cached_measures_valid(&mut self, valid: bool) {
        self.flags.set(NodeFlags::CACHED_MEASURES_VALID, valid);
    }

    pub fn are_cached_measures_valid(&self) -> bool {
        self.flags.contains(NodeFlags::CACHED_MEASURES_VALID)
    }

    // -------------------------------------------------------------------------
    // Geometry
    // -------------------------------------------------------------------------

    pub fn set_bounds(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub(crate) fn set_absolute_bounds(&mut self, bounds: Rect) {
        self.absolute_bounds = bounds;
    }

    /// Bounds in tree-absolute coordinates (valid after the pass finishes).
    pub fn absolute_bounds(&self) -> Rect {
        self.absolute_bounds
    }

    pub fn baseline(&self) -> Option<i32> {
        self.baseline
    }

    pub(crate) fn set_baseline(&mut self, baseline: i32) {
        self.baseline = Some(baseline);
    }

    // -------------------------------------------------------------------------
    // Measurement bookkeeping
    // -------------------------------------------------------------------------

    pub fn last_width_spec(&self) -> Option<SizeSpec> {
        self.last_width_spec
    }

    pub fn last_height_spec(&self) -> Option<SizeSpec> {
        self.last_height_spec
    }

    pub(crate) fn set_last_specs(&mut self, width_spec: SizeSpec, height_spec: SizeSpec) {
        self.last_width_spec = Some(width_spec);
        self.last_height_spec = Some(height_spec);
    }

    pub fn last_measured_width(&self) -> Option<i32> {
        self.last_measured_width
    }

    pub fn last_measured_height(&self) -> Option<i32> {
        self.last_measured_height
    }

    pub(crate) fn set_last_measured(&mut self, width: i32, height: i32) {
        self.last_measured_width = Some(width);
        self.last_measured_height = Some(height);
    }

    pub fn diff(&self) -> Option<DiffNode> {
        self.diff
    }

    pub(crate) fn set_diff(&mut self, diff: DiffNode) {
        self.diff = Some(diff);
    }

    pub fn nested_tree(&self) -> Option<(NodeId, SizeSpec, SizeSpec)> {
        self.nested_tree
    }

    pub(crate) fn set_nested_tree(&mut self, nested: Option<(NodeId, SizeSpec, SizeSpec)>) {
        self.nested_tree = nested;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diff_node_matches_exact_specs_only() {
        let diff = DiffNode {
            lifecycle_id: LifecycleId::next(),
            last_width_spec: SizeSpec::exactly(100),
            last_height_spec: SizeSpec::at_most(50),
            last_measured_width: 100,
            last_measured_height: 20,
        };

        assert!(diff.matches(SizeSpec::exactly(100), SizeSpec::at_most(50)));
        assert!(!diff.matches(SizeSpec::exactly(100), SizeSpec::at_most(51)));
        assert!(!diff.matches(SizeSpec::at_most(100), SizeSpec::at_most(50)));
        assert!(!diff.matches(SizeSpec::exactly(100), SizeSpec::exactly(50)));
    }

    #[test]
    fn test_flags_default_empty() {
        let node = InternalNode::new(ComponentContext::new());
        assert!(!node.has_measure_binding());
        assert!(!node.has_baseline_binding());
        assert!(!node.is_nested_tree_holder());
        assert!(!node.are_cached_measures_valid());
    }

    #[test]
    fn test_nested_tree_holder_keeps_pending_props() {
        let mut node = InternalNode::new(ComponentContext::new());
        let mut props = TreeProps::new();
        props.set("scope", 7u32);

        node.mark_nested_tree_holder(props.clone());
        assert!(node.is_nested_tree_holder());
        assert!(node.pending_tree_props().is_some_and(|p| p.same(&props)));
    }
}
