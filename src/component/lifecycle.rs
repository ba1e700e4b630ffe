//! ComponentLifecycle - the per-kind behavior singleton.
//!
//! A lifecycle is a stateless object shared by every [`Component`] instance
//! of one concrete kind. It defines how those components create their layout
//! tree, measure themselves, and mount native content. Per-instance state
//! never lives here; a lifecycle holds behavior only.
//!
//! `create_layout` (on [`Component`]) is the orchestration entry point: it
//! dispatches to the lifecycle callbacks, handles deferred nested-tree
//! resolution, attaches measure/baseline bindings, and scopes the ambient
//! [`TreeProps`] map around the subtree.

use std::sync::atomic::{AtomicU32, Ordering};

use log::trace;

use crate::component::{Component, ComponentContext, TreeProps};
use crate::layout::{InternalNode, LayoutContext, NodeId};
use crate::pools::Size;
use crate::types::{FlexStyle, MountContent, MountType, SizeSpec};

// =============================================================================
// Lifecycle identity
// =============================================================================

/// Identity of one component kind.
///
/// Allocated from a process-wide monotonic counter when the kind's lifecycle
/// singleton is constructed. Used for diff compatibility checks and for the
/// mount-content preallocation pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LifecycleId(u32);

static LIFECYCLE_ID_COUNTER: AtomicU32 = AtomicU32::new(0);

impl LifecycleId {
    /// Allocate the next id. Safe to call from any thread.
    pub fn next() -> Self {
        Self(LIFECYCLE_ID_COUNTER.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn raw(self) -> u32 {
        self.0
    }
}

/// How many unmounted content objects are kept for reuse per kind.
pub const DEFAULT_MAX_PREALLOCATION: usize = 15;

// =============================================================================
// Lifecycle trait
// =============================================================================

/// Behavior callbacks for one component kind.
///
/// Implementations are singletons: construct one instance per kind, wrap it
/// in an `Arc`, and share it across every [`Component`] of that kind. The
/// implementation must hold no per-instance mutable state.
pub trait ComponentLifecycle: Send + Sync {
    /// The kind's id, allocated via [`LifecycleId::next`] at construction.
    fn id(&self) -> LifecycleId;

    /// Kind name used in logs and contract-violation messages.
    fn name(&self) -> &'static str;

    /// What native content this kind mounts, if any.
    fn mount_type(&self) -> MountType {
        MountType::None
    }

    /// Whether this kind measures itself against size constraints.
    ///
    /// Returning `true` requires overriding [`ComponentLifecycle::on_measure`].
    fn can_measure(&self) -> bool {
        false
    }

    /// Whether mounted content hosts nested component content that can be
    /// mounted incrementally.
    fn can_mount_incrementally(&self) -> bool {
        false
    }

    /// Whether drawable content should cache its drawing in a display list.
    fn should_use_display_list(&self) -> bool {
        false
    }

    /// Bound on recycled mount content kept for this kind.
    fn max_preallocated_content(&self) -> usize {
        DEFAULT_MAX_PREALLOCATION
    }

    /// Generate the layout tree for the component.
    ///
    /// The default is a bare column container, matching the framework's
    /// canonical container defaults.
    fn on_create_layout(&self, c: &mut LayoutContext<'_>, component: &Component) -> NodeId {
        let _ = component;
        c.container(FlexStyle::column())
    }

    /// Generate the layout tree when this kind needs concrete size
    /// constraints to decide what to render.
    fn on_create_layout_with_size_spec(
        &self,
        c: &mut LayoutContext<'_>,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
        component: &Component,
    ) -> NodeId {
        let _ = (width_spec, height_spec, component);
        c.container(FlexStyle::column())
    }

    /// Pre-layout side effects, run once per layout pass (skipped for
    /// deferred nested-tree holders).
    fn on_prepare(&self, c: &ComponentContext, component: &Component) {
        let _ = (c, component);
    }

    /// Load style values before layout creation.
    fn on_load_style(&self, c: &ComponentContext, component: &Component) {
        let _ = (c, component);
    }

    /// Compute (width, height) for the given constraints into `size`.
    ///
    /// Must be overridden whenever [`ComponentLifecycle::can_measure`] is
    /// true; the default is a fatal contract violation.
    fn on_measure(
        &self,
        c: &ComponentContext,
        layout: &InternalNode,
        width_spec: SizeSpec,
        height_spec: SizeSpec,
        size: &mut Size,
        component: &Component,
    ) {
        let _ = (c, layout, width_spec, height_spec, size, component);
        panic!(
            "{} returned true from can_measure() but does not override on_measure()",
            self.name()
        );
    }

    /// Baseline of the component given its resolved size. Defaults to the
    /// full height (baseline at the bottom edge).
    fn on_measure_baseline(&self, c: &ComponentContext, width: i32, height: i32) -> i32 {
        let _ = (c, width);
        height
    }

    /// Called once final geometry is assigned to the node.
    fn on_bounds_defined(&self, c: &ComponentContext, layout: &InternalNode, component: &Component) {
        let _ = (c, layout, component);
    }

    /// Create the native content this kind mounts.
    ///
    /// There is no default path: a kind whose [`mount_type`] is not
    /// [`MountType::None`] must supply one.
    ///
    /// [`mount_type`]: ComponentLifecycle::mount_type
    fn on_create_mount_content(&self, c: &ComponentContext) -> MountContent {
        let _ = c;
        panic!(
            "{} mounts content but does not implement on_create_mount_content()",
            self.name()
        );
    }

    /// Set the mounted content up with the component's props.
    fn on_mount(&self, c: &ComponentContext, content: &mut MountContent, component: &Component) {
        let _ = (c, content, component);
    }

    /// Attach dynamic behavior to already-mounted content.
    fn on_bind(&self, c: &ComponentContext, content: &mut MountContent, component: &Component) {
        let _ = (c, content, component);
    }

    /// Detach dynamic behavior; inverse of [`ComponentLifecycle::on_bind`].
    fn on_unbind(&self, c: &ComponentContext, content: &mut MountContent, component: &Component) {
        let _ = (c, content, component);
    }

    /// Tear mounted content down; inverse of [`ComponentLifecycle::on_mount`].
    fn on_unmount(&self, c: &ComponentContext, content: &mut MountContent, component: &Component) {
        let _ = (c, content, component);
    }

    /// Produce the `TreeProps` map visible to this component's children.
    /// Defaults to the parent's map unchanged.
    fn tree_props_for_children(
        &self,
        c: &ComponentContext,
        component: &Component,
        parent: &TreeProps,
    ) -> TreeProps {
        let _ = (c, component);
        parent.clone()
    }
}

// =============================================================================
// Layout creation
// =============================================================================

impl Component {
    /// Create a layout tree for this component.
    ///
    /// When the component is a nested-tree kind and `resolve_nested_tree` is
    /// false, returns an empty placeholder node marked as a nested-tree
    /// holder; the sub-layout is resolved later, once concrete size
    /// constraints are known.
    ///
    /// A callback that yields no node produces [`NodeId::NULL`]: rendering
    /// nothing is legitimate, not an error.
    pub fn create_layout(&self, lc: &mut LayoutContext<'_>, resolve_nested_tree: bool) -> NodeId {
        let defer_nested_tree = self.is_nested_tree() && !resolve_nested_tree;

        let parent_props = lc.context().tree_props().clone();
        let child_props = self
            .lifecycle()
            .tree_props_for_children(lc.context(), self, &parent_props);
        lc.context_mut().set_tree_props(child_props);

        trace!("create_layout: {}", self.name());

        let node = if defer_nested_tree {
            let pending = lc.context().tree_props().clone();
            let id = lc.acquire_node();
            lc.arena_mut().node_mut(id).mark_nested_tree_holder(pending);
            id
        } else if self.is_layout_spec_with_size_spec() {
            self.lifecycle().on_load_style(lc.context(), self);
            let width_spec = lc.context().width_spec().unwrap_or_default();
            let height_spec = lc.context().height_spec().unwrap_or_default();
            self.lifecycle()
                .on_create_layout_with_size_spec(lc, width_spec, height_spec, self)
        } else {
            self.lifecycle().on_load_style(lc.context(), self);
            self.lifecycle().on_create_layout(lc, self)
        };

        if node.is_null() {
            lc.context_mut().set_tree_props(parent_props);
            return NodeId::NULL;
        }

        // The callback may have delegated entirely to a child component, in
        // which case the returned root already belongs to that child.
        if lc.arena().node(node).component().is_none() {
            let measurable_mount = self.lifecycle().can_measure() && self.is_mount_spec();

            let n = lc.arena_mut().node_mut(node);
            n.set_component(self.clone());
            n.set_baseline_binding();
            if measurable_mount || defer_nested_tree {
                n.set_measure_binding();
            }
        }

        if !defer_nested_tree {
            self.lifecycle().on_prepare(lc.context(), self);
        }

        lc.context_mut().set_tree_props(parent_props);
        node
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::layout::LayoutArena;

    struct PlainLayout {
        id: LifecycleId,
    }

    impl PlainLayout {
        fn new() -> Self {
            Self {
                id: LifecycleId::next(),
            }
        }
    }

    impl ComponentLifecycle for PlainLayout {
        fn id(&self) -> LifecycleId {
            self.id
        }

        fn name(&self) -> &'static str {
            "PlainLayout"
        }
    }

    struct NestedTreeSpec {
        id: LifecycleId,
    }

    impl NestedTreeSpec {
        fn new() -> Self {
            Self {
                id: LifecycleId::next(),
            }
        }
    }

    impl ComponentLifecycle for NestedTreeSpec {
        fn id(&self) -> LifecycleId {
            self.id
        }

        fn name(&self) -> &'static str {
            "NestedTreeSpec"
        }

        // Layout spec (mount_type None) + can_measure = nested-tree kind.
        fn can_measure(&self) -> bool {
            true
        }
    }

    struct MeasurableMount {
        id: LifecycleId,
    }

    impl MeasurableMount {
        fn new() -> Self {
            Self {
                id: LifecycleId::next(),
            }
        }
    }

    impl ComponentLifecycle for MeasurableMount {
        fn id(&self) -> LifecycleId {
            self.id
        }

        fn name(&self) -> &'static str {
            "MeasurableMount"
        }

        fn mount_type(&self) -> MountType {
            MountType::Drawable
        }

        fn can_measure(&self) -> bool {
            true
        }

        fn on_create_layout(&self, c: &mut LayoutContext<'_>, _component: &Component) -> NodeId {
            c.acquire_node()
        }
    }

    struct EmptySpec {
        id: LifecycleId,
    }

    impl ComponentLifecycle for EmptySpec {
        fn id(&self) -> LifecycleId {
            self.id
        }

        fn name(&self) -> &'static str {
            "EmptySpec"
        }

        fn on_create_layout(&self, _c: &mut LayoutContext<'_>, _component: &Component) -> NodeId {
            NodeId::NULL
        }
    }

    #[test]
    fn test_lifecycle_ids_are_unique_and_increasing() {
        let a = LifecycleId::next();
        let b = LifecycleId::next();
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_create_layout_attaches_component() {
        let component = Component::new(Arc::new(PlainLayout::new()));
        let mut arena = LayoutArena::new();
        let mut lc = LayoutContext::new(&mut arena, ComponentContext::new());

        let node = component.create_layout(&mut lc, false);
        assert!(!node.is_null());

        let n = arena.node(node);
        assert!(n.component().is_some());
        assert!(n.has_baseline_binding());
        // Plain layout spec: no custom measurement, no nested tree.
        assert!(!n.has_measure_binding());
        assert!(!n.is_nested_tree_holder());
    }

    #[test]
    fn test_measurable_mount_gets_measure_binding() {
        let component = Component::new(Arc::new(MeasurableMount::new()));
        let mut arena = LayoutArena::new();
        let mut lc = LayoutContext::new(&mut arena, ComponentContext::new());

        let node = component.create_layout(&mut lc, false);
        assert!(arena.node(node).has_measure_binding());
    }

    #[test]
    fn test_nested_tree_is_deferred() {
        let component = Component::new(Arc::new(NestedTreeSpec::new()));
        let mut arena = LayoutArena::new();
        let mut lc = LayoutContext::new(&mut arena, ComponentContext::new());

        let node = component.create_layout(&mut lc, false);
        let n = arena.node(node);
        assert!(n.is_nested_tree_holder());
        assert!(n.has_measure_binding());
        // Deferred: no geometry resolved yet.
        assert!(n.last_measured_width().is_none());
        assert!(n.last_measured_height().is_none());
    }

    #[test]
    fn test_nested_tree_resolved_when_forced() {
        let component = Component::new(Arc::new(NestedTreeSpec::new()));
        let mut arena = LayoutArena::new();
        let context =
            ComponentContext::new().with_size_specs(SizeSpec::exactly(100), SizeSpec::exactly(50));
        let mut lc = LayoutContext::new(&mut arena, context);

        let node = component.create_layout(&mut lc, true);
        assert!(!arena.node(node).is_nested_tree_holder());
        assert!(arena.node(node).component().is_some());
    }

    #[test]
    fn test_null_layout_for_empty_spec() {
        let component = Component::new(Arc::new(EmptySpec {
            id: LifecycleId::next(),
        }));
        let mut arena = LayoutArena::new();
        let mut lc = LayoutContext::new(&mut arena, ComponentContext::new());

        let node = component.create_layout(&mut lc, false);
        assert!(node.is_null());
    }

    #[test]
    fn test_tree_props_restored_after_create_layout() {
        struct Publisher {
            id: LifecycleId,
        }

        impl ComponentLifecycle for Publisher {
            fn id(&self) -> LifecycleId {
                self.id
            }

            fn name(&self) -> &'static str {
                "Publisher"
            }

            fn tree_props_for_children(
                &self,
                _c: &ComponentContext,
                _component: &Component,
                parent: &TreeProps,
            ) -> TreeProps {
                let mut props = parent.clone();
                props.set("depth", 1i32);
                props
            }
        }

        let component = Component::new(Arc::new(Publisher {
            id: LifecycleId::next(),
        }));
        let mut arena = LayoutArena::new();
        let mut context = ComponentContext::new();
        let mut before = TreeProps::new();
        before.set("theme", "dark");
        context.set_tree_props(before.clone());

        let mut lc = LayoutContext::new(&mut arena, context);
        component.create_layout(&mut lc, false);

        // The map visible afterwards is the parent's map.
        assert!(lc.context().tree_props().same(&before));
        assert!(!lc.context().tree_props().contains("depth"));
    }

    #[test]
    fn test_create_layout_idempotent() {
        let component = Component::new(Arc::new(PlainLayout::new()));
        let mut arena = LayoutArena::new();

        let mut lc = LayoutContext::new(&mut arena, ComponentContext::new());
        let first = component.create_layout(&mut lc, false);
        let second = component.create_layout(&mut lc, false);

        let a = arena.node(first);
        let b = arena.node(second);
        assert_eq!(a.style(), b.style());
        assert_eq!(a.child_count(), b.child_count());
        assert_eq!(
            a.component().map(|c| c.id()),
            b.component().map(|c| c.id())
        );
    }
}
