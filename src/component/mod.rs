//! Component model - immutable render descriptions plus their behavior.
//!
//! - [`Component`] - an immutable "what to render" instance sharing its
//!   kind's [`ComponentLifecycle`] singleton
//! - [`ComponentContext`] - per-tree ambient state (tree props, current
//!   size constraints) passed by value into recursive layout calls
//! - [`TreeProps`] - the inherited key-value map

mod lifecycle;
mod tree_props;

use std::fmt;
use std::sync::Arc;

pub use lifecycle::{ComponentLifecycle, LifecycleId, DEFAULT_MAX_PREALLOCATION};
pub use tree_props::TreeProps;

use crate::types::{MountType, SizeSpec};

// =============================================================================
// Component
// =============================================================================

/// An immutable description of a renderable unit.
///
/// Every instance of one kind shares that kind's stateless lifecycle
/// singleton; prop values live on the lifecycle implementation's concrete
/// type or inside the instance the application constructs it from. `Clone`
/// is an `Arc` clone.
#[derive(Clone)]
pub struct Component {
    lifecycle: Arc<dyn ComponentLifecycle>,
}

impl Component {
    pub fn new(lifecycle: Arc<dyn ComponentLifecycle>) -> Self {
        Self { lifecycle }
    }

    pub fn lifecycle(&self) -> &dyn ComponentLifecycle {
        self.lifecycle.as_ref()
    }

    /// Identity of this component's kind.
    pub fn id(&self) -> LifecycleId {
        self.lifecycle.id()
    }

    pub fn name(&self) -> &'static str {
        self.lifecycle.name()
    }

    /// Whether this kind mounts native content.
    pub fn is_mount_spec(&self) -> bool {
        self.lifecycle.mount_type() != MountType::None
    }

    /// Whether this kind only describes layout structure.
    pub fn is_layout_spec(&self) -> bool {
        self.lifecycle.mount_type() == MountType::None
    }

    /// A layout spec that needs concrete size constraints to create its
    /// layout.
    pub fn is_layout_spec_with_size_spec(&self) -> bool {
        self.is_layout_spec() && self.lifecycle.can_measure()
    }

    /// A nested-tree kind: its layout is a full sub-tree resolved only once
    /// concrete size constraints are known. Nested-tree resolution takes
    /// precedence over custom measurement.
    pub fn is_nested_tree(&self) -> bool {
        self.is_layout_spec_with_size_spec()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name())
            .field("id", &self.id())
            .finish()
    }
}

// =============================================================================
// ComponentContext
// =============================================================================

/// Ambient state carried through one layout pass.
///
/// Passed by value into recursive calls: callers keep their own copy, so a
/// subtree can never corrupt its parent's view of the tree props or size
/// constraints.
#[derive(Debug, Clone, Default)]
pub struct ComponentContext {
    tree_props: TreeProps,
    width_spec: Option<SizeSpec>,
    height_spec: Option<SizeSpec>,
}

impl ComponentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tree_props(&self) -> &TreeProps {
        &self.tree_props
    }

    pub fn set_tree_props(&mut self, props: TreeProps) {
        self.tree_props = props;
    }

    /// The width constraint currently in force, if layout has one.
    pub fn width_spec(&self) -> Option<SizeSpec> {
        self.width_spec
    }

    /// The height constraint currently in force, if layout has one.
    pub fn height_spec(&self) -> Option<SizeSpec> {
        self.height_spec
    }

    /// A copy of this context carrying the given size constraints.
    pub fn with_size_specs(&self, width_spec: SizeSpec, height_spec: SizeSpec) -> Self {
        Self {
            tree_props: self.tree_props.clone(),
            width_spec: Some(width_spec),
            height_spec: Some(height_spec),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
