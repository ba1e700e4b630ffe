//! Mount - attaching layout results to native content.
//!
//! [`MountState`] owns the mounted content for one tree. `mount` walks a
//! finished [`LayoutState`] and drives each mountable node through the
//! content lifecycle: create (or reuse pooled) content, `on_mount`,
//! `on_bind`. Re-mounting an unchanged position rebinds the existing
//! content instead of recreating it; `incremental_mount` additionally
//! restricts mounting to a visible region, unmounting what scrolled out.
//!
//! Unmounted content goes back to the per-kind preallocation pool, bounded
//! by the kind's `max_preallocated_content`.

use std::collections::HashMap;

use log::{debug, trace};

use crate::component::{Component, ComponentContext};
use crate::layout::LayoutState;
use crate::pools;
use crate::types::{MountContent, Rect};

// =============================================================================
// MountItem
// =============================================================================

/// One mounted piece of native content and the component that drives it.
pub struct MountItem {
    component: Component,
    content: MountContent,
    context: ComponentContext,
    bounds: Rect,
}

impl MountItem {
    pub fn component(&self) -> &Component {
        &self.component
    }

    pub fn content(&self) -> &MountContent {
        &self.content
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

/// What a layout pass wants mounted at one position.
struct MountTarget {
    component: Component,
    context: ComponentContext,
    bounds: Rect,
}

// =============================================================================
// MountState
// =============================================================================

/// Mounted content for one component tree, keyed by tree coordinate.
#[derive(Default)]
pub struct MountState {
    items: HashMap<Vec<usize>, MountItem>,
}

impl MountState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount every mountable node of the layout, reconciling against what
    /// is already mounted.
    pub fn mount(&mut self, layout: &LayoutState) {
        self.mount_region(layout, None);
    }

    /// Mount only the nodes whose bounds intersect `visible`, unmounting
    /// items that left the region.
    pub fn incremental_mount(&mut self, layout: &LayoutState, visible: Rect) {
        self.mount_region(layout, Some(visible));
    }

    /// Unmount everything, returning content to the preallocation pools.
    pub fn unmount_all(&mut self) {
        debug!("unmount_all: {} items", self.items.len());
        let coords: Vec<Vec<usize>> = self.items.keys().cloned().collect();
        for coord in coords {
            self.unmount_item(&coord);
        }
    }

    pub fn mounted_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_at(&self, coord: &[usize]) -> Option<&MountItem> {
        self.items.get(coord)
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    fn mount_region(&mut self, layout: &LayoutState, visible: Option<Rect>) {
        let mut targets: HashMap<Vec<usize>, MountTarget> = HashMap::new();
        layout.visit(|coord, _id, node| {
            let Some(component) = node.component() else {
                return;
            };
            if !component.is_mount_spec() {
                return;
            }
            let bounds = node.absolute_bounds();
            if visible.is_some_and(|region| !bounds.intersects(&region)) {
                return;
            }
            targets.insert(
                coord.to_vec(),
                MountTarget {
                    component: component.clone(),
                    context: node.context().clone(),
                    bounds,
                },
            );
        });

        // Unmount what the new layout no longer wants at its position, or
        // what left the visible region.
        let stale: Vec<Vec<usize>> = self
            .items
            .iter()
            .filter(|(coord, item)| {
                targets
                    .get(*coord)
                    .is_none_or(|target| target.component.id() != item.component.id())
            })
            .map(|(coord, _)| coord.clone())
            .collect();
        for coord in stale {
            self.unmount_item(&coord);
        }

        let mut mounted = 0usize;
        let mut rebound = 0usize;
        for (coord, target) in targets {
            match self.items.get_mut(&coord) {
                Some(item) => {
                    // Same kind at the same position: keep the content, swap
                    // the driving component.
                    trace!("rebind: {}", target.component.name());
                    item.component.lifecycle().on_unbind(
                        &item.context,
                        &mut item.content,
                        &item.component,
                    );
                    item.component = target.component;
                    item.context = target.context;
                    item.bounds = target.bounds;
                    item.component.lifecycle().on_bind(
                        &item.context,
                        &mut item.content,
                        &item.component,
                    );
                    rebound += 1;
                }
                None => {
                    self.mount_item(coord, target);
                    mounted += 1;
                }
            }
        }

        debug!("mount pass: {mounted} mounted, {rebound} rebound");
    }

    fn mount_item(&mut self, coord: Vec<usize>, target: MountTarget) {
        let lifecycle = target.component.lifecycle();
        trace!("mount: {}", target.component.name());

        let mut content = pools::acquire_mount_content(target.component.id())
            .unwrap_or_else(|| lifecycle.on_create_mount_content(&target.context));

        lifecycle.on_mount(&target.context, &mut content, &target.component);
        lifecycle.on_bind(&target.context, &mut content, &target.component);

        self.items.insert(
            coord,
            MountItem {
                component: target.component,
                content,
                context: target.context,
                bounds: target.bounds,
            },
        );
    }

    fn unmount_item(&mut self, coord: &[usize]) {
        let Some(mut item) = self.items.remove(coord) else {
            return;
        };
        let lifecycle = item.component.lifecycle();
        trace!("unmount: {}", item.component.name());

        lifecycle.on_unbind(&item.context, &mut item.content, &item.component);
        lifecycle.on_unmount(&item.context, &mut item.content, &item.component);

        pools::release_mount_content(
            item.component.id(),
            item.content,
            lifecycle.max_preallocated_content(),
        );
    }
}

impl Drop for MountState {
    fn drop(&mut self) {
        self.unmount_all();
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::component::{ComponentLifecycle, LifecycleId};
    use crate::layout::{LayoutContext, NodeId};
    use crate::types::{Dimension, FlexStyle, MountType, SizeSpec};

    #[derive(Default)]
    struct Counters {
        created: AtomicUsize,
        mounted: AtomicUsize,
        bound: AtomicUsize,
        unbound: AtomicUsize,
        unmounted: AtomicUsize,
    }

    impl Counters {
        fn get(&self) -> (usize, usize, usize, usize, usize) {
            (
                self.created.load(Ordering::SeqCst),
                self.mounted.load(Ordering::SeqCst),
                self.bound.load(Ordering::SeqCst),
                self.unbound.load(Ordering::SeqCst),
                self.unmounted.load(Ordering::SeqCst),
            )
        }
    }

    /// Fixed-size drawable leaf that counts every lifecycle callback.
    struct Widget {
        id: LifecycleId,
        counters: Arc<Counters>,
    }

    impl Widget {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                id: LifecycleId::next(),
                counters: Arc::new(Counters::default()),
            })
        }
    }

    impl ComponentLifecycle for Widget {
        fn id(&self) -> LifecycleId {
            self.id
        }

        fn name(&self) -> &'static str {
            "Widget"
        }

        fn mount_type(&self) -> MountType {
            MountType::Drawable
        }

        fn on_create_layout(&self, c: &mut LayoutContext<'_>, _component: &Component) -> NodeId {
            let node = c.acquire_node();
            let mut style = FlexStyle::column();
            style.width = Dimension::Points(100.0);
            style.height = Dimension::Points(10.0);
            c.set_style(node, style);
            node
        }

        fn on_create_mount_content(&self, _c: &ComponentContext) -> MountContent {
            self.counters.created.fetch_add(1, Ordering::SeqCst);
            Box::new(String::from("widget-content"))
        }

        fn on_mount(
            &self,
            _c: &ComponentContext,
            content: &mut MountContent,
            _component: &Component,
        ) {
            assert!(content.is::<String>());
            self.counters.mounted.fetch_add(1, Ordering::SeqCst);
        }

        fn on_bind(
            &self,
            _c: &ComponentContext,
            _content: &mut MountContent,
            _component: &Component,
        ) {
            self.counters.bound.fetch_add(1, Ordering::SeqCst);
        }

        fn on_unbind(
            &self,
            _c: &ComponentContext,
            _content: &mut MountContent,
            _component: &Component,
        ) {
            self.counters.unbound.fetch_add(1, Ordering::SeqCst);
        }

        fn on_unmount(
            &self,
            _c: &ComponentContext,
            _content: &mut MountContent,
            _component: &Component,
        ) {
            self.counters.unmounted.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Non-mounting column of children.
    struct Panel {
        id: LifecycleId,
        children: Vec<Component>,
    }

    impl Panel {
        fn new(children: Vec<Component>) -> Arc<Self> {
            Arc::new(Self {
                id: LifecycleId::next(),
                children,
            })
        }
    }

    impl ComponentLifecycle for Panel {
        fn id(&self) -> LifecycleId {
            self.id
        }

        fn name(&self) -> &'static str {
            "Panel"
        }

        fn on_create_layout(&self, c: &mut LayoutContext<'_>, _component: &Component) -> NodeId {
            let root = c.container(FlexStyle::column());
            for child in &self.children {
                let node = c.child_component(child);
                c.add_child(root, node);
            }
            root
        }
    }

    fn layout_of(root: Component) -> LayoutState {
        LayoutState::calculate(
            &ComponentContext::new(),
            root,
            SizeSpec::exactly(100),
            SizeSpec::at_most(500),
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_mount_attaches_all_mountable_nodes() {
        let widget = Widget::new();
        let layout = layout_of(Component::new(Panel::new(vec![
            Component::new(widget.clone()),
            Component::new(widget.clone()),
        ])));

        let mut mount_state = MountState::new();
        mount_state.mount(&layout);

        assert_eq!(mount_state.mounted_count(), 2);
        assert!(mount_state.item_at(&[0]).is_some());
        assert!(mount_state.item_at(&[1]).is_some());
        assert_eq!(mount_state.item_at(&[0]).unwrap().bounds().y, 0);
        assert_eq!(mount_state.item_at(&[1]).unwrap().bounds().y, 10);

        let (created, mounted, bound, unbound, unmounted) = widget.counters.get();
        assert_eq!((created, mounted, bound), (2, 2, 2));
        assert_eq!((unbound, unmounted), (0, 0));
    }

    #[test]
    fn test_remount_rebinds_existing_content() {
        let widget = Widget::new();
        let make = || layout_of(Component::new(Panel::new(vec![Component::new(widget.clone())])));

        let mut mount_state = MountState::new();
        mount_state.mount(&make());
        mount_state.mount(&make());

        let (created, mounted, bound, unbound, unmounted) = widget.counters.get();
        // Second pass keeps the content: one unbind/bind cycle, no remount.
        assert_eq!((created, mounted), (1, 1));
        assert_eq!((bound, unbound), (2, 1));
        assert_eq!(unmounted, 0);
        assert_eq!(mount_state.mounted_count(), 1);
    }

    #[test]
    fn test_changed_kind_swaps_content() {
        let first = Widget::new();
        let second = Widget::new();

        let mut mount_state = MountState::new();
        mount_state.mount(&layout_of(Component::new(Panel::new(vec![
            Component::new(first.clone()),
        ]))));
        mount_state.mount(&layout_of(Component::new(Panel::new(vec![
            Component::new(second.clone()),
        ]))));

        let (_, _, _, first_unbound, first_unmounted) = first.counters.get();
        assert_eq!((first_unbound, first_unmounted), (1, 1));

        let (created, mounted, ..) = second.counters.get();
        assert_eq!((created, mounted), (1, 1));
        assert_eq!(mount_state.mounted_count(), 1);
    }

    #[test]
    fn test_incremental_mount_follows_visibility() {
        let widget = Widget::new();
        let layout = layout_of(Component::new(Panel::new(vec![
            Component::new(widget.clone()),
            Component::new(widget.clone()),
        ])));

        let mut mount_state = MountState::new();

        // Only the first row (y 0..10) is visible.
        mount_state.incremental_mount(&layout, Rect::new(0, 0, 100, 10));
        assert_eq!(mount_state.mounted_count(), 1);
        assert!(mount_state.item_at(&[0]).is_some());
        assert!(mount_state.item_at(&[1]).is_none());

        // Scrolled: the second row replaces the first.
        mount_state.incremental_mount(&layout, Rect::new(0, 10, 100, 10));
        assert_eq!(mount_state.mounted_count(), 1);
        assert!(mount_state.item_at(&[0]).is_none());
        assert!(mount_state.item_at(&[1]).is_some());

        let (_, mounted, _, _, unmounted) = widget.counters.get();
        assert_eq!((mounted, unmounted), (2, 1));
    }

    #[test]
    fn test_unmount_all_releases_content_to_pool() {
        let widget = Widget::new();
        let layout = layout_of(Component::new(Panel::new(vec![
            Component::new(widget.clone()),
            Component::new(widget.clone()),
        ])));

        let mut mount_state = MountState::new();
        mount_state.mount(&layout);
        mount_state.unmount_all();

        assert!(mount_state.is_empty());
        let (_, _, bound, unbound, unmounted) = widget.counters.get();
        assert_eq!(bound, unbound);
        assert_eq!(unmounted, 2);
        assert_eq!(pools::pooled_mount_content_count(widget.id), 2);

        // A later mount reuses pooled content instead of creating more.
        mount_state.mount(&layout);
        let (created, ..) = widget.counters.get();
        assert_eq!(created, 2);
        assert_eq!(pools::pooled_mount_content_count(widget.id), 0);
    }
}
