//! Flexbox bridge - integration with the Taffy layout engine.
//!
//! Converts node styles to Taffy styles, runs layout computation with the
//! measure bridge registered for nodes that carry a measure binding, and
//! extracts resulting geometry back onto the arena nodes.

use taffy::{
    AlignContent as TaffyAlignContent, AlignItems as TaffyAlignItems, AlignSelf as TaffyAlignSelf,
    AvailableSpace, Dimension as TaffyDimension, Display, FlexDirection as TaffyFlexDirection,
    FlexWrap as TaffyFlexWrap, JustifyContent as TaffyJustifyContent, LengthPercentage,
    LengthPercentageAuto, NodeId as TaffyNodeId, Position as TaffyPosition, Rect, Size, Style,
    TaffyTree,
};

use crate::error::LayoutError;
use crate::layout::arena::{LayoutArena, NodeId};
use crate::layout::measure::measure_node;
use crate::types::{
    AlignContent, AlignItems, AlignSelf, Dimension, EdgeValues, FlexDirection, FlexStyle, FlexWrap,
    JustifyContent, MeasureMode, PositionType, SizeSpec,
};

// =============================================================================
// Style conversion
// =============================================================================

fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Points(n) => TaffyDimension::Length(n),
        Dimension::Percent(p) => TaffyDimension::Percent(p / 100.0),
    }
}

fn to_taffy_flex_direction(dir: FlexDirection) -> TaffyFlexDirection {
    match dir {
        FlexDirection::Column => TaffyFlexDirection::Column,
        FlexDirection::Row => TaffyFlexDirection::Row,
        FlexDirection::ColumnReverse => TaffyFlexDirection::ColumnReverse,
        FlexDirection::RowReverse => TaffyFlexDirection::RowReverse,
    }
}

fn to_taffy_flex_wrap(wrap: FlexWrap) -> TaffyFlexWrap {
    match wrap {
        FlexWrap::NoWrap => TaffyFlexWrap::NoWrap,
        FlexWrap::Wrap => TaffyFlexWrap::Wrap,
        FlexWrap::WrapReverse => TaffyFlexWrap::WrapReverse,
    }
}

fn to_taffy_justify_content(justify: JustifyContent) -> Option<TaffyJustifyContent> {
    Some(match justify {
        JustifyContent::FlexStart => TaffyJustifyContent::FlexStart,
        JustifyContent::Center => TaffyJustifyContent::Center,
        JustifyContent::FlexEnd => TaffyJustifyContent::FlexEnd,
        JustifyContent::SpaceBetween => TaffyJustifyContent::SpaceBetween,
        JustifyContent::SpaceAround => TaffyJustifyContent::SpaceAround,
        JustifyContent::SpaceEvenly => TaffyJustifyContent::SpaceEvenly,
    })
}

fn to_taffy_align_items(align: AlignItems) -> Option<TaffyAlignItems> {
    Some(match align {
        AlignItems::Stretch => TaffyAlignItems::Stretch,
        AlignItems::FlexStart => TaffyAlignItems::FlexStart,
        AlignItems::Center => TaffyAlignItems::Center,
        AlignItems::FlexEnd => TaffyAlignItems::FlexEnd,
        AlignItems::Baseline => TaffyAlignItems::Baseline,
    })
}

fn to_taffy_align_content(align: AlignContent) -> Option<TaffyAlignContent> {
    Some(match align {
        AlignContent::Stretch => TaffyAlignContent::Stretch,
        AlignContent::FlexStart => TaffyAlignContent::FlexStart,
        AlignContent::Center => TaffyAlignContent::Center,
        AlignContent::FlexEnd => TaffyAlignContent::FlexEnd,
        AlignContent::SpaceBetween => TaffyAlignContent::SpaceBetween,
        AlignContent::SpaceAround => TaffyAlignContent::SpaceAround,
    })
}

fn to_taffy_align_self(align: AlignSelf) -> Option<TaffyAlignSelf> {
    match align {
        AlignSelf::Auto => None, // inherit from parent
        AlignSelf::Stretch => Some(TaffyAlignSelf::Stretch),
        AlignSelf::FlexStart => Some(TaffyAlignSelf::FlexStart),
        AlignSelf::Center => Some(TaffyAlignSelf::Center),
        AlignSelf::FlexEnd => Some(TaffyAlignSelf::FlexEnd),
        AlignSelf::Baseline => Some(TaffyAlignSelf::Baseline),
    }
}

fn to_taffy_position(position: PositionType) -> TaffyPosition {
    match position {
        PositionType::Relative => TaffyPosition::Relative,
        PositionType::Absolute => TaffyPosition::Absolute,
    }
}

fn to_taffy_margin(edges: EdgeValues) -> Rect<LengthPercentageAuto> {
    Rect {
        left: LengthPercentageAuto::Length(edges.left),
        right: LengthPercentageAuto::Length(edges.right),
        top: LengthPercentageAuto::Length(edges.top),
        bottom: LengthPercentageAuto::Length(edges.bottom),
    }
}

fn to_taffy_padding(edges: EdgeValues) -> Rect<LengthPercentage> {
    Rect {
        left: LengthPercentage::Length(edges.left),
        right: LengthPercentage::Length(edges.right),
        top: LengthPercentage::Length(edges.top),
        bottom: LengthPercentage::Length(edges.bottom),
    }
}

/// Build a Taffy style from a node's flex style.
fn build_style(style: &FlexStyle) -> Style {
    Style {
        display: Display::Flex,
        position: to_taffy_position(style.position),

        flex_direction: to_taffy_flex_direction(style.direction),
        flex_wrap: to_taffy_flex_wrap(style.wrap),
        justify_content: to_taffy_justify_content(style.justify_content),
        align_items: to_taffy_align_items(style.align_items),
        align_content: to_taffy_align_content(style.align_content),

        flex_grow: style.flex_grow,
        flex_shrink: style.flex_shrink,
        flex_basis: to_taffy_dimension(style.flex_basis),
        align_self: to_taffy_align_self(style.align_self),

        size: Size {
            width: to_taffy_dimension(style.width),
            height: to_taffy_dimension(style.height),
        },
        min_size: Size {
            width: to_taffy_dimension(style.min_width),
            height: to_taffy_dimension(style.min_height),
        },
        max_size: Size {
            width: to_taffy_dimension(style.max_width),
            height: to_taffy_dimension(style.max_height),
        },

        margin: to_taffy_margin(style.margin),
        padding: to_taffy_padding(style.padding),

        ..Default::default()
    }
}

// =============================================================================
// Tree construction
// =============================================================================

fn build_taffy_node(
    arena: &LayoutArena,
    tree: &mut TaffyTree<NodeId>,
    id: NodeId,
    root_specs: Option<(SizeSpec, SizeSpec)>,
    mapping: &mut Vec<(NodeId, TaffyNodeId)>,
) -> Result<TaffyNodeId, taffy::TaffyError> {
    let node = arena.node(id);
    let mut style = build_style(node.style());

    // Exact root constraints pin the root's size; bounded/unbounded
    // constraints flow in through the available space instead.
    if let Some((width_spec, height_spec)) = root_specs {
        if width_spec.mode == MeasureMode::Exactly {
            style.size.width = TaffyDimension::Length(width_spec.size as f32);
        }
        if height_spec.mode == MeasureMode::Exactly {
            style.size.height = TaffyDimension::Length(height_spec.size as f32);
        }
    }

    let taffy_id = if node.has_measure_binding() {
        tree.new_leaf_with_context(style, id)?
    } else {
        tree.new_leaf(style)?
    };
    mapping.push((id, taffy_id));

    for &child in node.children() {
        let child_taffy = build_taffy_node(arena, tree, child, None, mapping)?;
        tree.add_child(taffy_id, child_taffy)?;
    }

    Ok(taffy_id)
}

fn to_available_space(spec: SizeSpec) -> AvailableSpace {
    match spec.mode {
        MeasureMode::Exactly | MeasureMode::AtMost => AvailableSpace::Definite(spec.size as f32),
        MeasureMode::Unspecified => AvailableSpace::MaxContent,
    }
}

// =============================================================================
// Layout pass
// =============================================================================

/// Run the flexbox engine over the tree rooted at `root` under the given
/// constraints, writing resolved geometry back onto the arena nodes.
pub(crate) fn measure_tree(
    arena: &mut LayoutArena,
    root: NodeId,
    width_spec: SizeSpec,
    height_spec: SizeSpec,
) -> Result<(), LayoutError> {
    if root.is_null() {
        return Ok(());
    }

    let mut tree: TaffyTree<NodeId> = TaffyTree::new();
    let mut mapping: Vec<(NodeId, TaffyNodeId)> = Vec::new();
    let taffy_root = build_taffy_node(
        arena,
        &mut tree,
        root,
        Some((width_spec, height_spec)),
        &mut mapping,
    )?;

    let available = Size {
        width: to_available_space(width_spec),
        height: to_available_space(height_spec),
    };

    tree.compute_layout_with_measure(
        taffy_root,
        available,
        |known_dimensions, available_space, _taffy_id, context: Option<&mut NodeId>, _style| {
            match context {
                Some(&mut node_id) => {
                    measure_node(arena, node_id, known_dimensions, available_space)
                }
                None => Size::ZERO,
            }
        },
    )?;

    for (node_id, taffy_id) in mapping {
        let layout = tree.layout(taffy_id)?;
        arena.node_mut(node_id).set_bounds(
            layout.location.x.round() as i32,
            layout.location.y.round() as i32,
            layout.size.width.round() as i32,
            layout.size.height.round() as i32,
        );
    }

    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::component::{Component, ComponentContext, ComponentLifecycle, LifecycleId};
    use crate::layout::LayoutContext;
    use crate::pools;
    use crate::types::MountType;

    fn styled_node(arena: &mut LayoutArena, style: FlexStyle) -> NodeId {
        let id = arena.acquire(ComponentContext::new());
        arena.node_mut(id).set_style(style);
        id
    }

    #[test]
    fn test_dimension_conversion() {
        assert_eq!(to_taffy_dimension(Dimension::Auto), TaffyDimension::Auto);
        assert_eq!(
            to_taffy_dimension(Dimension::Points(50.0)),
            TaffyDimension::Length(50.0)
        );
        // Percent: 50% stored as 50.0, converted to 0.5.
        assert_eq!(
            to_taffy_dimension(Dimension::Percent(50.0)),
            TaffyDimension::Percent(0.5)
        );
    }

    #[test]
    fn test_exact_root_specs_pin_root_size() {
        let mut arena = LayoutArena::new();
        let root = styled_node(&mut arena, FlexStyle::column());

        measure_tree(
            &mut arena,
            root,
            SizeSpec::exactly(200),
            SizeSpec::exactly(100),
        )
        .unwrap();

        assert_eq!(arena.node(root).width(), 200);
        assert_eq!(arena.node(root).height(), 100);
    }

    #[test]
    fn test_row_places_children_side_by_side() {
        let mut arena = LayoutArena::new();
        let root = styled_node(&mut arena, FlexStyle::row());

        let mut child_style = FlexStyle::column();
        child_style.width = Dimension::Points(30.0);
        child_style.height = Dimension::Points(10.0);

        let a = styled_node(&mut arena, child_style.clone());
        let b = styled_node(&mut arena, child_style);
        arena.add_child(root, a);
        arena.add_child(root, b);

        measure_tree(
            &mut arena,
            root,
            SizeSpec::exactly(100),
            SizeSpec::exactly(20),
        )
        .unwrap();

        assert_eq!(arena.node(a).x(), 0);
        assert_eq!(arena.node(b).x(), 30);
        assert_eq!(arena.node(a).width(), 30);
    }

    #[test]
    fn test_padding_offsets_children() {
        let mut arena = LayoutArena::new();
        let mut root_style = FlexStyle::column();
        root_style.padding = EdgeValues::all(5.0);
        let root = styled_node(&mut arena, root_style);

        let mut child_style = FlexStyle::column();
        child_style.width = Dimension::Points(10.0);
        child_style.height = Dimension::Points(10.0);
        let child = styled_node(&mut arena, child_style);
        arena.add_child(root, child);

        measure_tree(
            &mut arena,
            root,
            SizeSpec::exactly(50),
            SizeSpec::exactly(50),
        )
        .unwrap();

        assert_eq!(arena.node(child).x(), 5);
        assert_eq!(arena.node(child).y(), 5);
    }

    #[test]
    fn test_measured_leaf_drives_container_size() {
        struct Label {
            id: LifecycleId,
        }

        impl ComponentLifecycle for Label {
            fn id(&self) -> LifecycleId {
                self.id
            }

            fn name(&self) -> &'static str {
                "Label"
            }

            fn mount_type(&self) -> MountType {
                MountType::Drawable
            }

            fn can_measure(&self) -> bool {
                true
            }

            fn on_create_layout(
                &self,
                c: &mut LayoutContext<'_>,
                _component: &Component,
            ) -> NodeId {
                c.acquire_node()
            }

            fn on_measure(
                &self,
                _c: &ComponentContext,
                _layout: &crate::layout::InternalNode,
                _width_spec: SizeSpec,
                _height_spec: SizeSpec,
                size: &mut pools::Size,
                _component: &Component,
            ) {
                size.width = 42;
                size.height = 17;
            }
        }

        let component = Component::new(Arc::new(Label {
            id: LifecycleId::next(),
        }));

        let mut arena = LayoutArena::new();
        let root = {
            let mut lc = LayoutContext::new(&mut arena, ComponentContext::new());
            let root = lc.container(FlexStyle::column());
            let leaf = component.create_layout(&mut lc, false);
            lc.add_child(root, leaf);
            root
        };

        measure_tree(
            &mut arena,
            root,
            SizeSpec::at_most(100),
            SizeSpec::unspecified(),
        )
        .unwrap();

        let leaf = arena.node(root).children()[0];
        assert_eq!(arena.node(leaf).width(), 42);
        assert_eq!(arena.node(leaf).height(), 17);
        assert_eq!(arena.node(root).height(), 17);
    }
}
