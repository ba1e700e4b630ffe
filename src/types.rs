//! Core types for cinder-ui.
//!
//! These types define the foundation that everything builds on: measurement
//! constraints (size specs), flexbox style values, geometry, and the mount
//! content handle that flows through the mount lifecycle.

use std::any::Any;

// =============================================================================
// Measurement
// =============================================================================

/// Constraint mode for one axis of a measurement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MeasureMode {
    /// The parent has not imposed any constraint; the child picks its size.
    #[default]
    Unspecified,
    /// The parent has determined the exact size for the child.
    Exactly,
    /// The child can be as large as it wants up to the given size.
    AtMost,
}

/// An encoded (dimension, mode) measurement constraint for one axis.
///
/// Sizes are integer pixels so two specs compare bitwise: diff-cache reuse
/// requires exact equality of both the mode and the size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeSpec {
    pub size: i32,
    pub mode: MeasureMode,
}

impl SizeSpec {
    /// An exact constraint: the measured size must be `size`.
    pub const fn exactly(size: i32) -> Self {
        Self {
            size,
            mode: MeasureMode::Exactly,
        }
    }

    /// An upper-bound constraint: the measured size may not exceed `size`.
    pub const fn at_most(size: i32) -> Self {
        Self {
            size,
            mode: MeasureMode::AtMost,
        }
    }

    /// No constraint on this axis.
    pub const fn unspecified() -> Self {
        Self {
            size: 0,
            mode: MeasureMode::Unspecified,
        }
    }

    /// Resolve a desired size against this constraint.
    ///
    /// `Exactly` wins over the desired size, `AtMost` clamps it, and
    /// `Unspecified` passes it through.
    pub fn resolve(&self, desired: i32) -> i32 {
        match self.mode {
            MeasureMode::Unspecified => desired,
            MeasureMode::Exactly => self.size,
            MeasureMode::AtMost => desired.min(self.size),
        }
    }
}

impl Default for SizeSpec {
    fn default() -> Self {
        Self::unspecified()
    }
}

// =============================================================================
// Mount content
// =============================================================================

/// What kind of native content a component kind mounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountType {
    /// Pure layout component: mounts nothing itself.
    #[default]
    None,
    /// Mounts drawable (non-interactive) content.
    Drawable,
    /// Mounts a full native view.
    View,
}

/// Opaque native content created by `on_create_mount_content`.
///
/// The framework never looks inside; component lifecycles downcast to their
/// concrete content type in `on_mount`/`on_bind`.
pub type MountContent = Box<dyn Any + Send>;

// =============================================================================
// Flexbox style values
// =============================================================================

/// A dimension value: Auto, absolute pixels, or percent of parent (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    #[default]
    Auto,
    Points(f32),
    Percent(f32),
}

/// Main-axis direction of a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexDirection {
    #[default]
    Column,
    Row,
    ColumnReverse,
    RowReverse,
}

/// Whether flex items wrap onto multiple lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlexWrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

/// Main-axis distribution of free space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JustifyContent {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Cross-axis alignment of items within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignItems {
    #[default]
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

/// Cross-axis alignment of lines within the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignContent {
    #[default]
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
}

/// Per-item override of the parent's `AlignItems`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignSelf {
    /// Inherit from the parent container.
    #[default]
    Auto,
    Stretch,
    FlexStart,
    Center,
    FlexEnd,
    Baseline,
}

/// Positioning scheme of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

/// Per-edge pixel values (margin, padding).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeValues {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl EdgeValues {
    pub const fn all(value: f32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }
}

/// Flexbox style carried by every layout node.
///
/// This is the subset of flex properties the layout engine consumes; the
/// bridge converts it to the engine's native style representation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlexStyle {
    pub direction: FlexDirection,
    pub wrap: FlexWrap,
    pub justify_content: JustifyContent,
    pub align_items: AlignItems,
    pub align_content: AlignContent,
    pub align_self: AlignSelf,
    pub position: PositionType,

    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub flex_basis: Dimension,

    pub width: Dimension,
    pub height: Dimension,
    pub min_width: Dimension,
    pub max_width: Dimension,
    pub min_height: Dimension,
    pub max_height: Dimension,

    pub margin: EdgeValues,
    pub padding: EdgeValues,
}

impl FlexStyle {
    /// The canonical default container: a column that does not shrink, with
    /// lines packed to the start.
    pub fn column() -> Self {
        Self {
            direction: FlexDirection::Column,
            flex_shrink: 0.0,
            align_content: AlignContent::FlexStart,
            ..Default::default()
        }
    }

    /// A row container with the same defaults as [`FlexStyle::column`].
    pub fn row() -> Self {
        Self {
            direction: FlexDirection::Row,
            ..Self::column()
        }
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// An axis-aligned rectangle in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether this rect overlaps `other` by at least one pixel.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_spec_equality_is_exact() {
        assert_eq!(SizeSpec::exactly(100), SizeSpec::exactly(100));
        assert_ne!(SizeSpec::exactly(100), SizeSpec::exactly(101));
        assert_ne!(SizeSpec::exactly(100), SizeSpec::at_most(100));
        assert_eq!(SizeSpec::unspecified(), SizeSpec::unspecified());
    }

    #[test]
    fn test_size_spec_resolve() {
        assert_eq!(SizeSpec::exactly(100).resolve(50), 100);
        assert_eq!(SizeSpec::at_most(100).resolve(50), 50);
        assert_eq!(SizeSpec::at_most(100).resolve(150), 100);
        assert_eq!(SizeSpec::unspecified().resolve(50), 50);
    }

    #[test]
    fn test_rect_intersects() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(5, 5, 10, 10)));
        assert!(a.intersects(&Rect::new(0, 0, 1, 1)));
        assert!(!a.intersects(&Rect::new(10, 0, 5, 5)));
        assert!(!a.intersects(&Rect::new(0, 10, 5, 5)));
        assert!(!a.intersects(&Rect::new(-5, -5, 5, 5)));
    }

    #[test]
    fn test_default_container_style() {
        let style = FlexStyle::column();
        assert_eq!(style.direction, FlexDirection::Column);
        assert_eq!(style.flex_shrink, 0.0);
        assert_eq!(style.align_content, AlignContent::FlexStart);
    }
}
