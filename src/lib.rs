//! # cinder-ui
//!
//! Declarative UI component framework: flexbox layout lifecycle with
//! measurement caching and incremental mount.
//!
//! ## Architecture
//!
//! Applications describe their UI as a tree of immutable [`Component`]s,
//! each sharing its kind's stateless [`ComponentLifecycle`] singleton. The
//! pipeline turns that description into mounted native content:
//!
//! ```text
//! Component Tree → create_layout → flexbox measure → LayoutState → MountState
//! ```
//!
//! Layout runs through [Taffy](https://github.com/DioxusLabs/taffy) with a
//! measure bridge: components that size themselves implement `on_measure`
//! and their results are cached across passes, so unchanged subtrees are
//! never re-measured. Components that need concrete constraints to decide
//! what to render become nested trees, resolved lazily at measure time.
//!
//! ## Modules
//!
//! - [`types`] - Core types (SizeSpec, FlexStyle, Rect, MountType, etc.)
//! - [`component`] - Component, ComponentLifecycle, TreeProps
//! - [`layout`] - Layout tree, measure bridge, LayoutState
//! - [`mount`] - MountState, incremental mount, content recycling
//! - [`pools`] - Recycled value carriers and mount-content pools

pub mod component;
pub mod error;
pub mod layout;
pub mod mount;
pub mod pools;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use component::{
    Component, ComponentContext, ComponentLifecycle, LifecycleId, TreeProps,
    DEFAULT_MAX_PREALLOCATION,
};

pub use error::LayoutError;

pub use layout::{
    DiffNode, InternalNode, LayoutArena, LayoutContext, LayoutState, NodeFlags, NodeId,
};

pub use mount::{MountItem, MountState};

pub use pools::{
    acquire_diff, acquire_output, acquire_size, Diff, Output, Pooled, Size, SIZE_UNSET,
};
