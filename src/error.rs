//! Error types for the layout engine.
//!
//! Only environment and engine failures surface as errors; contract
//! violations by lifecycle implementations (negative measurements, missing
//! overrides) are programming bugs and panic with the offending kind's name.

use thiserror::Error;

/// Failure of a layout pass.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The flexbox engine rejected the tree or a node operation.
    #[error("flexbox computation failed: {0}")]
    Flexbox(#[from] taffy::TaffyError),
}
