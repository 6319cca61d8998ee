//! Errors surfaced by a render pass.

use crate::node::{BoxError, NodeId};
use thiserror::Error;

/// Why a pass did not complete. Nothing is committed when one is returned.
#[derive(Error, Debug)]
pub enum RenderError {
    /// A node's transform callback failed.
    #[error("transform callback on node {node} failed: {source}")]
    Transform {
        /// The node whose transform failed.
        node: NodeId,
        /// The callback's error.
        #[source]
        source: BoxError,
    },

    /// The output sink rejected a write.
    #[error("terminal write failed: {0}")]
    Io(#[from] std::io::Error),

    /// The renderer was unmounted.
    #[error("renderer is unmounted")]
    Unmounted,
}

/// Result type for render operations.
pub type Result<T, E = RenderError> = std::result::Result<T, E>;
