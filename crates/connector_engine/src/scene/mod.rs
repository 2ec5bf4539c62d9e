//! Scene management
//!
//! Generic transform nodes stored behind the [`SceneGraph`] provider trait,
//! plus the [`DragSet`] of nodes whose transforms are sampled every tick.
//!
//! ## Ownership
//!
//! ```text
//! SceneGraph ──owns──> SceneNode ──owns──> NodeMetadata
//!      ↑
//! DragSet (membership only)
//! ```

mod drag_set;
mod node;
mod scene_graph;

pub use drag_set::DragSet;
pub use node::{ClampLimits, NodeMetadata, NodeRole, SceneNode, UpdateCallback};
pub use scene_graph::{NodeArena, SceneGraph};

pub use crate::foundation::collections::NodeId;
pub use crate::physics::AABB;

use thiserror::Error;

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Handle does not name a live node
    #[error("Scene node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Another node already visualizes this instance
    #[error("Instance already in scene: {0}")]
    DuplicateInstance(String),

    /// No node visualizes this instance
    #[error("Instance not in scene: {0}")]
    InstanceNotFound(String),

    /// A parent transform cannot be inverted (zero scale)
    #[error("Transform of node {0:?} is not invertible")]
    SingularTransform(NodeId),
}
