//! Scene nodes and their metadata bag

use std::fmt;

use crate::foundation::collections::NodeId;
use crate::foundation::math::{Quat, Transform, Vec3};
use crate::persistence::InstanceKind;
use crate::physics::{BoundaryShape, AABB};

/// Per-node callback invoked once per tick before change detection
pub type UpdateCallback = Box<dyn FnMut(&mut SceneNode)>;

/// What a node stands for, fixed when the node is created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Visualized class, port or relation instance
    Instance(InstanceKind),
    /// Draggable interior waypoint of a connector
    BendPoint,
    /// Oriented mesh at one end of a connector
    Cap,
    /// Text label following a connector midpoint
    Label,
    /// Anything else
    Plain,
}

impl NodeRole {
    /// Whether rotation changes of this node are written to its instance record
    pub fn persists_rotation(self) -> bool {
        match self {
            Self::Instance(InstanceKind::Class | InstanceKind::Port) => true,
            Self::Instance(InstanceKind::Relation)
            | Self::BendPoint
            | Self::Cap
            | Self::Label
            | Self::Plain => false,
        }
    }
}

/// Local-space box a port's position is kept inside (its parent's surface)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClampLimits(pub AABB);

impl ClampLimits {
    /// Limits covering the local bounds of the parent's shape
    pub fn surface_of(parent_shape: &BoundaryShape) -> Self {
        Self(parent_shape.local_bounds())
    }

    /// Clamp a local position into the limits
    pub fn apply(&self, position: Vec3) -> Vec3 {
        self.0.clamp_point(position)
    }
}

/// Open metadata attached to a node
#[derive(Default)]
pub struct NodeMetadata {
    /// Surface geometry used for connector attachment
    pub shape: Option<BoundaryShape>,
    /// Limits for ports clamped to their parent's surface
    pub clamp: Option<ClampLimits>,
    /// Cached bounding width (set on connector caps)
    pub cap_width: Option<f32>,
    /// Labels attached to this node
    pub labels: Vec<NodeId>,
    /// Optional per-tick update hook
    pub update: Option<UpdateCallback>,
}

impl fmt::Debug for NodeMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeMetadata")
            .field("shape", &self.shape)
            .field("clamp", &self.clamp)
            .field("cap_width", &self.cap_width)
            .field("labels", &self.labels)
            .field("update", &self.update.as_ref().map(|_| "<callback>"))
            .finish()
    }
}

/// Generic transform node
#[derive(Debug)]
pub struct SceneNode {
    /// Display name
    pub name: String,
    /// Identifier of the persisted instance this node visualizes, if any
    pub instance_id: Option<String>,
    /// Role of the node
    pub role: NodeRole,
    /// Transform relative to the parent
    pub transform: Transform,
    /// Metadata bag
    pub metadata: NodeMetadata,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    /// Create a plain node at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance_id: None,
            role: NodeRole::Plain,
            transform: Transform::identity(),
            metadata: NodeMetadata::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Node visualizing a persisted instance
    pub fn instance(instance_id: impl Into<String>, kind: InstanceKind) -> Self {
        let instance_id = instance_id.into();
        Self::new(instance_id.clone())
            .with_role(NodeRole::Instance(kind))
            .with_instance_id(instance_id)
    }

    /// Builder pattern: set role
    #[must_use]
    pub fn with_role(mut self, role: NodeRole) -> Self {
        self.role = role;
        self
    }

    /// Builder pattern: set instance identifier
    #[must_use]
    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    /// Builder pattern: set local position
    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder pattern: set local rotation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation;
        self
    }

    /// Builder pattern: set local scale
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.transform.scale = scale;
        self
    }

    /// Builder pattern: set surface shape
    #[must_use]
    pub fn with_shape(mut self, shape: BoundaryShape) -> Self {
        self.metadata.shape = Some(shape);
        self
    }

    /// Builder pattern: clamp the local position to the given limits
    #[must_use]
    pub fn with_clamp(mut self, clamp: ClampLimits) -> Self {
        self.metadata.clamp = Some(clamp);
        self
    }

    /// Builder pattern: cache a cap width
    #[must_use]
    pub fn with_cap_width(mut self, width: f32) -> Self {
        self.metadata.cap_width = Some(width);
        self
    }

    /// Builder pattern: install a per-tick update callback
    #[must_use]
    pub fn with_update(mut self, update: impl FnMut(&mut SceneNode) + 'static) -> Self {
        self.metadata.update = Some(Box::new(update));
        self
    }

    /// Parent handle
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Run the update callback, if any
    ///
    /// The callback may replace itself; the replacement is kept.
    pub fn run_update(&mut self) {
        if let Some(mut update) = self.metadata.update.take() {
            update(self);
            if self.metadata.update.is_none() {
                self.metadata.update = Some(update);
            }
        }
    }

    /// Keep the local position inside the clamp limits (ports only)
    ///
    /// Returns `true` if the position moved.
    pub fn apply_clamp(&mut self) -> bool {
        let Some(clamp) = self.metadata.clamp else {
            return false;
        };
        if !matches!(self.role, NodeRole::Instance(InstanceKind::Port)) {
            return false;
        }
        let clamped = clamp.apply(self.transform.position);
        let moved = clamped != self.transform.position;
        self.transform.position = clamped;
        moved
    }
}
