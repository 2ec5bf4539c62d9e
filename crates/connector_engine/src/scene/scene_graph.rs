//! Scene graph trait and implementation
//!
//! The connector engine only talks to the scene through [`SceneGraph`], so the
//! host can plug in its own node storage. [`NodeArena`] is the slot-map backed
//! implementation used by the editor context and the tests.

use std::collections::HashMap;

use super::node::SceneNode;
use super::SceneError;
use crate::foundation::collections::{NodeId, NodeMap};
use crate::foundation::math::{Mat4, Point3, Quat, Transform, Vec3};

/// Scene graph provider
pub trait SceneGraph {
    /// Insert a node, optionally under a parent
    fn add_node(&mut self, node: SceneNode, parent: Option<NodeId>) -> Result<NodeId, SceneError>;

    /// Remove a node and all of its descendants
    ///
    /// Children are removed before their parent; the returned ids follow that
    /// order.
    fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, SceneError>;

    /// Look up a node
    fn node(&self, id: NodeId) -> Option<&SceneNode>;

    /// Look up a node mutably
    fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode>;

    /// Find the node visualizing a persisted instance
    fn find_by_instance(&self, instance_id: &str) -> Option<NodeId>;

    /// Pre-order walk of `root` and its descendants
    fn traverse(&self, root: NodeId, visitor: &mut dyn FnMut(NodeId, &SceneNode));

    /// Nodes without a parent, in insertion order
    fn roots(&self) -> Vec<NodeId>;

    /// Every live node handle
    fn node_ids(&self) -> Vec<NodeId>;

    /// Visit every live node mutably
    ///
    /// The provided version collects [`node_ids`](Self::node_ids) first;
    /// storages that can iterate in place should override it.
    fn for_each_node_mut(&mut self, visitor: &mut dyn FnMut(NodeId, &mut SceneNode)) {
        for id in self.node_ids() {
            if let Some(node) = self.node_mut(id) {
                visitor(id, node);
            }
        }
    }

    /// Number of live nodes
    fn len(&self) -> usize;

    /// Whether the scene is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a node handle is still live
    fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Composed transform from the root down to `id`
    fn world_transform(&self, id: NodeId) -> Option<Transform> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.node(node_id)?;
            chain.push(node.transform);
            current = node.parent;
        }
        chain
            .iter()
            .rev()
            .fold(Some(Transform::identity()), |acc, local| acc.map(|t| t.combine(local)))
    }

    /// World matrix of `id` (product of local TRS matrices)
    fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let node = self.node(id)?;
        let local = node.transform.to_matrix();
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    /// World position of `id`
    fn world_position(&self, id: NodeId) -> Option<Point3> {
        self.world_matrix(id).map(|m| m.transform_point(&Point3::origin()))
    }

    /// Move `id` so its world position becomes `position`
    fn set_world_position(&mut self, id: NodeId, position: Point3) -> Result<(), SceneError> {
        let parent = self.node(id).ok_or(SceneError::NodeNotFound(id))?.parent;
        let local = match parent {
            Some(parent) => {
                let inverse = self
                    .world_matrix(parent)
                    .ok_or(SceneError::NodeNotFound(parent))?
                    .try_inverse()
                    .ok_or(SceneError::SingularTransform(parent))?;
                inverse.transform_point(&position)
            }
            None => position,
        };
        let node = self.node_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        node.transform.position = local.coords;
        Ok(())
    }

    /// Rotate `id` so its world rotation becomes `rotation`
    fn set_world_rotation(&mut self, id: NodeId, rotation: Quat) -> Result<(), SceneError> {
        let parent = self.node(id).ok_or(SceneError::NodeNotFound(id))?.parent;
        let local = match parent {
            Some(parent) => {
                let parent_world = self
                    .world_transform(parent)
                    .ok_or(SceneError::NodeNotFound(parent))?;
                parent_world.rotation.inverse() * rotation
            }
            None => rotation,
        };
        let node = self.node_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        node.transform.rotation = local;
        Ok(())
    }

    /// `id` and all its descendants, pre-order
    fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.traverse(id, &mut |node_id, _| ids.push(node_id));
        ids
    }
}

/// Slot-map backed scene graph
#[derive(Debug, Default)]
pub struct NodeArena {
    nodes: NodeMap<SceneNode>,
    instances: HashMap<String, NodeId>,
    roots: Vec<NodeId>,
}

impl NodeArena {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the local position of a node
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))?;
        node.transform.position = position;
        Ok(())
    }

    fn detach(&mut self, id: NodeId, parent: Option<NodeId>) {
        match parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(parent) {
                    parent.children.retain(|child| *child != id);
                }
            }
            None => self.roots.retain(|root| *root != id),
        }
    }

    fn remove_subtree(&mut self, id: NodeId, removed: &mut Vec<NodeId>) {
        let children = self
            .nodes
            .get(id)
            .map(|node| node.children.clone())
            .unwrap_or_default();
        for child in children {
            self.remove_subtree(child, removed);
        }
        if let Some(node) = self.nodes.remove(id) {
            if let Some(instance_id) = &node.instance_id {
                self.instances.remove(instance_id);
            }
            log::trace!("Disposed node '{}' ({:?})", node.name, id);
            removed.push(id);
        }
    }
}

impl SceneGraph for NodeArena {
    fn add_node(&mut self, mut node: SceneNode, parent: Option<NodeId>) -> Result<NodeId, SceneError> {
        if let Some(parent) = parent {
            if !self.nodes.contains_key(parent) {
                return Err(SceneError::NodeNotFound(parent));
            }
        }
        if let Some(instance_id) = &node.instance_id {
            if self.instances.contains_key(instance_id) {
                return Err(SceneError::DuplicateInstance(instance_id.clone()));
            }
        }

        node.parent = parent;
        node.children.clear();
        let instance_id = node.instance_id.clone();
        let id = self.nodes.insert(node);

        if let Some(instance_id) = instance_id {
            self.instances.insert(instance_id, id);
        }
        match parent.and_then(|parent| self.nodes.get_mut(parent)) {
            Some(parent) => parent.children.push(id),
            None => self.roots.push(id),
        }
        Ok(id)
    }

    fn remove_node(&mut self, id: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let parent = self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))?.parent;
        self.detach(id, parent);

        let mut removed = Vec::new();
        self.remove_subtree(id, &mut removed);
        Ok(removed)
    }

    fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id)
    }

    fn find_by_instance(&self, instance_id: &str) -> Option<NodeId> {
        self.instances.get(instance_id).copied()
    }

    fn traverse(&self, root: NodeId, visitor: &mut dyn FnMut(NodeId, &SceneNode)) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(id) {
                visitor(id, node);
                stack.extend(node.children.iter().rev().copied());
            }
        }
    }

    fn roots(&self) -> Vec<NodeId> {
        self.roots.clone()
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().collect()
    }

    fn for_each_node_mut(&mut self, visitor: &mut dyn FnMut(NodeId, &mut SceneNode)) {
        for (id, node) in &mut self.nodes {
            visitor(id, node);
        }
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
