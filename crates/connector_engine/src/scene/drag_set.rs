//! The set of interactive nodes sampled by the change detector

use super::SceneGraph;
use crate::foundation::collections::{NodeId, OrderedSet};

/// Insertion-ordered set of interactive nodes
///
/// Holds handles only; the scene owns the nodes. Iteration order is stable so
/// consecutive frame snapshots line up element by element.
#[derive(Debug, Default, Clone)]
pub struct DragSet {
    members: OrderedSet<NodeId>,
}

impl DragSet {
    /// Create an empty drag set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node; returns `false` if it was already a member
    pub fn insert(&mut self, id: NodeId) -> bool {
        self.members.insert(id)
    }

    /// Remove a node, keeping the order of the remaining members
    pub fn remove(&mut self, id: NodeId) -> bool {
        self.members.shift_remove(&id)
    }

    /// Membership test
    pub fn contains(&self, id: NodeId) -> bool {
        self.members.contains(&id)
    }

    /// Members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().copied()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Drop members whose node no longer exists
    pub fn retain_live(&mut self, scene: &dyn SceneGraph) -> usize {
        let before = self.members.len();
        self.members.retain(|id| scene.contains(*id));
        before - self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeArena, SceneNode};

    #[test]
    fn test_order_is_stable_after_removal() {
        let mut scene = NodeArena::new();
        let a = scene.add_node(SceneNode::new("a"), None).unwrap();
        let b = scene.add_node(SceneNode::new("b"), None).unwrap();
        let c = scene.add_node(SceneNode::new("c"), None).unwrap();

        let mut drag_set = DragSet::new();
        assert!(drag_set.insert(a));
        assert!(drag_set.insert(b));
        assert!(drag_set.insert(c));
        assert!(!drag_set.insert(a));

        drag_set.remove(b);
        assert_eq!(drag_set.iter().collect::<Vec<_>>(), vec![a, c]);
    }

    #[test]
    fn test_retain_live() {
        let mut scene = NodeArena::new();
        let a = scene.add_node(SceneNode::new("a"), None).unwrap();
        let b = scene.add_node(SceneNode::new("b"), None).unwrap();

        let mut drag_set = DragSet::new();
        drag_set.insert(a);
        drag_set.insert(b);
        scene.remove_node(a).unwrap();

        assert_eq!(drag_set.retain_live(&scene), 1);
        assert!(!drag_set.contains(a));
        assert!(drag_set.contains(b));
    }
}
