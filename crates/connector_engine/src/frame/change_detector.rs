//! Per-tick transform sampling and tolerant comparison

use crate::core::config::DEFAULT_CHANGE_TOLERANCE;
use crate::scene::{DragSet, SceneGraph, SceneNode};

/// Element-wise comparison with the default tolerance
///
/// Two empty slices are equal, slices of different length never are.
pub fn approximately_equal(a: &[f32], b: &[f32]) -> bool {
    approximately_equal_within(a, b, DEFAULT_CHANGE_TOLERANCE)
}

/// Element-wise comparison: every pair is identical or at most `tolerance` apart
#[allow(clippy::float_cmp)]
pub fn approximately_equal_within(a: &[f32], b: &[f32], tolerance: f32) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y || (x - y).abs() <= tolerance)
}

/// Flat position and rotation samples of the drag set
///
/// Each member contributes its own local transform followed by those of its
/// direct children: three floats per position, four (x, y, z, w) per rotation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSnapshot {
    /// Sampled positions
    pub positions: Vec<f32>,
    /// Sampled rotations
    pub rotations: Vec<f32>,
}

impl FrameSnapshot {
    /// Sample every live member of `drag_set`, in drag set order
    pub fn capture(drag_set: &DragSet, scene: &dyn SceneGraph) -> Self {
        let mut snapshot = Self::default();
        for id in drag_set.iter() {
            let Some(node) = scene.node(id) else {
                continue;
            };
            snapshot.push(node);
            for child in node.children().iter().filter_map(|child| scene.node(*child)) {
                snapshot.push(child);
            }
        }
        snapshot
    }

    /// Number of sampled nodes
    pub fn node_count(&self) -> usize {
        self.positions.len() / 3
    }

    fn push(&mut self, node: &SceneNode) {
        let position = node.transform.position;
        let rotation = node.transform.rotation;
        self.positions.extend_from_slice(&[position.x, position.y, position.z]);
        self.rotations.extend_from_slice(&[rotation.i, rotation.j, rotation.k, rotation.w]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Quat, Vec3};
    use crate::scene::NodeArena;

    #[test]
    fn test_identical_arrays_are_equal() {
        let samples = [0.0, -3.5, 1e6, 42.125];
        assert!(approximately_equal(&samples, &samples));
        assert!(approximately_equal(&[], &[]));
    }

    #[test]
    fn test_tolerance_boundary_is_inclusive() {
        assert!(approximately_equal(&[0.0], &[0.08]));
        // Differences of exactly the tolerance count as equal
        assert!(approximately_equal(&[0.0], &[0.09]));
        assert!(approximately_equal(&[0.5], &[0.59]));
        assert!(!approximately_equal(&[0.0], &[0.091]));
        assert!(!approximately_equal(&[0.0], &[0.10]));
    }

    #[test]
    fn test_length_mismatch_is_a_change() {
        assert!(!approximately_equal(&[0.0, 1.0], &[0.0]));
        assert!(!approximately_equal(&[], &[0.0]));
    }

    #[test]
    fn test_custom_tolerance() {
        assert!(approximately_equal_within(&[0.0], &[0.5], 0.5));
        assert!(!approximately_equal_within(&[0.0], &[0.01], 0.0));
    }

    #[test]
    fn test_capture_includes_direct_children_in_order() {
        let mut scene = NodeArena::new();
        let parent = scene
            .add_node(SceneNode::new("parent").with_position(Vec3::new(1.0, 2.0, 3.0)), None)
            .unwrap();
        let child = scene
            .add_node(SceneNode::new("child").with_position(Vec3::new(4.0, 5.0, 6.0)), Some(parent))
            .unwrap();
        scene
            .add_node(SceneNode::new("grandchild").with_position(Vec3::new(7.0, 8.0, 9.0)), Some(child))
            .unwrap();
        let other = scene
            .add_node(
                SceneNode::new("other").with_rotation(Quat::from_euler_angles(0.0, 1.0, 0.0)),
                None,
            )
            .unwrap();

        let mut drag_set = DragSet::new();
        drag_set.insert(other);
        drag_set.insert(parent);

        let snapshot = FrameSnapshot::capture(&drag_set, &scene);

        assert_eq!(snapshot.node_count(), 3);
        assert_eq!(&snapshot.positions[3..], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(snapshot.rotations.len(), 12);
        assert_eq!(&snapshot.rotations[4..], &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_capture_skips_removed_members() {
        let mut scene = NodeArena::new();
        let gone = scene.add_node(SceneNode::new("gone"), None).unwrap();
        let mut drag_set = DragSet::new();
        drag_set.insert(gone);
        scene.remove_node(gone).unwrap();

        assert_eq!(FrameSnapshot::capture(&drag_set, &scene), FrameSnapshot::default());
    }
}
