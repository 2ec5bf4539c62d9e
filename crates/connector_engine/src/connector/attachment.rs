//! Boundary attachment
//!
//! Connectors end on an object's visible surface, not at its origin. The
//! boundary point is found by casting a ray from a neighbouring waypoint
//! towards the object and taking the first hit on the object's shapes.

use thiserror::Error;

use crate::foundation::collections::NodeId;
use crate::foundation::math::Point3;
use crate::physics::collision::SurfaceHit;
use crate::scene::SceneGraph;

/// Why no boundary point could be found
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionFailure {
    /// Source or target node is gone
    #[error("node {0:?} is not in the scene")]
    MissingNode(NodeId),
    /// Source and target share a world position
    #[error("source and target are coincident")]
    Coincident,
    /// The ray hit none of the target's shapes
    #[error("ray does not intersect the target surface")]
    NoIntersection,
}

/// Finds where a connector meets an object's surface
#[derive(Debug, Default, Clone, Copy)]
pub struct AttachmentResolver;

impl AttachmentResolver {
    /// Point where the ray from `source` towards `target` first meets the
    /// surface of `target` (or of any of its descendants), in world space
    pub fn resolve_boundary_point(
        scene: &dyn SceneGraph,
        source: NodeId,
        target: NodeId,
    ) -> Result<Point3, ResolutionFailure> {
        let origin = scene
            .world_position(source)
            .ok_or(ResolutionFailure::MissingNode(source))?;
        let toward = scene
            .world_position(target)
            .ok_or(ResolutionFailure::MissingNode(target))?;

        if (toward - origin).norm_squared() <= f32::EPSILON * f32::EPSILON {
            return Err(ResolutionFailure::Coincident);
        }

        let mut nearest: Option<SurfaceHit> = None;
        for id in scene.descendants(target) {
            let Some(shape) = scene.node(id).and_then(|node| node.metadata.shape) else {
                continue;
            };
            let Some(world) = scene.world_matrix(id) else {
                continue;
            };
            if let Some(hit) = shape.cast(&world, &origin, &toward) {
                if nearest.map_or(true, |best| hit.distance < best.distance) {
                    nearest = Some(hit);
                }
            }
        }

        nearest
            .map(|hit| hit.point)
            .ok_or(ResolutionFailure::NoIntersection)
    }
}
