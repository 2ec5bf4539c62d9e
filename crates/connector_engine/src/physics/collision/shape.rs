//! Surface shapes attached to scene nodes
//!
//! Shapes are stored in MODEL SPACE. A world-space query ray is transformed
//! into the node's local frame using the inverse of its world matrix, tested
//! there, and the hit is transformed back.

use serde::{Deserialize, Serialize};

use super::primitives::{BoundingSphere, Ray, AABB};
use crate::foundation::math::{Mat4, Point3, Vec3};

/// Surface geometry of a node, in the node's local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryShape {
    /// Box centred on the node origin
    Box {
        /// Half size along each local axis
        half_extents: [f32; 3],
    },
    /// Sphere centred on the node origin
    Sphere {
        /// Sphere radius
        radius: f32,
    },
}

/// A ray hit on a boundary shape, in world space
#[derive(Debug, Clone, Copy)]
pub struct SurfaceHit {
    /// Hit point
    pub point: Point3,
    /// World distance from the ray origin
    pub distance: f32,
}

impl BoundaryShape {
    /// Box with the given full width, height and depth
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        Self::Box {
            half_extents: [width * 0.5, height * 0.5, depth * 0.5],
        }
    }

    /// Sphere with the given radius
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    /// Local bounding box of the shape
    pub fn local_bounds(&self) -> AABB {
        match *self {
            Self::Box { half_extents } => {
                AABB::from_center_extents(Vec3::zeros(), Vec3::from(half_extents))
            }
            Self::Sphere { radius } => {
                AABB::from_center_extents(Vec3::zeros(), Vec3::repeat(radius))
            }
        }
    }

    /// Full local width along X (the value cached on cap nodes)
    pub fn bounding_width(&self) -> f32 {
        let bounds = self.local_bounds();
        bounds.max.x - bounds.min.x
    }

    /// Whether the shape has no usable volume
    pub fn is_degenerate(&self) -> bool {
        self.local_bounds().is_degenerate()
    }

    /// First non-negative hit distance of a local-space ray
    ///
    /// A ray starting inside the shape reports the exit point.
    pub fn intersect_local(&self, ray: &Ray) -> Option<f32> {
        if self.is_degenerate() {
            return None;
        }
        let (t_enter, t_exit) = match *self {
            Self::Box { .. } => self.local_bounds().intersect_ray(ray)?,
            Self::Sphere { radius } => {
                BoundingSphere::new(Point3::origin(), radius).intersect_ray(ray)?
            }
        };
        Some(if t_enter >= 0.0 { t_enter } else { t_exit })
    }

    /// Cast a world-space ray from `origin` towards `toward` against this
    /// shape placed by the `world` matrix
    pub fn cast(&self, world: &Mat4, origin: &Point3, toward: &Point3) -> Option<SurfaceHit> {
        let inverse = world.try_inverse()?;
        let local_origin = inverse.transform_point(origin);
        let local_direction = inverse.transform_vector(&(toward - origin));
        let ray = Ray::try_new(local_origin, local_direction)?;

        let t = self.intersect_local(&ray)?;
        let point = world.transform_point(&ray.point_at(t));
        Some(SurfaceHit {
            point,
            distance: (point - origin).norm(),
        })
    }
}
