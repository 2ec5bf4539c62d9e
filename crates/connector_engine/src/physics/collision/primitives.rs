//! Primitive shapes and ray intersection algorithms
//!
//! Provides rays, axis-aligned boxes and spheres with intersection tests that
//! report the parametric entry and exit of a ray.

use crate::foundation::math::{Point3, Vec3};

/// A ray for ray casting
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray
    pub origin: Point3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a ray, returning `None` when the direction has no length
    pub fn try_new(origin: Point3, direction: Vec3) -> Option<Self> {
        let direction = direction.try_normalize(f32::EPSILON)?;
        Some(Self { origin, direction })
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Point3 {
        self.origin + self.direction * t
    }
}

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a point with given extents
    pub fn from_center_extents(center: Vec3, extents: Vec3) -> Self {
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Whether the box has zero (or negative) size along any axis
    pub fn is_degenerate(&self) -> bool {
        (0..3).any(|i| self.max[i] - self.min[i] <= 0.0)
    }

    /// Clamp a point into the box
    pub fn clamp_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Slab test: parametric entry and exit distances of the ray
    ///
    /// Returns `None` when the ray misses or the box lies entirely behind the
    /// origin. The entry distance is negative when the origin is inside.
    #[allow(clippy::float_cmp)]
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let direction = ray.direction[axis];

            if direction == 0.0 {
                // Parallel to this slab: either always inside it or never
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / direction;
            let t1 = (self.min[axis] - origin) * inv;
            let t2 = (self.max[axis] - origin) * inv;
            t_enter = t_enter.max(t1.min(t2));
            t_exit = t_exit.min(t1.max(t2));
        }

        (t_exit >= t_enter && t_exit >= 0.0).then_some((t_enter, t_exit))
    }
}

/// A bounding sphere
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    /// The center of the sphere
    pub center: Point3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Point3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Parametric entry and exit distances of the ray
    ///
    /// Same conventions as [`AABB::intersect_ray`].
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f32, f32)> {
        // Solve |origin + t*direction - center|^2 = radius^2 with |direction| = 1
        let oc = ray.origin - self.center;
        let b = oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;

        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }

        let root = discriminant.sqrt();
        let t_enter = -b - root;
        let t_exit = -b + root;

        (t_exit >= 0.0).then_some((t_enter, t_exit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> AABB {
        AABB::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_ray_rejects_zero_direction() {
        assert!(Ray::try_new(Point3::origin(), Vec3::zeros()).is_none());
    }

    #[test]
    fn test_aabb_ray_from_outside() {
        let ray = Ray::try_new(Point3::new(-5.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)).unwrap();
        let (t_enter, t_exit) = unit_box().intersect_ray(&ray).unwrap();

        assert_relative_eq!(t_enter, 4.0);
        assert_relative_eq!(t_exit, 6.0);
    }

    #[test]
    fn test_aabb_ray_from_inside_has_negative_entry() {
        let ray = Ray::try_new(Point3::origin(), Vec3::new(0.0, 1.0, 0.0)).unwrap();
        let (t_enter, t_exit) = unit_box().intersect_ray(&ray).unwrap();

        assert!(t_enter < 0.0);
        assert_relative_eq!(t_exit, 1.0);
    }

    #[test]
    fn test_aabb_ray_miss_and_behind() {
        let parallel = Ray::try_new(Point3::new(-5.0, 3.0, 0.0), Vec3::new(1.0, 0.0, 0.0)).unwrap();
        assert!(unit_box().intersect_ray(&parallel).is_none());

        let away = Ray::try_new(Point3::new(-5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)).unwrap();
        assert!(unit_box().intersect_ray(&away).is_none());
    }

    #[test]
    fn test_aabb_degenerate() {
        let flat = AABB::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 1.0));
        assert!(flat.is_degenerate());
        assert!(!unit_box().is_degenerate());
    }

    #[test]
    fn test_sphere_ray() {
        let sphere = BoundingSphere::new(Point3::new(0.0, 0.0, 10.0), 2.0);
        let ray = Ray::try_new(Point3::origin(), Vec3::new(0.0, 0.0, 1.0)).unwrap();
        let (t_enter, t_exit) = sphere.intersect_ray(&ray).unwrap();

        assert_relative_eq!(t_enter, 8.0);
        assert_relative_eq!(t_exit, 12.0);
    }
}
