//! Math utilities and types
//!
//! Provides the vector, point and rotation types the scene and connector
//! code is written against, plus the few helpers that are not in nalgebra.

pub use nalgebra::{Matrix4, Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Position relative to the parent
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Builder pattern: set rotation
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Builder pattern: set scale
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix (TRS order)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Combine this (parent) transform with a child transform
    pub fn combine(&self, child: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * self.scale.component_mul(&child.position),
            rotation: self.rotation * child.rotation,
            scale: self.scale.component_mul(&child.scale),
        }
    }
}

/// Coordinate axis selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// The X axis
    X,
    /// The Y axis (up)
    Y,
    /// The Z axis
    Z,
}

impl Axis {
    /// Component index of this axis
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Point3, Quat, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Round `value` to `digits` significant digits
    ///
    /// Zero and non-finite values are returned unchanged.
    #[allow(clippy::cast_possible_truncation)]
    pub fn round_to_significant(value: f32, digits: i32) -> f32 {
        if value == 0.0 || !value.is_finite() {
            return value;
        }
        let value = f64::from(value);
        let exponent = value.abs().log10().floor() as i32 - (digits - 1);
        let scale = 10f64.powi(exponent);
        ((value / scale).round() * scale) as f32
    }

    /// Snap every coordinate of `point` onto a grid of the given resolution
    ///
    /// A non-positive resolution leaves the point untouched.
    pub fn snap_to_grid(point: Point3, resolution: f32) -> Point3 {
        if resolution <= 0.0 {
            return point;
        }
        point.map(|c| (c / resolution).round() * resolution)
    }

    /// Rotation that points the local +Z axis from `eye` towards `target`
    ///
    /// Uses world +Y as the up vector, falling back to +Z when the direction
    /// is (anti)parallel to it. Returns `None` for a zero-length direction or
    /// when the result is not finite.
    pub fn look_at_rotation(eye: &Point3, target: &Point3) -> Option<Quat> {
        let direction = target - eye;
        let length_squared = direction.norm_squared();
        if !length_squared.is_finite() || length_squared <= f32::EPSILON * f32::EPSILON {
            return None;
        }

        let up = if direction.cross(&Vec3::y()).norm_squared() <= 1e-10 * length_squared {
            Vec3::z()
        } else {
            Vec3::y()
        };

        let rotation = Quat::face_towards(&direction, &up);
        rotation.coords.iter().all(|c| c.is_finite()).then_some(rotation)
    }
}
