//! Geometric queries used to attach connectors to object surfaces
//!
//! Only ray casting is needed here: a connector end is found by casting a ray
//! from its neighbouring waypoint into the object it attaches to.

pub mod collision;

pub use collision::{BoundaryShape, BoundingSphere, Ray, AABB};
