//! Collision primitives and surface shapes
//!
//! Shapes are stored in node-local space and the query ray is moved into
//! that space, so scaled and rotated nodes need no per-frame shape rebuild.

pub mod primitives;
pub mod shape;

pub use primitives::{BoundingSphere, Ray, AABB};
pub use shape::{BoundaryShape, SurfaceHit};
