//! # Connector Engine
//!
//! Live relation-line geometry for interactive 3D metamodel scenes.
//!
//! ## Features
//!
//! - **Boundary Attachment**: connectors end on the visible surface of the
//!   objects they relate, not at their centers
//! - **Bend Points**: draggable interior waypoints, snapped and persisted
//! - **Oriented Caps**: end caps offset off the surface and turned along the line
//! - **Midpoint Labels**: labels follow the arc-length midpoint through
//!   explicit subscriptions
//! - **Change Detection**: one tolerant snapshot comparison per tick gates
//!   every rebuild
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use connector_engine::prelude::*;
//!
//! fn main() -> Result<(), ContextError> {
//!     let mut ctx = EditorContext::new(EngineSettings::default())?;
//!     for (id, x) in [("a", 0.0), ("b", 10.0)] {
//!         ctx.insert_object(
//!             SceneNode::instance(id, InstanceKind::Class)
//!                 .with_position(Vec3::new(x, 0.0, 0.0))
//!                 .with_shape(BoundaryShape::cuboid(2.0, 2.0, 2.0)),
//!             None,
//!         )?;
//!     }
//!     ctx.add_connector(
//!         InstanceRecord::relation(
//!             "rel",
//!             vec![
//!                 LinePoint::new("a", Point3::origin()),
//!                 LinePoint::new("b", Point3::new(10.0, 0.0, 0.0)),
//!             ],
//!         ),
//!         SceneNode::new("start-cap").with_cap_width(0.4),
//!         SceneNode::new("end-cap").with_cap_width(0.4),
//!     )?;
//!
//!     let mut scheduler = FrameScheduler::new();
//!     let report = scheduler.tick(&mut ctx);
//!     assert_eq!(report.state, TickState::Dirty);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod foundation;
pub mod config;
pub mod scene;
pub mod physics;
pub mod connector;
pub mod frame;
pub mod persistence;
pub mod context;

#[cfg(test)]
mod tests;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        connector::{
            ConnectorError, ConnectorGeometryBuilder, ConnectorInstance, LabelBinding, MidpointObserver,
            PolylineGeometry, Waypoint,
        },
        context::{ContextError, EditorContext, SchedulerFlags, ViewMode},
        core::config::{Config, EngineSettings},
        foundation::math::{Point3, Quat, Transform, Vec3},
        frame::{FrameScheduler, TickReport, TickState},
        persistence::{InstanceKind, InstanceRecord, InstanceStore, LinePoint, MemoryStore},
        physics::BoundaryShape,
        scene::{DragSet, NodeArena, NodeId, NodeRole, SceneGraph, SceneNode},
    };
}
