//! Live connector geometry
//!
//! A connector is the polyline drawn for a relation instance. Every rebuild
//! reads the live positions of its waypoints, attaches both ends to the
//! boundaries of the connected objects, places and orients the two end caps
//! and moves any attached label to the arc-length midpoint.
//!
//! ```text
//! ConnectorGeometryBuilder::rebuild
//!   ├─ resolve waypoints (anchors + bend points)
//!   ├─ AttachmentResolver (start pair, end pair)
//!   ├─ cap offset + look-at (per endpoint, non-fatal)
//!   ├─ PolylineGeometry::replace
//!   └─ MidpointLabelTracker::update
//! ```

mod attachment;
mod builder;
mod instance;
mod midpoint;
mod polyline;

pub use attachment::{AttachmentResolver, ResolutionFailure};
pub use builder::{ConnectorGeometryBuilder, RebuildOutcome};
pub use instance::{ConnectorInstance, Waypoint};
pub use midpoint::{locate_midpoint, LabelBinding, MidpointLabelTracker, MidpointObserver};
pub use polyline::PolylineGeometry;

use std::fmt;

use thiserror::Error;

use crate::scene::SceneError;

/// Which end of a connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// First waypoint end
    Start,
    /// Last waypoint end
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Connector errors
///
/// None of these reach the end user; the frame scheduler logs them and the
/// affected connector keeps its previous geometry for the tick.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectorError {
    /// No boundary intersection for one of the endpoint pairs
    #[error("Connector {connector}: boundary resolution failed at {endpoint} end: {reason}")]
    Resolution {
        /// Connector id
        connector: String,
        /// Endpoint being resolved
        endpoint: Endpoint,
        /// Why the ray found nothing
        reason: ResolutionFailure,
    },

    /// Cap look-at or offset math failed for one endpoint
    #[error("Cap orientation failed at {endpoint} end: {reason}")]
    Orientation {
        /// Endpoint whose cap was left unchanged
        endpoint: Endpoint,
        /// Description of the degenerate input
        reason: String,
    },

    /// An object-anchor waypoint no longer names a live node
    #[error("Connector {connector}: waypoint object '{anchor}' is not in the scene")]
    MissingWaypointObject {
        /// Connector id
        connector: String,
        /// Anchor instance id
        anchor: String,
    },

    /// Waypoint list violates the connector invariants
    #[error("Connector {connector}: invalid waypoints: {reason}")]
    InvalidWaypoints {
        /// Connector id
        connector: String,
        /// Violated invariant
        reason: String,
    },

    /// Connector node does not expose its two cap children
    #[error("Connector {connector}: expected two cap nodes")]
    MissingCaps {
        /// Connector id
        connector: String,
    },

    /// Scene graph failure
    #[error(transparent)]
    Scene(#[from] SceneError),
}
