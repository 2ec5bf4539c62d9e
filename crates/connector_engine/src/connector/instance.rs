//! Connector instances and their waypoints

use super::midpoint::{MidpointLabelTracker, MidpointObserver};
use super::polyline::PolylineGeometry;
use super::ConnectorError;
use crate::foundation::collections::{NodeId, SubscriptionId};
use crate::foundation::math::Point3;
use crate::persistence::{InstanceKind, InstanceRecord, LinePoint};
use crate::scene::{NodeRole, SceneGraph};

/// One control point of a connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Waypoint {
    /// Object whose live world position is read on every rebuild
    Anchor {
        /// Instance id of the object
        instance_id: String,
    },
    /// Draggable bend point; its node position is the waypoint
    Bend {
        /// Bend point node
        node: NodeId,
    },
}

/// A relation instance rendered as a live polyline
///
/// Invariants: at least two waypoints, the first and last are object anchors,
/// and `waypoints[i]` is stored as `line_points[i]`.
#[derive(Debug)]
pub struct ConnectorInstance {
    id: String,
    node: NodeId,
    waypoints: Vec<Waypoint>,
    line_points: Vec<LinePoint>,
    polyline: PolylineGeometry,
    midpoint: MidpointLabelTracker,
    label: Option<(NodeId, SubscriptionId)>,
}

impl ConnectorInstance {
    /// Build a connector from its persisted relation record
    ///
    /// `node` is the connector's root scene node; its first two children are
    /// the start and end caps. Interior waypoints naming a bend point node
    /// become [`Waypoint::Bend`], everything else is an object anchor.
    pub fn from_record(
        record: &InstanceRecord,
        node: NodeId,
        scene: &dyn SceneGraph,
        color: [f32; 3],
    ) -> Result<Self, ConnectorError> {
        let invalid = |reason: &str| ConnectorError::InvalidWaypoints {
            connector: record.id.clone(),
            reason: reason.to_string(),
        };

        if record.kind != InstanceKind::Relation {
            return Err(invalid("record is not a relation"));
        }
        if record.line_points.len() < 2 {
            return Err(invalid("a connector needs at least two waypoints"));
        }

        let last = record.line_points.len() - 1;
        let mut waypoints = Vec::with_capacity(record.line_points.len());
        for (index, line_point) in record.line_points.iter().enumerate() {
            let bend_node = scene
                .find_by_instance(&line_point.anchor_id)
                .filter(|id| scene.node(*id).is_some_and(|n| n.role == NodeRole::BendPoint));

            let waypoint = match bend_node {
                Some(_) if index == 0 || index == last => {
                    return Err(invalid("first and last waypoints must be object anchors"));
                }
                Some(node) => Waypoint::Bend { node },
                None => Waypoint::Anchor {
                    instance_id: line_point.anchor_id.clone(),
                },
            };
            waypoints.push(waypoint);
        }

        let points: Vec<Point3> = record.line_points.iter().map(|lp| lp.point).collect();
        Ok(Self {
            id: record.id.clone(),
            node,
            waypoints,
            line_points: record.line_points.clone(),
            polyline: PolylineGeometry::from_points(&points, color),
            midpoint: MidpointLabelTracker::new(),
            label: None,
        })
    }

    /// Relation instance id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Root scene node of the connector
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Ordered waypoints
    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Stored form of the waypoints
    pub fn line_points(&self) -> &[LinePoint] {
        &self.line_points
    }

    /// Rendered polyline
    pub fn polyline(&self) -> &PolylineGeometry {
        &self.polyline
    }

    pub(crate) fn polyline_mut(&mut self) -> &mut PolylineGeometry {
        &mut self.polyline
    }

    /// Last computed arc-length midpoint
    pub fn midpoint(&self) -> Option<Point3> {
        self.midpoint.midpoint()
    }

    pub(crate) fn midpoint_tracker_mut(&mut self) -> &mut MidpointLabelTracker {
        &mut self.midpoint
    }

    /// Distinct objects this connector relates
    pub fn related_objects(&self) -> usize {
        let mut anchors: Vec<&str> = self
            .waypoints
            .iter()
            .filter_map(|w| match w {
                Waypoint::Anchor { instance_id } => Some(instance_id.as_str()),
                Waypoint::Bend { .. } => None,
            })
            .collect();
        anchors.sort_unstable();
        anchors.dedup();
        anchors.len()
    }

    /// Whether `node` is one of this connector's bend points
    pub fn has_bend_point(&self, node: NodeId) -> bool {
        self.waypoints.contains(&Waypoint::Bend { node })
    }

    /// Overwrite a stored waypoint position; returns `true` if it changed
    pub(crate) fn store_point(&mut self, index: usize, point: Point3) -> bool {
        match self.line_points.get_mut(index) {
            Some(line_point) if line_point.point != point => {
                line_point.point = point;
                true
            }
            _ => false,
        }
    }

    /// Insert a bend point before `index`
    ///
    /// `index` must be interior: `1..=waypoints.len() - 1`.
    pub fn insert_bend_point(
        &mut self,
        index: usize,
        node: NodeId,
        anchor_id: impl Into<String>,
        point: Point3,
    ) -> Result<(), ConnectorError> {
        if index == 0 || index >= self.waypoints.len() {
            return Err(ConnectorError::InvalidWaypoints {
                connector: self.id.clone(),
                reason: format!("bend point index {index} is not interior"),
            });
        }
        self.waypoints.insert(index, Waypoint::Bend { node });
        self.line_points.insert(index, LinePoint::new(anchor_id, point));
        Ok(())
    }

    /// Remove a bend point; returns `false` if it is not part of this connector
    pub fn remove_bend_point(&mut self, node: NodeId) -> bool {
        let Some(index) = self.waypoints.iter().position(|w| *w == Waypoint::Bend { node }) else {
            return false;
        };
        self.waypoints.remove(index);
        self.line_points.remove(index);
        true
    }

    /// Register a midpoint observer
    pub fn subscribe(&mut self, observer: impl MidpointObserver + 'static) -> SubscriptionId {
        self.midpoint.subscribe(observer)
    }

    /// Remove a midpoint observer
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.midpoint.unsubscribe(subscription)
    }

    /// Attached midpoint label, if any
    pub fn label(&self) -> Option<NodeId> {
        self.label.map(|(node, _)| node)
    }

    pub(crate) fn set_label(&mut self, label: Option<(NodeId, SubscriptionId)>) -> Option<(NodeId, SubscriptionId)> {
        std::mem::replace(&mut self.label, label)
    }
}
