//! Connector geometry rebuild
//!
//! Rebuilds a connector's polyline from the live positions of its waypoints.
//! Attachment failures abort the rebuild (the old geometry stays on screen);
//! cap placement failures only skip the affected endpoint.

use super::attachment::AttachmentResolver;
use super::instance::{ConnectorInstance, Waypoint};
use super::{ConnectorError, Endpoint};
use crate::core::config::EngineSettings;
use crate::foundation::collections::NodeId;
use crate::foundation::math::utils::{deg_to_rad, look_at_rotation, round_to_significant, snap_to_grid};
use crate::foundation::math::{Point3, Quat, Vec3};
use crate::scene::SceneGraph;

/// What a successful rebuild changed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RebuildOutcome {
    /// At least one stored bend point position was overwritten
    pub waypoints_changed: bool,
    /// New arc-length midpoint
    pub midpoint: Option<Point3>,
    /// Endpoints whose cap could not be placed or oriented
    pub cap_failures: usize,
}

/// Rebuilds connector polylines and places their caps
#[derive(Debug, Clone, Copy)]
pub struct ConnectorGeometryBuilder<'a> {
    settings: &'a EngineSettings,
}

impl<'a> ConnectorGeometryBuilder<'a> {
    /// Create a builder using the given settings
    pub fn new(settings: &'a EngineSettings) -> Self {
        Self { settings }
    }

    /// Rebuild `connector` from the current scene
    pub fn rebuild(
        &self,
        connector: &mut ConnectorInstance,
        scene: &mut dyn SceneGraph,
    ) -> Result<RebuildOutcome, ConnectorError> {
        let (nodes, waypoint_points, waypoints_changed) = self.resolve_waypoints(connector, &*scene)?;
        let last = nodes.len() - 1;

        let start = AttachmentResolver::resolve_boundary_point(&*scene, nodes[1], nodes[0])
            .map_err(|reason| ConnectorError::Resolution {
                connector: connector.id().to_string(),
                endpoint: Endpoint::Start,
                reason,
            })?;
        let end = AttachmentResolver::resolve_boundary_point(&*scene, nodes[last - 1], nodes[last])
            .map_err(|reason| ConnectorError::Resolution {
                connector: connector.id().to_string(),
                endpoint: Endpoint::End,
                reason,
            })?;

        let mut points = Vec::with_capacity(nodes.len());
        points.push(start);
        points.extend_from_slice(&waypoint_points[1..last]);
        points.push(end);

        let (start_cap, end_cap) = Self::caps(connector, &*scene)?;
        let mut cap_failures = 0;
        for (endpoint, cap, slot, adjacent) in [
            (Endpoint::Start, start_cap, 0, waypoint_points[1]),
            (Endpoint::End, end_cap, last, waypoint_points[last - 1]),
        ] {
            match self.place_cap(scene, cap, endpoint, points[slot], adjacent) {
                Ok(cap_point) => points[slot] = cap_point,
                Err((cap_point, e)) => {
                    log::warn!("Connector {}: {}", connector.id(), e);
                    cap_failures += 1;
                    if let Some(cap_point) = cap_point {
                        points[slot] = cap_point;
                    }
                }
            }
        }

        connector.polyline_mut().replace(&points, self.settings.line_color);
        let midpoint = connector.midpoint_tracker_mut().update(&points, scene);

        log::trace!(
            "Rebuilt connector {} with {} points (midpoint {:?})",
            connector.id(),
            points.len(),
            midpoint
        );

        Ok(RebuildOutcome {
            waypoints_changed,
            midpoint,
            cap_failures,
        })
    }

    /// Live node and point of every waypoint, writing moved bend points back
    fn resolve_waypoints(
        &self,
        connector: &mut ConnectorInstance,
        scene: &dyn SceneGraph,
    ) -> Result<(Vec<NodeId>, Vec<Point3>, bool), ConnectorError> {
        let missing = |anchor: String| ConnectorError::MissingWaypointObject {
            connector: connector.id().to_string(),
            anchor,
        };

        let mut nodes = Vec::with_capacity(connector.waypoints().len());
        let mut points = Vec::with_capacity(connector.waypoints().len());
        let mut bend_points = Vec::new();

        for (index, waypoint) in connector.waypoints().iter().enumerate() {
            let (node, point) = match waypoint {
                Waypoint::Anchor { instance_id } => {
                    let node = scene
                        .find_by_instance(instance_id)
                        .ok_or_else(|| missing(instance_id.clone()))?;
                    let point = scene
                        .world_position(node)
                        .ok_or_else(|| missing(instance_id.clone()))?;
                    (node, point)
                }
                Waypoint::Bend { node } => {
                    let point = scene
                        .world_position(*node)
                        .ok_or_else(|| missing(connector.line_points()[index].anchor_id.clone()))?;
                    let point = snap_to_grid(point, self.settings.bend_point_grid);
                    bend_points.push((index, point));
                    (*node, point)
                }
            };
            nodes.push(node);
            points.push(point);
        }

        if nodes.len() < 2 {
            return Err(ConnectorError::InvalidWaypoints {
                connector: connector.id().to_string(),
                reason: "a connector needs at least two waypoints".to_string(),
            });
        }

        let mut changed = false;
        for (index, point) in bend_points {
            changed |= connector.store_point(index, point);
        }
        Ok((nodes, points, changed))
    }

    /// Start and end cap nodes (first two children of the connector node)
    fn caps(connector: &ConnectorInstance, scene: &dyn SceneGraph) -> Result<(NodeId, NodeId), ConnectorError> {
        let node = scene
            .node(connector.node())
            .ok_or_else(|| ConnectorError::MissingCaps {
                connector: connector.id().to_string(),
            })?;
        match node.children() {
            [start, end, ..] => Ok((*start, *end)),
            _ => Err(ConnectorError::MissingCaps {
                connector: connector.id().to_string(),
            }),
        }
    }

    /// Move the cap inwards from `boundary` and turn it along the line
    ///
    /// Returns the cap's new world position. On failure the error carries the
    /// position if the cap was still moved (offset succeeded, look-at failed).
    fn place_cap(
        &self,
        scene: &mut dyn SceneGraph,
        cap: NodeId,
        endpoint: Endpoint,
        boundary: Point3,
        adjacent: Point3,
    ) -> Result<Point3, (Option<Point3>, ConnectorError)> {
        let orientation = |reason: &str| ConnectorError::Orientation {
            endpoint,
            reason: reason.to_string(),
        };

        let direction = (boundary - adjacent)
            .try_normalize(f32::EPSILON)
            .ok_or_else(|| (None, orientation("zero-length direction")))?;

        let cap_width = scene.node(cap).map_or(0.0, |node| {
            node.metadata
                .cap_width
                .or_else(|| node.metadata.shape.map(|shape| shape.bounding_width()))
                .unwrap_or(0.0)
        });
        let offset = -direction * (cap_width / 2.0 + self.settings.cap_clearance);
        let cap_point = boundary + offset;
        scene
            .set_world_position(cap, cap_point)
            .map_err(|e| (None, ConnectorError::from(e)))?;

        let target = self.look_at_target(adjacent, boundary);
        let rotation = look_at_rotation(&cap_point, &target)
            .ok_or_else(|| (Some(cap_point), orientation("look-at direction is degenerate")))?;
        let face = Quat::from_axis_angle(
            &Vec3::y_axis(),
            deg_to_rad(self.settings.cap_face_rotation_degrees),
        );
        scene
            .set_world_rotation(cap, rotation * face)
            .map_err(|e| (Some(cap_point), ConnectorError::from(e)))?;

        Ok(cap_point)
    }

    /// Point far along `from -> to`, nudged off the vertical when needed
    #[allow(clippy::float_cmp)]
    fn look_at_target(&self, from: Point3, to: Point3) -> Point3 {
        let mut target = from + (to - from) * self.settings.look_at_extrapolation;

        // Near-vertical line: the horizontal component matches the boundary
        // to one significant digit, so the look-at would flip around
        let axis = self.settings.degenerate_axis.index();
        if round_to_significant(target[axis], 1) == round_to_significant(to[axis], 1) {
            target[axis] *= self.settings.degenerate_perturbation;
        }
        target
    }
}
