//! # Editor Context
//!
//! Everything the frame loop touches lives in one explicit struct that is
//! passed by reference into the [`FrameScheduler`](crate::frame::FrameScheduler):
//! the scene graph, the drag set, the connectors, the instance store, the
//! scheduler flags and the active view mode.
//!
//! The editing operations here keep those pieces consistent with each other,
//! e.g. a new bend point is created in the scene, inserted into its connector,
//! added to the drag set and persisted in one call.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::connector::{ConnectorError, ConnectorInstance, LabelBinding, Waypoint};
use crate::core::config::{ConfigError, EngineSettings};
use crate::foundation::collections::NodeId;
use crate::foundation::math::utils::snap_to_grid;
use crate::foundation::math::{Point3, Vec3};
use crate::persistence::{InstanceKind, InstanceRecord, InstanceStore, MemoryStore, PersistenceError};
use crate::scene::{DragSet, NodeArena, NodeRole, SceneError, SceneGraph, SceneNode};

bitflags! {
    /// Conditions that force a connector rebuild regardless of movement
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SchedulerFlags: u8 {
        /// A connector is being drawn interactively
        const DRAWING = 1 << 0;
        /// An object was rescaled since the last rebuild pass
        const RESCALED = 1 << 1;
    }
}

/// Active camera / view mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    /// Editor camera; position changes rebuild connectors
    #[default]
    Interactive,
    /// Camera driven by an immersive (AR) session; position-triggered
    /// rebuilds are suspended
    Immersive,
}

/// Editing operation errors
#[derive(Error, Debug)]
pub enum ContextError {
    /// No connector with this id
    #[error("Connector not found: {0}")]
    ConnectorNotFound(String),

    /// Node is not one of the connector's bend points
    #[error("Node {node:?} is not a bend point of connector {connector}")]
    UnknownBendPoint {
        /// Connector id
        connector: String,
        /// Offending node
        node: NodeId,
    },

    /// Scene graph failure
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Connector construction failure
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    /// Store failure
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Settings rejected at construction
    #[error(transparent)]
    Settings(#[from] ConfigError),
}

/// Shared editor state
pub struct EditorContext {
    pub(crate) settings: EngineSettings,
    pub(crate) scene: Box<dyn SceneGraph>,
    pub(crate) drag_set: DragSet,
    pub(crate) connectors: Vec<ConnectorInstance>,
    pub(crate) store: Box<dyn InstanceStore>,
    pub(crate) flags: SchedulerFlags,
    pub(crate) view_mode: ViewMode,
    bend_points_created: u64,
}

impl fmt::Debug for EditorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorContext")
            .field("settings", &self.settings)
            .field("nodes", &self.scene.len())
            .field("drag_set", &self.drag_set.len())
            .field("connectors", &self.connectors.len())
            .field("flags", &self.flags)
            .field("view_mode", &self.view_mode)
            .finish()
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::assemble(
            EngineSettings::default(),
            Box::new(NodeArena::new()),
            Box::new(MemoryStore::new()),
        )
    }
}

impl EditorContext {
    /// Empty editor backed by a [`NodeArena`] and a [`MemoryStore`]
    ///
    /// Fails when `settings` do not pass [`EngineSettings::validate`].
    pub fn new(settings: EngineSettings) -> Result<Self, ContextError> {
        Self::with_parts(settings, Box::new(NodeArena::new()), Box::new(MemoryStore::new()))
    }

    /// Editor over a host-provided scene graph and store
    pub fn with_parts(
        settings: EngineSettings,
        scene: Box<dyn SceneGraph>,
        store: Box<dyn InstanceStore>,
    ) -> Result<Self, ContextError> {
        settings.validate()?;
        Ok(Self::assemble(settings, scene, store))
    }

    fn assemble(settings: EngineSettings, scene: Box<dyn SceneGraph>, store: Box<dyn InstanceStore>) -> Self {
        Self {
            settings,
            scene,
            drag_set: DragSet::new(),
            connectors: Vec::new(),
            store,
            flags: SchedulerFlags::empty(),
            view_mode: ViewMode::default(),
            bend_points_created: 0,
        }
    }

    /// Engine settings
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Scene graph
    pub fn scene(&self) -> &dyn SceneGraph {
        self.scene.as_ref()
    }

    /// Mutable scene graph (for host-driven moves)
    pub fn scene_mut(&mut self) -> &mut dyn SceneGraph {
        self.scene.as_mut()
    }

    /// Nodes sampled by the change detector
    pub fn drag_set(&self) -> &DragSet {
        &self.drag_set
    }

    /// Instance store
    pub fn store(&self) -> &dyn InstanceStore {
        self.store.as_ref()
    }

    /// All connectors in creation order
    pub fn connectors(&self) -> &[ConnectorInstance] {
        &self.connectors
    }

    /// Connector by relation id
    pub fn connector(&self, id: &str) -> Option<&ConnectorInstance> {
        self.connectors.iter().find(|c| c.id() == id)
    }

    /// Current scheduler flags
    pub fn flags(&self) -> SchedulerFlags {
        self.flags
    }

    /// Active view mode
    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// Raise or clear the connector-drawing flag
    pub fn set_drawing(&mut self, drawing: bool) {
        self.flags.set(SchedulerFlags::DRAWING, drawing);
    }

    /// Switch the active view mode
    pub fn set_view_mode(&mut self, view_mode: ViewMode) {
        if self.view_mode != view_mode {
            log::debug!("View mode {:?} -> {:?}", self.view_mode, view_mode);
        }
        self.view_mode = view_mode;
    }

    /// Add an object node and make it interactive
    ///
    /// Class and port nodes get an empty instance record if the store has
    /// none yet.
    pub fn insert_object(&mut self, node: SceneNode, parent: Option<NodeId>) -> Result<NodeId, ContextError> {
        let record = match (node.role, &node.instance_id) {
            (NodeRole::Instance(kind @ (InstanceKind::Class | InstanceKind::Port)), Some(id)) => {
                Some(InstanceRecord::new(id.clone(), kind))
            }
            _ => None,
        };

        let id = self.scene.add_node(node, parent)?;
        if let Some(record) = record {
            if self.store.record(&record.id).is_none() {
                self.store.upsert(record);
            }
        }
        self.drag_set.insert(id);
        Ok(id)
    }

    /// Remove an object and its children from the scene and the drag set
    ///
    /// Connectors anchored on the object are left alone; their next rebuild
    /// reports the missing waypoint object. A relation id removes the whole
    /// connector, bend points and label included.
    pub fn remove_object(&mut self, instance_id: &str) -> Result<Vec<NodeId>, ContextError> {
        let id = self
            .scene
            .find_by_instance(instance_id)
            .ok_or_else(|| SceneError::InstanceNotFound(instance_id.to_string()))?;
        let owner = self.connectors.iter().find(|c| c.node() == id).map(|c| c.id().to_string());
        if let Some(connector) = owner {
            return self.remove_connector(&connector);
        }
        let removed = self.scene.remove_node(id)?;
        for node in &removed {
            self.drag_set.remove(*node);
        }
        self.connectors.retain(|c| !removed.contains(&c.node()));
        log::debug!("Removed object {} ({} nodes)", instance_id, removed.len());
        Ok(removed)
    }

    /// Visualize a persisted relation as a connector
    ///
    /// Creates the connector's root node with the two caps as its first two
    /// children and stores the record.
    pub fn add_connector(
        &mut self,
        record: InstanceRecord,
        start_cap: SceneNode,
        end_cap: SceneNode,
    ) -> Result<NodeId, ContextError> {
        let node = self
            .scene
            .add_node(SceneNode::instance(record.id.clone(), InstanceKind::Relation), None)?;

        let connector = match self.build_connector(&record, node, start_cap, end_cap) {
            Ok(connector) => connector,
            Err(e) => {
                if let Err(cleanup) = self.scene.remove_node(node) {
                    log::warn!("Could not remove half-built connector {}: {}", record.id, cleanup);
                }
                return Err(e);
            }
        };

        log::debug!("Added connector {} with {} waypoints", record.id, connector.waypoints().len());
        self.store.upsert(record);
        self.connectors.push(connector);
        Ok(node)
    }

    fn build_connector(
        &mut self,
        record: &InstanceRecord,
        node: NodeId,
        start_cap: SceneNode,
        end_cap: SceneNode,
    ) -> Result<ConnectorInstance, ContextError> {
        self.scene.add_node(start_cap.with_role(NodeRole::Cap), Some(node))?;
        self.scene.add_node(end_cap.with_role(NodeRole::Cap), Some(node))?;
        Ok(ConnectorInstance::from_record(
            record,
            node,
            self.scene.as_ref(),
            self.settings.line_color,
        )?)
    }

    /// Remove a connector together with its caps, bend points and label
    ///
    /// Returns every node taken out of the scene.
    pub fn remove_connector(&mut self, id: &str) -> Result<Vec<NodeId>, ContextError> {
        let mut removed: Vec<NodeId> = self.detach_label(id)?.into_iter().collect();
        let index = self.connector_index(id)?;
        let connector = self.connectors.remove(index);

        for waypoint in connector.waypoints() {
            if let Waypoint::Bend { node } = waypoint {
                self.drag_set.remove(*node);
                if self.scene.contains(*node) {
                    removed.extend(self.scene.remove_node(*node)?);
                }
            }
        }
        if self.scene.contains(connector.node()) {
            removed.extend(self.scene.remove_node(connector.node())?);
        }
        log::debug!("Removed connector {} ({} nodes)", id, removed.len());
        Ok(removed)
    }

    /// Insert a draggable bend point into a connector before waypoint `index`
    pub fn insert_bend_point(&mut self, connector: &str, index: usize, position: Point3) -> Result<NodeId, ContextError> {
        let slot = self.connector_index(connector)?;
        let point = snap_to_grid(position, self.settings.bend_point_grid);

        self.bend_points_created += 1;
        let anchor_id = format!("{connector}/bend-{}", self.bend_points_created);
        let node = self.scene.add_node(
            SceneNode::new(anchor_id.clone())
                .with_role(NodeRole::BendPoint)
                .with_instance_id(anchor_id.clone())
                .with_position(point.coords),
            None,
        )?;

        if let Err(e) = self.connectors[slot].insert_bend_point(index, node, anchor_id, point) {
            self.scene.remove_node(node)?;
            return Err(e.into());
        }
        self.drag_set.insert(node);
        self.persist_line_points(slot)?;
        Ok(node)
    }

    /// Remove a bend point from a connector and from the scene
    pub fn remove_bend_point(&mut self, connector: &str, node: NodeId) -> Result<(), ContextError> {
        let slot = self.connector_index(connector)?;
        if !self.connectors[slot].remove_bend_point(node) {
            return Err(ContextError::UnknownBendPoint {
                connector: connector.to_string(),
                node,
            });
        }
        self.drag_set.remove(node);
        if self.scene.contains(node) {
            self.scene.remove_node(node)?;
        }
        self.persist_line_points(slot)?;
        Ok(())
    }

    /// Attach a label that follows the connector's midpoint
    ///
    /// Replaces any label already attached.
    pub fn attach_label(&mut self, connector: &str, label: SceneNode) -> Result<NodeId, ContextError> {
        self.detach_label(connector)?;
        let slot = self.connector_index(connector)?;

        let label = self.scene.add_node(label.with_role(NodeRole::Label), None)?;
        let connector = &mut self.connectors[slot];
        if let Some(node) = self.scene.node_mut(connector.node()) {
            node.metadata.labels.push(label);
        }
        let subscription = connector.subscribe(LabelBinding { label });
        connector.set_label(Some((label, subscription)));
        if let Some(midpoint) = connector.midpoint() {
            self.scene.set_world_position(label, midpoint)?;
        }
        self.drag_set.insert(label);
        Ok(label)
    }

    /// Detach and remove the connector's label, if any
    pub fn detach_label(&mut self, connector: &str) -> Result<Option<NodeId>, ContextError> {
        let slot = self.connector_index(connector)?;
        let connector = &mut self.connectors[slot];
        let Some((label, subscription)) = connector.set_label(None) else {
            return Ok(None);
        };

        connector.unsubscribe(subscription);
        if let Some(node) = self.scene.node_mut(connector.node()) {
            node.metadata.labels.retain(|l| *l != label);
        }
        self.drag_set.remove(label);
        if self.scene.contains(label) {
            self.scene.remove_node(label)?;
        }
        Ok(Some(label))
    }

    /// Move an object (local position)
    pub fn move_object(&mut self, instance_id: &str, position: Vec3) -> Result<(), ContextError> {
        let node = self.object_mut(instance_id)?;
        node.transform.position = position;
        Ok(())
    }

    /// Rescale an object; forces a rebuild on the next tick
    pub fn rescale_object(&mut self, instance_id: &str, scale: Vec3) -> Result<(), ContextError> {
        let node = self.object_mut(instance_id)?;
        node.transform.scale = scale;
        self.flags.insert(SchedulerFlags::RESCALED);
        Ok(())
    }

    fn object_mut(&mut self, instance_id: &str) -> Result<&mut SceneNode, ContextError> {
        let id = self
            .scene
            .find_by_instance(instance_id)
            .ok_or_else(|| SceneError::InstanceNotFound(instance_id.to_string()))?;
        Ok(self.scene.node_mut(id).ok_or(SceneError::NodeNotFound(id))?)
    }

    fn connector_index(&self, id: &str) -> Result<usize, ContextError> {
        self.connectors
            .iter()
            .position(|c| c.id() == id)
            .ok_or_else(|| ContextError::ConnectorNotFound(id.to_string()))
    }

    fn persist_line_points(&mut self, slot: usize) -> Result<(), ContextError> {
        let connector = &self.connectors[slot];
        self.store
            .update_line_points(connector.id(), connector.line_points().to_vec())?;
        Ok(())
    }
}
