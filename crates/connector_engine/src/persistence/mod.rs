//! Persisted instance records
//!
//! The engine reads waypoint data from relation records and writes rotations
//! and moved bend points back. Records are plain serde structures that encode
//! to JSON; the actual transport (REST, storage) belongs to the host.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::foundation::math::{Point3, Quat, Quaternion};

/// Kind of a persisted metamodel instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceKind {
    /// Class instance
    Class,
    /// Port instance (attached to a class)
    Port,
    /// Relation instance (rendered as a connector)
    Relation,
}

/// Stored rotation quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationRecord {
    /// i component
    pub x: f32,
    /// j component
    pub y: f32,
    /// k component
    pub z: f32,
    /// real component
    pub w: f32,
}

impl From<&Quat> for RotationRecord {
    fn from(rotation: &Quat) -> Self {
        Self {
            x: rotation.i,
            y: rotation.j,
            z: rotation.k,
            w: rotation.w,
        }
    }
}

impl From<RotationRecord> for Quat {
    fn from(record: RotationRecord) -> Self {
        Quat::from_quaternion(Quaternion::new(record.w, record.x, record.y, record.z))
    }
}

/// One stored waypoint of a relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    /// Instance id of the object or bend point this waypoint refers to
    #[serde(rename = "anchorId")]
    pub anchor_id: String,
    /// Last known position
    pub point: Point3,
}

impl LinePoint {
    /// Create a line point
    pub fn new(anchor_id: impl Into<String>, point: Point3) -> Self {
        Self {
            anchor_id: anchor_id.into(),
            point,
        }
    }
}

/// A persisted class, port or relation instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Stable identifier
    pub id: String,
    /// Instance kind
    pub kind: InstanceKind,
    /// Stored rotation (classes and ports)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationRecord>,
    /// Stored waypoints (relations)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_points: Vec<LinePoint>,
}

impl InstanceRecord {
    /// Class or port record without rotation
    pub fn new(id: impl Into<String>, kind: InstanceKind) -> Self {
        Self {
            id: id.into(),
            kind,
            rotation: None,
            line_points: Vec::new(),
        }
    }

    /// Relation record with its waypoints
    pub fn relation(id: impl Into<String>, line_points: Vec<LinePoint>) -> Self {
        Self {
            id: id.into(),
            kind: InstanceKind::Relation,
            rotation: None,
            line_points,
        }
    }
}

/// Persistence errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// No record with this id
    #[error("Instance record not found: {0}")]
    NotFound(String),

    /// JSON encoding failed
    #[error("JSON encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Storage for instance records
pub trait InstanceStore {
    /// Fetch a record
    fn record(&self, id: &str) -> Option<&InstanceRecord>;

    /// Insert or replace a record
    fn upsert(&mut self, record: InstanceRecord);

    /// Overwrite a record's rotation
    fn update_rotation(&mut self, id: &str, rotation: RotationRecord) -> Result<(), PersistenceError>;

    /// Overwrite a record's waypoints
    fn update_line_points(&mut self, id: &str, line_points: Vec<LinePoint>) -> Result<(), PersistenceError>;
}

/// In-memory instance store
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<String, InstanceRecord>,
    writes: u64,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rotation/waypoint writes performed so far
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    /// Encode one record as JSON
    pub fn to_json(&self, id: &str) -> Result<String, PersistenceError> {
        let record = self
            .records
            .get(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))?;
        Ok(serde_json::to_string(record)?)
    }

    fn record_mut(&mut self, id: &str) -> Result<&mut InstanceRecord, PersistenceError> {
        self.records
            .get_mut(id)
            .ok_or_else(|| PersistenceError::NotFound(id.to_string()))
    }
}

impl InstanceStore for MemoryStore {
    fn record(&self, id: &str) -> Option<&InstanceRecord> {
        self.records.get(id)
    }

    fn upsert(&mut self, record: InstanceRecord) {
        self.records.insert(record.id.clone(), record);
    }

    fn update_rotation(&mut self, id: &str, rotation: RotationRecord) -> Result<(), PersistenceError> {
        self.record_mut(id)?.rotation = Some(rotation);
        self.writes += 1;
        Ok(())
    }

    fn update_line_points(&mut self, id: &str, line_points: Vec<LinePoint>) -> Result<(), PersistenceError> {
        self.record_mut(id)?.line_points = line_points;
        self.writes += 1;
        Ok(())
    }
}
