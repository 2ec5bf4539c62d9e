//! Arc-length midpoint tracking
//!
//! After every rebuild the connector's midpoint is recomputed and pushed to
//! every subscribed observer. Labels subscribe through [`LabelBinding`].

use std::fmt;

use crate::foundation::collections::{NodeId, SlotMap, SubscriptionId};
use crate::foundation::math::Point3;
use crate::scene::SceneGraph;

/// Point reached after travelling half the total length of the polyline
///
/// Returns `None` for an empty slice. A polyline whose total length is zero
/// resolves to its first point.
pub fn locate_midpoint(points: &[Point3]) -> Option<Point3> {
    let first = *points.first()?;

    let lengths: Vec<f32> = points.windows(2).map(|pair| (pair[1] - pair[0]).norm()).collect();
    let total: f32 = lengths.iter().sum();
    if total <= 0.0 {
        return Some(first);
    }

    let half = total / 2.0;
    let mut accumulated = 0.0;
    for (segment, length) in lengths.iter().enumerate() {
        accumulated += length;
        if accumulated >= half {
            let remaining = half - (accumulated - length);
            let ratio = if *length > 0.0 { (remaining / length).clamp(0.0, 1.0) } else { 0.0 };
            let start = points[segment];
            let end = points[segment + 1];
            return Some(start + (end - start) * ratio);
        }
    }

    // Rounding left the running total just short of half
    points.last().copied()
}

/// Receives midpoint updates
pub trait MidpointObserver {
    /// Called with the new midpoint right after it is stored
    fn midpoint_changed(&mut self, midpoint: Point3, scene: &mut dyn SceneGraph);
}

impl<F> MidpointObserver for F
where
    F: FnMut(Point3, &mut dyn SceneGraph),
{
    fn midpoint_changed(&mut self, midpoint: Point3, scene: &mut dyn SceneGraph) {
        self(midpoint, scene);
    }
}

/// Keeps a label node on the midpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelBinding {
    /// Label node
    pub label: NodeId,
}

impl MidpointObserver for LabelBinding {
    fn midpoint_changed(&mut self, midpoint: Point3, scene: &mut dyn SceneGraph) {
        if let Err(e) = scene.set_world_position(self.label, midpoint) {
            log::warn!("Label {:?} could not follow midpoint: {}", self.label, e);
        }
    }
}

/// Stored midpoint plus its subscribers
#[derive(Default)]
pub struct MidpointLabelTracker {
    midpoint: Option<Point3>,
    observers: SlotMap<SubscriptionId, Box<dyn MidpointObserver>>,
}

impl fmt::Debug for MidpointLabelTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MidpointLabelTracker")
            .field("midpoint", &self.midpoint)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl MidpointLabelTracker {
    /// Tracker with no midpoint and no observers
    pub fn new() -> Self {
        Self::default()
    }

    /// Last stored midpoint
    pub fn midpoint(&self) -> Option<Point3> {
        self.midpoint
    }

    /// Register an observer
    pub fn subscribe(&mut self, observer: impl MidpointObserver + 'static) -> SubscriptionId {
        self.observers.insert(Box::new(observer))
    }

    /// Remove an observer; returns `false` if it was not registered
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.observers.remove(subscription).is_some()
    }

    /// Number of registered observers
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Store a midpoint and notify every observer
    pub fn set_midpoint(&mut self, midpoint: Point3, scene: &mut dyn SceneGraph) {
        self.midpoint = Some(midpoint);
        for observer in self.observers.values_mut() {
            observer.midpoint_changed(midpoint, scene);
        }
    }

    /// Recompute the midpoint of `points`, store it and notify observers
    pub fn update(&mut self, points: &[Point3], scene: &mut dyn SceneGraph) -> Option<Point3> {
        let midpoint = locate_midpoint(points)?;
        self.set_midpoint(midpoint, scene);
        Some(midpoint)
    }
}
