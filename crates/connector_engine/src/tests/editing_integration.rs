//! Integration tests for editing operations against a host-provided store
//!
//! The store below records every write so the tests can check that the
//! frame loop only writes what actually changed.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::EditorContext;
use crate::core::config::EngineSettings;
use crate::foundation::math::{Point3, Vec3};
use crate::frame::{FrameScheduler, TickState};
use crate::persistence::{
    InstanceKind, InstanceRecord, InstanceStore, LinePoint, MemoryStore, PersistenceError, RotationRecord,
};
use crate::physics::BoundaryShape;
use crate::scene::{NodeArena, NodeRole, SceneNode};

/// Memory store that logs `"<kind>:<id>"` for every write
struct RecordingStore {
    inner: MemoryStore,
    log: Rc<RefCell<Vec<String>>>,
}

impl InstanceStore for RecordingStore {
    fn record(&self, id: &str) -> Option<&InstanceRecord> {
        self.inner.record(id)
    }

    fn upsert(&mut self, record: InstanceRecord) {
        self.inner.upsert(record);
    }

    fn update_rotation(&mut self, id: &str, rotation: RotationRecord) -> Result<(), PersistenceError> {
        self.log.borrow_mut().push(format!("rotation:{id}"));
        self.inner.update_rotation(id, rotation)
    }

    fn update_line_points(&mut self, id: &str, line_points: Vec<LinePoint>) -> Result<(), PersistenceError> {
        self.log.borrow_mut().push(format!("line_points:{id}"));
        self.inner.update_line_points(id, line_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn recording_editor() -> (EditorContext, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let store = RecordingStore {
            inner: MemoryStore::new(),
            log: Rc::clone(&log),
        };
        let ctx = EditorContext::with_parts(EngineSettings::default(), Box::new(NodeArena::new()), Box::new(store))
            .unwrap();
        (ctx, log)
    }

    fn class(ctx: &mut EditorContext, id: &str, position: Vec3) {
        ctx.insert_object(
            SceneNode::instance(id, InstanceKind::Class)
                .with_position(position)
                .with_shape(BoundaryShape::cuboid(2.0, 2.0, 2.0)),
            None,
        )
        .unwrap();
    }

    #[test]
    fn test_writes_only_follow_changes() {
        let (mut ctx, log) = recording_editor();
        class(&mut ctx, "a", Vec3::zeros());
        class(&mut ctx, "b", Vec3::new(10.0, 0.0, 0.0));
        ctx.add_connector(
            InstanceRecord::relation(
                "rel",
                vec![LinePoint::new("a", Point3::origin()), LinePoint::new("b", Point3::origin())],
            ),
            SceneNode::new("start-cap").with_cap_width(0.4),
            SceneNode::new("end-cap").with_cap_width(0.4),
        )
        .unwrap();
        ctx.insert_bend_point("rel", 1, Point3::new(5.0, 4.0, 0.0)).unwrap();

        let mut scheduler = FrameScheduler::new();
        scheduler.tick(&mut ctx);
        scheduler.tick(&mut ctx);

        assert_eq!(
            *log.borrow(),
            vec![
                "line_points:rel".to_string(),
                "rotation:a".to_string(),
                "rotation:b".to_string(),
            ]
        );

        // Moving an object rebuilds, but no stored waypoint changes
        log.borrow_mut().clear();
        ctx.move_object("b", Vec3::new(12.0, 0.0, 0.0)).unwrap();
        let report = scheduler.tick(&mut ctx);
        assert_eq!(report.state, TickState::Dirty);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_record_with_existing_bend_node() {
        let (mut ctx, log) = recording_editor();
        class(&mut ctx, "a", Vec3::zeros());
        class(&mut ctx, "b", Vec3::new(10.0, 0.0, 0.0));
        let bend = ctx
            .insert_object(
                SceneNode::new("bend")
                    .with_role(NodeRole::BendPoint)
                    .with_instance_id("bend-7")
                    .with_position(Vec3::new(5.0, 0.0, 5.0)),
                None,
            )
            .unwrap();
        ctx.add_connector(
            InstanceRecord::relation(
                "rel",
                vec![
                    LinePoint::new("a", Point3::origin()),
                    LinePoint::new("bend-7", Point3::new(5.0, 0.0, 5.0)),
                    LinePoint::new("b", Point3::new(10.0, 0.0, 0.0)),
                ],
            ),
            SceneNode::new("start-cap").with_cap_width(0.4),
            SceneNode::new("end-cap").with_cap_width(0.4),
        )
        .unwrap();

        assert!(ctx.connector("rel").unwrap().has_bend_point(bend));
        assert!(ctx.store().record("bend-7").is_none());

        let mut scheduler = FrameScheduler::new();
        scheduler.tick(&mut ctx);
        log.borrow_mut().clear();

        ctx.scene_mut().node_mut(bend).unwrap().transform.position = Vec3::new(5.0, 0.0, 8.004);
        scheduler.tick(&mut ctx);

        assert_eq!(*log.borrow(), vec!["line_points:rel".to_string()]);
        let stored = ctx.store().record("rel").unwrap();
        assert_relative_eq!(stored.line_points[1].point, Point3::new(5.0, 0.0, 8.0), epsilon = 1e-4);

        let json: serde_json::Value = serde_json::to_value(stored).unwrap();
        assert_eq!(json["line_points"][1]["anchorId"], "bend-7");
    }

    #[test]
    fn test_label_attached_after_first_rebuild_jumps_to_midpoint() {
        let (mut ctx, _log) = recording_editor();
        class(&mut ctx, "a", Vec3::zeros());
        class(&mut ctx, "b", Vec3::new(0.0, 0.0, -10.0));
        ctx.add_connector(
            InstanceRecord::relation(
                "rel",
                vec![LinePoint::new("a", Point3::origin()), LinePoint::new("b", Point3::origin())],
            ),
            SceneNode::new("start-cap").with_cap_width(0.4),
            SceneNode::new("end-cap").with_cap_width(0.4),
        )
        .unwrap();

        let mut scheduler = FrameScheduler::new();
        scheduler.tick(&mut ctx);
        let label = ctx.attach_label("rel", SceneNode::new("label")).unwrap();

        assert_relative_eq!(
            ctx.scene().world_position(label).unwrap(),
            Point3::new(0.0, 0.0, -5.0),
            epsilon = 1e-4
        );
        assert_eq!(ctx.scene().node(label).unwrap().role, NodeRole::Label);
    }
}
