//! Tick-driven connector rebuild scheduling

use super::change_detector::{approximately_equal_within, FrameSnapshot};
use crate::connector::ConnectorGeometryBuilder;
use crate::context::{EditorContext, SchedulerFlags, ViewMode};
use crate::foundation::time::FrameClock;
use crate::persistence::RotationRecord;

/// Logical state of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickState {
    /// Nothing moved, no rebuild ran
    #[default]
    Idle,
    /// A change was detected and every eligible connector was rebuilt
    Dirty,
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Idle or dirty
    pub state: TickState,
    /// Connectors rebuilt successfully
    pub rebuilt: usize,
    /// Connectors whose rebuild failed (previous geometry kept)
    pub failed: usize,
    /// Rotation records written
    pub rotations_persisted: usize,
    /// Relation records whose waypoints were written
    pub waypoints_persisted: usize,
}

/// Runs once per render tick
///
/// Samples the drag set, compares the samples with the previous tick and
/// rebuilds every connector when something moved (or a flag forces it).
/// Rotation changes are only persisted, they never rebuild geometry.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    previous: FrameSnapshot,
    clock: FrameClock,
}

impl FrameScheduler {
    /// Scheduler with empty history; the first tick is always dirty
    pub fn new() -> Self {
        Self::default()
    }

    /// Samples stored by the last tick
    pub fn previous(&self) -> &FrameSnapshot {
        &self.previous
    }

    /// Tick counter and timing
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Run one tick against `ctx`
    pub fn tick(&mut self, ctx: &mut EditorContext) -> TickReport {
        let mut report = TickReport::default();

        Self::run_node_updates(ctx);
        ctx.drag_set.retain_live(ctx.scene.as_ref());
        let current = FrameSnapshot::capture(&ctx.drag_set, ctx.scene.as_ref());
        let tolerance = ctx.settings.change_tolerance;

        let moved = !approximately_equal_within(&current.positions, &self.previous.positions, tolerance);
        let forced = ctx.flags.intersects(SchedulerFlags::DRAWING | SchedulerFlags::RESCALED);
        if (moved || forced) && ctx.view_mode == ViewMode::Interactive {
            report.state = TickState::Dirty;
            Self::rebuild_all(ctx, &mut report);
            ctx.flags.remove(SchedulerFlags::RESCALED);
        }

        if !approximately_equal_within(&current.rotations, &self.previous.rotations, tolerance) {
            report.rotations_persisted = Self::persist_rotations(ctx);
        }

        self.previous = current;
        self.clock.advance();

        log::trace!(
            "Tick {} ({:.2?}): {:?} rebuilt={} failed={} rotations={} waypoints={}",
            self.clock.tick_count(),
            self.clock.delta(),
            report.state,
            report.rebuilt,
            report.failed,
            report.rotations_persisted,
            report.waypoints_persisted
        );
        report
    }

    /// Per-node callbacks, then port clamping
    fn run_node_updates(ctx: &mut EditorContext) {
        ctx.scene.for_each_node_mut(&mut |_, node| {
            node.run_update();
            node.apply_clamp();
        });
    }

    /// Full pass over every connector relating more than one object
    fn rebuild_all(ctx: &mut EditorContext, report: &mut TickReport) {
        let EditorContext {
            settings,
            scene,
            connectors,
            store,
            ..
        } = ctx;
        let builder = ConnectorGeometryBuilder::new(settings);

        for connector in connectors.iter_mut().filter(|c| c.related_objects() > 1) {
            match builder.rebuild(connector, scene.as_mut()) {
                Ok(outcome) => {
                    report.rebuilt += 1;
                    if outcome.waypoints_changed {
                        match store.update_line_points(connector.id(), connector.line_points().to_vec()) {
                            Ok(()) => report.waypoints_persisted += 1,
                            Err(e) => log::error!("Connector {}: could not persist waypoints: {}", connector.id(), e),
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Skipping rebuild this tick: {}", e);
                    report.failed += 1;
                }
            }
        }
    }

    /// Write changed class/port rotations to their records
    fn persist_rotations(ctx: &mut EditorContext) -> usize {
        let mut written = 0;
        for id in ctx.drag_set.iter() {
            let mut sampled = vec![id];
            if let Some(node) = ctx.scene.node(id) {
                sampled.extend_from_slice(node.children());
            }

            for node_id in sampled {
                let Some(node) = ctx.scene.node(node_id) else {
                    continue;
                };
                let Some(instance_id) = node.instance_id.as_deref() else {
                    continue;
                };
                if !node.role.persists_rotation() {
                    continue;
                }

                let rotation = RotationRecord::from(&node.transform.rotation);
                let Some(record) = ctx.store.record(instance_id) else {
                    continue;
                };
                if record.rotation == Some(rotation) {
                    continue;
                }
                match ctx.store.update_rotation(instance_id, rotation) {
                    Ok(()) => written += 1,
                    Err(e) => log::error!("Could not persist rotation of {}: {}", instance_id, e),
                }
            }
        }
        written
    }
}
