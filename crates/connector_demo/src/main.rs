//! Connector demo application
//!
//! Builds a small class diagram (two classes, a port, two relations with a
//! bend point and a label) and drives the frame scheduler headlessly while
//! the classes drift around, logging what every tick did.
//!
//! Usage: `connector_demo [settings.toml|settings.ron]`

use connector_engine::foundation::logging;
use connector_engine::prelude::*;
use connector_engine::scene::ClampLimits;
use rand::Rng;

const TICKS: usize = 120;

struct DemoApp {
    ctx: EditorContext,
    scheduler: FrameScheduler,
    rng: rand::rngs::ThreadRng,
}

impl DemoApp {
    fn new(settings: EngineSettings) -> Result<Self, ContextError> {
        Ok(Self {
            ctx: EditorContext::new(settings)?,
            scheduler: FrameScheduler::new(),
            rng: rand::thread_rng(),
        })
    }

    fn initialize(&mut self) -> Result<(), ContextError> {
        log::info!("Building demo scene...");
        let class_shape = BoundaryShape::cuboid(2.0, 1.5, 2.0);

        let customer = self.ctx.insert_object(
            SceneNode::instance("customer", InstanceKind::Class).with_shape(class_shape),
            None,
        )?;
        self.ctx.insert_object(
            SceneNode::instance("order", InstanceKind::Class)
                .with_position(Vec3::new(8.0, 0.0, -3.0))
                .with_shape(class_shape),
            None,
        )?;
        self.ctx.insert_object(
            SceneNode::instance("invoice", InstanceKind::Class)
                .with_position(Vec3::new(4.0, 5.0, 2.0))
                .with_shape(BoundaryShape::sphere(1.0))
                .with_update(|node| {
                    let spin = Quat::from_euler_angles(0.0, 0.05, 0.0);
                    node.transform.rotation = spin * node.transform.rotation;
                }),
            None,
        )?;
        self.ctx.insert_object(
            SceneNode::instance("customer-port", InstanceKind::Port)
                .with_position(Vec3::new(1.0, 0.0, 0.0))
                .with_shape(BoundaryShape::cuboid(0.3, 0.3, 0.3))
                .with_clamp(ClampLimits::surface_of(&class_shape)),
            Some(customer),
        )?;

        self.ctx.add_connector(
            InstanceRecord::relation(
                "places",
                vec![
                    LinePoint::new("customer-port", Point3::origin()),
                    LinePoint::new("order", Point3::origin()),
                ],
            ),
            SceneNode::new("places-start").with_cap_width(0.4),
            SceneNode::new("places-end").with_cap_width(0.4),
        )?;
        self.ctx.add_connector(
            InstanceRecord::relation(
                "billed-by",
                vec![
                    LinePoint::new("order", Point3::origin()),
                    LinePoint::new("invoice", Point3::origin()),
                ],
            ),
            SceneNode::new("billed-by-start").with_cap_width(0.4),
            SceneNode::new("billed-by-end").with_cap_width(0.4),
        )?;

        self.ctx.insert_bend_point("places", 1, Point3::new(4.0, 2.0, -1.5))?;
        self.ctx.attach_label("places", SceneNode::new("places-label"))?;

        log::info!(
            "Scene ready: {} nodes, {} connectors, {} interactive nodes",
            self.ctx.scene().len(),
            self.ctx.connectors().len(),
            self.ctx.drag_set().len()
        );
        Ok(())
    }

    fn run(&mut self) -> Result<(), ContextError> {
        self.initialize()?;

        let mut dirty_ticks = 0;
        for tick in 0..TICKS {
            self.drive(tick)?;

            let report = self.scheduler.tick(&mut self.ctx);
            if report.state == TickState::Dirty {
                dirty_ticks += 1;
                for connector in self.ctx.connectors() {
                    log::info!(
                        "tick {:3}: {} midpoint {:?} ({} points)",
                        tick,
                        connector.id(),
                        connector.midpoint().map(|p| [p.x, p.y, p.z]),
                        connector.polyline().point_count()
                    );
                }
            }
            if report.failed > 0 || report.rotations_persisted > 0 || report.waypoints_persisted > 0 {
                log::debug!("tick {:3}: {:?}", tick, report);
            }
        }

        log::info!(
            "{} of {} ticks rebuilt connectors ({:.0} ticks/s)",
            dirty_ticks,
            TICKS,
            self.scheduler.clock().average_tick_rate()
        );
        Ok(())
    }

    /// Scripted input: jitter the order, rescale once, look away for a while
    fn drive(&mut self, tick: usize) -> Result<(), ContextError> {
        match tick {
            10..=40 if tick % 3 == 0 => {
                let jitter = Vec3::new(
                    self.rng.gen_range(-0.5..0.5),
                    self.rng.gen_range(-0.5..0.5),
                    self.rng.gen_range(-0.5..0.5),
                );
                let order = self.ctx.scene().find_by_instance("order");
                let current = order
                    .and_then(|id| self.ctx.scene().node(id))
                    .map_or(Vec3::zeros(), |node| node.transform.position);
                self.ctx.move_object("order", current + jitter)?;
            }
            50 => self.ctx.rescale_object("customer", Vec3::new(1.5, 1.5, 1.5))?,
            60 => self.ctx.set_view_mode(ViewMode::Immersive),
            70 => self.ctx.move_object("invoice", Vec3::new(-4.0, 5.0, 2.0))?,
            80 => {
                self.ctx.set_view_mode(ViewMode::Interactive);
                self.ctx.set_drawing(true);
            }
            81 => self.ctx.set_drawing(false),
            _ => {}
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_filter("info,connector_engine::frame=debug");
    log::info!("Starting connector demo");

    let settings = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading settings from {}", path);
            EngineSettings::load_from_file(&path)?
        }
        None => EngineSettings::default(),
    };

    let mut app = DemoApp::new(settings)?;
    match app.run() {
        Ok(()) => {
            log::info!("Connector demo completed successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Connector demo failed: {}", e);
            Err(e.into())
        }
    }
}
