//! Classic test scenes and a small driver that steps them the way an
//! interactive viewer would.

use rand::{Rng, SeedableRng, rngs::SmallRng};
use tracing::debug;

use crate::{
    body::{Body, STATIC_MASS},
    vec2::Vec2,
    world::{BodyId, World},
};

pub const TIME_STEP: f32 = 1.0 / 60.0;
pub const ITERATIONS: usize = 10;
pub const GRAVITY: Vec2 = Vec2::new(0.0, -10.0);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Demo {
    SingleBox,
    Pendulum,
    VaryingFriction,
    RandomizedStacking,
    Pyramid,
    Teeter,
    SuspensionBridge,
    MultiPendulum,
}

impl Demo {
    pub const ALL: [Demo; 8] = [
        Demo::SingleBox,
        Demo::Pendulum,
        Demo::VaryingFriction,
        Demo::RandomizedStacking,
        Demo::Pyramid,
        Demo::Teeter,
        Demo::SuspensionBridge,
        Demo::MultiPendulum,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Demo::SingleBox => "A Single Box",
            Demo::Pendulum => "Simple Pendulum",
            Demo::VaryingFriction => "Varying Friction Coefficients",
            Demo::RandomizedStacking => "Randomized Stacking",
            Demo::Pyramid => "Pyramid Stacking",
            Demo::Teeter => "A Teeter",
            Demo::SuspensionBridge => "A Suspension Bridge",
            Demo::MultiPendulum => "Multi-pendulum",
        }
    }

    /// Populates `world`, which is expected to be empty.
    pub fn build(self, world: &mut World, rng: &mut impl Rng) {
        match self {
            Demo::SingleBox => {
                ground(world);
                add_box(world, Vec2::new(1.0, 1.0), 200.0, Vec2::new(0.0, 4.0));
            }
            Demo::Pendulum => {
                let ground = ground(world);
                let bob = add_box(world, Vec2::new(1.0, 1.0), 100.0, Vec2::new(9.0, 11.0));
                world.connect(ground, bob, Vec2::new(0.0, 11.0));
            }
            Demo::VaryingFriction => {
                ground(world);
                let ramps = [
                    (Vec2::new(13.0, 0.25), Vec2::new(-2.0, 11.0), -0.25),
                    (Vec2::new(0.25, 1.0), Vec2::new(5.25, 9.5), 0.0),
                    (Vec2::new(13.0, 0.25), Vec2::new(2.0, 7.0), 0.25),
                    (Vec2::new(0.25, 1.0), Vec2::new(-5.25, 5.5), 0.0),
                    (Vec2::new(13.0, 0.25), Vec2::new(-2.0, 3.0), -0.25),
                ];
                for (width, position, rotation) in ramps {
                    let ramp = add_box(world, width, STATIC_MASS, position);
                    world.body_mut(ramp).rotation = rotation;
                }

                for (i, friction) in [0.75, 0.5, 0.35, 0.1, 0.0].into_iter().enumerate() {
                    let x = -7.5 + 2.0 * i as f32;
                    let id = add_box(world, Vec2::new(0.5, 0.5), 25.0, Vec2::new(x, 14.0));
                    world.body_mut(id).friction = friction;
                }
            }
            Demo::RandomizedStacking => {
                ground(world);
                for i in 0..10 {
                    let x = rng.random_range(-0.1f32..0.1);
                    let y = 0.51 + 1.05 * i as f32;
                    add_box(world, Vec2::new(1.0, 1.0), 1.0, Vec2::new(x, y));
                }
            }
            Demo::Pyramid => {
                ground(world);
                let mut x = Vec2::new(-6.0, 0.75);
                for i in 0..12 {
                    let mut y = x;
                    for _ in i..12 {
                        add_box(world, Vec2::new(1.0, 1.0), 10.0, y);
                        y += Vec2::new(1.125, 0.0);
                    }
                    x += Vec2::new(0.5625, 2.0);
                }
            }
            Demo::Teeter => {
                let ground = ground(world);
                let plank = add_box(world, Vec2::new(12.0, 0.25), 100.0, Vec2::new(0.0, 1.0));
                add_box(world, Vec2::new(0.5, 0.5), 25.0, Vec2::new(-5.0, 2.0));
                add_box(world, Vec2::new(0.5, 0.5), 25.0, Vec2::new(-5.5, 2.0));
                add_box(world, Vec2::new(1.0, 1.0), 100.0, Vec2::new(5.5, 15.0));
                world.connect(ground, plank, Vec2::new(0.0, 1.0));
            }
            Demo::SuspensionBridge => {
                const PLANKS: usize = 15;
                const MASS: f32 = 50.0;

                let ground = ground(world);
                let mut previous = ground;
                for i in 0..=PLANKS {
                    let anchor = Vec2::new(-9.125 + 1.25 * i as f32, 5.0);
                    // The last joint ties the bridge back to the ground on the far side.
                    let next = if i < PLANKS {
                        let x = -8.5 + 1.25 * i as f32;
                        add_box(world, Vec2::new(1.0, 0.25), MASS, Vec2::new(x, 5.0))
                    } else {
                        ground
                    };
                    let joint = world.connect(previous, next, anchor);
                    world.joint_mut(joint).soften(2.0, 0.7, MASS, TIME_STEP);
                    previous = next;
                }
            }
            Demo::MultiPendulum => {
                const MASS: f32 = 10.0;
                const Y: f32 = 12.0;

                let mut previous = ground(world);
                for i in 0..15 {
                    let x = i as f32;
                    let link = add_box(world, Vec2::new(0.75, 0.25), MASS, Vec2::new(0.5 + x, Y));
                    let joint = world.connect(previous, link, Vec2::new(x, Y));
                    world.joint_mut(joint).soften(4.0, 0.7, MASS, TIME_STEP);
                    previous = link;
                }
            }
        }
    }
}

/// A wide static slab whose top face is at `y = 0`.
fn ground(world: &mut World) -> BodyId {
    add_box(world, Vec2::new(100.0, 20.0), STATIC_MASS, Vec2::new(0.0, -10.0))
}

fn add_box(world: &mut World, width: Vec2, mass: f32, position: Vec2) -> BodyId {
    let mut body = Body::new(width, mass);
    body.position = position;
    world.add_body(body)
}

/// A world running one of the [`Demo`] scenes, plus a heavy box that can
/// be thrown into it.
pub struct Sandbox {
    pub world: World,
    demo: Demo,
    bomb: Option<BodyId>,
    rng: SmallRng,
}

impl Sandbox {
    /// `seed` makes randomized scenes and bomb throws reproducible.
    pub fn new(seed: u64) -> Self {
        let mut sandbox = Self {
            world: World::new(GRAVITY, ITERATIONS),
            demo: Demo::SingleBox,
            bomb: None,
            rng: SmallRng::seed_from_u64(seed),
        };
        sandbox.load(Demo::SingleBox);
        sandbox
    }

    /// Replaces the current scene. Keeps the solver configuration.
    pub fn load(&mut self, demo: Demo) {
        self.world.clear();
        self.bomb = None;
        self.demo = demo;
        demo.build(&mut self.world, &mut self.rng);
        debug!(
            demo = demo.name(),
            bodies = self.world.bodies().len(),
            joints = self.world.joints().len(),
            "loaded demo"
        );
    }

    pub fn demo(&self) -> Demo {
        self.demo
    }

    pub fn bomb(&self) -> Option<BodyId> {
        self.bomb
    }

    /// Throws the bomb towards the origin from a random spot above the scene.
    /// The bomb body is created on first use and reused afterwards.
    pub fn launch_bomb(&mut self) -> BodyId {
        let id = *self.bomb.get_or_insert_with(|| {
            self.world
                .add_body(Body::new(Vec2::new(1.0, 1.0), 50.0))
        });

        let bomb = self.world.body_mut(id);
        bomb.position = Vec2::new(self.rng.random_range(-15.0f32..15.0), 15.0);
        bomb.rotation = self.rng.random_range(-1.5f32..1.5);
        bomb.velocity = -1.5 * bomb.position;
        bomb.angular_velocity = self.rng.random_range(-20.0f32..20.0);
        debug!(?id, position = ?bomb.position, "bomb launched");
        id
    }

    pub fn step(&mut self) {
        self.world.step(TIME_STEP);
    }

    /// Returns the new setting.
    pub fn toggle_accumulation(&mut self) -> bool {
        let config = self.world.config_mut();
        config.accumulate_impulses = !config.accumulate_impulses;
        config.accumulate_impulses
    }

    /// Returns the new setting.
    pub fn toggle_warm_starting(&mut self) -> bool {
        let config = self.world.config_mut();
        config.warm_starting = !config.warm_starting;
        config.warm_starting
    }

    /// Returns the new setting.
    pub fn toggle_position_correction(&mut self) -> bool {
        let config = self.world.config_mut();
        config.position_correction = !config.position_correction;
        config.position_correction
    }
}
