//! Rigid body dynamics for oriented boxes in 2D.
//!
//! A [`World`] owns bodies and joints. Every [`World::step`] finds touching
//! box pairs, keeps one [`Arbiter`] per pair whose contact points persist
//! across steps, and resolves contacts and joints with a fixed number of
//! sequential impulse passes.
//!
//! ```
//! use impulse2d::{Body, STATIC_MASS, Vec2, World};
//!
//! let mut world = World::new(Vec2::new(0.0, -10.0), 10);
//! let mut ground = Body::new(Vec2::new(100.0, 20.0), STATIC_MASS);
//! ground.position = Vec2::new(0.0, -10.0);
//! world.add_body(ground);
//! let mut crate_ = Body::new(Vec2::new(1.0, 1.0), 200.0);
//! crate_.position = Vec2::new(0.0, 4.0);
//! let id = world.add_body(crate_);
//! for _ in 0..300 {
//!     world.step(1.0 / 60.0);
//! }
//! assert!((world.body(id).position.y - 0.5).abs() < 0.1);
//! ```

#![warn(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

pub mod arbiter;
pub mod body;
pub mod collide;
pub mod demo;
pub mod joint;
pub mod vec2;
pub mod world;

pub use arbiter::{Arbiter, ArbiterKey};
pub use body::{Body, STATIC_MASS};
pub use collide::{Contact, Contacts, FeaturePair, collide};
pub use joint::Joint;
pub use vec2::{Mat22, Vec2};
pub use world::{BodyId, JointId, SolverConfig, World};
