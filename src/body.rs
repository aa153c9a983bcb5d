use crate::vec2::{Vec2, cross, cross_sv};

/// Sentinel mass for bodies that never move.
pub const STATIC_MASS: f32 = f32::MAX;

/// An oriented box.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Body {
    pub position: Vec2,
    /// Radians, counter-clockwise.
    pub rotation: f32,

    pub velocity: Vec2,
    pub angular_velocity: f32,

    /// Summation of all forces applied since last
    /// step. Will get reset to zero at next `step`
    pub force: Vec2,
    /// Summation of all torques applied since last
    /// step. Will get reset to zero at next `step`
    pub torque: f32,

    /// Full extents of the box along its local axes.
    pub width: Vec2,

    pub friction: f32,
    pub mass: f32,
    pub inv_mass: f32,
    /// Moment of inertia around the center.
    pub inertia: f32,
    pub inv_inertia: f32,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            width: Vec2::splat(1.0),
            friction: 0.2,
            mass: STATIC_MASS,
            inv_mass: 0.0,
            inertia: STATIC_MASS,
            inv_inertia: 0.0,
        }
    }
}

impl Body {
    /// A box of the given full extents, resting at the origin.
    /// Pass [`STATIC_MASS`] for immovable bodies.
    pub fn new(width: Vec2, mass: f32) -> Self {
        let mut body = Self::default();
        body.set(width, mass);
        body
    }

    /// Resets all kinematic state and recomputes the mass properties
    /// of a solid box.
    pub fn set(&mut self, width: Vec2, mass: f32) {
        *self = Self {
            width,
            mass,
            ..Self::default()
        };

        if mass < STATIC_MASS {
            self.inv_mass = 1.0 / mass;
            self.inertia = mass * width.dot(width) / 12.0;
            self.inv_inertia = 1.0 / self.inertia;
        }
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Consumed by the next `World::step`.
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Consumed by the next `World::step`.
    pub fn add_torque(&mut self, torque: f32) {
        self.torque += torque;
    }

    /// The velocity that the point of the object at the given arm
    /// (world space offset from the center) moves. Takes into account
    /// linear and angular velocity.
    pub fn velocity_at(&self, arm: Vec2) -> Vec2 {
        self.velocity + cross_sv(self.angular_velocity, arm)
    }

    /// Applies `impulse` at the point `arm` away from the center.
    /// Static bodies are unaffected because their inverse mass and inertia are zero.
    pub fn apply_impulse(&mut self, impulse: Vec2, arm: Vec2) {
        self.velocity += self.inv_mass * impulse;
        self.angular_velocity += self.inv_inertia * cross(arm, impulse);
    }

    pub(crate) fn integrate_forces(&mut self, gravity: Vec2, dt: f32) {
        if self.is_static() {
            return;
        }
        self.velocity += dt * (gravity + self.inv_mass * self.force);
        self.angular_velocity += dt * self.inv_inertia * self.torque;
    }

    pub(crate) fn integrate_velocity(&mut self, dt: f32) {
        self.position += dt * self.velocity;
        self.rotation += dt * self.angular_velocity;
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }
}
