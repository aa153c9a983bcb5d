use crate::{
    body::Body,
    vec2::{Mat22, Vec2},
    world::{BodyId, SolverConfig},
};

/// Pins a point of one body to a point of another body.
#[derive(Debug, Clone, PartialEq)]
pub struct Joint {
    pub body1: BodyId,
    pub body2: BodyId,
    /// Anchor in `body1`'s local frame.
    pub local_anchor1: Vec2,
    /// Anchor in `body2`'s local frame.
    pub local_anchor2: Vec2,

    /// Effective mass matrix, cached by `pre_step`.
    pub m: Mat22,
    pub r1: Vec2,
    pub r2: Vec2,
    pub bias: Vec2,
    /// Accumulated impulse.
    pub p: Vec2,

    pub bias_factor: f32,
    /// Constraint force mixing. Zero makes the joint rigid.
    pub softness: f32,
}

impl Joint {
    /// Connects `body1` and `body2` at the world space `anchor`,
    /// using their current poses.
    pub fn new(body1: (BodyId, &Body), body2: (BodyId, &Body), anchor: Vec2) -> Self {
        let mut joint = Self {
            body1: body1.0,
            body2: body2.0,
            local_anchor1: Vec2::ZERO,
            local_anchor2: Vec2::ZERO,
            m: Mat22::ZERO,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
            bias: Vec2::ZERO,
            p: Vec2::ZERO,
            bias_factor: 0.2,
            softness: 0.0,
        };
        joint.set(body1, body2, anchor);
        joint
    }

    /// Re-targets the joint and resets its accumulated impulse and tuning.
    pub fn set(&mut self, (id1, b1): (BodyId, &Body), (id2, b2): (BodyId, &Body), anchor: Vec2) {
        self.body1 = id1;
        self.body2 = id2;

        let rot1t = Mat22::from_angle(b1.rotation).transpose();
        let rot2t = Mat22::from_angle(b2.rotation).transpose();

        self.local_anchor1 = rot1t * (anchor - b1.position);
        self.local_anchor2 = rot2t * (anchor - b2.position);

        self.p = Vec2::ZERO;

        self.softness = 0.0;
        self.bias_factor = 0.2;
    }

    /// Turns the joint into a damped spring. `mass` is the mass the spring
    /// is tuned for and `dt` the step the world will be advanced with.
    pub fn soften(&mut self, frequency_hz: f32, damping_ratio: f32, mass: f32, dt: f32) {
        let omega = 2.0 * std::f32::consts::PI * frequency_hz;
        let d = 2.0 * mass * damping_ratio * omega;
        let k = mass * omega * omega;

        self.softness = 1.0 / (d + dt * k);
        self.bias_factor = dt * k / (d + dt * k);
    }

    /// World space anchor on `body1` and on `body2`. Equal while the joint holds.
    pub fn anchors(&self, b1: &Body, b2: &Body) -> (Vec2, Vec2) {
        (
            b1.position + Mat22::from_angle(b1.rotation) * self.local_anchor1,
            b2.position + Mat22::from_angle(b2.rotation) * self.local_anchor2,
        )
    }

    pub fn pre_step(&mut self, b1: &mut Body, b2: &mut Body, inv_dt: f32, config: &SolverConfig) {
        // Pre-compute anchors, mass matrix, and bias.
        self.r1 = Mat22::from_angle(b1.rotation) * self.local_anchor1;
        self.r2 = Mat22::from_angle(b2.rotation) * self.local_anchor2;
        let (r1, r2) = (self.r1, self.r2);

        // deltaV = deltaV0 + K * impulse
        // invM = [(1/m1 + 1/m2) * eye(2) - skew(r1) * invI1 * skew(r1) - skew(r2) * invI2 * skew(r2)]
        //      = [1/m1+1/m2     0    ] + invI1 * [r1.y*r1.y -r1.x*r1.y] + invI2 * [r2.y*r2.y -r2.x*r2.y]
        //        [    0     1/m1+1/m2]           [-r1.x*r1.y r1.x*r1.x]           [-r2.x*r2.y r2.x*r2.x]
        let inv_mass = b1.inv_mass + b2.inv_mass;
        let k1 = Mat22::new(Vec2::new(inv_mass, 0.0), Vec2::new(0.0, inv_mass));
        let rotational = |inv_i: f32, r: Vec2| {
            Mat22::new(
                Vec2::new(inv_i * r.y * r.y, -inv_i * r.x * r.y),
                Vec2::new(-inv_i * r.x * r.y, inv_i * r.x * r.x),
            )
        };
        let k2 = rotational(b1.inv_inertia, r1);
        let k3 = rotational(b2.inv_inertia, r2);

        let mut k = k1 + (k2 + k3);
        k.col1.x += self.softness;
        k.col2.y += self.softness;

        self.m = k.invert();

        let p1 = b1.position + r1;
        let p2 = b2.position + r2;
        let dp = p2 - p1;

        self.bias = if config.position_correction {
            -self.bias_factor * inv_dt * dp
        } else {
            Vec2::ZERO
        };

        if config.warm_starting {
            // Apply accumulated impulse.
            b1.apply_impulse(-self.p, r1);
            b2.apply_impulse(self.p, r2);
        } else {
            self.p = Vec2::ZERO;
        }
    }

    pub fn apply_impulse(&mut self, b1: &mut Body, b2: &mut Body) {
        let dv = b2.velocity_at(self.r2) - b1.velocity_at(self.r1);

        let impulse = self.m * (self.bias - (dv + self.softness * self.p));

        b1.apply_impulse(-impulse, self.r1);
        b2.apply_impulse(impulse, self.r2);

        self.p += impulse;
    }

    /// Distance between the two world space anchors.
    pub fn drift(&self, b1: &Body, b2: &Body) -> f32 {
        let (a1, a2) = self.anchors(b1, b2);
        (a2 - a1).length()
    }
}

