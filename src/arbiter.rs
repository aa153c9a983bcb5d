//! Persistent contact state between two bodies.

use crate::{
    body::Body,
    collide::{Contacts, collide},
    vec2::{clamp, cross_vs},
    world::{BodyId, SolverConfig},
};

/// Penetration depth that is tolerated without positional correction.
pub const ALLOWED_PENETRATION: f32 = 0.01;
/// Fraction of the remaining penetration that is corrected per step.
pub const BIAS_FACTOR: f32 = 0.2;

/// Order independent identifier of a body pair.
/// `body1` is always the smaller id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArbiterKey {
    pub body1: BodyId,
    pub body2: BodyId,
}

impl ArbiterKey {
    pub fn new(a: BodyId, b: BodyId) -> Self {
        Self {
            body1: a.min(b),
            body2: a.max(b),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Arbiter {
    pub key: ArbiterKey,
    pub contacts: Contacts,
    /// Geometric mean of both bodies' friction.
    pub friction: f32,
}

impl Arbiter {
    /// Collides the two bodies of `key`. `body1` and `body2` must be the bodies
    /// that `key.body1` and `key.body2` refer to.
    pub fn new(key: ArbiterKey, body1: &Body, body2: &Body) -> Self {
        Self {
            key,
            contacts: collide(body1, body2),
            friction: (body1.friction * body2.friction).sqrt(),
        }
    }

    /// Replaces the manifold with `new_contacts`. Points whose features match
    /// a point of the previous manifold inherit its accumulated impulses when
    /// warm starting.
    pub fn update(&mut self, new_contacts: Contacts, config: &SolverConfig) {
        let merged = new_contacts
            .into_iter()
            .map(|mut c_new| {
                if let Some(c_old) = self
                    .contacts
                    .iter()
                    .find(|c_old| c_old.feature == c_new.feature)
                {
                    if config.warm_starting {
                        c_new.pn = c_old.pn;
                        c_new.pt = c_old.pt;
                        c_new.pnb = c_old.pnb;
                    } else {
                        c_new.pn = 0.0;
                        c_new.pt = 0.0;
                        c_new.pnb = 0.0;
                    }
                }
                c_new
            })
            .collect();
        self.contacts = merged;
    }

    /// Caches effective masses and position bias for every contact, then
    /// applies the carried over impulses.
    pub fn pre_step(&mut self, b1: &mut Body, b2: &mut Body, inv_dt: f32, config: &SolverConfig) {
        let bias_factor = if config.position_correction {
            BIAS_FACTOR
        } else {
            0.0
        };

        for c in &mut self.contacts {
            let r1 = c.position - b1.position;
            let r2 = c.position - b2.position;

            // Precompute normal mass, tangent mass, and bias.
            let rn1 = r1.dot(c.normal);
            let rn2 = r2.dot(c.normal);
            let k_normal = b1.inv_mass
                + b2.inv_mass
                + b1.inv_inertia * (r1.dot(r1) - rn1 * rn1)
                + b2.inv_inertia * (r2.dot(r2) - rn2 * rn2);
            c.mass_normal = 1.0 / k_normal;

            let tangent = cross_vs(c.normal, 1.0);
            let rt1 = r1.dot(tangent);
            let rt2 = r2.dot(tangent);
            let k_tangent = b1.inv_mass
                + b2.inv_mass
                + b1.inv_inertia * (r1.dot(r1) - rt1 * rt1)
                + b2.inv_inertia * (r2.dot(r2) - rt2 * rt2);
            c.mass_tangent = 1.0 / k_tangent;

            c.bias = -bias_factor * inv_dt * (c.separation + ALLOWED_PENETRATION).min(0.0);

            if config.accumulate_impulses {
                // Apply normal + friction impulse
                let p = c.pn * c.normal + c.pt * tangent;
                b1.apply_impulse(-p, r1);
                b2.apply_impulse(p, r2);
            }
        }
    }

    /// One solver iteration over all contact points: normal impulse first,
    /// then friction bounded by the Coulomb cone.
    pub fn apply_impulse(&mut self, b1: &mut Body, b2: &mut Body, config: &SolverConfig) {
        for c in &mut self.contacts {
            c.r1 = c.position - b1.position;
            c.r2 = c.position - b2.position;

            // Relative velocity at contact
            let dv = b2.velocity_at(c.r2) - b1.velocity_at(c.r1);

            // Compute normal impulse
            let vn = dv.dot(c.normal);
            let mut dpn = c.mass_normal * (-vn + c.bias);

            if config.accumulate_impulses {
                // Clamp the accumulated impulse
                let pn0 = c.pn;
                c.pn = (pn0 + dpn).max(0.0);
                dpn = c.pn - pn0;
            } else {
                dpn = dpn.max(0.0);
            }

            // Apply contact impulse
            let pn = dpn * c.normal;
            b1.apply_impulse(-pn, c.r1);
            b2.apply_impulse(pn, c.r2);

            // Relative velocity at contact
            let dv = b2.velocity_at(c.r2) - b1.velocity_at(c.r1);

            let tangent = cross_vs(c.normal, 1.0);
            let vt = dv.dot(tangent);
            let mut dpt = c.mass_tangent * -vt;

            if config.accumulate_impulses {
                // Compute friction impulse
                let max_pt = self.friction * c.pn;

                // Clamp friction
                let old_tangent_impulse = c.pt;
                c.pt = clamp(old_tangent_impulse + dpt, -max_pt, max_pt);
                dpt = c.pt - old_tangent_impulse;
            } else {
                let max_pt = self.friction * dpn;
                dpt = clamp(dpt, -max_pt, max_pt);
            }

            // Apply contact impulse
            let pt = dpt * tangent;
            b1.apply_impulse(-pt, c.r1);
            b2.apply_impulse(pt, c.r2);
        }
    }

    /// Total accumulated normal impulse over all contact points.
    pub fn normal_impulse(&self) -> f32 {
        self.contacts.iter().map(|c| c.pn).sum()
    }
}
