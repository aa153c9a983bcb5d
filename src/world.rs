use std::collections::{BTreeMap, btree_map::Entry};

use tracing::{debug, debug_span, trace};

use crate::{
    arbiter::{Arbiter, ArbiterKey},
    body::Body,
    collide::Contact,
    joint::Joint,
    vec2::Vec2,
};

/// Handle of a body registered with a [`World`]. Assigned in registration
/// order and invalidated by [`World::clear`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub usize);

/// Handle of a joint registered with a [`World`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JointId(pub usize);

/// Switches read by every arbiter and joint during a step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Clamp the running total of each contact impulse instead of every
    /// single increment, and apply last step's total before iterating.
    pub accumulate_impulses: bool,
    /// Carry impulses over to matching contacts and joints of the next step.
    pub warm_starting: bool,
    /// Push penetrating bodies apart and pull drifting joints together
    /// with a velocity bias.
    pub position_correction: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            accumulate_impulses: true,
            warm_starting: true,
            position_correction: true,
        }
    }
}

/// Owns every body and joint and steps them forward in time.
pub struct World {
    bodies: Vec<Body>,
    joints: Vec<Joint>,
    arbiters: BTreeMap<ArbiterKey, Arbiter>,
    pub gravity: Vec2,
    /// Solver passes per step.
    pub iterations: usize,
    config: SolverConfig,
}

impl World {
    pub fn new(gravity: Vec2, iterations: usize) -> Self {
        Self::with_config(gravity, iterations, SolverConfig::default())
    }

    pub fn with_config(gravity: Vec2, iterations: usize, config: SolverConfig) -> Self {
        Self {
            bodies: Vec::new(),
            joints: Vec::new(),
            arbiters: BTreeMap::new(),
            gravity,
            iterations,
            config,
        }
    }

    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = BodyId(self.bodies.len());
        self.bodies.push(body);
        id
    }

    #[track_caller]
    pub fn add_joint(&mut self, joint: Joint) -> JointId {
        self.body(joint.body1);
        self.body(joint.body2);
        let id = JointId(self.joints.len());
        self.joints.push(joint);
        id
    }

    /// Creates a rigid joint between two registered bodies at the world space `anchor`.
    #[track_caller]
    pub fn connect(&mut self, body1: BodyId, body2: BodyId, anchor: Vec2) -> JointId {
        let joint = Joint::new(
            (body1, self.body(body1)),
            (body2, self.body(body2)),
            anchor,
        );
        self.add_joint(joint)
    }

    /// Removes all bodies, joints and contacts. Previously handed out ids become invalid.
    pub fn clear(&mut self) {
        debug!(
            bodies = self.bodies.len(),
            joints = self.joints.len(),
            "clearing world"
        );
        self.bodies.clear();
        self.joints.clear();
        self.arbiters.clear();
    }

    /// Advances the simulation by `dt` seconds. Forces and torques added to
    /// bodies since the previous step are applied for this step only.
    pub fn step(&mut self, dt: f32) {
        let _span = debug_span!("step", dt).entered();
        let inv_dt = if dt > 0.0 { 1.0 / dt } else { 0.0 };

        // Determine overlapping bodies and update contact points.
        self.broad_phase();

        // Integrate forces.
        for body in &mut self.bodies {
            body.integrate_forces(self.gravity, dt);
        }

        // Perform pre-steps.
        for arbiter in self.arbiters.values_mut() {
            let (b1, b2) = pair_mut(&mut self.bodies, arbiter.key.body1, arbiter.key.body2);
            arbiter.pre_step(b1, b2, inv_dt, &self.config);
        }
        for joint in &mut self.joints {
            let (b1, b2) = pair_mut(&mut self.bodies, joint.body1, joint.body2);
            joint.pre_step(b1, b2, inv_dt, &self.config);
        }

        // Perform iterations
        for _ in 0..self.iterations {
            for arbiter in self.arbiters.values_mut() {
                let (b1, b2) = pair_mut(&mut self.bodies, arbiter.key.body1, arbiter.key.body2);
                arbiter.apply_impulse(b1, b2, &self.config);
            }
            for joint in &mut self.joints {
                let (b1, b2) = pair_mut(&mut self.bodies, joint.body1, joint.body2);
                joint.apply_impulse(b1, b2);
            }
        }

        // Integrate velocities
        for body in &mut self.bodies {
            body.integrate_velocity(dt);
        }

        debug!(
            bodies = self.bodies.len(),
            arbiters = self.arbiters.len(),
            joints = self.joints.len()
        );
    }

    /// O(n^2) broad-phase. Creates, refreshes or retires the arbiter of every
    /// body pair that has at least one non-static body.
    pub fn broad_phase(&mut self) {
        for (i, bi) in self.bodies.iter().enumerate() {
            for (j, bj) in self.bodies.iter().enumerate().skip(i + 1) {
                if bi.is_static() && bj.is_static() {
                    continue;
                }

                let key = ArbiterKey::new(BodyId(i), BodyId(j));
                let new_arb = Arbiter::new(key, bi, bj);

                if new_arb.contacts.is_empty() {
                    if self.arbiters.remove(&key).is_some() {
                        trace!(?key, "arbiter retired");
                    }
                    continue;
                }

                match self.arbiters.entry(key) {
                    Entry::Occupied(mut entry) => {
                        entry.get_mut().update(new_arb.contacts, &self.config);
                    }
                    Entry::Vacant(entry) => {
                        trace!(?key, contacts = new_arb.contacts.len(), "arbiter created");
                        entry.insert(new_arb);
                    }
                }
            }
        }
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    #[track_caller]
    pub fn body(&self, id: BodyId) -> &Body {
        self.bodies
            .get(id.0)
            .unwrap_or_else(|| panic!("{id:?} is not registered"))
    }

    #[track_caller]
    pub fn body_mut(&mut self, id: BodyId) -> &mut Body {
        self.bodies
            .get_mut(id.0)
            .unwrap_or_else(|| panic!("{id:?} is not registered"))
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    #[track_caller]
    pub fn joint(&self, id: JointId) -> &Joint {
        self.joints
            .get(id.0)
            .unwrap_or_else(|| panic!("{id:?} is not registered"))
    }

    #[track_caller]
    pub fn joint_mut(&mut self, id: JointId) -> &mut Joint {
        self.joints
            .get_mut(id.0)
            .unwrap_or_else(|| panic!("{id:?} is not registered"))
    }

    /// Active arbiters, ordered by their body pair.
    pub fn arbiters(&self) -> impl Iterator<Item = &Arbiter> + '_ {
        self.arbiters.values()
    }

    /// The arbiter between `a` and `b`, in either order.
    pub fn arbiter(&self, a: BodyId, b: BodyId) -> Option<&Arbiter> {
        self.arbiters.get(&ArbiterKey::new(a, b))
    }

    pub fn arbiter_count(&self) -> usize {
        self.arbiters.len()
    }

    /// Every contact point of every active arbiter.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.arbiters.values().flat_map(|arbiter| arbiter.contacts.iter())
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SolverConfig {
        &mut self.config
    }
}

/// Borrows two distinct bodies mutably at the same time.
#[track_caller]
fn pair_mut(bodies: &mut [Body], a: BodyId, b: BodyId) -> (&mut Body, &mut Body) {
    assert_ne!(a, b, "a constraint cannot connect {a:?} to itself");
    if a.0 < b.0 {
        let (lo, hi) = bodies.split_at_mut(b.0);
        (&mut lo[a.0], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(a.0);
        (&mut hi[0], &mut lo[b.0])
    }
}
