use std::f32::consts::FRAC_PI_2;

use impulse2d::{Body, BodyId, Joint, STATIC_MASS, SolverConfig, Vec2, World};

#[path = "tracing.rs"]
mod tracing_helper;
use tracing_helper::*;

const DT: f32 = 1.0 / 60.0;

fn add_box(world: &mut World, width: Vec2, mass: f32, position: Vec2) -> BodyId {
    let mut body = Body::new(width, mass);
    body.position = position;
    world.add_body(body)
}

fn assert_close(a: Vec2, b: Vec2, tolerance: f32) {
    assert!((a - b).length() < tolerance, "{a:?} != {b:?}");
}

#[test]
fn anchors_are_stored_locally() {
    let mut b1 = Body::new(Vec2::new(1.0, 1.0), 1.0);
    b1.position = Vec2::new(1.0, 1.0);
    b1.rotation = FRAC_PI_2;
    let mut b2 = Body::new(Vec2::new(1.0, 1.0), 1.0);
    b2.position = Vec2::new(3.0, 2.0);

    let anchor = Vec2::new(1.0, 2.0);
    let joint = Joint::new((BodyId(0), &b1), (BodyId(1), &b2), anchor);
    assert_close(joint.local_anchor1, Vec2::new(1.0, 0.0), 1e-6);
    assert_close(joint.local_anchor2, Vec2::new(-2.0, 0.0), 1e-6);
    assert_eq!(joint.p, Vec2::ZERO);
    assert_eq!(joint.softness, 0.0);
    assert_eq!(joint.bias_factor, 0.2);

    let (a1, a2) = joint.anchors(&b1, &b2);
    assert_close(a1, anchor, 1e-6);
    assert_close(a2, anchor, 1e-6);
    assert!(joint.drift(&b1, &b2) < 1e-6);

    // Anchors follow their bodies.
    b2.position.x += 0.5;
    assert!((joint.drift(&b1, &b2) - 0.5).abs() < 1e-6);
}

#[test]
fn set_resets_tuning() {
    let b1 = Body::new(Vec2::new(1.0, 1.0), 1.0);
    let b2 = Body::new(Vec2::new(1.0, 1.0), 1.0);
    let mut joint = Joint::new((BodyId(0), &b1), (BodyId(1), &b2), Vec2::ZERO);
    joint.soften(2.0, 0.7, 50.0, DT);
    joint.p = Vec2::new(1.0, 1.0);

    joint.set((BodyId(1), &b2), (BodyId(0), &b1), Vec2::new(0.5, 0.0));
    assert_eq!(joint.body1, BodyId(1));
    assert_eq!(joint.body2, BodyId(0));
    assert_eq!(joint.p, Vec2::ZERO);
    assert_eq!(joint.softness, 0.0);
    assert_eq!(joint.bias_factor, 0.2);
}

#[test]
fn soften_derives_spring_parameters() {
    let b1 = Body::new(Vec2::new(1.0, 1.0), 1.0);
    let b2 = Body::new(Vec2::new(1.0, 1.0), 1.0);
    let mut joint = Joint::new((BodyId(0), &b1), (BodyId(1), &b2), Vec2::ZERO);
    joint.soften(2.0, 0.7, 50.0, DT);

    let omega = 2.0 * std::f32::consts::PI * 2.0;
    let d = 2.0 * 50.0 * 0.7 * omega;
    let k = 50.0 * omega * omega;
    assert!((joint.softness - 1.0 / (d + DT * k)).abs() < 1e-7);
    assert!((joint.bias_factor - DT * k / (d + DT * k)).abs() < 1e-5);
    assert!(joint.bias_factor > 0.0 && joint.bias_factor < 1.0);
}

#[test]
fn warm_start_applies_carried_impulse() {
    let mut b1 = Body::new(Vec2::new(1.0, 1.0), 2.0);
    let mut b2 = Body::new(Vec2::new(1.0, 1.0), 4.0);
    b2.position = Vec2::new(2.0, 0.0);
    let mut joint = Joint::new((BodyId(0), &b1), (BodyId(1), &b2), Vec2::new(1.0, 0.0));

    joint.p = Vec2::new(4.0, 0.0);
    joint.pre_step(&mut b1, &mut b2, 1.0 / DT, &SolverConfig::default());
    assert_close(b1.velocity, Vec2::new(-2.0, 0.0), 1e-6);
    assert_close(b2.velocity, Vec2::new(1.0, 0.0), 1e-6);
    // Pushing along the arm exerts no torque.
    assert_eq!(b1.angular_velocity, 0.0);
    assert_eq!(joint.bias, Vec2::ZERO);

    let mut b1 = Body::new(Vec2::new(1.0, 1.0), 2.0);
    let config = SolverConfig {
        warm_starting: false,
        ..SolverConfig::default()
    };
    joint.pre_step(&mut b1, &mut b2, 1.0 / DT, &config);
    assert_eq!(joint.p, Vec2::ZERO);
    assert_eq!(b1.velocity, Vec2::ZERO);
}

#[test]
fn impulses_cancel_relative_anchor_velocity() {
    init_tracing();
    let mut b1 = Body::new(Vec2::new(1.0, 1.0), STATIC_MASS);
    let mut b2 = Body::new(Vec2::new(1.0, 1.0), 1.0);
    b2.position = Vec2::new(0.0, -2.0);
    b2.velocity = Vec2::new(1.0, -3.0);
    let mut joint = Joint::new((BodyId(0), &b1), (BodyId(1), &b2), Vec2::ZERO);

    joint.pre_step(&mut b1, &mut b2, 1.0 / DT, &SolverConfig::default());
    // A static partner leaves a single body problem, solved in one pass.
    joint.apply_impulse(&mut b1, &mut b2);
    let relative = b2.velocity_at(joint.r2) - b1.velocity_at(joint.r1);
    assert_close(relative, Vec2::ZERO, 1e-4);
    assert_eq!(b1.velocity, Vec2::ZERO);
    assert!(joint.p.length() > 0.0);
}

#[test]
fn pendulum_keeps_its_length() {
    init_tracing();
    let mut world = World::new(Vec2::new(0.0, -10.0), 10);
    let ground = add_box(
        &mut world,
        Vec2::new(100.0, 20.0),
        STATIC_MASS,
        Vec2::new(0.0, -10.0),
    );
    let bob = add_box(&mut world, Vec2::new(1.0, 1.0), 100.0, Vec2::new(9.0, 11.0));
    let pivot = Vec2::new(0.0, 11.0);
    let joint = world.connect(ground, bob, pivot);

    let mut lowest = f32::MAX;
    for _ in 0..300 {
        world.step(DT);
        let (b1, b2) = (world.body(ground), world.body(bob));
        assert!(world.joint(joint).drift(b1, b2) < 0.05);
        let length = (b2.position - pivot).length();
        assert!((length - 9.0).abs() < 0.05, "length {length}");
        lowest = lowest.min(b2.position.y);
    }
    // It swung through the bottom of its arc.
    assert!(lowest < 2.1, "lowest {lowest}");
    assert_eq!(world.arbiter_count(), 0);
}

#[test]
fn hanging_chain_holds_still() {
    init_tracing();
    let mut world = World::new(Vec2::new(0.0, -10.0), 10);
    let ceiling = add_box(
        &mut world,
        Vec2::new(1.0, 1.0),
        STATIC_MASS,
        Vec2::new(0.0, 11.0),
    );
    let upper = add_box(&mut world, Vec2::new(0.25, 0.8), 5.0, Vec2::new(0.0, 9.5));
    let lower = add_box(&mut world, Vec2::new(0.25, 0.8), 5.0, Vec2::new(0.0, 8.5));
    let top = world.connect(ceiling, upper, Vec2::new(0.0, 10.0));
    let middle = world.connect(upper, lower, Vec2::new(0.0, 9.0));

    for _ in 0..300 {
        world.step(DT);
    }
    for joint in [top, middle] {
        let joint = world.joint(joint);
        let drift = joint.drift(world.body(joint.body1), world.body(joint.body2));
        assert!(drift < 0.01, "drift {drift}");
    }
    assert_close(world.body(upper).position, Vec2::new(0.0, 9.5), 0.02);
    assert_close(world.body(lower).position, Vec2::new(0.0, 8.5), 0.02);
    assert_eq!(world.arbiter_count(), 0);
}

#[test]
#[should_panic = "cannot connect"]
fn joint_to_itself() {
    let mut world = World::new(Vec2::ZERO, 10);
    let id = add_box(&mut world, Vec2::new(1.0, 1.0), 1.0, Vec2::ZERO);
    world.connect(id, id, Vec2::ZERO);
    world.step(DT);
}

#[test]
fn drift_is_ignored_without_position_correction() {
    let mut b1 = Body::new(Vec2::new(1.0, 1.0), 1.0);
    let mut b2 = Body::new(Vec2::new(1.0, 1.0), 1.0);
    b2.position = Vec2::new(2.0, 0.0);
    let mut joint = Joint::new((BodyId(0), &b1), (BodyId(1), &b2), Vec2::new(1.0, 0.0));
    b2.position = Vec2::new(2.5, 0.3);
    assert!(joint.drift(&b1, &b2) > 0.5);

    let config = SolverConfig {
        position_correction: false,
        ..SolverConfig::default()
    };
    joint.pre_step(&mut b1, &mut b2, 1.0 / DT, &config);
    assert_eq!(joint.bias, Vec2::ZERO);

    // The same drift is pulled back when correction is on.
    joint.pre_step(&mut b1, &mut b2, 1.0 / DT, &SolverConfig::default());
    let expected = -0.2 / DT * Vec2::new(0.5, 0.3);
    assert_close(joint.bias, expected, 1e-4);
}
