use impulse2d::demo::{Demo, Sandbox};

#[path = "tracing.rs"]
mod tracing_helper;
use tracing_helper::*;

#[test]
fn every_demo_runs() {
    init_tracing();
    let mut sandbox = Sandbox::new(0);
    for demo in Demo::ALL {
        sandbox.load(demo);
        assert_eq!(sandbox.demo(), demo);
        assert!(!sandbox.world.bodies().is_empty(), "{}", demo.name());
        for _ in 0..180 {
            sandbox.step();
        }
        for body in sandbox.world.bodies() {
            assert!(body.position.x.is_finite(), "{}: {body:?}", demo.name());
            assert!(body.position.y.is_finite(), "{}: {body:?}", demo.name());
            assert!(body.rotation.is_finite(), "{}: {body:?}", demo.name());
            // Nothing tunnels through the ground.
            assert!(body.position.y > -0.5 || body.is_static(), "{}: {body:?}", demo.name());
        }
    }
}

#[test]
fn scene_sizes() {
    let mut sandbox = Sandbox::new(0);
    let mut sizes = vec![];
    for demo in Demo::ALL {
        sandbox.load(demo);
        sizes.push((
            sandbox.world.bodies().len(),
            sandbox.world.joints().len(),
        ));
    }
    assert_eq!(
        sizes,
        [
            (2, 0),
            (2, 1),
            (11, 0),
            (11, 0),
            (79, 0),
            (5, 1),
            (16, 16),
            (16, 15),
        ]
    );
}

#[test]
fn single_box_settles() {
    init_tracing();
    let mut sandbox = Sandbox::new(0);
    for _ in 0..300 {
        sandbox.step();
    }
    let body = &sandbox.world.bodies()[1];
    assert!((body.position.y - 0.5).abs() < 0.1, "{body:?}");
}

#[test]
fn randomized_stacking_is_seeded() {
    let positions = |seed| {
        let mut sandbox = Sandbox::new(seed);
        sandbox.load(Demo::RandomizedStacking);
        sandbox
            .world
            .bodies()
            .iter()
            .map(|body| body.position)
            .collect::<Vec<_>>()
    };
    let a = positions(7);
    assert_eq!(a, positions(7));
    assert_ne!(a, positions(8));
    for (i, position) in a.iter().skip(1).enumerate() {
        assert!(position.x.abs() < 0.1);
        assert!((position.y - (0.51 + 1.05 * i as f32)).abs() < 1e-5);
    }
}

#[test]
fn bomb_is_reused() {
    init_tracing();
    let mut sandbox = Sandbox::new(3);
    assert_eq!(sandbox.bomb(), None);
    let count = sandbox.world.bodies().len();

    let first = sandbox.launch_bomb();
    assert_eq!(sandbox.bomb(), Some(first));
    assert_eq!(sandbox.world.bodies().len(), count + 1);
    let bomb = sandbox.world.body(first);
    assert_eq!(bomb.position.y, 15.0);
    assert!(bomb.position.x.abs() <= 15.0);
    assert!(bomb.rotation.abs() <= 1.5);
    assert!(bomb.angular_velocity.abs() <= 20.0);
    assert_eq!(bomb.velocity, -1.5 * bomb.position);
    assert_eq!(bomb.mass, 50.0);

    sandbox.step();
    let second = sandbox.launch_bomb();
    assert_eq!(first, second);
    assert_eq!(sandbox.world.bodies().len(), count + 1);
    assert_eq!(sandbox.world.body(second).position.y, 15.0);

    // A new scene forgets the bomb.
    sandbox.load(Demo::Pyramid);
    assert_eq!(sandbox.bomb(), None);
}

#[test]
fn toggles_flip_solver_switches() {
    let mut sandbox = Sandbox::new(0);
    assert!(!sandbox.toggle_accumulation());
    assert!(!sandbox.world.config().accumulate_impulses);
    assert!(!sandbox.toggle_warm_starting());
    assert!(!sandbox.world.config().warm_starting);
    assert!(!sandbox.toggle_position_correction());
    assert!(!sandbox.world.config().position_correction);

    // Switches survive scene changes.
    sandbox.load(Demo::Teeter);
    assert!(!sandbox.world.config().warm_starting);
    assert!(sandbox.toggle_accumulation());
    assert!(sandbox.world.config().accumulate_impulses);
}
