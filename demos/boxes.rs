use ::tracing::debug;
use macroquad::prelude::*;

use impulse2d::{
    Body, Mat22,
    demo::{Demo, Sandbox},
};

#[path = "../tests/tracing.rs"]
mod tracing_helper;
use tracing_helper::*;

const KEYS: [KeyCode; 8] = [
    KeyCode::Key1,
    KeyCode::Key2,
    KeyCode::Key3,
    KeyCode::Key4,
    KeyCode::Key5,
    KeyCode::Key6,
    KeyCode::Key7,
    KeyCode::Key8,
];

/// World space point shown in the middle of the window.
const VIEW_CENTER: impulse2d::Vec2 = impulse2d::Vec2::new(0.0, 7.0);
/// World space height of the window.
const VIEW_HEIGHT: f32 = 22.0;

fn world2screen(point: impulse2d::Vec2) -> Vec2 {
    let scale = screen_height() / VIEW_HEIGHT;
    let center = vec2(screen_width(), screen_height()) / 2.;
    let point = point - VIEW_CENTER;
    center + vec2(point.x, -point.y) * scale
}

fn draw_body(body: &Body, color: Color) {
    let rot = Mat22::from_angle(body.rotation);
    let h = 0.5 * body.width;
    let corners = [
        body.position + rot * impulse2d::Vec2::new(-h.x, -h.y),
        body.position + rot * impulse2d::Vec2::new(h.x, -h.y),
        body.position + rot * impulse2d::Vec2::new(h.x, h.y),
        body.position + rot * impulse2d::Vec2::new(-h.x, h.y),
    ]
    .map(world2screen);
    for (i, start) in corners.iter().enumerate() {
        let end = corners[(i + 1) % corners.len()];
        draw_line(start.x, start.y, end.x, end.y, 2., color);
    }
}

fn draw_segment(start: impulse2d::Vec2, end: impulse2d::Vec2, color: Color) {
    let start = world2screen(start);
    let end = world2screen(end);
    draw_line(start.x, start.y, end.x, end.y, 1., color);
}

#[macroquad::main("impulse2d boxes")]
async fn main() {
    init_tracing();
    let mut sandbox = Sandbox::new(0);
    loop {
        for (key, demo) in KEYS.into_iter().zip(Demo::ALL) {
            if is_key_pressed(key) {
                sandbox.load(demo);
            }
        }
        if is_key_pressed(KeyCode::Space) {
            sandbox.launch_bomb();
        }
        if is_key_pressed(KeyCode::A) {
            let on = sandbox.toggle_accumulation();
            debug!(on, "accumulation");
        }
        if is_key_pressed(KeyCode::W) {
            let on = sandbox.toggle_warm_starting();
            debug!(on, "warm starting");
        }
        if is_key_pressed(KeyCode::P) {
            let on = sandbox.toggle_position_correction();
            debug!(on, "position correction");
        }

        sandbox.step();

        clear_background(BLACK);

        let world = &sandbox.world;
        for (i, body) in world.bodies().iter().enumerate() {
            let color = if Some(impulse2d::BodyId(i)) == sandbox.bomb() {
                RED
            } else if body.is_static() {
                GRAY
            } else {
                SKYBLUE
            };
            draw_body(body, color);
        }

        // Center to anchor on both sides.
        for joint in world.joints() {
            let b1 = world.body(joint.body1);
            let b2 = world.body(joint.body2);
            let (a1, a2) = joint.anchors(b1, b2);
            draw_segment(b1.position, a1, ORANGE);
            draw_segment(b2.position, a2, ORANGE);
        }

        for contact in world.contacts() {
            let p = world2screen(contact.position);
            draw_circle(p.x, p.y, 2., YELLOW);
        }

        let config = world.config();
        let demo = sandbox.demo();
        let number = Demo::ALL.iter().position(|&d| d == demo).map_or(0, |i| i + 1);
        let lines = [
            format!("Demo {number}: {}", demo.name()),
            "Keys: 1-8 demos, Space to launch the bomb".to_string(),
            format!("(A)ccumulation {}", config.accumulate_impulses),
            format!("(P)osition correction {}", config.position_correction),
            format!("(W)arm starting {}", config.warm_starting),
        ];
        for (i, line) in lines.iter().enumerate() {
            draw_text(line, 10., 20. + 18. * i as f32, 18., WHITE);
        }

        next_frame().await
    }
}
