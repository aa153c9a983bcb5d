//! Box versus box narrow phase: separating axis test followed by clipping
//! the incident edge against the reference face.
//!
//! Box vertices and edges are numbered counter-clockwise in the box's local frame:
//!
//! ```text
//!        ^ y
//!        |
//!        e1
//!   v2 ------ v1
//!    |        |
//! e2 |        | e4  --> x
//!    |        |
//!   v3 ------ v4
//!        e3
//! ```

use arrayvec::ArrayVec;

use crate::{
    body::Body,
    vec2::{Mat22, Vec2},
};

/// Box-box collision never yields more than two points.
pub const MAX_CONTACTS: usize = 2;

/// Inline storage for the points of a single manifold.
pub type Contacts = ArrayVec<Contact, MAX_CONTACTS>;

/// Bias towards box A's faces, then towards x axes, so that nearly equal
/// separations don't make the reference face flicker between frames.
const RELATIVE_TOL: f32 = 0.95;
const ABSOLUTE_TOL: f32 = 0.01;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Edge {
    #[default]
    None = 0,
    Edge1,
    Edge2,
    Edge3,
    Edge4,
}

/// Identifies the pair of edges whose intersection produced a contact point.
/// Stays stable while the boxes move slightly, which is what lets
/// accumulated impulses follow a contact from one step to the next.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct FeaturePair {
    pub in_edge1: Edge,
    pub out_edge1: Edge,
    pub in_edge2: Edge,
    pub out_edge2: Edge,
}

impl FeaturePair {
    /// Swaps the roles of the two boxes.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.in_edge1, &mut self.in_edge2);
        std::mem::swap(&mut self.out_edge1, &mut self.out_edge2);
    }
}

/// One point of a contact manifold together with its solver state.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Contact {
    pub position: Vec2,
    /// Points from body 1 towards body 2.
    pub normal: Vec2,
    pub r1: Vec2,
    pub r2: Vec2,
    /// Negative when penetrating.
    pub separation: f32,
    /// Accumulated normal impulse.
    pub pn: f32,
    /// Accumulated tangent impulse.
    pub pt: f32,
    /// Accumulated normal impulse for position bias.
    pub pnb: f32,
    pub mass_normal: f32,
    pub mass_tangent: f32,
    pub bias: f32,
    pub feature: FeaturePair,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Axis {
    FaceAX,
    FaceAY,
    FaceBX,
    FaceBY,
}

/// The face of the reference box that the incident edge gets clipped against,
/// bounded by two side planes.
struct ReferenceFace {
    center: Vec2,
    front_normal: Vec2,
    front_extent: f32,
    side_normal: Vec2,
    side_extent: f32,
    neg_edge: Edge,
    pos_edge: Edge,
}

#[derive(Debug, Default, Copy, Clone)]
struct ClipVertex {
    v: Vec2,
    fp: FeaturePair,
}

/// Sutherland-Hodgman clip of a two point segment against the half plane
/// `normal · p <= offset`. Points created by the clip are tagged with `clip_edge`.
fn clip_segment_to_line(
    v_in: &[ClipVertex; 2],
    normal: Vec2,
    offset: f32,
    clip_edge: Edge,
) -> ArrayVec<ClipVertex, 2> {
    let mut v_out = ArrayVec::new();

    // Distance of end points to the line
    let distance0 = normal.dot(v_in[0].v) - offset;
    let distance1 = normal.dot(v_in[1].v) - offset;

    // Points behind the plane are kept
    if distance0 <= 0.0 {
        v_out.push(v_in[0]);
    }
    if distance1 <= 0.0 {
        v_out.push(v_in[1]);
    }

    // End points on different sides of the plane: add the intersection
    if distance0 * distance1 < 0.0 {
        let interp = distance0 / (distance0 - distance1);
        let v = v_in[0].v + interp * (v_in[1].v - v_in[0].v);
        let fp = if distance0 > 0.0 {
            FeaturePair {
                in_edge1: clip_edge,
                in_edge2: Edge::None,
                ..v_in[0].fp
            }
        } else {
            FeaturePair {
                out_edge1: clip_edge,
                out_edge2: Edge::None,
                ..v_in[1].fp
            }
        };
        v_out.push(ClipVertex { v, fp });
    }

    v_out
}

/// Finds the edge of the incident box (half extents `h`) most anti-parallel to
/// the reference face `normal`, in world space.
fn compute_incident_edge(h: Vec2, pos: Vec2, rot: Mat22, normal: Vec2) -> [ClipVertex; 2] {
    // The normal is from the reference box. Convert it
    // to the incident box's frame and flip sign.
    let n = -(rot.transpose() * normal);
    let n_abs = n.abs();

    let vertex = |x: f32, y: f32, in_edge2: Edge, out_edge2: Edge| ClipVertex {
        v: Vec2::new(x, y),
        fp: FeaturePair {
            in_edge2,
            out_edge2,
            ..FeaturePair::default()
        },
    };

    let mut c = if n_abs.x > n_abs.y {
        if n.x > 0.0 {
            [
                vertex(h.x, -h.y, Edge::Edge3, Edge::Edge4),
                vertex(h.x, h.y, Edge::Edge4, Edge::Edge1),
            ]
        } else {
            [
                vertex(-h.x, h.y, Edge::Edge1, Edge::Edge2),
                vertex(-h.x, -h.y, Edge::Edge2, Edge::Edge3),
            ]
        }
    } else if n.y > 0.0 {
        [
            vertex(h.x, h.y, Edge::Edge4, Edge::Edge1),
            vertex(-h.x, h.y, Edge::Edge1, Edge::Edge2),
        ]
    } else {
        [
            vertex(-h.x, -h.y, Edge::Edge2, Edge::Edge3),
            vertex(h.x, -h.y, Edge::Edge3, Edge::Edge4),
        ]
    };

    for vertex in &mut c {
        vertex.v = pos + rot * vertex.v;
    }
    c
}

/// Computes the contact manifold between two boxes. The normals of the
/// returned contacts point from `body_a` towards `body_b`.
pub fn collide(body_a: &Body, body_b: &Body) -> Contacts {
    // Setup
    let h_a = 0.5 * body_a.width;
    let h_b = 0.5 * body_b.width;

    let pos_a = body_a.position;
    let pos_b = body_b.position;

    let rot_a = Mat22::from_angle(body_a.rotation);
    let rot_b = Mat22::from_angle(body_b.rotation);

    let rot_at = rot_a.transpose();
    let rot_bt = rot_b.transpose();

    let dp = pos_b - pos_a;
    let d_a = rot_at * dp;
    let d_b = rot_bt * dp;

    let c = rot_at * rot_b;
    let abs_c = c.abs();
    let abs_ct = abs_c.transpose();

    // Box A faces
    let face_a = d_a.abs() - h_a - abs_c * h_b;
    if face_a.x > 0.0 || face_a.y > 0.0 {
        return Contacts::new();
    }

    // Box B faces
    let face_b = d_b.abs() - h_b - abs_ct * h_a;
    if face_b.x > 0.0 || face_b.y > 0.0 {
        return Contacts::new();
    }

    // Find best axis
    let toward = |positive: bool, axis: Vec2| if positive { axis } else { -axis };

    let mut axis = Axis::FaceAX;
    let mut separation = face_a.x;
    let mut normal = toward(d_a.x > 0.0, rot_a.col1);

    if face_a.y > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_a.y {
        axis = Axis::FaceAY;
        separation = face_a.y;
        normal = toward(d_a.y > 0.0, rot_a.col2);
    }

    if face_b.x > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_b.x {
        axis = Axis::FaceBX;
        separation = face_b.x;
        normal = toward(d_b.x > 0.0, rot_b.col1);
    }

    if face_b.y > RELATIVE_TOL * separation + ABSOLUTE_TOL * h_b.y {
        axis = Axis::FaceBY;
        normal = toward(d_b.y > 0.0, rot_b.col2);
    }

    // Setup clipping plane data based on the separating axis
    let (face, incident_edge) = match axis {
        Axis::FaceAX => (
            ReferenceFace {
                center: pos_a,
                front_normal: normal,
                front_extent: h_a.x,
                side_normal: rot_a.col2,
                side_extent: h_a.y,
                neg_edge: Edge::Edge3,
                pos_edge: Edge::Edge1,
            },
            compute_incident_edge(h_b, pos_b, rot_b, normal),
        ),
        Axis::FaceAY => (
            ReferenceFace {
                center: pos_a,
                front_normal: normal,
                front_extent: h_a.y,
                side_normal: rot_a.col1,
                side_extent: h_a.x,
                neg_edge: Edge::Edge2,
                pos_edge: Edge::Edge4,
            },
            compute_incident_edge(h_b, pos_b, rot_b, normal),
        ),
        Axis::FaceBX => (
            ReferenceFace {
                center: pos_b,
                front_normal: -normal,
                front_extent: h_b.x,
                side_normal: rot_b.col2,
                side_extent: h_b.y,
                neg_edge: Edge::Edge3,
                pos_edge: Edge::Edge1,
            },
            compute_incident_edge(h_a, pos_a, rot_a, -normal),
        ),
        Axis::FaceBY => (
            ReferenceFace {
                center: pos_b,
                front_normal: -normal,
                front_extent: h_b.y,
                side_normal: rot_b.col1,
                side_extent: h_b.x,
                neg_edge: Edge::Edge2,
                pos_edge: Edge::Edge4,
            },
            compute_incident_edge(h_a, pos_a, rot_a, -normal),
        ),
    };

    let front_normal = face.front_normal;
    let side_normal = face.side_normal;
    let front = face.center.dot(front_normal) + face.front_extent;
    let side = face.center.dot(side_normal);
    let neg_side = -side + face.side_extent;
    let pos_side = side + face.side_extent;

    // Clip against the negative side plane
    let Ok(clip_points1) =
        clip_segment_to_line(&incident_edge, -side_normal, neg_side, face.neg_edge).into_inner()
    else {
        return Contacts::new();
    };

    // Clip against the positive side plane
    let Ok(clip_points2) =
        clip_segment_to_line(&clip_points1, side_normal, pos_side, face.pos_edge).into_inner()
    else {
        return Contacts::new();
    };

    // Due to roundoff, it is possible that clipping removes all points.
    let mut contacts = Contacts::new();
    for clip in clip_points2 {
        let separation = front_normal.dot(clip.v) - front;
        if separation <= 0.0 {
            let mut feature = clip.fp;
            if matches!(axis, Axis::FaceBX | Axis::FaceBY) {
                feature.flip();
            }
            contacts.push(Contact {
                separation,
                normal,
                // slide contact point onto reference face (easy to cull)
                position: clip.v - separation * front_normal,
                feature,
                ..Contact::default()
            });
        }
    }

    contacts
}
