//! Small value types for planar rigid body math.

use std::ops::{Mul, MulAssign};

use derive_more::derive::{Add, AddAssign, Neg, Sub, SubAssign};

#[derive(Debug, Default, Copy, Clone, PartialEq, Add, AddAssign, Sub, SubAssign, Neg)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Basic constructor for when struct constructors are too inconvenient
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Set `x` and `y` to the same value
    pub const fn splat(v: f32) -> Self {
        Self::new(v, v)
    }

    pub fn set(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Component-wise absolute value.
    pub fn abs(self) -> Self {
        Self::new(self.x.abs(), self.y.abs())
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, s: f32) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, s: f32) {
        self.x *= s;
        self.y *= s;
    }
}

impl Mul<Vec2> for f32 {
    type Output = Vec2;
    fn mul(self, v: Vec2) -> Vec2 {
        Vec2::new(self * v.x, self * v.y)
    }
}

/// Scalar z component of the 3D cross product of two planar vectors.
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

/// `s × v`: the vector `v` rotated a quarter turn counter-clockwise and scaled by `s`.
/// With `s` an angular velocity and `v` an arm, this is the linear velocity of the arm's tip.
pub fn cross_sv(s: f32, v: Vec2) -> Vec2 {
    Vec2::new(-s * v.y, s * v.x)
}

/// `v × s`: the vector `v` rotated a quarter turn clockwise and scaled by `s`.
pub fn cross_vs(v: Vec2, s: f32) -> Vec2 {
    Vec2::new(s * v.y, -s * v.x)
}

pub fn clamp(a: f32, low: f32, high: f32) -> f32 {
    low.max(a.min(high))
}

/// Column-major 2x2 matrix.
#[derive(Debug, Default, Copy, Clone, PartialEq, Add)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Mat22 {
    pub col1: Vec2,
    pub col2: Vec2,
}

impl Mat22 {
    pub const ZERO: Self = Self::new(Vec2::ZERO, Vec2::ZERO);

    pub const fn new(col1: Vec2, col2: Vec2) -> Self {
        Self { col1, col2 }
    }

    /// Counter-clockwise rotation by `angle` radians.
    pub fn from_angle(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(Vec2::new(c, s), Vec2::new(-s, c))
    }

    pub fn transpose(self) -> Self {
        Self::new(
            Vec2::new(self.col1.x, self.col2.x),
            Vec2::new(self.col1.y, self.col2.y),
        )
    }

    pub fn abs(self) -> Self {
        Self::new(self.col1.abs(), self.col2.abs())
    }

    /// Analytic inverse. The matrix must not be singular; a zero determinant
    /// means the caller built a degenerate mass matrix.
    pub fn invert(self) -> Self {
        let (a, b, c, d) = (self.col1.x, self.col2.x, self.col1.y, self.col2.y);
        let det = a * d - b * c;
        debug_assert!(det != 0.0, "inverting singular matrix {self:?}");
        let det = 1.0 / det;
        Self::new(Vec2::new(det * d, -det * c), Vec2::new(-det * b, det * a))
    }
}

impl Mul<Vec2> for Mat22 {
    type Output = Vec2;
    fn mul(self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.col1.x * v.x + self.col2.x * v.y,
            self.col1.y * v.x + self.col2.y * v.y,
        )
    }
}

impl Mul for Mat22 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::new(self * rhs.col1, self * rhs.col2)
    }
}

#[cfg(feature = "glam")]
impl From<Vec2> for glam::Vec2 {
    fn from(v: Vec2) -> Self {
        glam::Vec2::new(v.x, v.y)
    }
}

#[cfg(feature = "glam")]
impl From<glam::Vec2> for Vec2 {
    fn from(v: glam::Vec2) -> Self {
        Vec2::new(v.x, v.y)
    }
}
