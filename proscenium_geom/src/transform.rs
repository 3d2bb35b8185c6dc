// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Six-coefficient affine transform.

use core::ops::Mul;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Point, Vec2};

/// A 2D affine transform `[a, b, c, d, e, f]` representing the matrix
///
/// ```text
/// | a c e |
/// | b d f |
/// | 0 0 1 |
/// ```
///
/// The mutating operations (`rotate`, `scale`, `translate`, `multiply`) post-multiply,
/// so the most recently appended operation is the first one applied to a point.
/// This matches how a drawing context accumulates transforms and lets node
/// transforms be composed from the root down.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Coefficients in `[a, b, c, d, e, f]` order.
    pub m: [f64; 6],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        m: [1.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };

    /// Creates a transform from raw coefficients.
    pub const fn new(m: [f64; 6]) -> Self {
        Self { m }
    }

    /// Resets to identity.
    pub fn reset(&mut self) -> &mut Self {
        *self = Self::IDENTITY;
        self
    }

    /// Post-multiplies by `other`: `self = self * other`.
    pub fn multiply(&mut self, other: &Self) -> &mut Self {
        let m = &self.m;
        let o = &other.m;
        self.m = [
            m[0] * o[0] + m[2] * o[1],
            m[1] * o[0] + m[3] * o[1],
            m[0] * o[2] + m[2] * o[3],
            m[1] * o[2] + m[3] * o[3],
            m[0] * o[4] + m[2] * o[5] + m[4],
            m[1] * o[4] + m[3] * o[5] + m[5],
        ];
        self
    }

    /// Appends a rotation by `rad` radians.
    pub fn rotate(&mut self, rad: f64) -> &mut Self {
        let (s, c) = (rad.sin(), rad.cos());
        let m = self.m;
        self.m[0] = m[0] * c + m[2] * s;
        self.m[1] = m[1] * c + m[3] * s;
        self.m[2] = m[0] * -s + m[2] * c;
        self.m[3] = m[1] * -s + m[3] * c;
        self
    }

    /// Appends a non-uniform scale.
    pub fn scale(&mut self, sx: f64, sy: f64) -> &mut Self {
        self.m[0] *= sx;
        self.m[1] *= sx;
        self.m[2] *= sy;
        self.m[3] *= sy;
        self
    }

    /// Appends a translation.
    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.m[4] += self.m[0] * x + self.m[2] * y;
        self.m[5] += self.m[1] * x + self.m[3] * y;
        self
    }

    /// The determinant `ad - bc`.
    pub fn determinant(&self) -> f64 {
        self.m[0] * self.m[3] - self.m[1] * self.m[2]
    }

    /// Inverts in place.
    ///
    /// The caller guarantees the matrix is invertible; a zero determinant
    /// produces non-finite coefficients. Use [`Transform::try_invert`] when
    /// that cannot be guaranteed.
    pub fn invert(&mut self) -> &mut Self {
        let m = self.m;
        let d = 1.0 / (m[0] * m[3] - m[1] * m[2]);
        self.m = [
            m[3] * d,
            -m[1] * d,
            -m[2] * d,
            m[0] * d,
            d * (m[2] * m[5] - m[3] * m[4]),
            d * (m[1] * m[4] - m[0] * m[5]),
        ];
        self
    }

    /// Returns the inverse, leaving `self` untouched. Unchecked, see [`Transform::invert`].
    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut out = *self;
        out.invert();
        out
    }

    /// Returns the inverse, or `None` when the matrix is singular or not finite.
    pub fn try_invert(&self) -> Option<Self> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        Some(self.inverse())
    }

    /// Maps a point through the transform.
    pub fn transform_point(&self, p: Point) -> Point {
        let m = &self.m;
        Point::new(
            p.x * m[0] + p.y * m[2] + m[4],
            p.x * m[1] + p.y * m[3] + m[5],
        )
    }

    /// The translation component `(e, f)`.
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.m[4], self.m[5])
    }

    /// Whether the matrix has any off-diagonal linear term.
    ///
    /// Used to pick the axis-aligned fast path in [`crate::BoundsRect::transform`];
    /// shear counts as rotation here since both move corners off-axis.
    pub fn has_rotation(&self) -> bool {
        self.m[1] != 0.0 || self.m[2] != 0.0
    }

    /// Whether this is exactly the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Self;

    fn mul(mut self, rhs: Self) -> Self {
        self.multiply(&rhs);
        self
    }
}

impl From<Transform> for Affine {
    fn from(t: Transform) -> Self {
        Self::new(t.m)
    }
}

impl From<Affine> for Transform {
    fn from(a: Affine) -> Self {
        Self::new(a.as_coeffs())
    }
}
