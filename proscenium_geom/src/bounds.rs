// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned bounds in `x, y, width, height` form.

use kurbo::{Point, Rect};

use crate::Transform;

/// An axis-aligned rectangle stored as origin plus extent.
///
/// Unlike [`kurbo::Rect`] this keeps the origin/size layout the scene graph
/// uses when accumulating bounds, so that `enclose_*` can grow a rectangle in
/// place while walking children.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundsRect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl BoundsRect {
    /// The zero rectangle at the origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a rectangle from origin and extent.
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from its edges.
    pub fn from_bounds(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// A zero-extent rectangle at `(x, y)`.
    pub const fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0, 0.0)
    }

    /// Left edge.
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Top edge.
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Strict overlap: rectangles that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Grows `self` to the union with `other`.
    pub fn enclose_rect(&mut self, other: &Self) -> &mut Self {
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        self.x = self.x.min(other.x);
        self.y = self.y.min(other.y);
        self.width = right - self.x;
        self.height = bottom - self.y;
        self
    }

    /// Grows `self` to include the point `(x, y)`.
    pub fn enclose_point(&mut self, x: f64, y: f64) -> &mut Self {
        let right = self.right().max(x);
        let bottom = self.bottom().max(y);
        self.x = self.x.min(x);
        self.y = self.y.min(y);
        self.width = right - self.x;
        self.height = bottom - self.y;
        self
    }

    /// Exact componentwise equality.
    pub fn is_equal(&self, other: &Self) -> bool {
        self.x == other.x
            && self.y == other.y
            && self.width == other.width
            && self.height == other.height
    }

    /// Whether `p` lies inside, edges included.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Returns a copy shifted by `(dx, dy)`.
    #[must_use]
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Replaces `self` with the axis-aligned bounds of its image under `t`.
    ///
    /// Without rotation (or for a point-sized rectangle) only the origin is
    /// mapped and the extents are scaled by the diagonal; a negative scale is
    /// folded back into the origin so the extents stay non-negative. Otherwise
    /// all four corners are projected and enclosed.
    pub fn transform(&mut self, t: &Transform) -> &mut Self {
        if !t.has_rotation() || (self.width == 0.0 && self.height == 0.0) {
            let origin = t.transform_point(Point::new(self.x, self.y));
            let (mut x, mut y) = (origin.x, origin.y);
            let mut width = self.width * t.m[0];
            let mut height = self.height * t.m[3];
            if width < 0.0 {
                x += width;
                width = -width;
            }
            if height < 0.0 {
                y += height;
                height = -height;
            }
            *self = Self::new(x, y, width, height);
            return self;
        }

        let (left, top, right, bottom) = (self.x, self.y, self.right(), self.bottom());
        let first = t.transform_point(Point::new(left, top));
        *self = Self::from_point(first.x, first.y);
        for corner in [
            Point::new(right, top),
            Point::new(right, bottom),
            Point::new(left, bottom),
        ] {
            let p = t.transform_point(corner);
            self.enclose_point(p.x, p.y);
        }
        self
    }

    /// Returns the transformed copy, see [`BoundsRect::transform`].
    #[must_use]
    pub fn transformed(&self, t: &Transform) -> Self {
        let mut out = *self;
        out.transform(t);
        out
    }

    /// Converts to a [`kurbo::Rect`].
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.right(), self.bottom())
    }
}

impl From<Rect> for BoundsRect {
    fn from(r: Rect) -> Self {
        let r = r.abs();
        Self::new(r.x0, r.y0, r.width(), r.height())
    }
}

impl From<BoundsRect> for Rect {
    fn from(b: BoundsRect) -> Self {
        b.to_rect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &BoundsRect, b: &BoundsRect) -> bool {
        (a.x - b.x).abs() < 1e-9
            && (a.y - b.y).abs() < 1e-9
            && (a.width - b.width).abs() < 1e-9
            && (a.height - b.height).abs() < 1e-9
    }

    /// Four-corner projection without the fast path.
    fn project_corners(r: &BoundsRect, t: &Transform) -> BoundsRect {
        let p0 = t.transform_point(Point::new(r.x, r.y));
        let mut out = BoundsRect::from_point(p0.x, p0.y);
        for p in [
            Point::new(r.right(), r.y),
            Point::new(r.right(), r.bottom()),
            Point::new(r.x, r.bottom()),
        ] {
            let q = t.transform_point(p);
            out.enclose_point(q.x, q.y);
        }
        out
    }

    #[test]
    fn enclose_is_minimal_union() {
        let a = BoundsRect::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundsRect::new(5.0, -5.0, 20.0, 8.0);
        let mut u = a;
        u.enclose_rect(&b);
        assert_eq!(u, BoundsRect::from_bounds(0.0, -5.0, 25.0, 10.0));
        assert_eq!(u.left(), a.left().min(b.left()));
        assert_eq!(u.top(), a.top().min(b.top()));
        assert_eq!(u.right(), a.right().max(b.right()));
        assert_eq!(u.bottom(), a.bottom().max(b.bottom()));
    }

    #[test]
    fn union_overlaps_both_inputs() {
        let pairs = [
            // disjoint
            (
                BoundsRect::new(0.0, 0.0, 10.0, 10.0),
                BoundsRect::new(50.0, 60.0, 5.0, 5.0),
            ),
            // nested
            (
                BoundsRect::new(0.0, 0.0, 100.0, 100.0),
                BoundsRect::new(20.0, 30.0, 10.0, 10.0),
            ),
            // partial
            (
                BoundsRect::new(0.0, 0.0, 10.0, 10.0),
                BoundsRect::new(5.0, -5.0, 20.0, 8.0),
            ),
        ];
        for (a, b) in pairs {
            let mut u = a;
            u.enclose_rect(&b);
            assert!(u.overlaps(&a) && u.overlaps(&b), "{u:?} from {a:?} and {b:?}");
            let mut v = b;
            v.enclose_rect(&a);
            assert_eq!(u, v);
        }
    }

    #[test]
    fn enclose_point_grows_both_ways() {
        let mut r = BoundsRect::from_point(3.0, 3.0);
        r.enclose_point(-1.0, 7.0).enclose_point(5.0, 0.0);
        assert_eq!(r, BoundsRect::from_bounds(-1.0, 0.0, 5.0, 7.0));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = BoundsRect::new(0.0, 0.0, 10.0, 10.0);
        let right = BoundsRect::new(10.0, 0.0, 5.0, 5.0);
        let below = BoundsRect::new(0.0, 10.0, 5.0, 5.0);
        let inside = BoundsRect::new(9.0, 9.0, 5.0, 5.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn fast_path_agrees_with_corner_projection() {
        let r = BoundsRect::new(-20.0, 5.0, 40.0, 12.0);
        let mut cases = [Transform::IDENTITY; 4];
        cases[0].translate(100.0, 50.0);
        cases[1].scale(2.0, 0.5).translate(3.0, 3.0);
        cases[2].translate(10.0, 10.0).scale(-1.0, 1.0);
        cases[3].scale(1.5, -2.0);
        for t in cases {
            assert!(!t.has_rotation());
            let fast = r.transformed(&t);
            let slow = project_corners(&r, &t);
            assert!(close(&fast, &slow), "{t:?}: {fast:?} vs {slow:?}");
        }
    }

    #[test]
    fn fast_path_keeps_translation_at_origin() {
        let r = BoundsRect::new(0.0, 0.0, 10.0, 10.0);
        let mut t = Transform::IDENTITY;
        t.translate(7.0, 9.0);
        assert_eq!(r.transformed(&t), BoundsRect::new(7.0, 9.0, 10.0, 10.0));
    }

    #[test]
    fn rotated_bounds_enclose_corners() {
        let r = BoundsRect::new(0.0, 0.0, 10.0, 10.0);
        let mut t = Transform::IDENTITY;
        t.rotate(core::f64::consts::FRAC_PI_4);
        let out = r.transformed(&t);
        let half_diag = 10.0 * core::f64::consts::SQRT_2 / 2.0;
        assert!(close(
            &out,
            &BoundsRect::new(-half_diag, 0.0, 2.0 * half_diag, 2.0 * half_diag)
        ));
    }

    #[test]
    fn point_rect_takes_fast_path_under_rotation() {
        let r = BoundsRect::from_point(10.0, 0.0);
        let mut t = Transform::IDENTITY;
        t.rotate(core::f64::consts::FRAC_PI_2);
        let out = r.transformed(&t);
        assert!(close(&out, &BoundsRect::from_point(0.0, 10.0)), "{out:?}");
    }

    #[test]
    fn kurbo_round_trip() {
        let b = BoundsRect::new(1.0, 2.0, 3.0, 4.0);
        let r: Rect = b.into();
        assert_eq!(r, Rect::new(1.0, 2.0, 4.0, 6.0));
        assert!(BoundsRect::from(r).is_equal(&b));
    }
}
