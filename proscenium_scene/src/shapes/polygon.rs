// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polygons: arbitrary point lists, regular polygons and stars.

use alloc::vec::Vec;
use core::f64::consts::{PI, TAU};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::Point;
use proscenium_geom::BoundsRect;

use super::{DrawContext, Drawable};
use crate::DrawError;

fn trace(cx: &mut DrawContext<'_>, points: impl IntoIterator<Item = Point>) -> bool {
    let mut points = points.into_iter();
    let Some(first) = points.next() else {
        return false;
    };
    cx.canvas.begin_path();
    cx.canvas.move_to(first);
    for p in points {
        cx.canvas.line_to(p);
    }
    cx.canvas.close_path();
    true
}

fn enclose(points: impl IntoIterator<Item = Point>) -> BoundsRect {
    let mut points = points.into_iter();
    let Some(first) = points.next() else {
        return BoundsRect::ZERO;
    };
    let mut b = BoundsRect::from_point(first.x, first.y);
    for p in points {
        b.enclose_point(p.x, p.y);
    }
    b
}

/// A closed polygon through an explicit list of points.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    /// Vertices in local space.
    pub points: Vec<Point>,
}

impl Polygon {
    /// A polygon through `points`.
    pub fn new(points: impl IntoIterator<Item = Point>) -> Self {
        Self {
            points: points.into_iter().collect(),
        }
    }
}

impl Drawable for Polygon {
    fn draw(&self, cx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        if trace(cx, self.points.iter().copied()) {
            cx.fill_stroke();
        }
        Ok(())
    }

    fn bounds(&self) -> BoundsRect {
        enclose(self.points.iter().copied())
    }
}

/// A regular polygon centered on the origin, with its first vertex straight up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegularPolygon {
    /// Number of sides; fewer than three draws nothing.
    pub sides: u32,
    /// Distance from the center to each vertex.
    pub radius: f64,
}

impl RegularPolygon {
    /// A regular polygon.
    pub const fn new(sides: u32, radius: f64) -> Self {
        Self { sides, radius }
    }

    /// Vertex positions, starting at `(0, -radius)`.
    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        let sides = self.sides;
        let r = self.radius;
        (0..sides).map(move |n| {
            let a = f64::from(n) * TAU / f64::from(sides);
            Point::new(r * a.sin(), -r * a.cos())
        })
    }
}

impl Drawable for RegularPolygon {
    fn draw(&self, cx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        if self.sides < 3 {
            return Err(DrawError::Degenerate);
        }
        trace(cx, self.vertices());
        cx.fill_stroke();
        Ok(())
    }

    fn bounds(&self) -> BoundsRect {
        enclose(self.vertices())
    }
}

/// A star centered on the origin, with its first outer point straight up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Star {
    /// Number of outer points.
    pub points: u32,
    /// Radius of the inner vertices.
    pub inner_radius: f64,
    /// Radius of the outer vertices.
    pub outer_radius: f64,
}

impl Star {
    /// A star.
    pub const fn new(points: u32, inner_radius: f64, outer_radius: f64) -> Self {
        Self {
            points,
            inner_radius,
            outer_radius,
        }
    }

    /// Alternating outer and inner vertices, starting at `(0, -outer_radius)`.
    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        let points = self.points;
        (0..points * 2).map(move |n| {
            let r = if n % 2 == 0 {
                self.outer_radius
            } else {
                self.inner_radius
            };
            let a = f64::from(n) * PI / f64::from(points);
            Point::new(r * a.sin(), -r * a.cos())
        })
    }
}

impl Drawable for Star {
    fn draw(&self, cx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        if self.points < 2 {
            return Err(DrawError::Degenerate);
        }
        trace(cx, self.vertices());
        cx.fill_stroke();
        Ok(())
    }

    fn bounds(&self) -> BoundsRect {
        let r = self.outer_radius.max(self.inner_radius);
        BoundsRect::new(-r, -r, 2.0 * r, 2.0 * r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_bounds_enclose_points() {
        let p = Polygon::new([
            Point::new(-5.0, 2.0),
            Point::new(10.0, -3.0),
            Point::new(4.0, 8.0),
        ]);
        assert_eq!(p.bounds(), BoundsRect::new(-5.0, -3.0, 15.0, 11.0));
        assert_eq!(Polygon::default().bounds(), BoundsRect::ZERO);
    }

    #[test]
    fn regular_polygon_starts_at_top() {
        let square = RegularPolygon::new(4, 10.0);
        let v: Vec<Point> = square.vertices().collect();
        assert_eq!(v.len(), 4);
        assert!((v[0].y + 10.0).abs() < 1e-9 && v[0].x.abs() < 1e-9);
        assert!((v[1].x - 10.0).abs() < 1e-9 && v[1].y.abs() < 1e-9);
    }

    #[test]
    fn star_alternates_radii() {
        let star = Star::new(5, 4.0, 10.0);
        let v: Vec<Point> = star.vertices().collect();
        assert_eq!(v.len(), 10);
        let d0 = v[0].to_vec2().hypot();
        let d1 = v[1].to_vec2().hypot();
        assert!((d0 - 10.0).abs() < 1e-9);
        assert!((d1 - 4.0).abs() < 1e-9);
        assert_eq!(star.bounds(), BoundsRect::new(-10.0, -10.0, 20.0, 20.0));
    }
}
