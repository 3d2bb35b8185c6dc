// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::f64::consts::TAU;

use kurbo::Point;
use proscenium_geom::BoundsRect;

use super::{DrawContext, Drawable};
use crate::DrawError;

/// A circle centered on the local origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    /// Radius.
    pub radius: f64,
}

impl Circle {
    /// A circle of the given radius.
    pub const fn new(radius: f64) -> Self {
        Self { radius }
    }
}

impl Drawable for Circle {
    fn draw(&self, cx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        cx.canvas.begin_path();
        cx.canvas.arc(Point::ORIGIN, self.radius, 0.0, TAU);
        cx.canvas.close_path();
        cx.fill_stroke();
        Ok(())
    }

    fn bounds(&self) -> BoundsRect {
        let r = self.radius;
        BoundsRect::new(-r, -r, 2.0 * r, 2.0 * r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_centered() {
        assert_eq!(
            Circle::new(20.0).bounds(),
            BoundsRect::new(-20.0, -20.0, 40.0, 40.0)
        );
    }
}
