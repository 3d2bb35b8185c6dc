// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawable contract and the built-in shapes.
//!
//! A [`Drawable`] describes geometry in its own local space: the scene sets
//! up the transform, alpha and composite mode before calling
//! [`Drawable::draw`], and uses [`Drawable::bounds`] for culling and group
//! bounds. The same `draw` serves rendering and hit testing; on hit-test
//! passes ([`DrawContext::hit_test`]) only the path matters, so paint calls
//! should go through [`DrawContext::fill_stroke`], which skips them.

use alloc::boxed::Box;
use core::any::Any;
use core::fmt::Debug;

use kurbo::Size;
use peniko::{BlendMode, Brush, Color};
use proscenium_geom::BoundsRect;
use proscenium_render::Canvas;

use crate::DrawError;

mod circle;
mod image;
mod polygon;
mod rect;
mod text;
mod tile_map;

pub use circle::Circle;
pub use image::{Image, ImageSource};
pub use polygon::{Polygon, RegularPolygon, Star};
pub use rect::RectShape;
pub use text::{Text, TextAlign, VerticalAlign};
pub use tile_map::TileMap;

/// Stroke width used when a stroke paint is given without a width.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Geometry that can draw itself onto a [`Canvas`].
pub trait Drawable: Any + Debug {
    /// Builds the path and paints it.
    fn draw(&self, cx: &mut DrawContext<'_>) -> Result<(), DrawError>;

    /// Bounds in local space, before the node transform.
    fn bounds(&self) -> BoundsRect;
}

/// Everything a [`Drawable`] gets while drawing.
#[derive(Debug)]
pub struct DrawContext<'a> {
    /// Target canvas, with the node's full transform already set.
    pub canvas: &'a mut dyn Canvas,
    /// Paint style of the shape.
    pub style: &'a ShapeStyle,
    /// `true` when drawing onto the hit-testing surface.
    pub hit_test: bool,
    /// Size of the surface being drawn onto.
    pub viewport: Size,
}

impl DrawContext<'_> {
    /// Fills and strokes the current path according to the style.
    ///
    /// Does nothing on hit-test passes.
    pub fn fill_stroke(&mut self) {
        if self.hit_test {
            return;
        }
        if let Some(fill) = &self.style.fill {
            self.canvas.fill(fill);
        }
        if let Some(stroke) = &self.style.stroke {
            self.canvas.stroke(stroke, self.style.effective_stroke_width());
        }
    }
}

/// Fill and stroke paint for a shape.
#[derive(Clone, Debug, Default)]
pub struct ShapeStyle {
    /// Fill paint.
    pub fill: Option<Brush>,
    /// Stroke paint.
    pub stroke: Option<Brush>,
    /// Stroke width.
    pub stroke_width: Option<f64>,
}

impl ShapeStyle {
    /// No fill, no stroke.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the fill.
    #[must_use]
    pub fn with_fill(mut self, fill: impl Into<Brush>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    /// Sets the stroke paint.
    #[must_use]
    pub fn with_stroke(mut self, stroke: impl Into<Brush>) -> Self {
        self.stroke = Some(stroke.into());
        self
    }

    /// Sets the stroke width.
    #[must_use]
    pub fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = Some(width);
        self
    }

    /// Fills in stroke defaults: a stroke without a width gets
    /// [`DEFAULT_STROKE_WIDTH`], a width without a stroke gets black.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        match (&self.stroke, self.stroke_width) {
            (Some(_), None) => self.stroke_width = Some(DEFAULT_STROKE_WIDTH),
            (None, Some(_)) => self.stroke = Some(Brush::Solid(Color::BLACK)),
            _ => {}
        }
        self
    }

    /// Width used when stroking.
    pub fn effective_stroke_width(&self) -> f64 {
        self.stroke_width.unwrap_or(1.0)
    }
}

/// A drawable plus its paint settings.
#[derive(Debug)]
pub struct Shape {
    pub(crate) drawable: Box<dyn Drawable>,
    pub(crate) style: ShapeStyle,
    pub(crate) blend: Option<BlendMode>,
}

impl Shape {
    pub(crate) fn new(drawable: Box<dyn Drawable>) -> Self {
        Self {
            drawable,
            style: ShapeStyle::default(),
            blend: None,
        }
    }

    /// The drawable.
    pub fn drawable(&self) -> &dyn Drawable {
        self.drawable.as_ref()
    }

    /// The drawable as a concrete type.
    pub fn downcast_ref<T: Drawable>(&self) -> Option<&T> {
        let any: &dyn Any = self.drawable.as_ref();
        any.downcast_ref::<T>()
    }

    pub(crate) fn downcast_mut<T: Drawable>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self.drawable.as_mut();
        any.downcast_mut::<T>()
    }

    /// Paint style.
    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    /// Composite mode, if set.
    pub fn blend_mode(&self) -> Option<BlendMode> {
        self.blend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_defaults_follow_each_other() {
        let s = ShapeStyle::new().with_stroke(Color::WHITE).normalized();
        assert_eq!(s.stroke_width, Some(DEFAULT_STROKE_WIDTH));

        let s = ShapeStyle::new().with_stroke_width(4.0).normalized();
        assert!(matches!(s.stroke, Some(Brush::Solid(c)) if c == Color::BLACK));

        let s = ShapeStyle::new().normalized();
        assert!(s.stroke.is_none() && s.stroke_width.is_none());
        assert_eq!(s.effective_stroke_width(), 1.0);
    }

    #[test]
    fn downcast_finds_concrete_type() {
        let shape = Shape::new(Box::new(Circle::new(3.0)));
        assert_eq!(shape.downcast_ref::<Circle>().map(|c| c.radius), Some(3.0));
        assert!(shape.downcast_ref::<Star>().is_none());
    }
}
