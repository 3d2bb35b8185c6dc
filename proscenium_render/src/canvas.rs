// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The canvas and surface traits.

use alloc::string::String;
use core::any::Any;
use core::fmt::{self, Debug};

use kurbo::{Affine, Point, Rect, Size};
use peniko::{BlendMode, Brush};

/// Identifier for an image resource owned by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u32);

/// A reference to an image that may still be loading.
///
/// The host decodes and owns pixel data; the scene only needs to know which
/// image to draw and whether it is ready. A handle without a size is treated
/// as not yet loaded and fails to draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageHandle {
    /// Host-side image id.
    pub id: ImageId,
    /// Natural size once the image is available.
    pub size: Option<Size>,
}

impl ImageHandle {
    /// A handle to an image that is ready to draw.
    pub const fn loaded(id: ImageId, size: Size) -> Self {
        Self {
            id,
            size: Some(size),
        }
    }

    /// A handle to an image that is not available yet.
    pub const fn pending(id: ImageId) -> Self {
        Self { id, size: None }
    }

    /// Whether pixel data is available.
    pub fn is_loaded(&self) -> bool {
        self.size.is_some()
    }
}

/// Advance of one character, in ems, used by [`Font::estimate_width`].
pub const AVERAGE_ADVANCE_EM: f64 = 0.5;

/// Font used to draw text.
///
/// Displays as a CSS font shorthand, e.g. `700 16px serif`.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    /// Family name; the host's default family when `None`.
    pub family: Option<String>,
    /// Size in pixels; also the height of one line.
    pub size: f64,
    /// Numeric weight (400 is regular, 700 bold).
    pub weight: Option<u16>,
}

impl Font {
    /// A font of the given pixel size in the default family.
    pub fn new(size: f64) -> Self {
        Self {
            family: None,
            size,
            weight: None,
        }
    }

    /// Sets the family.
    #[must_use]
    pub fn with_family(mut self, family: impl Into<String>) -> Self {
        self.family = Some(family.into());
        self
    }

    /// Sets the weight.
    #[must_use]
    pub fn with_weight(mut self, weight: u16) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Fixed-advance width estimate for surfaces without font metrics.
    pub fn estimate_width(&self, text: &str) -> f64 {
        text.chars().count() as f64 * self.size * AVERAGE_ADVANCE_EM
    }
}

impl fmt::Display for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(weight) = self.weight {
            write!(f, "{weight} ")?;
        }
        write!(f, "{}px", self.size)?;
        if let Some(family) = &self.family {
            write!(f, " {family}")?;
        }
        Ok(())
    }
}

/// Errors reported by drawing surfaces.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum RenderError {
    /// The image has no pixel data yet.
    #[error("image {0:?} is not available")]
    ImageUnavailable(ImageId),
    /// The requested source rectangle is empty or lies outside the image.
    #[error("source rectangle {rect:?} is invalid for image {id:?}")]
    InvalidSource {
        /// Image being drawn.
        id: ImageId,
        /// Offending source rectangle.
        rect: Rect,
    },
}

/// An immediate-mode 2D drawing context.
///
/// Path construction happens in the coordinate space set by the current
/// transform; [`Canvas::is_point_in_path`] takes device coordinates.
pub trait Canvas: Debug {
    /// Pushes the current state (transform, alpha, blend mode).
    fn save(&mut self);
    /// Pops the most recently saved state. Unbalanced calls are ignored.
    fn restore(&mut self);

    /// The current transform.
    fn transform(&self) -> Affine;
    /// Replaces the current transform.
    fn set_transform(&mut self, transform: Affine);
    /// Post-multiplies the current transform by `transform`.
    fn concat_transform(&mut self, transform: Affine) {
        let current = self.transform();
        self.set_transform(current * transform);
    }

    /// Sets the alpha applied to subsequent paint operations.
    fn set_global_alpha(&mut self, alpha: f64);
    /// Sets the composite mode for subsequent paint operations.
    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Discards the current path.
    fn begin_path(&mut self);
    /// Starts a new subpath at `p`.
    fn move_to(&mut self, p: Point);
    /// Adds a line from the current point to `p`.
    fn line_to(&mut self, p: Point);
    /// Adds a circular arc; connects from the current point if there is one.
    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, sweep_angle: f64);
    /// Adds a closed rectangle subpath.
    fn rect(&mut self, rect: Rect);
    /// Closes the current subpath.
    fn close_path(&mut self);

    /// Fills the current path.
    fn fill(&mut self, brush: &Brush);
    /// Strokes the current path.
    fn stroke(&mut self, brush: &Brush, width: f64);
    /// Draws `src` of `image` (the whole image when `None`) into `dst`.
    fn draw_image(
        &mut self,
        image: &ImageHandle,
        src: Option<Rect>,
        dst: Rect,
    ) -> Result<(), RenderError>;

    /// Advance width of `text` set in `font`, in user units.
    fn measure_text(&self, text: &str, font: &Font) -> f64;
    /// Fills `text` starting at `origin.x`, vertically centered on `origin.y`.
    fn fill_text(&mut self, text: &str, origin: Point, font: &Font, brush: &Brush);
    /// Strokes the outline of `text`, placed as in [`Canvas::fill_text`].
    fn stroke_text(&mut self, text: &str, origin: Point, font: &Font, brush: &Brush, width: f64);

    /// Whether the device-space point is inside the current path (nonzero rule).
    fn is_point_in_path(&self, p: Point) -> bool;
}

/// A sized canvas that owns its contents.
///
/// Surfaces are `Any` so hosts can get their concrete type back from a layer.
pub trait Surface: Canvas + Any {
    /// Current pixel size.
    fn size(&self) -> Size;
    /// Resizes and clears.
    fn resize(&mut self, size: Size);
    /// Erases all content and the current path, and resets the state stack.
    fn clear(&mut self);
    /// Composites `source` onto this surface at the origin.
    fn blit(&mut self, source: &dyn Surface);
}

/// Convenience helpers for [`Canvas`] implementors.
pub trait CanvasExt: Canvas {
    /// Runs `f` between a `save` and the matching `restore`.
    fn with_saved<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.save();
        let out = f(self);
        self.restore();
        out
    }
}

impl<T: Canvas + ?Sized> CanvasExt for T {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_shorthand() {
        assert_eq!(alloc::format!("{}", Font::new(12.0)), "12px");
        let bold = Font::new(16.0).with_family("serif").with_weight(700);
        assert_eq!(alloc::format!("{bold}"), "700 16px serif");
    }

    #[test]
    fn estimate_counts_characters() {
        let font = Font::new(10.0);
        assert_eq!(font.estimate_width("Hello"), 25.0);
        assert_eq!(font.estimate_width("héllo"), 25.0);
        assert_eq!(font.estimate_width(""), 0.0);
    }
}
