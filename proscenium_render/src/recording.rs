// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Reference surface that records paint operations.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Affine, Arc, BezPath, PathEl, Point, Rect, Shape, Size, Vec2};
use peniko::{BlendMode, Brush};

use crate::{Canvas, Font, ImageHandle, ImageId, RenderError, Surface};

const ARC_TOLERANCE: f64 = 0.05;

/// Drawing state captured with every recorded operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasState {
    /// Current transform.
    pub transform: Affine,
    /// Global alpha.
    pub alpha: f64,
    /// Composite mode.
    pub blend: BlendMode,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            blend: BlendMode::default(),
        }
    }
}

/// Paint operation recorded by [`RecordingCanvas`].
#[derive(Clone, Debug)]
pub enum CanvasOp {
    /// A path fill. The path is in device space.
    Fill {
        /// Filled path.
        path: BezPath,
        /// Paint.
        brush: Brush,
        /// State at the time of the fill.
        state: CanvasState,
    },
    /// A path stroke. The path is in device space.
    Stroke {
        /// Stroked path.
        path: BezPath,
        /// Paint.
        brush: Brush,
        /// Line width in user units.
        width: f64,
        /// State at the time of the stroke.
        state: CanvasState,
    },
    /// An image draw.
    Image {
        /// Image drawn.
        image: ImageId,
        /// Source sub-rectangle, if any.
        src: Option<Rect>,
        /// Destination rectangle in user space.
        dst: Rect,
        /// State at the time of the draw.
        state: CanvasState,
    },
    /// A run of text, filled or stroked.
    Text {
        /// The text.
        text: String,
        /// Left edge and vertical center, in user space.
        origin: Point,
        /// Font.
        font: Font,
        /// Paint.
        brush: Brush,
        /// Outline width for stroked text; `None` when filled.
        stroke_width: Option<f64>,
        /// State at the time of the draw.
        state: CanvasState,
    },
    /// Another surface composited onto this one.
    Blit {
        /// Size of the source surface.
        source_size: Size,
    },
}

/// What a [`RecordingCanvas`] keeps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecordMode {
    /// Record every paint operation.
    #[default]
    Full,
    /// Track only the current path; paint operations are dropped.
    ///
    /// This is what a hit-testing surface needs.
    PathOnly,
}

/// A [`Surface`] that records operations instead of rasterizing.
///
/// The recorded ops describe what is currently on the surface: [`Surface::clear`]
/// discards them. [`RecordingCanvas::clear_count`] counts clears, which is a
/// convenient proxy for "how many times was this surface redrawn".
#[derive(Clone, Debug, Default)]
pub struct RecordingCanvas {
    size: Size,
    mode: RecordMode,
    state: CanvasState,
    stack: Vec<CanvasState>,
    path: BezPath,
    has_current_point: bool,
    ops: Vec<CanvasOp>,
    clears: u64,
}

impl RecordingCanvas {
    /// A full-recording surface of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// A path-only surface for hit testing.
    pub fn path_only(size: Size) -> Self {
        Self {
            size,
            mode: RecordMode::PathOnly,
            ..Self::default()
        }
    }

    /// Recording mode.
    pub fn mode(&self) -> RecordMode {
        self.mode
    }

    /// Operations painted since the last clear.
    pub fn ops(&self) -> &[CanvasOp] {
        &self.ops
    }

    /// Number of fill operations since the last clear.
    pub fn fill_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, CanvasOp::Fill { .. }))
            .count()
    }

    /// How many times the surface was cleared or resized.
    pub fn clear_count(&self) -> u64 {
        self.clears
    }

    /// The current path in device space.
    pub fn current_path(&self) -> &BezPath {
        &self.path
    }

    /// Current drawing state.
    pub fn state(&self) -> CanvasState {
        self.state
    }

    fn push_el(&mut self, el: PathEl) {
        self.path.push(self.state.transform * el);
    }

    fn records(&self) -> bool {
        self.mode == RecordMode::Full
    }

    fn push_text(
        &mut self,
        text: &str,
        origin: Point,
        font: &Font,
        brush: &Brush,
        stroke_width: Option<f64>,
    ) {
        if self.records() {
            self.ops.push(CanvasOp::Text {
                text: text.to_string(),
                origin,
                font: font.clone(),
                brush: brush.clone(),
                stroke_width,
                state: self.state,
            });
        }
    }
}

impl Canvas for RecordingCanvas {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn transform(&self) -> Affine {
        self.state.transform
    }

    fn set_transform(&mut self, transform: Affine) {
        self.state.transform = transform;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        // Out-of-range values are ignored, as on an HTML canvas.
        if (0.0..=1.0).contains(&alpha) {
            self.state.alpha = alpha;
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn begin_path(&mut self) {
        self.path.truncate(0);
        self.has_current_point = false;
    }

    fn move_to(&mut self, p: Point) {
        self.push_el(PathEl::MoveTo(p));
        self.has_current_point = true;
    }

    fn line_to(&mut self, p: Point) {
        if self.has_current_point {
            self.push_el(PathEl::LineTo(p));
        } else {
            self.move_to(p);
        }
    }

    fn arc(&mut self, center: Point, radius: f64, start_angle: f64, sweep_angle: f64) {
        let start = center + Vec2::new(start_angle.cos(), start_angle.sin()) * radius;
        self.line_to(start);
        let arc = Arc::new(
            center,
            Vec2::new(radius, radius),
            start_angle,
            sweep_angle,
            0.0,
        );
        for el in arc.append_iter(ARC_TOLERANCE) {
            self.push_el(el);
        }
    }

    fn rect(&mut self, rect: Rect) {
        self.move_to(Point::new(rect.x0, rect.y0));
        self.line_to(Point::new(rect.x1, rect.y0));
        self.line_to(Point::new(rect.x1, rect.y1));
        self.line_to(Point::new(rect.x0, rect.y1));
        self.close_path();
    }

    fn close_path(&mut self) {
        if self.has_current_point {
            self.path.push(PathEl::ClosePath);
        }
    }

    fn fill(&mut self, brush: &Brush) {
        if self.records() {
            self.ops.push(CanvasOp::Fill {
                path: self.path.clone(),
                brush: brush.clone(),
                state: self.state,
            });
        }
    }

    fn stroke(&mut self, brush: &Brush, width: f64) {
        if self.records() {
            self.ops.push(CanvasOp::Stroke {
                path: self.path.clone(),
                brush: brush.clone(),
                width,
                state: self.state,
            });
        }
    }

    fn draw_image(
        &mut self,
        image: &ImageHandle,
        src: Option<Rect>,
        dst: Rect,
    ) -> Result<(), RenderError> {
        let Some(size) = image.size else {
            return Err(RenderError::ImageUnavailable(image.id));
        };
        if let Some(rect) = src {
            let bounds = size.to_rect();
            if rect.is_zero_area() || rect.union(bounds) != bounds {
                return Err(RenderError::InvalidSource { id: image.id, rect });
            }
        }
        if self.records() {
            self.ops.push(CanvasOp::Image {
                image: image.id,
                src,
                dst,
                state: self.state,
            });
        }
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        font.estimate_width(text)
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &Font, brush: &Brush) {
        self.push_text(text, origin, font, brush, None);
    }

    fn stroke_text(&mut self, text: &str, origin: Point, font: &Font, brush: &Brush, width: f64) {
        self.push_text(text, origin, font, brush, Some(width));
    }

    fn is_point_in_path(&self, p: Point) -> bool {
        self.path.contains(p)
    }
}

impl Surface for RecordingCanvas {
    fn size(&self) -> Size {
        self.size
    }

    fn resize(&mut self, size: Size) {
        self.size = size;
        self.clear();
    }

    fn clear(&mut self) {
        self.ops.clear();
        self.stack.clear();
        self.state = CanvasState::default();
        self.begin_path();
        self.clears += 1;
    }

    fn blit(&mut self, source: &dyn Surface) {
        if self.records() {
            self.ops.push(CanvasOp::Blit {
                source_size: source.size(),
            });
        }
    }
}
