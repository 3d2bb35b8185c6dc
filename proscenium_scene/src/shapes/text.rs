// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use kurbo::{Point, Rect, Size};
use peniko::Brush;
use proscenium_geom::BoundsRect;
use proscenium_render::{Canvas, Font};

use super::{DrawContext, Drawable};
use crate::DrawError;

/// Horizontal placement of text relative to the local origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    /// Text starts at the origin.
    #[default]
    Left,
    /// Text is centered on the origin.
    Center,
    /// Text ends at the origin.
    Right,
}

/// Vertical placement of text relative to the local origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerticalAlign {
    /// The text block hangs below the origin.
    #[default]
    Top,
    /// The text block is centered on the origin.
    Middle,
    /// The text block sits above the origin.
    Bottom,
}

/// One or more lines of text inside a padded box.
///
/// Lines are separated by `\n`; each line is one font size tall and is
/// aligned on its own. The box spans the widest line plus the padding on
/// every side, and is what hit tests and bounds use.
///
/// Line widths come from [`Font::estimate_width`] until [`Text::measure`]
/// is called with a canvas that knows real font metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct Text {
    text: String,
    lines: Vec<String>,
    widths: Vec<f64>,
    font: Font,
    padding: f64,
    align: TextAlign,
    vertical_align: VerticalAlign,
    background: Option<Brush>,
}

impl Text {
    /// Text in `font`, left and top aligned, without padding.
    pub fn new(text: impl Into<String>, font: Font) -> Self {
        let mut out = Self {
            text: String::new(),
            lines: Vec::new(),
            widths: Vec::new(),
            font,
            padding: 0.0,
            align: TextAlign::Left,
            vertical_align: VerticalAlign::Top,
            background: None,
        };
        out.set_text(text);
        out
    }

    /// Sets the padding around the text.
    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the horizontal alignment.
    #[must_use]
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    /// Sets the vertical alignment.
    #[must_use]
    pub fn with_vertical_align(mut self, vertical_align: VerticalAlign) -> Self {
        self.vertical_align = vertical_align;
        self
    }

    /// Paints the box behind the text.
    #[must_use]
    pub fn with_background(mut self, background: impl Into<Brush>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// The text, lines joined by `\n`.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text and re-estimates line widths.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.lines = self.text.split('\n').map(ToString::to_string).collect();
        self.estimate();
    }

    /// Number of lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The font.
    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Replaces the font and re-estimates line widths.
    pub fn set_font(&mut self, font: Font) {
        self.font = font;
        self.estimate();
    }

    /// Padding around the text.
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Sets the padding around the text.
    pub fn set_padding(&mut self, padding: f64) {
        self.padding = padding;
    }

    /// Horizontal alignment.
    pub fn align(&self) -> TextAlign {
        self.align
    }

    /// Sets the horizontal alignment.
    pub fn set_align(&mut self, align: TextAlign) {
        self.align = align;
    }

    /// Vertical alignment.
    pub fn vertical_align(&self) -> VerticalAlign {
        self.vertical_align
    }

    /// Sets the vertical alignment.
    pub fn set_vertical_align(&mut self, vertical_align: VerticalAlign) {
        self.vertical_align = vertical_align;
    }

    /// Measures every line with `canvas`.
    ///
    /// Call this through [`Scene::update_shape`](crate::Scene::update_shape)
    /// so the node's bounds are recomputed.
    pub fn measure(&mut self, canvas: &dyn Canvas) {
        self.widths = self
            .lines
            .iter()
            .map(|line| canvas.measure_text(line, &self.font))
            .collect();
    }

    /// Width of the widest line, without padding.
    pub fn text_width(&self) -> f64 {
        self.widths.iter().copied().fold(0.0, f64::max)
    }

    /// Height of the text block, without padding.
    pub fn text_height(&self) -> f64 {
        self.lines.len() as f64 * self.font.size
    }

    /// Size of the box, padding included.
    pub fn size(&self) -> Size {
        let p2 = self.padding * 2.0;
        Size::new(self.text_width() + p2, self.text_height() + p2)
    }

    /// The padded box in local space.
    pub fn box_rect(&self) -> Rect {
        let p = self.padding;
        let x = align_offset(self.align, self.text_width(), p);
        let y = match self.vertical_align {
            VerticalAlign::Top => 0.0,
            VerticalAlign::Middle => -self.text_height() / 2.0 - p,
            VerticalAlign::Bottom => -self.text_height() - p,
        };
        Rect::from_origin_size((x, y), self.size())
    }

    fn estimate(&mut self) {
        self.widths = self
            .lines
            .iter()
            .map(|line| self.font.estimate_width(line))
            .collect();
    }
}

fn align_offset(align: TextAlign, width: f64, padding: f64) -> f64 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => -width / 2.0 - padding,
        TextAlign::Right => -width - padding,
    }
}

impl Drawable for Text {
    fn draw(&self, cx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        let frame = self.box_rect();
        cx.canvas.begin_path();
        cx.canvas.rect(frame);
        if cx.hit_test {
            return Ok(());
        }
        if let Some(background) = &self.background {
            cx.canvas.fill(background);
        }
        let style = cx.style;
        let p = self.padding;
        for (i, (line, width)) in self.lines.iter().zip(&self.widths).enumerate() {
            let origin = Point::new(
                align_offset(self.align, *width, p) + p,
                frame.y0 + p + self.font.size * (i as f64 + 0.5),
            );
            if let Some(fill) = &style.fill {
                cx.canvas.fill_text(line, origin, &self.font, fill);
            }
            if let Some(stroke) = &style.stroke {
                cx.canvas.stroke_text(
                    line,
                    origin,
                    &self.font,
                    stroke,
                    style.effective_stroke_width(),
                );
            }
        }
        Ok(())
    }

    fn bounds(&self) -> BoundsRect {
        self.box_rect().into()
    }
}
