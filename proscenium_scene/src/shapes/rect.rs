// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Size};
use proscenium_geom::BoundsRect;

use super::{DrawContext, Drawable};
use crate::DrawError;

/// An axis-aligned rectangle with its top-left corner at the local origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectShape {
    /// Width and height.
    pub size: Size,
}

impl RectShape {
    /// A rectangle of the given size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
        }
    }
}

impl Drawable for RectShape {
    fn draw(&self, cx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        cx.canvas.begin_path();
        cx.canvas.rect(Rect::from_origin_size((0.0, 0.0), self.size));
        cx.fill_stroke();
        Ok(())
    }

    fn bounds(&self) -> BoundsRect {
        BoundsRect::new(0.0, 0.0, self.size.width, self.size.height)
    }
}
