// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Rect, Size};
use proscenium_geom::BoundsRect;
use proscenium_render::ImageHandle;

use super::{DrawContext, Drawable};
use crate::DrawError;
use crate::tiles::TileInfo;

/// What an [`Image`] shows.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// A whole image.
    Full(ImageHandle),
    /// One tile of a tile set.
    Tile(TileInfo),
}

impl ImageSource {
    /// Natural size: the image size or the tile size.
    pub fn natural_size(&self) -> Option<Size> {
        match self {
            Self::Full(handle) => handle.size,
            Self::Tile(tile) => Some(tile.source.size()),
        }
    }
}

/// An image or tile stretched over `(0, 0, width, height)`.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Pixels to show.
    pub source: ImageSource,
    /// Drawn size.
    pub size: Size,
}

impl Image {
    /// An image at its natural size (zero while a full image is still loading).
    pub fn new(source: ImageSource) -> Self {
        let size = source.natural_size().unwrap_or(Size::ZERO);
        Self { source, size }
    }

    /// Overrides the drawn size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }
}

impl Drawable for Image {
    fn draw(&self, cx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        let dst = Rect::from_origin_size((0.0, 0.0), self.size);
        cx.canvas.begin_path();
        cx.canvas.rect(dst);
        if cx.hit_test {
            return Ok(());
        }
        match &self.source {
            ImageSource::Full(handle) => cx.canvas.draw_image(handle, None, dst)?,
            ImageSource::Tile(tile) => cx.canvas.draw_image(&tile.image, Some(tile.source), dst)?,
        }
        Ok(())
    }

    fn bounds(&self) -> BoundsRect {
        BoundsRect::new(0.0, 0.0, self.size.width, self.size.height)
    }
}
