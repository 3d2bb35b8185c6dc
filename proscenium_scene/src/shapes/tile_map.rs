// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Size};
use proscenium_geom::{BoundsRect, Transform};

use super::{DrawContext, Drawable};
use crate::DrawError;
use crate::tiles::{TileMapSpot, TileSet, spot_overlap};

/// A grid of tile spots.
///
/// Only the spots under the visible part of the surface are drawn, widened
/// by the [`spot_overlap`] of the largest tile so that oversized tiles
/// poking into view from outside are not cut off. Hit testing uses the whole
/// map rectangle.
#[derive(Clone, Debug)]
pub struct TileMap {
    columns: usize,
    rows: usize,
    spot_size: Size,
    tile_set: TileSet,
    spots: Vec<TileMapSpot>,
}

impl TileMap {
    /// Builds the grid. `spot_data` gives tile ids row by row; missing
    /// entries leave spots empty and extra entries are ignored.
    pub fn new(
        columns: usize,
        rows: usize,
        spot_size: Size,
        tile_set: TileSet,
        spot_data: impl IntoIterator<Item = Option<u32>>,
    ) -> Self {
        let mut data = spot_data.into_iter();
        let mut spots = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for column in 0..columns {
                let bounds = BoundsRect::new(
                    column as f64 * spot_size.width,
                    row as f64 * spot_size.height,
                    spot_size.width,
                    spot_size.height,
                );
                let index = spots.len();
                let tile_id = data.next().flatten();
                spots.push(TileMapSpot::new(column, row, index, bounds, &tile_set, tile_id));
            }
        }
        Self {
            columns,
            rows,
            spot_size,
            tile_set,
            spots,
        }
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Size of each spot.
    pub fn spot_size(&self) -> Size {
        self.spot_size
    }

    /// The tile set.
    pub fn tile_set(&self) -> &TileSet {
        &self.tile_set
    }

    /// Replaces the tile set and re-resolves every spot.
    pub fn set_tile_set(&mut self, tile_set: TileSet) {
        self.tile_set = tile_set;
        for spot in &mut self.spots {
            spot.set_tile(spot.tile_id(), &self.tile_set);
        }
    }

    /// Changes the tile of one spot. Returns `false` for an unknown index.
    pub fn set_spot_tile(&mut self, index: usize, tile_id: Option<u32>) -> bool {
        match self.spots.get_mut(index) {
            Some(spot) => {
                spot.set_tile(tile_id, &self.tile_set);
                true
            }
            None => false,
        }
    }

    /// Grid cell containing a local position; may lie outside the grid.
    pub fn local_to_grid(&self, p: Point) -> (i64, i64) {
        (
            (p.x / self.spot_size.width).floor() as i64,
            (p.y / self.spot_size.height).floor() as i64,
        )
    }

    /// Spot at a grid cell.
    pub fn spot_by_coord(&self, column: i64, row: i64) -> Option<&TileMapSpot> {
        let column = usize::try_from(column).ok().filter(|c| *c < self.columns)?;
        let row = usize::try_from(row).ok().filter(|r| *r < self.rows)?;
        self.spots.get(column + row * self.columns)
    }

    /// Spot by row-major index.
    pub fn spot_by_index(&self, index: usize) -> Option<&TileMapSpot> {
        self.spots.get(index)
    }

    /// Inclusive column and row ranges covering `area`, or `None` if it
    /// misses the grid.
    pub fn visible_range(&self, area: &BoundsRect) -> Option<((usize, usize), (usize, usize))> {
        if self.columns == 0 || self.rows == 0 {
            return None;
        }
        let overlap = spot_overlap(self.tile_set.tile_size_max(), self.spot_size);
        let (left, top) = self.local_to_grid(Point::new(area.left(), area.top()));
        let (right, bottom) = self.local_to_grid(Point::new(area.right(), area.bottom()));
        let start_x = (left - overlap.left).max(0);
        let start_y = (top - overlap.top).max(0);
        let stop_x = (right + overlap.right).min(self.columns as i64 - 1);
        let stop_y = (bottom + overlap.bottom).min(self.rows as i64 - 1);
        if stop_x < start_x || stop_y < start_y {
            return None;
        }
        Some((
            (start_x as usize, stop_x as usize),
            (start_y as usize, stop_y as usize),
        ))
    }
}

impl Drawable for TileMap {
    fn draw(&self, cx: &mut DrawContext<'_>) -> Result<(), DrawError> {
        if cx.hit_test {
            cx.canvas.begin_path();
            cx.canvas.rect(self.bounds().to_rect());
            return Ok(());
        }
        if !(self.spot_size.width > 0.0 && self.spot_size.height > 0.0) {
            return Err(DrawError::Degenerate);
        }
        let Some(inverse) = Transform::from(cx.canvas.transform()).try_invert() else {
            return Ok(());
        };
        let viewport = BoundsRect::from(Rect::from_origin_size((0.0, 0.0), cx.viewport))
            .transformed(&inverse);
        let Some(((x0, x1), (y0, y1))) = self.visible_range(&viewport) else {
            return Ok(());
        };
        for row in y0..=y1 {
            let first = x0 + row * self.columns;
            for spot in &self.spots[first..=first + (x1 - x0)] {
                spot.draw(cx.canvas)?;
            }
        }
        Ok(())
    }

    fn bounds(&self) -> BoundsRect {
        BoundsRect::new(
            0.0,
            0.0,
            self.columns as f64 * self.spot_size.width,
            self.rows as f64 * self.spot_size.height,
        )
    }
}
