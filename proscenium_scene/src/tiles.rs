// Copyright 2026 the Proscenium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tile sets and tile map spots.
//!
//! A [`TileSet`] maps global tile ids (gids) to sub-rectangles of host images.
//! Sets are filled from tile sheets, which are sliced on a regular grid, or
//! from tile atlases, which list every rectangle explicitly. The layout of
//! the configuration follows the Tiled tileset format: ids start at
//! `first_gid` and advance left to right, then top to bottom.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;
use kurbo::{Point, Rect, Size};
use hashbrown::HashMap;
use proscenium_geom::BoundsRect;
use proscenium_render::{Canvas, ImageHandle, RenderError};

/// Free-form string properties attached to sheets and tiles.
pub type Properties = HashMap<String, String>;

/// Property key that registers a tile under a name.
pub const NAME_PROPERTY: &str = "name";

/// One tile: an image sub-rectangle plus custom properties.
#[derive(Clone, Debug, PartialEq)]
pub struct TileInfo {
    /// Source image.
    pub image: ImageHandle,
    /// Sub-rectangle of the image in pixels.
    pub source: Rect,
    sheet_properties: Option<Rc<Properties>>,
    tile_properties: Option<Rc<Properties>>,
}

impl TileInfo {
    /// A tile without custom properties.
    pub fn new(image: ImageHandle, source: Rect) -> Self {
        Self {
            image,
            source,
            sheet_properties: None,
            tile_properties: None,
        }
    }

    /// Tile width.
    pub fn width(&self) -> f64 {
        self.source.width()
    }

    /// Tile height.
    pub fn height(&self) -> f64 {
        self.source.height()
    }

    /// Looks up a custom property, preferring the tile's own over the sheet's.
    pub fn custom_property(&self, key: &str) -> Option<&str> {
        self.tile_properties
            .as_deref()
            .and_then(|p| p.get(key))
            .or_else(|| self.sheet_properties.as_deref().and_then(|p| p.get(key)))
            .map(String::as_str)
    }
}

/// A regular grid of tiles cut from one image.
#[derive(Clone, Debug, Default)]
pub struct TileSheetConfig {
    /// Sheet image.
    pub image: Option<ImageHandle>,
    /// Image size in pixels.
    pub image_size: Size,
    /// Size of each tile.
    pub tile_size: Size,
    /// Gid of the first tile.
    pub first_gid: u32,
    /// Upper limit on the number of tiles taken from the grid.
    pub tiles_num: Option<usize>,
    /// Properties shared by every tile of the sheet.
    pub properties: Option<Properties>,
    /// Per-tile properties keyed by tile index within the sheet.
    pub tile_properties: HashMap<usize, Properties>,
}

/// One rectangle of a tile atlas.
#[derive(Clone, Debug, PartialEq)]
pub struct TileSpec {
    /// Lookup name.
    pub name: Option<String>,
    /// Sub-rectangle of the atlas image.
    pub rect: Rect,
}

/// Explicitly listed tiles from one image.
#[derive(Clone, Debug, Default)]
pub struct TileAtlasConfig {
    /// Atlas image.
    pub image: Option<ImageHandle>,
    /// Gid of the first tile.
    pub first_gid: u32,
    /// Tile rectangles in gid order.
    pub specs: Vec<TileSpec>,
    /// Properties shared by every tile of the atlas.
    pub properties: Option<Properties>,
    /// Per-tile properties keyed by index into `specs`.
    pub tile_properties: HashMap<usize, Properties>,
}

/// Gid-indexed collection of tiles.
#[derive(Clone, Debug, Default)]
pub struct TileSet {
    images: Vec<ImageHandle>,
    tiles: HashMap<u32, TileInfo>,
    names: HashMap<String, u32>,
    tile_size_max: Size,
}

impl TileSet {
    /// An empty tile set.
    pub fn new() -> Self {
        Self::default()
    }

    fn grow_max(&mut self, size: Size) {
        self.tile_size_max.width = self.tile_size_max.width.max(size.width);
        self.tile_size_max.height = self.tile_size_max.height.max(size.height);
    }

    fn insert(&mut self, gid: u32, info: TileInfo) {
        if let Some(name) = info.tile_properties.as_deref().and_then(|p| p.get(NAME_PROPERTY)) {
            self.names.insert(name.clone(), gid);
        }
        self.tiles.insert(gid, info);
    }

    /// Slices a tile sheet and adds its tiles. Returns the number added.
    ///
    /// Partial tiles at the right and bottom edges are ignored. A sheet
    /// without an image or with an empty tile size adds nothing.
    pub fn add_tile_sheet(&mut self, config: TileSheetConfig) -> usize {
        let Some(image) = config.image else {
            return 0;
        };
        let tile = config.tile_size;
        if !(tile.width > 0.0 && tile.height > 0.0) {
            return 0;
        }
        self.images.push(image);
        self.grow_max(tile);

        let per_row = (config.image_size.width / tile.width).floor().max(0.0) as usize;
        let per_col = (config.image_size.height / tile.height).floor().max(0.0) as usize;
        let mut count = per_row * per_col;
        if let Some(limit) = config.tiles_num {
            count = count.min(limit);
        }

        let sheet = config.properties.map(Rc::new);
        let mut tile_properties = config.tile_properties;
        for index in 0..count {
            let (col, row) = (index % per_row, index / per_row);
            let origin = Point::new(col as f64 * tile.width, row as f64 * tile.height);
            let info = TileInfo {
                image,
                source: Rect::from_origin_size(origin, tile),
                sheet_properties: sheet.clone(),
                tile_properties: tile_properties.remove(&index).map(Rc::new),
            };
            self.insert(config.first_gid + index as u32, info);
        }
        count
    }

    /// Adds the tiles of an atlas. Returns the number added.
    pub fn add_tile_atlas(&mut self, config: TileAtlasConfig) -> usize {
        let Some(image) = config.image else {
            return 0;
        };
        self.images.push(image);

        let sheet = config.properties.map(Rc::new);
        let mut tile_properties = config.tile_properties;
        let count = config.specs.len();
        for (index, spec) in config.specs.into_iter().enumerate() {
            self.grow_max(spec.rect.size());
            let gid = config.first_gid + index as u32;
            let info = TileInfo {
                image,
                source: spec.rect,
                sheet_properties: sheet.clone(),
                tile_properties: tile_properties.remove(&index).map(Rc::new),
            };
            self.insert(gid, info);
            if let Some(name) = spec.name {
                self.names.insert(name, gid);
            }
        }
        count
    }

    /// Tile by gid.
    pub fn tile(&self, gid: u32) -> Option<&TileInfo> {
        self.tiles.get(&gid)
    }

    /// Tile by registered name.
    pub fn tile_by_name(&self, name: &str) -> Option<&TileInfo> {
        self.names.get(name).and_then(|gid| self.tiles.get(gid))
    }

    /// Images referenced by the set, in insertion order.
    pub fn images(&self) -> &[ImageHandle] {
        &self.images
    }

    /// Largest tile width and height seen so far.
    pub fn tile_size_max(&self) -> Size {
        self.tile_size_max
    }

    /// Number of tiles.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the set has no tiles.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

/// How many extra spots to draw around the viewport, per side.
///
/// Tiles larger than their spot are drawn bottom-centred, so they can poke
/// into neighbouring spots to the left, the right and above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpotOverlap {
    /// Extra columns on the left.
    pub left: i64,
    /// Extra rows on top.
    pub top: i64,
    /// Extra columns on the right.
    pub right: i64,
    /// Extra rows below.
    pub bottom: i64,
}

/// Overlap for tiles of size `tile` placed in spots of size `spot`.
pub fn spot_overlap(tile: Size, spot: Size) -> SpotOverlap {
    let horizontal = ((tile.width - spot.width) * 0.5).max(0.0) / spot.width;
    let top = (tile.height - spot.height).max(0.0) / spot.height;
    let horizontal = horizontal.ceil() as i64;
    SpotOverlap {
        left: horizontal,
        top: top.ceil() as i64,
        right: horizontal,
        bottom: 0,
    }
}

/// One cell of a tile map.
#[derive(Clone, Debug, PartialEq)]
pub struct TileMapSpot {
    column: usize,
    row: usize,
    index: usize,
    map_bounds: BoundsRect,
    tile_id: Option<u32>,
    tile: Option<TileInfo>,
}

impl TileMapSpot {
    /// A spot showing `tile_id` from `tile_set`.
    pub fn new(
        column: usize,
        row: usize,
        index: usize,
        map_bounds: BoundsRect,
        tile_set: &TileSet,
        tile_id: Option<u32>,
    ) -> Self {
        let mut spot = Self {
            column,
            row,
            index,
            map_bounds,
            tile_id: None,
            tile: None,
        };
        spot.set_tile(tile_id, tile_set);
        spot
    }

    /// Changes the tile. An unknown id leaves the spot empty.
    pub fn set_tile(&mut self, tile_id: Option<u32>, tile_set: &TileSet) {
        self.tile_id = tile_id;
        self.tile = tile_id.and_then(|gid| tile_set.tile(gid)).cloned();
    }

    /// Grid column and row.
    pub fn grid_coords(&self) -> (usize, usize) {
        (self.column, self.row)
    }

    /// Row-major index in the map.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The spot rectangle in map space.
    pub fn bounds(&self) -> BoundsRect {
        self.map_bounds
    }

    /// Tile id, if any.
    pub fn tile_id(&self) -> Option<u32> {
        self.tile_id
    }

    /// Resolved tile, if any.
    pub fn tile(&self) -> Option<&TileInfo> {
        self.tile.as_ref()
    }

    /// Where the tile's top-left corner goes: centred horizontally on the
    /// spot, with its bottom edge on the spot's bottom edge.
    pub fn draw_position(&self) -> Option<Point> {
        let tile = self.tile.as_ref()?;
        let mb = &self.map_bounds;
        Some(Point::new(
            mb.x + (tile.width() - mb.width) * -0.5,
            mb.y - (tile.height() - mb.height),
        ))
    }

    /// Draws the tile image. Empty spots draw nothing.
    pub fn draw(&self, canvas: &mut dyn Canvas) -> Result<(), RenderError> {
        let (Some(tile), Some(pos)) = (&self.tile, self.draw_position()) else {
            return Ok(());
        };
        let dst = Rect::from_origin_size(pos, tile.source.size());
        canvas.draw_image(&tile.image, Some(tile.source), dst)
    }
}
