//! Tileset slicing geometry
//!
//! A tileset is an image cut into square cells of `tile_size` pixels. Only
//! whole cells are sliced; a partial strip on the right or bottom edge is
//! ignored.

use crate::TileRef;
use serde::{Deserialize, Serialize};

/// Source rectangle of a tile inside the tileset image, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Dimensions of a loaded tileset image and the size it is sliced at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tileset {
    pub image_width: u32,
    pub image_height: u32,
    pub tile_size: u32,
}

impl Tileset {
    pub fn new(image_width: u32, image_height: u32, tile_size: u32) -> Self {
        Self {
            image_width,
            image_height,
            tile_size,
        }
    }

    pub fn columns(&self) -> u32 {
        self.image_width.checked_div(self.tile_size).unwrap_or(0)
    }

    pub fn rows(&self) -> u32 {
        self.image_height.checked_div(self.tile_size).unwrap_or(0)
    }

    pub fn tile_count(&self) -> u64 {
        u64::from(self.columns()) * u64::from(self.rows())
    }

    pub fn contains(&self, tile: TileRef) -> bool {
        tile.col < self.columns() && tile.row < self.rows()
    }

    /// All sliced cells, row by row
    pub fn tile_refs(&self) -> impl Iterator<Item = TileRef> {
        let columns = self.columns();
        (0..self.rows()).flat_map(move |row| (0..columns).map(move |col| TileRef::new(col, row)))
    }

    /// Where a tile is cut from, or `None` if it lies outside the image
    pub fn source_rect(&self, tile: TileRef) -> Option<PixelRect> {
        if !self.contains(tile) {
            return None;
        }
        Some(PixelRect {
            x: tile.col * self.tile_size,
            y: tile.row * self.tile_size,
            width: self.tile_size,
            height: self.tile_size,
        })
    }

    /// Select the rectangle of cells spanned by two palette corners.
    ///
    /// Corners may be given in any order. Cells outside the tileset are kept;
    /// the palette never produces them and painting them is harmless.
    pub fn select_area(&self, a: TileRef, b: TileRef) -> TileSelection {
        let (min_col, max_col) = (a.col.min(b.col), a.col.max(b.col));
        let (min_row, max_row) = (a.row.min(b.row), a.row.max(b.row));
        let tiles = (min_row..=max_row)
            .flat_map(|row| (min_col..=max_col).map(move |col| TileRef::new(col, row)))
            .collect();
        TileSelection {
            tiles,
            width: max_col - min_col + 1,
            height: max_row - min_row + 1,
        }
    }
}

/// A rectangular block of tiles picked from the palette, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSelection {
    pub tiles: Vec<TileRef>,
    pub width: u32,
    pub height: u32,
}

impl TileSelection {
    pub fn single(tile: TileRef) -> Self {
        Self {
            tiles: vec![tile],
            width: 1,
            height: 1,
        }
    }

    /// Offset of each tile relative to the selection's top-left corner
    pub fn offsets(&self) -> impl Iterator<Item = (u32, u32, TileRef)> + '_ {
        let width = self.width.max(1);
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (i as u32 % width, i as u32 / width, *tile))
    }
}
