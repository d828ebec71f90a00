//! Sparse, unbounded tile storage
//!
//! Cells live in fixed-size chunks keyed by chunk coordinate. Chunks are held
//! behind `Arc` and written through `Arc::make_mut`, so cloning a grid is
//! O(chunks) and a later edit only copies the chunk it touches. History
//! snapshots rely on this.

use crate::TileRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Edge length of a storage chunk, in tiles
pub const CHUNK_SIZE: i32 = 16;
const CHUNK_AREA: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// A position on the tile grid. Either axis may be negative.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ChunkCoord {
    cx: i32,
    cy: i32,
}

impl ChunkCoord {
    /// Split a grid position into its chunk and the cell index inside it
    fn locate(pos: GridPos) -> (Self, usize) {
        let coord = Self {
            cx: pos.x.div_euclid(CHUNK_SIZE),
            cy: pos.y.div_euclid(CHUNK_SIZE),
        };
        let lx = pos.x.rem_euclid(CHUNK_SIZE);
        let ly = pos.y.rem_euclid(CHUNK_SIZE);
        (coord, (ly * CHUNK_SIZE + lx) as usize)
    }

    fn position(&self, index: usize) -> GridPos {
        let index = index as i32;
        GridPos {
            x: self.cx * CHUNK_SIZE + index % CHUNK_SIZE,
            y: self.cy * CHUNK_SIZE + index / CHUNK_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Chunk {
    cells: [Option<TileRef>; CHUNK_AREA],
    occupied: usize,
}

impl Chunk {
    fn empty() -> Self {
        Self {
            cells: [None; CHUNK_AREA],
            occupied: 0,
        }
    }
}

/// Sparse map from grid positions to tile references
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileGrid {
    chunks: HashMap<ChunkCoord, Arc<Chunk>>,
    len: usize,
}

impl TileGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of occupied cells
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the tile at a position, if any
    pub fn get(&self, pos: GridPos) -> Option<TileRef> {
        let (coord, index) = ChunkCoord::locate(pos);
        self.chunks.get(&coord).and_then(|chunk| chunk.cells[index])
    }

    /// Write a tile, returning the previous occupant.
    ///
    /// Writing the tile already stored leaves shared chunks untouched.
    pub fn set(&mut self, pos: GridPos, tile: TileRef) -> Option<TileRef> {
        let (coord, index) = ChunkCoord::locate(pos);
        let chunk = self
            .chunks
            .entry(coord)
            .or_insert_with(|| Arc::new(Chunk::empty()));
        let previous = chunk.cells[index];
        if previous == Some(tile) {
            return previous;
        }

        let chunk = Arc::make_mut(chunk);
        chunk.cells[index] = Some(tile);
        if previous.is_none() {
            chunk.occupied += 1;
            self.len += 1;
        }
        previous
    }

    /// Clear a cell, returning what it held
    pub fn remove(&mut self, pos: GridPos) -> Option<TileRef> {
        let (coord, index) = ChunkCoord::locate(pos);
        let chunk = self.chunks.get_mut(&coord)?;
        chunk.cells[index]?;

        let chunk = Arc::make_mut(chunk);
        let previous = chunk.cells[index].take();
        chunk.occupied -= 1;
        self.len -= 1;
        if chunk.occupied == 0 {
            self.chunks.remove(&coord);
        }
        previous
    }

    /// Iterate over occupied cells in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, TileRef)> + '_ {
        self.chunks.iter().flat_map(|(coord, chunk)| {
            chunk
                .cells
                .iter()
                .enumerate()
                .filter_map(move |(index, cell)| cell.map(|tile| (coord.position(index), tile)))
        })
    }

    /// Occupied cells in row-major order (y, then x)
    pub fn sorted(&self) -> Vec<(GridPos, TileRef)> {
        let mut cells: Vec<_> = self.iter().collect();
        cells.sort_unstable_by_key(|(pos, _)| (pos.y, pos.x));
        cells
    }

    /// Number of chunks whose storage is shared with `other`
    pub fn shared_chunks(&self, other: &TileGrid) -> usize {
        self.chunks
            .iter()
            .filter(|(coord, chunk)| {
                other
                    .chunks
                    .get(coord)
                    .is_some_and(|theirs| Arc::ptr_eq(chunk, theirs))
            })
            .count()
    }
}

impl FromIterator<(GridPos, TileRef)> for TileGrid {
    fn from_iter<I: IntoIterator<Item = (GridPos, TileRef)>>(iter: I) -> Self {
        let mut grid = Self::new();
        for (pos, tile) in iter {
            grid.set(pos, tile);
        }
        grid
    }
}
