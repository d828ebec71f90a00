//! Core data structures for tilemap_editor
//!
//! This crate provides the plain data model of a layered tile map:
//! - `TileRef` - A `"col_row"` reference into the tileset image
//! - `TileGrid` - Sparse, copy-on-write storage for an unbounded grid
//! - `Layer` - A single paintable plane with display metadata
//! - `TileMap` - Tile size plus an ordered stack of layers
//! - `Bounds` - Occupied area across visible layers
//! - `LayerStore` - The map being edited plus the active-layer pointer
//! - `Tileset` - Slicing geometry of a tileset image
//!
//! It has no I/O and no notion of history; see `tilemap_editor` for that.

mod bounds;
mod grid;
mod layer;
mod store;
mod tile;
mod tilemap;
mod tileset;

pub use bounds::{compute_bounds, Bounds};
pub use grid::{GridPos, TileGrid, CHUNK_SIZE};
pub use layer::{Layer, LayerId};
pub use store::LayerStore;
pub use tile::{TileRef, TileRefError};
pub use tilemap::{MapStats, TileMap, DEFAULT_TILE_SIZE};
pub use tileset::{PixelRect, TileSelection, Tileset};
