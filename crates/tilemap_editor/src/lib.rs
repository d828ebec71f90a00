//! tilemap_editor - Editing engine for layered tile maps
//!
//! This crate provides the state engine behind a tile-map editor:
//! - Tile painting and erasing on an unbounded grid
//! - Layer management (add, delete, duplicate, reorder, rename, visibility, collision)
//! - Undo/redo with grouped paint strokes
//! - Export to `map.json` / `tiles.json` with bounds-relative coordinates
//! - Atomic import of previously exported maps
//!
//! Rendering, palettes and input handling are left to the caller.
//!
//! # Usage
//!
//! ```rust
//! use tilemap_editor::{TileRef, TilemapEditor};
//!
//! let mut editor = TilemapEditor::default();
//! editor.place_tile((5, 5), TileRef::new(2, 3));
//! editor.place_tile((6, 5), TileRef::new(2, 3));
//!
//! let export = editor.export_map(32);
//! assert_eq!(export.map.map_width, 2);
//!
//! editor.undo();
//! assert_eq!(editor.active_layer().unwrap().tile_count(), 1);
//! ```

pub mod config;
mod editor;
mod error;
pub mod export;
pub mod history;
pub mod import;
pub mod io;

pub use config::{ConfigError, EditorConfig};
pub use editor::{ImportTicket, TilemapEditor};
pub use error::EditorError;
pub use export::{
    export_map, LayerDocument, MapDocument, MapExport, PlacedTile, TileDefinition, TilesDocument,
};
pub use import::ImportSources;

// Re-export the data model
pub use tilemap_core;
pub use tilemap_core::{
    Bounds, GridPos, Layer, LayerId, MapStats, TileMap, TileRef, TileSelection, Tileset,
};
