//! `map.json` / `tiles.json` documents and the exporter
//!
//! Exported tile coordinates are relative to the bounds of the visible
//! layers, so a map always starts near `(0, 0)` wherever it was painted.
//! Layers are written base first, the reverse of the in-memory stack.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tilemap_core::{TileMap, TileRef, Tileset};

/// Contents of `map.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDocument {
    pub tile_size: u32,
    pub map_width: u64,
    pub map_height: u64,
    pub layers: Vec<LayerDocument>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDocument {
    pub name: String,
    pub collider: bool,
    pub tiles: Vec<PlacedTile>,
}

/// A tile placed at bounds-relative grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub id: TileRef,
    pub x: i64,
    pub y: i64,
}

/// Contents of `tiles.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TilesDocument {
    pub tile_size: u32,
    pub spritesheet: String,
    pub tiles: Vec<TileDefinition>,
}

/// A tileset cell and its pixel origin in the spritesheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileDefinition {
    pub id: String,
    pub x: u64,
    pub y: u64,
    /// Always `false`; collision is tracked per layer
    pub collision: bool,
}

impl TileDefinition {
    fn new(tile: TileRef, tile_size: u32) -> Self {
        let (x, y) = tile.pixel_origin(tile_size);
        Self {
            id: tile.to_string(),
            x,
            y,
            collision: false,
        }
    }
}

impl TilesDocument {
    /// Describe the given tiles, sorted by their textual id
    pub fn from_tiles(
        tiles: impl IntoIterator<Item = TileRef>,
        tile_size: u32,
        spritesheet: impl Into<String>,
    ) -> Self {
        // Keyed by the string form: "10_0" sorts before "2_0"
        let unique: BTreeMap<String, TileRef> = tiles
            .into_iter()
            .map(|tile| (tile.to_string(), tile))
            .collect();
        Self {
            tile_size,
            spritesheet: spritesheet.into(),
            tiles: unique
                .into_values()
                .map(|tile| TileDefinition::new(tile, tile_size))
                .collect(),
        }
    }

    /// Manifest covering every cell of a sliced tileset
    pub fn from_tileset(tileset: &Tileset, spritesheet: impl Into<String>) -> Self {
        Self::from_tiles(tileset.tile_refs(), tileset.tile_size, spritesheet)
    }
}

/// The pair of documents produced by an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapExport {
    pub map: MapDocument,
    pub tiles: TilesDocument,
}

/// Serialize a map.
///
/// Bounds come from visible layers only, but every layer's tiles are written.
/// Tiles of a hidden layer lying outside those bounds get coordinates outside
/// `0..mapWidth` / `0..mapHeight`, possibly negative.
pub fn export_map(map: &TileMap, tile_size: u32, spritesheet: &str) -> MapExport {
    let bounds = map.bounds();

    let layers = map
        .layers
        .iter()
        .rev()
        .map(|layer| LayerDocument {
            name: layer.name.clone(),
            collider: layer.is_collision,
            tiles: layer
                .tiles
                .sorted()
                .into_iter()
                .map(|(pos, id)| {
                    let (x, y) = bounds.offset(pos);
                    PlacedTile { id, x, y }
                })
                .collect(),
        })
        .collect();

    let used = map
        .layers
        .iter()
        .flat_map(|layer| layer.tiles.iter().map(|(_, tile)| tile));

    MapExport {
        map: MapDocument {
            tile_size,
            map_width: bounds.width,
            map_height: bounds.height,
            layers,
        },
        tiles: TilesDocument::from_tiles(used, tile_size, spritesheet),
    }
}
