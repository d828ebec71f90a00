//! The tile map aggregate: tile size plus an ordered stack of layers

use crate::{compute_bounds, Bounds, Layer, LayerId};
use serde::{Deserialize, Serialize};

/// Default pixel edge length of a tile
pub const DEFAULT_TILE_SIZE: u32 = 32;

/// A tile map. Layer index 0 is drawn frontmost.
///
/// `width` and `height` are informational; the authoritative extent is
/// always recomputed from occupied cells via [`TileMap::bounds`].
#[derive(Debug, Clone, PartialEq)]
pub struct TileMap {
    pub tile_size: u32,
    pub width: u64,
    pub height: u64,
    pub layers: Vec<Layer>,
}

/// Summary counts for status displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapStats {
    /// Occupied cells across visible layers
    pub total_tiles: usize,
    pub total_layers: usize,
    pub visible_layers: usize,
    pub bounds: Bounds,
}

impl TileMap {
    /// Create a map with no layers
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            width: Bounds::EMPTY.width,
            height: Bounds::EMPTY.height,
            layers: Vec::new(),
        }
    }

    /// Create a map holding a single empty layer
    pub fn with_default_layer(tile_size: u32, layer_name: impl Into<String>) -> Self {
        let mut map = Self::new(tile_size);
        map.layers.push(Layer::new(layer_name));
        map
    }

    /// Get the index of a layer by ID
    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    /// Get layer by ID
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// Get mutable layer by ID
    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    /// Bounds across visible layers
    pub fn bounds(&self) -> Bounds {
        compute_bounds(&self.layers)
    }

    /// True when no layer, visible or not, holds a tile
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.tiles.is_empty())
    }

    pub fn stats(&self) -> MapStats {
        let visible = self.layers.iter().filter(|layer| layer.visible);
        MapStats {
            total_tiles: visible.clone().map(Layer::tile_count).sum(),
            total_layers: self.layers.len(),
            visible_layers: visible.count(),
            bounds: self.bounds(),
        }
    }
}

impl Default for TileMap {
    fn default() -> Self {
        Self::with_default_layer(DEFAULT_TILE_SIZE, "Layer 1")
    }
}
