//! Paintable tile layers

use crate::{GridPos, TileGrid, TileRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a layer. Never reused once a layer is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    /// Allocate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single plane of tile references
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    /// Display opacity in `[0, 1]`
    pub opacity: f32,
    /// Marks the layer as collision geometry on export
    pub is_collision: bool,
    pub tiles: TileGrid,
}

impl Layer {
    /// Create a new, empty, visible layer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LayerId::new(),
            name: name.into(),
            visible: true,
            opacity: 1.0,
            is_collision: false,
            tiles: TileGrid::new(),
        }
    }

    /// Copy this layer under a fresh id and a derived name
    pub fn duplicate(&self) -> Self {
        Self {
            id: LayerId::new(),
            name: format!("{} Copy", self.name),
            ..self.clone()
        }
    }

    pub fn tile(&self, pos: GridPos) -> Option<TileRef> {
        self.tiles.get(pos)
    }

    /// Number of occupied cells
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Set opacity, clamped into `[0, 1]`
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }
}
