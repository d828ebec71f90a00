//! Occupied-area bounds over sparse layers

use crate::{GridPos, Layer};
use serde::{Deserialize, Serialize};

/// Inclusive bounding rectangle in tile-grid coordinates.
///
/// `width` and `height` are `u64` so a rectangle spanning the whole `i32`
/// grid is still exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    pub width: u64,
    pub height: u64,
}

impl Bounds {
    /// Sentinel returned when no tile is present. Indistinguishable from a
    /// single tile at the origin without checking for tiles directly.
    pub const EMPTY: Bounds = Bounds {
        min_x: 0,
        min_y: 0,
        max_x: 0,
        max_y: 0,
        width: 1,
        height: 1,
    };

    fn from_extremes(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
            width: span(min_x, max_x),
            height: span(min_y, max_y),
        }
    }

    /// Bounds of an arbitrary set of positions, or [`Bounds::EMPTY`]
    pub fn from_positions(positions: impl IntoIterator<Item = GridPos>) -> Self {
        let mut extremes: Option<(i32, i32, i32, i32)> = None;
        for pos in positions {
            extremes = Some(match extremes {
                None => (pos.x, pos.y, pos.x, pos.y),
                Some((min_x, min_y, max_x, max_y)) => (
                    min_x.min(pos.x),
                    min_y.min(pos.y),
                    max_x.max(pos.x),
                    max_y.max(pos.y),
                ),
            });
        }
        match extremes {
            Some((min_x, min_y, max_x, max_y)) => Self::from_extremes(min_x, min_y, max_x, max_y),
            None => Self::EMPTY,
        }
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.x >= self.min_x && pos.x <= self.max_x && pos.y >= self.min_y && pos.y <= self.max_y
    }

    /// Offset of a grid position from this rectangle's top-left corner.
    ///
    /// Computed in `i64`: positions outside the rectangle may lie further
    /// away than an `i32` can express.
    pub fn offset(&self, pos: GridPos) -> (i64, i64) {
        (
            i64::from(pos.x) - i64::from(self.min_x),
            i64::from(pos.y) - i64::from(self.min_y),
        )
    }
}

fn span(min: i32, max: i32) -> u64 {
    (i64::from(max) - i64::from(min)).unsigned_abs() + 1
}

impl Default for Bounds {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Bounds of every tile on the visible layers. Hidden layers contribute nothing.
pub fn compute_bounds<'a>(layers: impl IntoIterator<Item = &'a Layer>) -> Bounds {
    Bounds::from_positions(
        layers
            .into_iter()
            .filter(|layer| layer.visible)
            .flat_map(|layer| layer.tiles.iter().map(|(pos, _)| pos)),
    )
}
