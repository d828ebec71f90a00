//! Tile references into a tileset image
//!
//! A tile reference names one cell of the sliced tileset by column and row.
//! Its textual form is `"col_row"`, e.g. `"3_7"`, which is also how it is
//! written to `map.json` and `tiles.json`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing a `"col_row"` tile reference
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileRefError {
    #[error("tile reference '{0}' is missing the '_' separator")]
    MissingSeparator(String),
    #[error("tile reference '{0}' must have exactly one column and one row")]
    WrongPartCount(String),
    #[error("tile reference '{0}' has a non-numeric or out-of-range part")]
    InvalidNumber(String),
}

/// A reference to a single cell of the tileset (column, row)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileRef {
    pub col: u32,
    pub row: u32,
}

impl TileRef {
    /// Create a reference to the cell at `col`, `row`
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// Pixel offset of this cell inside a tileset sliced with `tile_size`
    pub fn pixel_origin(&self, tile_size: u32) -> (u64, u64) {
        (
            u64::from(self.col) * u64::from(tile_size),
            u64::from(self.row) * u64::from(tile_size),
        )
    }
}

fn parse_part(part: &str, whole: &str) -> Result<u32, TileRefError> {
    // u32::from_str accepts a leading '+', which is not part of the format
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TileRefError::InvalidNumber(whole.to_string()));
    }
    part.parse()
        .map_err(|_| TileRefError::InvalidNumber(whole.to_string()))
}

impl FromStr for TileRef {
    type Err = TileRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (col, row) = s
            .split_once('_')
            .ok_or_else(|| TileRefError::MissingSeparator(s.to_string()))?;
        if row.contains('_') {
            return Err(TileRefError::WrongPartCount(s.to_string()));
        }
        Ok(Self {
            col: parse_part(col, s)?,
            row: parse_part(row, s)?,
        })
    }
}

impl fmt::Display for TileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.col, self.row)
    }
}

impl Serialize for TileRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TileRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
