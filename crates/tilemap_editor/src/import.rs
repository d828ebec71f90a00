//! Map import
//!
//! Builds a complete replacement [`TileMap`] from `map.json` (and optionally
//! validates `tiles.json`) without touching the live editor state. The editor
//! commits the result only once it is fully built.

use crate::{EditorError, TileDefinition, TilesDocument};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tilemap_core::{Bounds, GridPos, Layer, LayerId, TileGrid, TileMap, TileRef};

const EXTENT_ERROR: &str = "map extent exceeds the coordinate range";

/// Raw document text handed to the importer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSources {
    pub map_json: String,
    /// Advisory tileset manifest; validated but not used for placement
    pub tiles_json: Option<String>,
}

impl ImportSources {
    pub fn new(map_json: impl Into<String>) -> Self {
        Self {
            map_json: map_json.into(),
            tiles_json: None,
        }
    }

    pub fn with_tiles(mut self, tiles_json: impl Into<String>) -> Self {
        self.tiles_json = Some(tiles_json.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMap {
    #[serde(default)]
    tile_size: Option<u32>,
    layers: Vec<RawLayer>,
}

#[derive(Deserialize)]
struct RawLayer {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    collider: Value,
    #[serde(default)]
    tiles: Vec<RawTile>,
}

#[derive(Deserialize)]
struct RawTile {
    id: String,
    x: i64,
    y: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTiles {
    #[serde(default)]
    tile_size: Option<u32>,
    #[serde(default)]
    spritesheet: String,
    #[serde(default)]
    tiles: Vec<RawTileDefinition>,
}

#[derive(Deserialize)]
struct RawTileDefinition {
    id: String,
    #[serde(default)]
    x: u64,
    #[serde(default)]
    y: u64,
    #[serde(default)]
    collision: bool,
}

/// A fully built replacement state
#[derive(Debug, Clone)]
pub(crate) struct ImportedMap {
    pub map: TileMap,
    pub active: Option<LayerId>,
    pub tileset: Option<TilesDocument>,
}

/// JavaScript-style truthiness, which is how older files encoded `collider`
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Deserialize an already parsed document, reporting shape mismatches as format errors
fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, EditorError> {
    serde_json::from_value(value).map_err(|e| EditorError::Format(e.to_string()))
}

fn parse_tiles_document(text: &str, default_tile_size: u32) -> Result<TilesDocument, EditorError> {
    let raw: RawTiles = from_value(serde_json::from_str(text)?)?;
    let tiles = raw
        .tiles
        .into_iter()
        .map(|def| {
            let tile: TileRef = def.id.parse()?;
            Ok(TileDefinition {
                id: tile.to_string(),
                x: def.x,
                y: def.y,
                collision: def.collision,
            })
        })
        .collect::<Result<Vec<_>, EditorError>>()?;
    Ok(TilesDocument {
        tile_size: raw.tile_size.unwrap_or(default_tile_size),
        spritesheet: raw.spritesheet,
        tiles,
    })
}

/// Parse and lay out an import.
///
/// Layers share one frame: every tile is shifted by the minimum over all
/// layers, so document coordinates may lie anywhere as long as the shifted
/// extent fits the grid. Document order is base first, so layers are
/// reversed back into front-first stacking; the active layer is the first
/// one in the document. Unnamed layers are called `"{prefix} {n}"`.
pub(crate) fn build_import(
    sources: &ImportSources,
    default_tile_size: u32,
    layer_name_prefix: &str,
) -> Result<ImportedMap, EditorError> {
    let root: Value = serde_json::from_str(&sources.map_json)?;
    if !root.get("layers").is_some_and(Value::is_array) {
        return Err(EditorError::MissingLayers);
    }
    let raw: RawMap = from_value(root)?;
    if raw.layers.is_empty() {
        return Err(EditorError::Format("map contains no layers".to_string()));
    }

    let tileset = sources
        .tiles_json
        .as_deref()
        .map(|text| parse_tiles_document(text, default_tile_size))
        .transpose()?;

    let mut parsed = Vec::with_capacity(raw.layers.len());
    for (index, layer) in raw.layers.into_iter().enumerate() {
        let tiles = layer
            .tiles
            .into_iter()
            .map(|t| Ok(((t.x, t.y), t.id.parse::<TileRef>()?)))
            .collect::<Result<Vec<_>, EditorError>>()?;
        let name = layer
            .name
            .unwrap_or_else(|| format!("{} {}", layer_name_prefix, index + 1));
        parsed.push((name, truthy(&layer.collider), tiles));
    }

    let all = || parsed.iter().flat_map(|(_, _, tiles)| tiles.iter().map(|(pos, _)| *pos));
    let min_x = all().map(|(x, _)| x).min().unwrap_or(0);
    let min_y = all().map(|(_, y)| y).min().unwrap_or(0);
    let shift = |(x, y): (i64, i64)| -> Result<GridPos, EditorError> {
        let fit = |v: i64, min: i64| v.checked_sub(min).and_then(|d| i32::try_from(d).ok());
        match (fit(x, min_x), fit(y, min_y)) {
            (Some(x), Some(y)) => Ok(GridPos::new(x, y)),
            _ => Err(EditorError::Format(EXTENT_ERROR.to_string())),
        }
    };

    let mut layers = Vec::with_capacity(parsed.len());
    for (name, is_collision, tiles) in &parsed {
        let mut layer = Layer::new(name.clone());
        layer.is_collision = *is_collision;
        layer.tiles = tiles
            .iter()
            .map(|&(pos, tile)| Ok((shift(pos)?, tile)))
            .collect::<Result<TileGrid, EditorError>>()?;
        layers.push(layer);
    }
    let bounds = Bounds::from_positions(
        layers
            .iter()
            .flat_map(|layer| layer.tiles.iter().map(|(pos, _)| pos)),
    );
    let active = layers.first().map(|layer| layer.id);
    layers.reverse();

    Ok(ImportedMap {
        map: TileMap {
            tile_size: raw.tile_size.unwrap_or(default_tile_size),
            width: bounds.width,
            height: bounds.height,
            layers,
        },
        active,
        tileset,
    })
}
