//! Reading and writing the export documents on disk

use crate::{EditorError, ImportSources, MapExport};
use std::path::{Path, PathBuf};

pub const MAP_FILE: &str = "map.json";
pub const TILES_FILE: &str = "tiles.json";

fn ensure_json(path: &Path) -> Result<(), EditorError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(()),
        other => Err(EditorError::UnsupportedFormat(
            other.unwrap_or_default().to_string(),
        )),
    }
}

/// Write `map.json` and `tiles.json` into `dir`, creating it if needed.
///
/// Returns the paths written, map first.
pub fn write_export(dir: &Path, export: &MapExport) -> Result<(PathBuf, PathBuf), EditorError> {
    std::fs::create_dir_all(dir)?;

    let map_path = dir.join(MAP_FILE);
    std::fs::write(&map_path, serde_json::to_string_pretty(&export.map)?)?;

    let tiles_path = dir.join(TILES_FILE);
    std::fs::write(&tiles_path, serde_json::to_string_pretty(&export.tiles)?)?;

    tracing::info!("Wrote {:?} and {:?}", map_path, tiles_path);
    Ok((map_path, tiles_path))
}

/// Load import documents from disk. Only `.json` files are accepted.
pub fn read_import_sources(
    map_path: &Path,
    tiles_path: Option<&Path>,
) -> Result<ImportSources, EditorError> {
    ensure_json(map_path)?;
    let mut sources = ImportSources::new(std::fs::read_to_string(map_path)?);
    if let Some(tiles_path) = tiles_path {
        ensure_json(tiles_path)?;
        sources = sources.with_tiles(std::fs::read_to_string(tiles_path)?);
    }
    Ok(sources)
}
