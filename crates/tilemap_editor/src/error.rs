//! Editor error types

use thiserror::Error;
use tilemap_core::TileRefError;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid map file: expected an object with a 'layers' array")]
    MissingLayers,

    #[error("Invalid map file: {0}")]
    Format(String),

    #[error("Invalid tile reference: {0}")]
    InvalidTileRef(#[from] TileRefError),

    #[error("Another import is already in progress")]
    ImportInProgress,

    #[error("Import ticket does not match the pending import")]
    StaleImport,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}
