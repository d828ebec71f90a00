//! Command-line front end for the tile map engine
//!
//! Run with: tilemap_editor --help

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tilemap_editor::io::{read_import_sources, write_export};
use tilemap_editor::{EditorConfig, TilemapEditor, Tileset, TilesDocument};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tilemap_editor", version, about = "Inspect and convert tile map exports")]
struct Cli {
    /// Use this config file instead of the one in the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import a map and print its statistics
    Inspect {
        map: PathBuf,
        #[arg(long)]
        tiles: Option<PathBuf>,
    },
    /// Import a map and write normalized map.json/tiles.json
    Normalize {
        map: PathBuf,
        #[arg(long)]
        tiles: Option<PathBuf>,
        #[arg(long, default_value = "out")]
        out: PathBuf,
        /// Tile size for the export; defaults to the imported map's
        #[arg(long)]
        tile_size: Option<u32>,
    },
    /// Slice a tileset image and write a tiles.json covering every cell
    Slice {
        image: PathBuf,
        #[arg(long)]
        tile_size: Option<u32>,
        #[arg(long, default_value = "tiles.json")]
        out: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<EditorConfig> {
    match path {
        Some(path) => EditorConfig::load_from_path(path)
            .with_context(|| format!("Loading config {}", path.display())),
        None => Ok(EditorConfig::load()),
    }
}

fn import(editor: &mut TilemapEditor, map: &PathBuf, tiles: Option<&PathBuf>) -> Result<()> {
    let sources = read_import_sources(map, tiles.map(|p| p.as_path()))
        .with_context(|| format!("Reading {}", map.display()))?;
    editor
        .import_map(&sources)
        .with_context(|| format!("Importing {}", map.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.cmd {
        Command::Inspect { map, tiles } => {
            let mut editor = TilemapEditor::new(config);
            import(&mut editor, &map, tiles.as_ref())?;

            let stats = editor.stats();
            println!("Map: {}", map.display());
            println!("  tile size: {}", editor.map().tile_size);
            println!("  size:      {}x{}", stats.bounds.width, stats.bounds.height);
            println!(
                "  layers:    {} ({} visible)",
                stats.total_layers, stats.visible_layers
            );
            println!("  tiles:     {}", stats.total_tiles);
            for layer in editor.layers() {
                println!(
                    "    {:<24} {:>6} tiles{}",
                    layer.name,
                    layer.tile_count(),
                    if layer.is_collision { "  [collider]" } else { "" }
                );
            }
            if let Some(tileset) = editor.imported_tileset() {
                println!(
                    "  tileset:   {} ({} tiles)",
                    tileset.spritesheet,
                    tileset.tiles.len()
                );
            }
        }
        Command::Normalize {
            map,
            tiles,
            out,
            tile_size,
        } => {
            let mut editor = TilemapEditor::new(config);
            import(&mut editor, &map, tiles.as_ref())?;

            let tile_size = tile_size.unwrap_or(editor.map().tile_size);
            let export = editor.export_map(tile_size);
            let (map_path, tiles_path) = write_export(&out, &export)
                .with_context(|| format!("Writing export to {}", out.display()))?;
            println!("Wrote {} and {}", map_path.display(), tiles_path.display());
        }
        Command::Slice {
            image,
            tile_size,
            out,
        } => {
            let (width, height) = image::image_dimensions(&image)
                .with_context(|| format!("Reading image {}", image.display()))?;
            let tileset = Tileset::new(width, height, tile_size.unwrap_or(config.default_tile_size));
            let spritesheet = image
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| config.spritesheet.clone());

            let doc = TilesDocument::from_tileset(&tileset, spritesheet);
            std::fs::write(&out, serde_json::to_string_pretty(&doc)?)
                .with_context(|| format!("Writing {}", out.display()))?;
            println!(
                "Sliced {}x{} image into {} tiles ({} columns, {} rows)",
                width,
                height,
                tileset.tile_count(),
                tileset.columns(),
                tileset.rows()
            );
        }
    }

    Ok(())
}
