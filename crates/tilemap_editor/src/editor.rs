//! The editor façade
//!
//! [`TilemapEditor`] wraps a [`LayerStore`] and records a snapshot of the map
//! before every mutation that actually changes something. Snapshots are
//! cheap: tile storage is shared between clones until written.

use crate::export::{self, MapExport};
use crate::history::History;
use crate::import::{build_import, ImportSources};
use crate::{EditorConfig, EditorError, TilesDocument};
use tilemap_core::{
    Bounds, GridPos, Layer, LayerId, LayerStore, MapStats, TileMap, TileRef, TileSelection,
};
use tracing::{debug, info, trace, warn};

/// Proof that an import was started; hand it back to finish or cancel
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a pending import blocks further imports until finished or cancelled"]
pub struct ImportTicket(u64);

/// Mutations grouped into one undo step
#[derive(Debug)]
struct Batch {
    depth: usize,
    before: TileMap,
    changed: bool,
}

/// A tile map under edit, with undo/redo, import and export
#[derive(Debug)]
pub struct TilemapEditor {
    store: LayerStore,
    history: History<TileMap>,
    config: EditorConfig,
    batch: Option<Batch>,
    pending_import: Option<u64>,
    next_ticket: u64,
    imported_tileset: Option<TilesDocument>,
}

impl Default for TilemapEditor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl TilemapEditor {
    /// Create an editor holding one empty layer
    pub fn new(config: EditorConfig) -> Self {
        let map = TileMap::with_default_layer(
            config.default_tile_size,
            format!("{} 1", config.layer_name_prefix),
        );
        let store = LayerStore::new(map).with_layer_name_prefix(config.layer_name_prefix.clone());
        Self {
            store,
            history: History::new(config.max_history),
            config,
            batch: None,
            pending_import: None,
            next_ticket: 0,
            imported_tileset: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn map(&self) -> &TileMap {
        self.store.map()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.store.map().layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.store.map().layer(id)
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.store.active_layer_id()
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.store.active_layer()
    }

    pub fn bounds(&self) -> Bounds {
        self.store.map().bounds()
    }

    pub fn stats(&self) -> MapStats {
        self.store.map().stats()
    }

    /// Tileset manifest from the last import, if one was supplied
    pub fn imported_tileset(&self) -> Option<&TilesDocument> {
        self.imported_tileset.as_ref()
    }

    // ---- history plumbing ----

    fn snapshot(&self) -> TileMap {
        self.store.map().clone()
    }

    fn commit(&mut self, before: TileMap) {
        match &mut self.batch {
            Some(batch) => batch.changed = true,
            None => self.history.record(before),
        }
    }

    /// Run a store mutation, recording history only if it changed the map
    fn apply(&mut self, action: &str, op: impl FnOnce(&mut LayerStore) -> bool) -> bool {
        let before = self.snapshot();
        let changed = op(&mut self.store);
        if changed {
            self.commit(before);
            debug!("{}", action);
        } else {
            trace!("{} had no effect", action);
        }
        changed
    }

    pub fn undo(&mut self) -> bool {
        self.flush_batch();
        let undone = self.history.undo(self.store.map_mut());
        if undone {
            self.store.repair_active();
            debug!(remaining = self.history.history_len(), "Undo");
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        self.flush_batch();
        let redone = self.history.redo(self.store.map_mut());
        if redone {
            self.store.repair_active();
            debug!(remaining = self.history.future_len(), "Redo");
        }
        redone
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of snapshots available to undo
    pub fn history_len(&self) -> usize {
        self.history.history_len()
    }

    /// Number of snapshots available to redo
    pub fn future_len(&self) -> usize {
        self.history.future_len()
    }

    /// Start grouping mutations (e.g. a paint stroke) into one undo step.
    ///
    /// Calls nest; the group closes when every `begin_batch` is matched.
    pub fn begin_batch(&mut self) {
        match &mut self.batch {
            Some(batch) => batch.depth += 1,
            None => {
                self.batch = Some(Batch {
                    depth: 1,
                    before: self.snapshot(),
                    changed: false,
                });
            }
        }
    }

    /// Close one level of batching. Returns `true` if an undo step was recorded.
    pub fn end_batch(&mut self) -> bool {
        let Some(batch) = &mut self.batch else {
            return false;
        };
        batch.depth -= 1;
        if batch.depth > 0 {
            return false;
        }
        match self.batch.take() {
            Some(Batch {
                before,
                changed: true,
                ..
            }) => {
                self.history.record(before);
                true
            }
            _ => false,
        }
    }

    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }

    fn flush_batch(&mut self) {
        if let Some(batch) = self.batch.as_mut() {
            batch.depth = 1;
            self.end_batch();
        }
    }

    // ---- tiles ----

    /// Paint a tile on the active layer
    pub fn place_tile(&mut self, pos: impl Into<GridPos>, tile: TileRef) -> bool {
        let pos = pos.into();
        self.apply("Place tile", |store| store.place_tile(pos, tile))
    }

    /// Erase a tile from the active layer
    pub fn remove_tile(&mut self, pos: impl Into<GridPos>) -> bool {
        let pos = pos.into();
        self.apply("Remove tile", |store| store.remove_tile(pos))
    }

    /// Fill a rectangle on the active layer as one undo step
    pub fn fill_rect(&mut self, a: impl Into<GridPos>, b: impl Into<GridPos>, tile: TileRef) -> bool {
        let (a, b) = (a.into(), b.into());
        self.apply("Fill rectangle", |store| store.fill_rect(a, b, tile))
    }

    /// Erase a rectangle on the active layer as one undo step
    pub fn erase_rect(&mut self, a: impl Into<GridPos>, b: impl Into<GridPos>) -> bool {
        let (a, b) = (a.into(), b.into());
        self.apply("Erase rectangle", |store| store.erase_rect(a, b))
    }

    /// Stamp a multi-tile palette selection as one undo step
    pub fn place_selection(&mut self, origin: impl Into<GridPos>, selection: &TileSelection) -> bool {
        let origin = origin.into();
        self.apply("Place selection", |store| {
            store.place_selection(origin, selection)
        })
    }

    // ---- layers ----

    pub fn add_layer(&mut self) -> LayerId {
        let before = self.snapshot();
        let id = self.store.add_layer();
        self.commit(before);
        debug!(%id, "Added layer");
        id
    }

    pub fn delete_layer(&mut self, id: LayerId) -> bool {
        self.apply("Delete layer", |store| store.delete_layer(id))
    }

    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let before = self.snapshot();
        let copy = self.store.duplicate_layer(id)?;
        self.commit(before);
        debug!(source = %id, %copy, "Duplicated layer");
        Some(copy)
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        self.apply("Set layer visibility", |store| {
            store.set_layer_visible(id, visible)
        })
    }

    pub fn set_layer_name(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.apply("Rename layer", |store| store.set_layer_name(id, name))
    }

    pub fn set_layer_collision(&mut self, id: LayerId, is_collision: bool) -> bool {
        self.apply("Set layer collision", |store| {
            store.set_layer_collision(id, is_collision)
        })
    }

    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f32) -> bool {
        self.apply("Set layer opacity", |store| {
            store.set_layer_opacity(id, opacity)
        })
    }

    /// Select the layer tile edits go to. Never recorded in history.
    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        self.store.set_active_layer(id)
    }

    pub fn reorder_layers(&mut self, from: usize, to: usize) -> bool {
        self.apply("Reorder layers", |store| store.reorder_layers(from, to))
    }

    // ---- export / import ----

    /// Build `map.json` and `tiles.json` for the current map
    pub fn export_map(&self, tile_size: u32) -> MapExport {
        let export = export::export_map(self.store.map(), tile_size, &self.config.spritesheet);
        info!(
            layers = export.map.layers.len(),
            width = export.map.map_width,
            height = export.map.map_height,
            "Exported map"
        );
        export
    }

    /// Reserve the import slot before reading files.
    ///
    /// Fails while another import is pending. The live map is not touched
    /// until [`TilemapEditor::finish_import`] commits.
    pub fn begin_import(&mut self) -> Result<ImportTicket, EditorError> {
        if self.pending_import.is_some() {
            warn!("Rejected import: another import is pending");
            return Err(EditorError::ImportInProgress);
        }
        self.next_ticket += 1;
        self.pending_import = Some(self.next_ticket);
        Ok(ImportTicket(self.next_ticket))
    }

    /// Parse the documents and replace the map as a single undo step.
    ///
    /// The import slot is released whatever the outcome. On error the map
    /// and history are unchanged.
    pub fn finish_import(
        &mut self,
        ticket: ImportTicket,
        sources: &ImportSources,
    ) -> Result<(), EditorError> {
        if self.pending_import != Some(ticket.0) {
            return Err(EditorError::StaleImport);
        }
        self.pending_import = None;

        let imported = build_import(
            sources,
            self.config.default_tile_size,
            &self.config.layer_name_prefix,
        )
        .map_err(|e| {
            warn!("Import failed: {}", e);
            e
        })?;

        self.flush_batch();
        let before = self.snapshot();
        self.store.replace(imported.map, imported.active);
        self.history.record(before);
        self.imported_tileset = imported.tileset;

        let map = self.store.map();
        info!(
            layers = map.layers.len(),
            width = map.width,
            height = map.height,
            "Imported map"
        );
        Ok(())
    }

    /// Abandon a pending import
    pub fn cancel_import(&mut self, ticket: ImportTicket) -> bool {
        if self.pending_import == Some(ticket.0) {
            self.pending_import = None;
            true
        } else {
            false
        }
    }

    pub fn is_import_pending(&self) -> bool {
        self.pending_import.is_some()
    }

    /// Import documents that are already in memory
    pub fn import_map(&mut self, sources: &ImportSources) -> Result<(), EditorError> {
        let ticket = self.begin_import()?;
        self.finish_import(ticket, sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: TileRef = TileRef::new(2, 3);

    fn tile(s: &str) -> TileRef {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_editor() {
        let editor = TilemapEditor::default();
        assert_eq!(editor.layers().len(), 1);
        assert_eq!(editor.layers()[0].name, "Layer 1");
        assert_eq!(editor.active_layer_id(), Some(editor.layers()[0].id));
        assert_eq!(editor.bounds(), Bounds::EMPTY);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_history_linearity() {
        let mut editor = TilemapEditor::default();
        for x in 0..5 {
            assert!(editor.place_tile((x, 0), TILE));
        }
        for _ in 0..2 {
            assert!(editor.undo());
        }
        assert_eq!(editor.history_len(), 3);
        assert_eq!(editor.future_len(), 2);
        assert_eq!(editor.active_layer().unwrap().tile_count(), 3);

        editor.add_layer();
        assert_eq!(editor.history_len(), 4);
        assert_eq!(editor.future_len(), 0);
    }

    #[test]
    fn test_undo_redo_restores_tiles() {
        let mut editor = TilemapEditor::default();
        editor.place_tile((1, 1), TILE);
        editor.remove_tile((1, 1));

        assert!(editor.undo());
        assert_eq!(editor.active_layer().unwrap().tile(GridPos::new(1, 1)), Some(TILE));
        assert!(editor.undo());
        assert_eq!(editor.active_layer().unwrap().tile_count(), 0);
        assert!(!editor.undo());

        assert!(editor.redo());
        assert!(editor.redo());
        assert_eq!(editor.active_layer().unwrap().tile_count(), 0);
        assert!(!editor.redo());
    }

    #[test]
    fn test_no_op_mutations_do_not_record() {
        let mut editor = TilemapEditor::default();
        let id = editor.active_layer_id().unwrap();

        assert!(!editor.remove_tile((3, 3)));
        assert!(!editor.set_layer_visible(id, true));
        assert!(!editor.reorder_layers(0, 0));
        assert!(!editor.set_layer_name(LayerId::new(), "nope"));
        assert_eq!(editor.history_len(), 0);

        editor.place_tile((0, 0), TILE);
        assert!(!editor.place_tile((0, 0), TILE));
        assert_eq!(editor.history_len(), 1);
    }

    #[test]
    fn test_delete_last_layer_is_no_op() {
        let mut editor = TilemapEditor::default();
        let only = editor.active_layer_id().unwrap();
        assert!(!editor.delete_layer(only));
        assert_eq!(editor.layers().len(), 1);
        assert_eq!(editor.history_len(), 0);
    }

    #[test]
    fn test_add_layer_twice() {
        let mut editor = TilemapEditor::default();
        let first = editor.add_layer();
        let second = editor.add_layer();

        assert_eq!(editor.layers().len(), 3);
        assert_eq!(editor.layers()[0].id, second);
        assert_eq!(editor.layers()[1].id, first);
        assert_eq!(editor.active_layer_id(), Some(second));
    }

    #[test]
    fn test_set_active_layer_is_not_history() {
        let mut editor = TilemapEditor::default();
        let base = editor.active_layer_id().unwrap();
        editor.add_layer();
        let before = editor.history_len();

        assert!(editor.set_active_layer(base));
        assert_eq!(editor.history_len(), before);
    }

    #[test]
    fn test_undo_add_layer_repairs_active() {
        let mut editor = TilemapEditor::default();
        let base = editor.active_layer_id().unwrap();
        let added = editor.add_layer();

        editor.undo();
        assert_eq!(editor.layers().len(), 1);
        assert_eq!(editor.active_layer_id(), Some(base));

        editor.redo();
        assert!(editor.layer(added).is_some());
    }

    #[test]
    fn test_duplicate_independence() {
        let mut editor = TilemapEditor::default();
        let source = editor.active_layer_id().unwrap();
        editor.place_tile((0, 0), tile("1_1"));

        let copy = editor.duplicate_layer(source).unwrap();
        assert_eq!(editor.active_layer_id(), Some(copy));
        editor.place_tile((0, 0), tile("9_9"));
        editor.place_tile((4, 4), tile("9_9"));

        let original = editor.layer(source).unwrap();
        assert_eq!(original.tile(GridPos::new(0, 0)), Some(tile("1_1")));
        assert_eq!(original.tile_count(), 1);
        assert!(editor.duplicate_layer(LayerId::new()).is_none());
    }

    #[test]
    fn test_snapshots_are_not_corrupted_by_later_edits() {
        let mut editor = TilemapEditor::default();
        editor.place_tile((0, 0), tile("1_1"));
        editor.place_tile((0, 0), tile("2_2"));
        editor.place_tile((1, 0), tile("3_3"));

        editor.undo();
        editor.undo();
        let layer = editor.active_layer().unwrap();
        assert_eq!(layer.tile(GridPos::new(0, 0)), Some(tile("1_1")));
        assert_eq!(layer.tile_count(), 1);
    }

    #[test]
    fn test_hidden_layer_refuses_tiles() {
        let mut editor = TilemapEditor::default();
        let id = editor.active_layer_id().unwrap();
        editor.set_layer_visible(id, false);
        let before = editor.history_len();

        assert!(!editor.place_tile((0, 0), TILE));
        assert_eq!(editor.history_len(), before);
    }

    #[test]
    fn test_batch_groups_a_stroke() {
        let mut editor = TilemapEditor::default();
        editor.begin_batch();
        for x in 0..10 {
            editor.place_tile((x, 0), TILE);
        }
        editor.begin_batch();
        editor.remove_tile((0, 0));
        assert!(!editor.end_batch());
        assert!(editor.is_batching());
        assert!(editor.end_batch());

        assert_eq!(editor.history_len(), 1);
        editor.undo();
        assert_eq!(editor.active_layer().unwrap().tile_count(), 0);
    }

    #[test]
    fn test_empty_batch_records_nothing() {
        let mut editor = TilemapEditor::default();
        editor.begin_batch();
        editor.remove_tile((0, 0));
        assert!(!editor.end_batch());
        assert_eq!(editor.history_len(), 0);
        assert!(!editor.end_batch());
    }

    #[test]
    fn test_undo_closes_open_batch() {
        let mut editor = TilemapEditor::default();
        editor.begin_batch();
        editor.place_tile((0, 0), TILE);
        assert!(editor.undo());
        assert!(!editor.is_batching());
        assert_eq!(editor.active_layer().unwrap().tile_count(), 0);
    }

    #[test]
    fn test_history_capacity_from_config() {
        let mut editor = TilemapEditor::new(EditorConfig {
            max_history: Some(3),
            ..Default::default()
        });
        for x in 0..10 {
            editor.place_tile((x, 0), TILE);
        }
        assert_eq!(editor.history_len(), 3);
    }

    #[test]
    fn test_export_scenario() {
        let mut editor = TilemapEditor::default();
        editor.place_tile((5, 5), tile("2_3"));
        editor.place_tile((6, 5), tile("2_3"));

        let export = editor.export_map(32);
        assert_eq!(export.map.map_width, 2);
        assert_eq!(export.map.map_height, 1);
        let coords: Vec<_> = export.map.layers[0]
            .tiles
            .iter()
            .map(|t| (t.id.to_string(), t.x, t.y))
            .collect();
        assert_eq!(
            coords,
            vec![("2_3".to_string(), 0, 0), ("2_3".to_string(), 1, 0)]
        );
    }

    #[test]
    fn test_import_is_one_undo_step() {
        let mut editor = TilemapEditor::default();
        editor.place_tile((0, 0), TILE);
        let original = editor.map().clone();

        let sources = ImportSources::new(
            r#"{"tileSize": 16, "layers": [{"name": "Imported", "tiles": [{"id": "1_1", "x": 3, "y": 3}]}]}"#,
        );
        editor.import_map(&sources).unwrap();
        assert_eq!(editor.map().tile_size, 16);
        assert_eq!(editor.layers()[0].name, "Imported");
        assert_eq!(editor.active_layer_id(), Some(editor.layers()[0].id));
        assert_eq!(editor.history_len(), 2);

        editor.undo();
        assert_eq!(editor.map(), &original);
    }

    #[test]
    fn test_failed_import_leaves_state_untouched() {
        let mut editor = TilemapEditor::default();
        editor.place_tile((0, 0), TILE);
        let original = editor.map().clone();

        let err = editor
            .import_map(&ImportSources::new(r#"{"layers": [{"tiles": [{"id": "?", "x": 0, "y": 0}]}]}"#))
            .unwrap_err();
        assert!(matches!(err, EditorError::InvalidTileRef(_)));
        assert_eq!(editor.map(), &original);
        assert_eq!(editor.history_len(), 1);
        assert!(!editor.is_import_pending());
    }

    #[test]
    fn test_import_wider_than_grid_is_rejected() {
        let mut editor = TilemapEditor::default();
        editor.place_tile((0, 0), TILE);
        let original = editor.map().clone();

        let err = editor
            .import_map(&ImportSources::new(
                r#"{"layers":[{"tiles":[{"id":"0_0","x":-2147483648,"y":0},{"id":"0_0","x":2147483647,"y":0}]}]}"#,
            ))
            .unwrap_err();
        assert!(matches!(err, EditorError::Format(_)));
        assert_eq!(editor.map(), &original);
        assert!(!editor.is_import_pending());
    }

    #[test]
    fn test_import_names_layers_with_configured_prefix() {
        let config = EditorConfig {
            layer_name_prefix: "Tier".to_string(),
            ..EditorConfig::default()
        };
        let mut editor = TilemapEditor::new(config);
        editor
            .import_map(&ImportSources::new(r#"{"layers": [{}]}"#))
            .unwrap();
        assert_eq!(editor.layers()[0].name, "Tier 1");
    }

    #[test]
    fn test_export_with_hidden_tile_far_from_visible_ones() {
        let mut editor = TilemapEditor::default();
        let base = editor.active_layer_id().unwrap();
        editor.place_tile((i32::MAX, 0), TILE);
        editor.add_layer();
        editor.place_tile((-5, 0), TILE);
        let top = editor.active_layer_id().unwrap();
        editor.set_layer_visible(top, false);

        let export = editor.export_map(32);
        assert_eq!(export.map.map_width, 1);
        assert_eq!(export.map.layers[0].name, editor.layer(base).unwrap().name);
        assert_eq!(export.map.layers[0].tiles[0].x, 0);
        assert_eq!(
            export.map.layers[1].tiles[0].x,
            -5 - i64::from(i32::MAX)
        );
    }

    #[test]
    fn test_concurrent_import_is_rejected() {
        let mut editor = TilemapEditor::default();
        let ticket = editor.begin_import().unwrap();
        assert!(matches!(
            editor.begin_import(),
            Err(EditorError::ImportInProgress)
        ));

        // Edits while the read is pending still apply to the live map
        assert!(editor.place_tile((0, 0), TILE));

        editor
            .finish_import(ticket, &ImportSources::new(r#"{"layers": [{}]}"#))
            .unwrap();
        assert!(!editor.is_import_pending());
        assert!(editor.map().is_empty());
    }

    #[test]
    fn test_cancelled_ticket_is_stale() {
        let mut editor = TilemapEditor::default();
        let first = editor.begin_import().unwrap();
        assert!(editor.cancel_import(first));

        let second = editor.begin_import().unwrap();
        assert!(!editor.cancel_import(ImportTicket(0)));
        assert!(matches!(
            editor.finish_import(ImportTicket(1), &ImportSources::new("{}")),
            Err(EditorError::StaleImport)
        ));
        assert!(editor.is_import_pending());
        assert!(editor.cancel_import(second));
    }
}
