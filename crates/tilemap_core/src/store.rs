//! Layer store: the tile map plus the active-layer pointer
//!
//! Every mutating method returns `true` only when it changed the map. Callers
//! that keep undo history use this to skip recording no-op edits.

use crate::{GridPos, Layer, LayerId, TileMap, TileRef, TileSelection};

/// Owns the map being edited and tracks which layer tile edits target
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStore {
    map: TileMap,
    active: Option<LayerId>,
    layer_name_prefix: String,
}

impl LayerStore {
    /// Wrap a map, activating its frontmost layer
    pub fn new(map: TileMap) -> Self {
        let active = map.layers.first().map(|layer| layer.id);
        Self {
            map,
            active,
            layer_name_prefix: "Layer".to_string(),
        }
    }

    /// Prefix used when naming new layers (`"{prefix} {n}"`)
    pub fn with_layer_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.layer_name_prefix = prefix.into();
        self
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    /// Raw access for wholesale state swaps (undo/redo).
    ///
    /// Call [`LayerStore::repair_active`] afterwards if layers may have changed.
    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    /// Replace the whole map and active pointer
    pub fn replace(&mut self, map: TileMap, active: Option<LayerId>) {
        self.map = map;
        self.active = active;
        self.repair_active();
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active
    }

    pub fn active_layer(&self) -> Option<&Layer> {
        self.active.and_then(|id| self.map.layer(id))
    }

    /// Point the active layer back at index 0 if it no longer exists
    pub fn repair_active(&mut self) {
        let dangling = match self.active {
            Some(id) => self.map.layer(id).is_none(),
            None => true,
        };
        if dangling {
            self.active = self.map.layers.first().map(|layer| layer.id);
        }
    }

    /// The active layer, if it exists and is visible
    fn editable_layer(&mut self) -> Option<&mut Layer> {
        let id = self.active?;
        self.map.layer_mut(id).filter(|layer| layer.visible)
    }

    /// Whether tile edits would currently reach a layer
    pub fn can_edit_tiles(&self) -> bool {
        self.active_layer().is_some_and(|layer| layer.visible)
    }

    // ---- tiles ----

    pub fn place_tile(&mut self, pos: impl Into<GridPos>, tile: TileRef) -> bool {
        let pos = pos.into();
        match self.editable_layer() {
            Some(layer) => layer.tiles.set(pos, tile) != Some(tile),
            None => false,
        }
    }

    pub fn remove_tile(&mut self, pos: impl Into<GridPos>) -> bool {
        let pos = pos.into();
        match self.editable_layer() {
            Some(layer) => layer.tiles.remove(pos).is_some(),
            None => false,
        }
    }

    /// Fill the rectangle between two corners (any order) with one tile
    pub fn fill_rect(&mut self, a: impl Into<GridPos>, b: impl Into<GridPos>, tile: TileRef) -> bool {
        let (a, b) = (a.into(), b.into());
        let Some(layer) = self.editable_layer() else {
            return false;
        };
        let mut changed = false;
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for x in a.x.min(b.x)..=a.x.max(b.x) {
                changed |= layer.tiles.set(GridPos::new(x, y), tile) != Some(tile);
            }
        }
        changed
    }

    /// Clear every cell in the rectangle between two corners
    pub fn erase_rect(&mut self, a: impl Into<GridPos>, b: impl Into<GridPos>) -> bool {
        let (a, b) = (a.into(), b.into());
        let Some(layer) = self.editable_layer() else {
            return false;
        };
        let mut changed = false;
        for y in a.y.min(b.y)..=a.y.max(b.y) {
            for x in a.x.min(b.x)..=a.x.max(b.x) {
                changed |= layer.tiles.remove(GridPos::new(x, y)).is_some();
            }
        }
        changed
    }

    /// Stamp a palette selection with its top-left corner at `origin`.
    ///
    /// Cells that would land past the edge of the grid are skipped.
    pub fn place_selection(&mut self, origin: impl Into<GridPos>, selection: &TileSelection) -> bool {
        let origin = origin.into();
        let Some(layer) = self.editable_layer() else {
            return false;
        };
        let mut changed = false;
        for (dx, dy, tile) in selection.offsets() {
            let Some(pos) = offset_within_grid(origin, dx, dy) else {
                continue;
            };
            changed |= layer.tiles.set(pos, tile) != Some(tile);
        }
        changed
    }

    // ---- layers ----

    /// Insert a new empty layer at the front and make it active
    pub fn add_layer(&mut self) -> LayerId {
        let name = format!("{} {}", self.layer_name_prefix, self.map.layers.len() + 1);
        let layer = Layer::new(name);
        let id = layer.id;
        self.map.layers.insert(0, layer);
        self.active = Some(id);
        id
    }

    /// Remove a layer. Refused when it is the last one.
    pub fn delete_layer(&mut self, id: LayerId) -> bool {
        if self.map.layers.len() <= 1 {
            return false;
        }
        let Some(index) = self.map.layer_index(id) else {
            return false;
        };
        self.map.layers.remove(index);
        if self.active == Some(id) {
            self.active = self.map.layers.first().map(|layer| layer.id);
        }
        true
    }

    /// Copy a layer to the front and make the copy active
    pub fn duplicate_layer(&mut self, id: LayerId) -> Option<LayerId> {
        let copy = self.map.layer(id)?.duplicate();
        let copy_id = copy.id;
        self.map.layers.insert(0, copy);
        self.active = Some(copy_id);
        Some(copy_id)
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        match self.map.layer_mut(id) {
            Some(layer) if layer.visible != visible => {
                layer.visible = visible;
                true
            }
            _ => false,
        }
    }

    pub fn set_layer_name(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        let name = name.into();
        match self.map.layer_mut(id) {
            Some(layer) if layer.name != name => {
                layer.name = name;
                true
            }
            _ => false,
        }
    }

    pub fn set_layer_collision(&mut self, id: LayerId, is_collision: bool) -> bool {
        match self.map.layer_mut(id) {
            Some(layer) if layer.is_collision != is_collision => {
                layer.is_collision = is_collision;
                true
            }
            _ => false,
        }
    }

    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f32) -> bool {
        match self.map.layer_mut(id) {
            Some(layer) => {
                let before = layer.opacity;
                layer.set_opacity(opacity);
                layer.opacity != before
            }
            None => false,
        }
    }

    /// Change the edit target. Returns `false` for unknown ids.
    pub fn set_active_layer(&mut self, id: LayerId) -> bool {
        if self.map.layer(id).is_none() {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Move the layer at `from` to `to`, shifting the others.
    ///
    /// Out-of-range indices are clamped to the last layer.
    pub fn reorder_layers(&mut self, from: usize, to: usize) -> bool {
        let Some(last) = self.map.layers.len().checked_sub(1) else {
            return false;
        };
        let (from, to) = (from.min(last), to.min(last));
        if from == to {
            return false;
        }
        let layer = self.map.layers.remove(from);
        self.map.layers.insert(to, layer);
        true
    }
}

impl Default for LayerStore {
    fn default() -> Self {
        Self::new(TileMap::default())
    }
}

fn offset_within_grid(origin: GridPos, dx: u32, dy: u32) -> Option<GridPos> {
    let x = i32::try_from(dx).ok().and_then(|dx| origin.x.checked_add(dx))?;
    let y = i32::try_from(dy).ok().and_then(|dy| origin.y.checked_add(dy))?;
    Some(GridPos::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: TileRef = TileRef::new(2, 3);

    fn names(store: &LayerStore) -> Vec<&str> {
        store.map().layers.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_place_and_remove() {
        let mut store = LayerStore::default();

        assert!(store.place_tile((5, 5), TILE));
        assert!(!store.place_tile((5, 5), TILE));
        assert!(store.place_tile((5, 5), TileRef::new(0, 0)));

        assert!(store.remove_tile((5, 5)));
        assert!(!store.remove_tile((5, 5)));
        assert!(!store.remove_tile((500, -3)));
    }

    #[test]
    fn test_hidden_active_layer_refuses_edits() {
        let mut store = LayerStore::default();
        let id = store.active_layer_id().unwrap();
        store.place_tile((0, 0), TILE);

        assert!(store.set_layer_visible(id, false));
        assert!(!store.can_edit_tiles());
        assert!(!store.place_tile((1, 1), TILE));
        assert!(!store.remove_tile((0, 0)));
        assert!(!store.fill_rect((0, 0), (2, 2), TILE));
        assert_eq!(store.active_layer().unwrap().tile_count(), 1);
    }

    #[test]
    fn test_fill_and_erase_rect() {
        let mut store = LayerStore::default();

        assert!(store.fill_rect((3, 2), (1, 1), TILE));
        assert_eq!(store.active_layer().unwrap().tile_count(), 6);
        assert!(!store.fill_rect((1, 1), (3, 2), TILE));

        assert!(store.erase_rect((2, 1), (2, 2)));
        assert_eq!(store.active_layer().unwrap().tile_count(), 4);
        assert!(!store.erase_rect((2, 1), (2, 2)));
    }

    #[test]
    fn test_place_selection() {
        let mut store = LayerStore::default();
        let selection = TileSelection {
            tiles: vec![
                TileRef::new(0, 0),
                TileRef::new(1, 0),
                TileRef::new(0, 1),
                TileRef::new(1, 1),
            ],
            width: 2,
            height: 2,
        };

        assert!(store.place_selection((10, 10), &selection));
        let layer = store.active_layer().unwrap();
        assert_eq!(layer.tile(GridPos::new(11, 10)), Some(TileRef::new(1, 0)));
        assert_eq!(layer.tile(GridPos::new(10, 11)), Some(TileRef::new(0, 1)));
        assert!(!store.place_selection((10, 10), &selection));
    }

    #[test]
    fn test_place_selection_at_grid_edge() {
        let mut store = LayerStore::default();
        let selection = TileSelection {
            tiles: vec![
                TileRef::new(0, 0),
                TileRef::new(1, 0),
                TileRef::new(0, 1),
                TileRef::new(1, 1),
            ],
            width: 2,
            height: 2,
        };

        assert!(store.place_selection((i32::MAX, i32::MAX - 1), &selection));
        let layer = store.active_layer().unwrap();
        assert_eq!(layer.tile_count(), 2);
        assert_eq!(
            layer.tile(GridPos::new(i32::MAX, i32::MAX - 1)),
            Some(TileRef::new(0, 0))
        );
        assert_eq!(
            layer.tile(GridPos::new(i32::MAX, i32::MAX)),
            Some(TileRef::new(0, 1))
        );
    }

    #[test]
    fn test_add_layer_goes_to_front() {
        let mut store = LayerStore::default();
        let second = store.add_layer();
        let third = store.add_layer();

        assert_eq!(names(&store), vec!["Layer 3", "Layer 2", "Layer 1"]);
        assert_eq!(store.map().layers[0].id, third);
        assert_eq!(store.map().layers[1].id, second);
        assert_eq!(store.active_layer_id(), Some(third));
    }

    #[test]
    fn test_layer_name_prefix() {
        let mut store = LayerStore::default().with_layer_name_prefix("Camada");
        store.add_layer();
        assert_eq!(store.map().layers[0].name, "Camada 2");
    }

    #[test]
    fn test_delete_keeps_one_layer() {
        let mut store = LayerStore::default();
        let only = store.active_layer_id().unwrap();
        assert!(!store.delete_layer(only));
        assert_eq!(store.map().layers.len(), 1);

        let added = store.add_layer();
        assert!(!store.delete_layer(LayerId::new()));
        assert!(store.delete_layer(added));
        assert_eq!(store.active_layer_id(), Some(only));
    }

    #[test]
    fn test_delete_inactive_keeps_pointer() {
        let mut store = LayerStore::default();
        let first = store.active_layer_id().unwrap();
        let added = store.add_layer();
        assert!(store.delete_layer(first));
        assert_eq!(store.active_layer_id(), Some(added));
    }

    #[test]
    fn test_duplicate_layer() {
        let mut store = LayerStore::default();
        let source = store.active_layer_id().unwrap();
        store.place_tile((1, 1), TILE);

        let copy = store.duplicate_layer(source).unwrap();
        assert_eq!(store.map().layers[0].id, copy);
        assert_eq!(store.map().layers[0].name, "Layer 1 Copy");
        assert_eq!(store.active_layer_id(), Some(copy));

        store.place_tile((2, 2), TILE);
        store.remove_tile((1, 1));
        let original = store.map().layer(source).unwrap();
        assert_eq!(original.tile(GridPos::new(1, 1)), Some(TILE));
        assert_eq!(original.tile_count(), 1);

        assert!(store.duplicate_layer(LayerId::new()).is_none());
    }

    #[test]
    fn test_field_setters_report_changes() {
        let mut store = LayerStore::default();
        let id = store.active_layer_id().unwrap();

        assert!(store.set_layer_name(id, "Ground"));
        assert!(!store.set_layer_name(id, "Ground"));
        assert!(store.set_layer_collision(id, true));
        assert!(!store.set_layer_collision(id, true));
        assert!(store.set_layer_opacity(id, 0.5));
        assert!(!store.set_layer_opacity(id, 0.5));
        assert!(!store.set_layer_visible(id, true));
        assert!(!store.set_layer_name(LayerId::new(), "x"));
    }

    #[test]
    fn test_set_active_layer() {
        let mut store = LayerStore::default();
        let first = store.active_layer_id().unwrap();
        store.add_layer();

        assert!(store.set_active_layer(first));
        assert_eq!(store.active_layer_id(), Some(first));
        assert!(!store.set_active_layer(LayerId::new()));
        assert_eq!(store.active_layer_id(), Some(first));
    }

    #[test]
    fn test_reorder_layers() {
        let mut store = LayerStore::default();
        store.add_layer();
        store.add_layer();
        assert_eq!(names(&store), vec!["Layer 3", "Layer 2", "Layer 1"]);

        assert!(store.reorder_layers(0, 2));
        assert_eq!(names(&store), vec!["Layer 2", "Layer 1", "Layer 3"]);

        assert!(!store.reorder_layers(1, 1));
        assert!(store.reorder_layers(99, 0));
        assert_eq!(names(&store), vec!["Layer 3", "Layer 2", "Layer 1"]);
        assert!(!store.reorder_layers(5, 7));
    }

    #[test]
    fn test_repair_active_after_swap() {
        let mut store = LayerStore::default();
        let first = store.active_layer_id().unwrap();
        store.add_layer();
        store.map_mut().layers.remove(0);
        store.repair_active();
        assert_eq!(store.active_layer_id(), Some(first));
    }
}
