//! Placed tiles keyed by cell identifier

use crate::{CellCoord, CellId, MapSize, SceneHost, TILES_OBJECT_NAME};
use std::collections::HashMap;

/// A tile painted into one cell
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTile<H> {
    pub cell_id: CellId,
    pub cell: CellCoord,
    /// Position in the map's local frame
    pub world_position: [f32; 2],
    pub sprite_index: usize,
    pub object: H,
    pub renderable: H,
}

/// All tiles of one map, at most one per cell.
///
/// Tile objects are parented to a lazily created "Tiles" container.
#[derive(Debug, Clone)]
pub struct TileCollection<H> {
    root: Option<H>,
    tiles: HashMap<CellId, PlacedTile<H>>,
}

impl<H> Default for TileCollection<H> {
    fn default() -> Self {
        Self {
            root: None,
            tiles: HashMap::new(),
        }
    }
}

impl<H: Copy + Eq + std::fmt::Debug> TileCollection<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the "Tiles" container, if it has been created
    pub fn root(&self) -> Option<H> {
        self.root
    }

    /// Return the container, creating it under `parent` on first use
    pub fn ensure_root(
        &mut self,
        host: &mut impl SceneHost<Handle = H>,
        parent: Option<H>,
    ) -> H {
        *self
            .root
            .get_or_insert_with(|| host.create_scene_object(TILES_OBJECT_NAME, parent))
    }

    pub fn get(&self, cell_id: CellId) -> Option<&PlacedTile<H>> {
        self.tiles.get(&cell_id)
    }

    pub fn get_mut(&mut self, cell_id: CellId) -> Option<&mut PlacedTile<H>> {
        self.tiles.get_mut(&cell_id)
    }

    pub fn contains(&self, cell_id: CellId) -> bool {
        self.tiles.contains_key(&cell_id)
    }

    pub fn insert(&mut self, tile: PlacedTile<H>) -> Option<PlacedTile<H>> {
        self.tiles.insert(tile.cell_id, tile)
    }

    pub fn remove(&mut self, cell_id: CellId) -> Option<PlacedTile<H>> {
        self.tiles.remove(&cell_id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedTile<H>> {
        self.tiles.values()
    }

    /// Destroy every tile object and empty the collection
    pub fn clear(&mut self, host: &mut impl SceneHost<Handle = H>) -> usize {
        let count = self.tiles.len();
        for (_, tile) in self.tiles.drain() {
            host.destroy_scene_object(tile.object);
        }
        count
    }

    /// Re-key every tile for a new map size.
    ///
    /// Tiles whose cell falls outside the new size are destroyed. Returns the
    /// number of tiles dropped.
    pub fn rekey(&mut self, map_size: MapSize, host: &mut impl SceneHost<Handle = H>) -> usize {
        let mut dropped = 0;
        let old = std::mem::take(&mut self.tiles);

        for (_, mut tile) in old {
            if map_size.contains(tile.cell) {
                tile.cell_id = CellId::from_cell(tile.cell, map_size);
                self.tiles.insert(tile.cell_id, tile);
            } else {
                host.destroy_scene_object(tile.object);
                dropped += 1;
            }
        }

        dropped
    }
}
