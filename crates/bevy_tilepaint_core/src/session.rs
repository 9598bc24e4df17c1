//! Paint session: the brush and the paint/erase/clear state machine
//!
//! A session edits one `TileMap` at a time. The map is borrowed per call so
//! the tiles it owns outlive the session; the session only owns the brush.
//!
//! States:
//! - `Disabled` - no session; nothing follows the cursor
//! - `Inactive` - enabled, but the map has no source image
//! - `Ready` - the brush exists and paint/erase act on the cell under it

use crate::{
    AtlasLoader, BrushState, CellId, MapSize, PaintError, PlacedTile, SceneHost, SourceImage,
    TileMap, TILE_Z,
};

/// Observable session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disabled,
    Inactive,
    Ready,
}

/// Result of a paint trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOutcome {
    Created(CellId),
    Overwritten(CellId),
    OutOfBounds,
    NotReady,
}

/// Result of an erase trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EraseOutcome {
    Erased(CellId),
    Empty(CellId),
    OutOfBounds,
    NotReady,
}

/// Result of a clear-all trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared(usize),
    Declined,
    NotReady,
}

/// Live editing session against one map
#[derive(Debug, Clone)]
pub struct PaintSession<H> {
    enabled: bool,
    brush: Option<BrushState<H>>,
    cursor_in_bounds: bool,
}

impl<H> Default for PaintSession<H> {
    fn default() -> Self {
        Self {
            enabled: false,
            brush: None,
            cursor_in_bounds: false,
        }
    }
}

impl<H: Copy + Eq + std::fmt::Debug> PaintSession<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        match (self.enabled, &self.brush) {
            (false, _) => SessionState::Disabled,
            (true, None) => SessionState::Inactive,
            (true, Some(_)) => SessionState::Ready,
        }
    }

    pub fn brush(&self) -> Option<&BrushState<H>> {
        self.brush.as_ref()
    }

    /// Whether the last cursor sample was inside the grid
    pub fn cursor_in_bounds(&self) -> bool {
        self.cursor_in_bounds
    }

    /// Start the session. Recomputes the grid if the map already has an image.
    pub fn on_session_enabled(
        &mut self,
        map: &mut TileMap<H>,
        host: &mut impl SceneHost<Handle = H>,
    ) -> Result<SessionState, PaintError> {
        self.enabled = true;
        self.cursor_in_bounds = false;

        if map.atlas().is_some() {
            map.recalculate()?;
            map.clamp_selected_sprite();
            self.rebuild_brush(map, host);
        }

        Ok(self.state())
    }

    /// End the session. Placed tiles stay with the map.
    pub fn on_session_disabled(&mut self, host: &mut impl SceneHost<Handle = H>) {
        self.destroy_brush(host);
        self.enabled = false;
        self.cursor_in_bounds = false;
    }

    /// Swap the map's source image.
    ///
    /// The atlas is loaded and the grid recomputed before anything is
    /// replaced, so a failure leaves the map and brush as they were.
    pub fn on_source_image_changed(
        &mut self,
        map: &mut TileMap<H>,
        host: &mut impl SceneHost<Handle = H>,
        loader: &mut impl AtlasLoader,
        source: Option<SourceImage>,
    ) -> Result<SessionState, PaintError> {
        let Some(source) = source else {
            self.destroy_brush(host);
            map.clear_source();
            return Ok(self.state());
        };

        let atlas = loader.load_atlas(&source)?;
        map.install_source(source, atlas)?;

        self.cursor_in_bounds = false;
        if self.enabled {
            self.rebuild_brush(map, host);
        }

        Ok(self.state())
    }

    /// Resize the map in cells.
    ///
    /// The size is stored and existing tiles are re-keyed for the new width
    /// even when no image is present; in that case the grid cannot be
    /// recomputed and `NoSourceImage` is returned. Returns the number of
    /// tiles destroyed because their cell no longer exists.
    pub fn on_map_size_changed(
        &mut self,
        map: &mut TileMap<H>,
        host: &mut impl SceneHost<Handle = H>,
        map_size: MapSize,
    ) -> Result<usize, PaintError> {
        let map_size = map_size.validate()?;
        if map_size == map.map_size() {
            return Ok(0);
        }

        map.grid.set_map_size(map_size)?;
        let dropped = map.tiles.rekey(map_size, host);

        let config = *map.recalculate()?;
        if let Some(brush) = &mut self.brush {
            brush.resize(&config, host);
        }
        self.cursor_in_bounds = false;

        Ok(dropped)
    }

    /// Feed one cursor sample in the map's local frame. Returns whether it was in bounds.
    ///
    /// Out-of-bounds samples leave the brush on its last valid cell.
    pub fn on_cursor_position_sampled(
        &mut self,
        map: &TileMap<H>,
        host: &mut impl SceneHost<Handle = H>,
        local: [f32; 2],
    ) -> bool {
        let (Some(brush), Some(config)) = (&mut self.brush, map.config()) else {
            self.cursor_in_bounds = false;
            return false;
        };

        self.cursor_in_bounds = config.is_within_bounds(local);
        if self.cursor_in_bounds {
            let cell = config.world_to_cell(local);
            brush.snap_to(cell, config, host);
        }

        self.cursor_in_bounds
    }

    /// Paint the brush sprite into the cell under the brush
    pub fn on_paint_triggered(
        &mut self,
        map: &mut TileMap<H>,
        host: &mut impl SceneHost<Handle = H>,
    ) -> PaintOutcome {
        let Some(brush) = &self.brush else {
            return PaintOutcome::NotReady;
        };
        let (true, Some(cell), Some(cell_id)) = (self.cursor_in_bounds, brush.cell, brush.cell_id)
        else {
            return PaintOutcome::OutOfBounds;
        };
        let Some(entry) = map.atlas().and_then(|a| a.get(brush.sprite_index)).cloned() else {
            return PaintOutcome::NotReady;
        };

        // Indices alone do not identify a sprite across source images
        if let Some(tile) = map.tiles.get_mut(cell_id) {
            tile.sprite_index = entry.index;
            host.set_renderable_image(tile.renderable, &entry);
            return PaintOutcome::Overwritten(cell_id);
        }

        let parent = map.root();
        let root = map.tiles.ensure_root(host, Some(parent));
        let object = host.create_scene_object(&cell_id.object_name(), Some(root));
        let renderable = host.attach_renderable(object);
        host.set_renderable_image(renderable, &entry);
        let [x, y] = brush.world_position;
        host.set_object_position(object, [x, y, TILE_Z]);

        map.tiles.insert(PlacedTile {
            cell_id,
            cell,
            world_position: brush.world_position,
            sprite_index: entry.index,
            object,
            renderable,
        });

        PaintOutcome::Created(cell_id)
    }

    /// Remove the tile in the cell under the brush, if any
    pub fn on_erase_triggered(
        &mut self,
        map: &mut TileMap<H>,
        host: &mut impl SceneHost<Handle = H>,
    ) -> EraseOutcome {
        let Some(brush) = &self.brush else {
            return EraseOutcome::NotReady;
        };
        let (true, Some(cell_id)) = (self.cursor_in_bounds, brush.cell_id) else {
            return EraseOutcome::OutOfBounds;
        };

        match map.tiles.remove(cell_id) {
            Some(tile) => {
                host.destroy_scene_object(tile.object);
                EraseOutcome::Erased(cell_id)
            }
            None => EraseOutcome::Empty(cell_id),
        }
    }

    /// Destroy every placed tile after the host confirms
    pub fn on_clear_all_triggered(
        &mut self,
        map: &mut TileMap<H>,
        host: &mut impl SceneHost<Handle = H>,
    ) -> ClearOutcome {
        if !self.enabled {
            return ClearOutcome::NotReady;
        }

        let message = format!(
            "Remove all {} tiles from '{}'? This cannot be undone.",
            map.tiles.len(),
            map.name
        );
        if !host.confirm("Clear All Tiles", &message) {
            return ClearOutcome::Declined;
        }

        ClearOutcome::Cleared(map.tiles.clear(host))
    }

    /// Select the sprite the brush paints
    pub fn select_sprite(
        &mut self,
        map: &mut TileMap<H>,
        host: &mut impl SceneHost<Handle = H>,
        index: usize,
    ) -> Result<(), PaintError> {
        let atlas = map.atlas().ok_or(PaintError::NoSourceImage)?;
        atlas.validate_tile_index(index)?;
        map.selected_sprite = index;

        if let (Some(brush), Some(entry)) = (&mut self.brush, map.current_brush_entry()) {
            brush.set_sprite(entry, host);
        }
        Ok(())
    }

    fn destroy_brush(&mut self, host: &mut impl SceneHost<Handle = H>) {
        if let Some(brush) = self.brush.take() {
            brush.despawn(host);
        }
    }

    fn rebuild_brush(&mut self, map: &TileMap<H>, host: &mut impl SceneHost<Handle = H>) {
        self.destroy_brush(host);
        if let (Some(entry), Some(config)) = (map.current_brush_entry(), map.config()) {
            self.brush = Some(BrushState::spawn(host, Some(map.root()), entry, config));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;
    use crate::{CellCoord, GridSlicer};

    fn sheet() -> SourceImage {
        SourceImage::new("tiles/sheet.png", 400, 200)
    }

    fn slicer() -> GridSlicer {
        GridSlicer::new(100, 100, 100.0)
    }

    /// 4x4 map with 100px tiles at 100 pixels per unit, session enabled and ready
    fn ready() -> (PaintSession<u32>, TileMap<u32>, RecordingHost) {
        let mut host = RecordingHost::new();
        let mut map = TileMap::create(&mut host, "Tilemap", MapSize::new(4, 4)).unwrap();
        let mut session = PaintSession::new();
        session.on_session_enabled(&mut map, &mut host).unwrap();
        let state = session
            .on_source_image_changed(&mut map, &mut host, &mut slicer(), Some(sheet()))
            .unwrap();
        assert_eq!(state, SessionState::Ready);
        (session, map, host)
    }

    fn paint_at(
        session: &mut PaintSession<u32>,
        map: &mut TileMap<u32>,
        host: &mut RecordingHost,
        local: [f32; 2],
    ) -> PaintOutcome {
        session.on_cursor_position_sampled(map, host, local);
        session.on_paint_triggered(map, host)
    }

    #[test]
    fn test_enable_without_source_is_inactive() {
        let mut host = RecordingHost::new();
        let mut map = TileMap::create(&mut host, "Tilemap", MapSize::default()).unwrap();
        let mut session = PaintSession::new();

        assert_eq!(session.state(), SessionState::Disabled);
        let state = session.on_session_enabled(&mut map, &mut host).unwrap();
        assert_eq!(state, SessionState::Inactive);
        assert!(host.named("Brush").is_empty());
        assert_eq!(session.on_paint_triggered(&mut map, &mut host), PaintOutcome::NotReady);
    }

    #[test]
    fn test_source_image_creates_brush_on_default_sprite() {
        let (session, map, host) = ready();

        let config = map.config().unwrap();
        assert_eq!(config.pixels_to_units(), 100);
        assert_eq!(config.tile_size_pixels(), [100.0, 100.0]);
        assert_eq!(config.grid_size_units(), [4.0, 4.0]);

        let brush = session.brush().unwrap();
        assert_eq!(brush.sprite_index, 1);
        assert_eq!(brush.size_units, [1.0, 1.0]);

        let brushes = host.named("Brush");
        assert_eq!(brushes.len(), 1);
        assert_eq!(brushes[0].1.parent, Some(map.root()));
        assert_eq!(brushes[0].1.image, Some(1));
    }

    #[test]
    fn test_cursor_sample_snaps_brush() {
        let (mut session, map, mut host) = ready();

        assert!(session.on_cursor_position_sampled(&map, &mut host, [2.5, -1.3]));

        let brush = session.brush().unwrap();
        assert_eq!(brush.cell, Some(CellCoord::new(1, 2)));
        assert_eq!(brush.cell_id, Some(CellId(6)));
        assert_eq!(brush.world_position, [2.5, -1.5]);
        assert_eq!(host.objects[&brush.object].position, [2.5, -1.5, crate::BRUSH_Z]);
    }

    #[test]
    fn test_out_of_bounds_sample_leaves_brush() {
        let (mut session, map, mut host) = ready();
        session.on_cursor_position_sampled(&map, &mut host, [1.5, -0.5]);

        assert!(!session.on_cursor_position_sampled(&map, &mut host, [7.0, 3.0]));

        let brush = session.brush().unwrap();
        assert_eq!(brush.cell_id, Some(CellId(1)));
        assert_eq!(brush.world_position, [1.5, -0.5]);
        assert!(!session.cursor_in_bounds());
    }

    #[test]
    fn test_paint_twice_overwrites_sprite() {
        let (mut session, mut map, mut host) = ready();

        assert_eq!(
            paint_at(&mut session, &mut map, &mut host, [2.5, -1.3]),
            PaintOutcome::Created(CellId(6))
        );
        session.select_sprite(&mut map, &mut host, 4).unwrap();
        assert_eq!(
            paint_at(&mut session, &mut map, &mut host, [2.2, -1.9]),
            PaintOutcome::Overwritten(CellId(6))
        );

        assert_eq!(map.tiles().len(), 1);
        assert_eq!(host.named("Tile_6").len(), 1);
        let tile = map.tiles().get(CellId(6)).unwrap();
        assert_eq!(tile.sprite_index, 4);
        assert_eq!(host.objects[&tile.object].image, Some(4));
        assert_eq!(host.objects[&tile.object].position, [2.5, -1.5, TILE_Z]);
    }

    #[test]
    fn test_tiles_live_under_container() {
        let (mut session, mut map, mut host) = ready();
        paint_at(&mut session, &mut map, &mut host, [0.5, -0.5]);
        paint_at(&mut session, &mut map, &mut host, [3.5, -3.5]);

        let root = map.tiles().root().unwrap();
        assert_eq!(host.objects[&root].name, "Tiles");
        assert_eq!(host.objects[&root].parent, Some(map.root()));
        assert_eq!(host.children_of(root), 2);
        assert!(map.tiles().contains(CellId(15)));
    }

    #[test]
    fn test_erase_empty_cell_is_noop() {
        let (mut session, mut map, mut host) = ready();
        paint_at(&mut session, &mut map, &mut host, [0.5, -0.5]);

        session.on_cursor_position_sampled(&map, &mut host, [1.5, -0.5]);
        assert_eq!(
            session.on_erase_triggered(&mut map, &mut host),
            EraseOutcome::Empty(CellId(1))
        );
        assert_eq!(map.tiles().len(), 1);
    }

    #[test]
    fn test_erase_destroys_tile() {
        let (mut session, mut map, mut host) = ready();
        paint_at(&mut session, &mut map, &mut host, [0.5, -0.5]);

        assert_eq!(
            session.on_erase_triggered(&mut map, &mut host),
            EraseOutcome::Erased(CellId(0))
        );
        assert!(map.tiles().is_empty());
        assert!(host.named("Tile_0").is_empty());
    }

    #[test]
    fn test_paint_on_boundary_is_rejected() {
        let (mut session, mut map, mut host) = ready();

        assert_eq!(
            paint_at(&mut session, &mut map, &mut host, [0.0, -1.5]),
            PaintOutcome::OutOfBounds
        );
        assert_eq!(
            session.on_erase_triggered(&mut map, &mut host),
            EraseOutcome::OutOfBounds
        );
        assert!(map.tiles().is_empty());
    }

    #[test]
    fn test_paint_after_leaving_grid_is_noop() {
        let (mut session, mut map, mut host) = ready();
        paint_at(&mut session, &mut map, &mut host, [0.5, -0.5]);

        assert_eq!(
            paint_at(&mut session, &mut map, &mut host, [-2.0, -0.5]),
            PaintOutcome::OutOfBounds
        );
        assert_eq!(map.tiles().len(), 1);
    }

    #[test]
    fn test_clear_all_confirmed() {
        let (mut session, mut map, mut host) = ready();
        for x in [0.5, 1.5, 2.5, 3.5] {
            paint_at(&mut session, &mut map, &mut host, [x, -0.5]);
        }
        paint_at(&mut session, &mut map, &mut host, [0.5, -2.5]);
        assert_eq!(map.tiles().len(), 5);

        assert_eq!(
            session.on_clear_all_triggered(&mut map, &mut host),
            ClearOutcome::Cleared(5)
        );
        assert!(map.tiles().is_empty());
        assert_eq!(host.confirm_calls, 1);
        assert!(host.named("Tile_0").is_empty());
    }

    #[test]
    fn test_clear_all_declined() {
        let (mut session, mut map, mut host) = ready();
        for x in [0.5, 1.5, 2.5, 3.5] {
            paint_at(&mut session, &mut map, &mut host, [x, -0.5]);
        }
        paint_at(&mut session, &mut map, &mut host, [0.5, -2.5]);

        host.confirm_answer = false;
        assert_eq!(
            session.on_clear_all_triggered(&mut map, &mut host),
            ClearOutcome::Declined
        );
        assert_eq!(map.tiles().len(), 5);
    }

    #[test]
    fn test_source_change_keeps_placed_tiles() {
        let (mut session, mut map, mut host) = ready();
        session.select_sprite(&mut map, &mut host, 3).unwrap();
        for x in [0.5, 1.5, 2.5] {
            paint_at(&mut session, &mut map, &mut host, [x, -0.5]);
        }
        let old_brush = session.brush().unwrap().object;

        let other = SourceImage::new("tiles/other.png", 200, 200);
        session
            .on_source_image_changed(&mut map, &mut host, &mut slicer(), Some(other.clone()))
            .unwrap();

        assert_eq!(map.source(), Some(&other));
        assert_eq!(map.atlas().unwrap().tile_count(), 4);
        assert_eq!(map.selected_sprite(), 1);
        assert!(!host.objects.contains_key(&old_brush));
        assert_eq!(host.named("Brush").len(), 1);
        assert_eq!(session.brush().unwrap().sprite_index, 1);

        assert_eq!(map.tiles().len(), 3);
        for tile in map.tiles().iter() {
            assert_eq!(tile.sprite_index, 3);
            assert_eq!(host.objects[&tile.object].image, Some(3));
        }
    }

    #[test]
    fn test_failed_source_change_keeps_state() {
        let (mut session, mut map, mut host) = ready();
        let brush = session.brush().unwrap().object;
        let config = *map.config().unwrap();

        let tiny = SourceImage::new("tiles/tiny.png", 10, 10);
        let err = session
            .on_source_image_changed(&mut map, &mut host, &mut slicer(), Some(tiny))
            .unwrap_err();

        assert!(matches!(err, PaintError::AtlasLoad(_)));
        assert_eq!(map.source(), Some(&sheet()));
        assert_eq!(map.config(), Some(&config));
        assert_eq!(session.brush().unwrap().object, brush);
    }

    #[test]
    fn test_resize_without_source_fails() {
        let mut host = RecordingHost::new();
        let mut map = TileMap::create(&mut host, "Tilemap", MapSize::new(4, 4)).unwrap();
        let mut session = PaintSession::new();
        session.on_session_enabled(&mut map, &mut host).unwrap();

        let err = session
            .on_map_size_changed(&mut map, &mut host, MapSize::new(8, 8))
            .unwrap_err();
        assert_eq!(err, PaintError::NoSourceImage);
        assert!(map.config().is_none());
        assert_eq!(session.state(), SessionState::Inactive);
    }

    #[test]
    fn test_resize_rekeys_tiles() {
        let (mut session, mut map, mut host) = ready();
        paint_at(&mut session, &mut map, &mut host, [2.5, -1.3]);
        paint_at(&mut session, &mut map, &mut host, [3.5, -3.5]);
        assert!(map.tiles().contains(CellId(6)));

        let dropped = session
            .on_map_size_changed(&mut map, &mut host, MapSize::new(3, 4))
            .unwrap();

        assert_eq!(dropped, 1);
        assert_eq!(map.tiles().len(), 1);
        let tile = map.tiles().get(CellId(5)).unwrap();
        assert_eq!(tile.cell, CellCoord::new(1, 2));
        assert_eq!(map.config().unwrap().grid_size_units(), [3.0, 4.0]);

        let brush = session.brush().unwrap();
        assert_eq!(brush.cell, None);
        assert_eq!(brush.world_position, [0.5, -0.5]);
    }

    #[test]
    fn test_select_sprite_rejects_stale_index() {
        let (mut session, mut map, mut host) = ready();

        assert_eq!(
            session.select_sprite(&mut map, &mut host, 0),
            Err(PaintError::StaleAtlasIndex { index: 0, len: 9 })
        );
        assert_eq!(
            session.select_sprite(&mut map, &mut host, 9),
            Err(PaintError::StaleAtlasIndex { index: 9, len: 9 })
        );
        assert_eq!(map.selected_sprite(), 1);

        session.select_sprite(&mut map, &mut host, 8).unwrap();
        let brush = session.brush().unwrap();
        assert_eq!(brush.sprite_index, 8);
        assert_eq!(host.objects[&brush.object].image, Some(8));
    }

    #[test]
    fn test_disable_destroys_brush_keeps_tiles() {
        let (mut session, mut map, mut host) = ready();
        paint_at(&mut session, &mut map, &mut host, [0.5, -0.5]);

        session.on_session_disabled(&mut host);

        assert_eq!(session.state(), SessionState::Disabled);
        assert!(host.named("Brush").is_empty());
        assert_eq!(map.tiles().len(), 1);
        assert_eq!(
            session.on_clear_all_triggered(&mut map, &mut host),
            ClearOutcome::NotReady
        );
    }

    #[test]
    fn test_repaint_after_source_change_uses_new_sheet() {
        let (mut session, mut map, mut host) = ready();
        paint_at(&mut session, &mut map, &mut host, [0.5, -0.5]);
        let object = map.tiles().get(CellId(0)).unwrap().object;
        assert_eq!(host.objects[&object].sheet.as_deref(), Some("tiles/sheet.png"));

        let other = SourceImage::new("tiles/other.png", 200, 200);
        session
            .on_source_image_changed(&mut map, &mut host, &mut slicer(), Some(other))
            .unwrap();
        assert_eq!(session.brush().unwrap().sprite_index, 1);

        assert_eq!(
            paint_at(&mut session, &mut map, &mut host, [0.5, -0.5]),
            PaintOutcome::Overwritten(CellId(0))
        );
        assert_eq!(host.objects[&object].sheet.as_deref(), Some("tiles/other.png"));
        assert_eq!(host.objects[&object].image, Some(1));
    }

    #[test]
    fn test_clear_source_drops_grid() {
        let (mut session, mut map, mut host) = ready();
        paint_at(&mut session, &mut map, &mut host, [0.5, -0.5]);

        let state = session
            .on_source_image_changed(&mut map, &mut host, &mut slicer(), None)
            .unwrap();
        assert_eq!(state, SessionState::Inactive);
        assert!(map.config().is_none());

        assert_eq!(
            session.on_map_size_changed(&mut map, &mut host, MapSize::new(8, 8)),
            Err(PaintError::NoSourceImage)
        );
        assert_eq!(map.map_size(), MapSize::new(8, 8));
        assert!(map.config().is_none());
        assert_eq!(map.tiles().len(), 1);
    }

    #[test]
    fn test_reenable_resets_stale_selection() {
        let (mut session, mut map, mut host) = ready();
        session.on_session_disabled(&mut host);
        map.selected_sprite = 42;

        session.on_session_enabled(&mut map, &mut host).unwrap();

        assert_eq!(map.selected_sprite(), crate::DEFAULT_SPRITE_INDEX);
        let brush = session.brush().unwrap();
        assert_eq!(brush.sprite_index, crate::DEFAULT_SPRITE_INDEX);
        assert_eq!(host.objects[&brush.object].image, Some(1));
    }

    #[test]
    fn test_reenable_restores_selected_sprite() {
        let (mut session, mut map, mut host) = ready();
        session.select_sprite(&mut map, &mut host, 5).unwrap();
        session.on_session_disabled(&mut host);

        let state = session.on_session_enabled(&mut map, &mut host).unwrap();

        assert_eq!(state, SessionState::Ready);
        assert_eq!(session.brush().unwrap().sprite_index, 5);
        assert_eq!(host.named("Brush").len(), 1);
    }
}
