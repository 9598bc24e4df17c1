//! A tile map: grid, atlas and placed tiles

use crate::{
    AtlasEntry, GridModel, MapConfig, MapSize, PaintError, SceneHost, SourceImage, SpriteAtlas,
    TileCollection, DEFAULT_SPRITE_INDEX,
};
use uuid::Uuid;

/// A map being painted. Owns its configuration, atlas and tiles.
#[derive(Debug, Clone)]
pub struct TileMap<H> {
    pub id: Uuid,
    pub name: String,
    root: H,
    pub(crate) grid: GridModel,
    source: Option<SourceImage>,
    atlas: Option<SpriteAtlas>,
    pub(crate) selected_sprite: usize,
    pub(crate) tiles: TileCollection<H>,
}

impl<H: Copy + Eq + std::fmt::Debug> TileMap<H> {
    /// Wrap an existing root object
    pub fn new(name: impl Into<String>, root: H, map_size: MapSize) -> Result<Self, PaintError> {
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.into(),
            root,
            grid: GridModel::new(map_size.validate()?),
            source: None,
            atlas: None,
            selected_sprite: DEFAULT_SPRITE_INDEX,
            tiles: TileCollection::new(),
        })
    }

    /// Create the root object through the host, then the map
    pub fn create(
        host: &mut impl SceneHost<Handle = H>,
        name: &str,
        map_size: MapSize,
    ) -> Result<Self, PaintError> {
        let map_size = map_size.validate()?;
        let root = host.create_scene_object(name, None);
        Self::new(name, root, map_size)
    }

    pub fn root(&self) -> H {
        self.root
    }

    pub fn map_size(&self) -> MapSize {
        self.grid.map_size()
    }

    pub fn config(&self) -> Option<&MapConfig> {
        self.grid.config()
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn atlas(&self) -> Option<&SpriteAtlas> {
        self.atlas.as_ref()
    }

    pub fn selected_sprite(&self) -> usize {
        self.selected_sprite
    }

    pub fn tiles(&self) -> &TileCollection<H> {
        &self.tiles
    }

    /// Atlas entry of the selected sprite
    pub fn current_brush_entry(&self) -> Option<&AtlasEntry> {
        self.atlas.as_ref()?.get(self.selected_sprite)
    }

    /// Replace the source image and atlas wholesale.
    ///
    /// The grid is recomputed against the new atlas first; on failure nothing
    /// changes. The selected sprite resets to the default.
    pub fn install_source(
        &mut self,
        source: SourceImage,
        atlas: SpriteAtlas,
    ) -> Result<&MapConfig, PaintError> {
        let mut grid = self.grid.clone();
        grid.recompute(Some(&atlas))?;

        self.grid = grid;
        self.source = Some(source);
        self.atlas = Some(atlas);
        self.selected_sprite = DEFAULT_SPRITE_INDEX;

        self.grid.config().ok_or(PaintError::NoSourceImage)
    }

    /// Forget the source image and the grid derived from it
    pub fn clear_source(&mut self) {
        self.source = None;
        self.atlas = None;
        self.grid.clear_config();
    }

    /// Recompute the grid from the current atlas
    pub fn recalculate(&mut self) -> Result<&MapConfig, PaintError> {
        self.grid.recompute(self.atlas.as_ref())
    }

    /// Reset a selected sprite that no longer exists in the atlas.
    /// Returns true if the index changed.
    pub(crate) fn clamp_selected_sprite(&mut self) -> bool {
        let Some(atlas) = &self.atlas else {
            return false;
        };
        let resolved = atlas.resolve_index(self.selected_sprite);
        let changed = resolved != self.selected_sprite;
        self.selected_sprite = resolved;
        changed
    }
}
