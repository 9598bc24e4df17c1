//! The brush preview object that follows the cursor

use crate::{AtlasEntry, CellCoord, CellId, MapConfig, SceneHost, BRUSH_OBJECT_NAME, BRUSH_Z};

/// Brush preview state. One exists per enabled session with a source image.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushState<H> {
    /// Atlas index of the sprite the brush paints
    pub sprite_index: usize,
    /// Last in-bounds cell under the cursor
    pub cell: Option<CellCoord>,
    pub cell_id: Option<CellId>,
    /// Cell-snapped position in the map's local frame
    pub world_position: [f32; 2],
    pub size_units: [f32; 2],
    pub object: H,
    pub renderable: H,
}

impl<H: Copy + Eq + std::fmt::Debug> BrushState<H> {
    /// Create the brush object under `parent`, showing `entry`, over the first cell
    pub fn spawn(
        host: &mut impl SceneHost<Handle = H>,
        parent: Option<H>,
        entry: &AtlasEntry,
        config: &MapConfig,
    ) -> Self {
        let object = host.create_scene_object(BRUSH_OBJECT_NAME, parent);
        let renderable = host.attach_renderable(object);
        host.set_renderable_image(renderable, entry);

        let world_position = config.cell_center(CellCoord::new(0, 0));
        host.set_object_position(object, [world_position[0], world_position[1], BRUSH_Z]);

        Self {
            sprite_index: entry.index,
            cell: None,
            cell_id: None,
            world_position,
            size_units: config.tile_size_units(),
            object,
            renderable,
        }
    }

    pub fn despawn(self, host: &mut impl SceneHost<Handle = H>) {
        host.destroy_scene_object(self.object);
    }

    /// Move the brush onto `cell`
    pub fn snap_to(
        &mut self,
        cell: CellCoord,
        config: &MapConfig,
        host: &mut impl SceneHost<Handle = H>,
    ) {
        let position = config.cell_center(cell);
        self.cell = Some(cell);
        self.cell_id = Some(config.cell_to_identifier(cell));
        if position != self.world_position {
            self.world_position = position;
            host.set_object_position(self.object, [position[0], position[1], BRUSH_Z]);
        }
    }

    pub fn set_sprite(&mut self, entry: &AtlasEntry, host: &mut impl SceneHost<Handle = H>) {
        self.sprite_index = entry.index;
        host.set_renderable_image(self.renderable, entry);
    }

    /// Follow a configuration change. The cell id is re-derived for the new map width.
    pub fn resize(&mut self, config: &MapConfig, host: &mut impl SceneHost<Handle = H>) {
        self.size_units = config.tile_size_units();
        match self.cell {
            Some(cell) if config.map_size().contains(cell) => {
                self.world_position = config.cell_center(cell);
                self.cell_id = Some(config.cell_to_identifier(cell));
            }
            _ => {
                self.cell = None;
                self.cell_id = None;
                self.world_position = config.cell_center(CellCoord::new(0, 0));
            }
        }
        host.set_object_position(
            self.object,
            [self.world_position[0], self.world_position[1], BRUSH_Z],
        );
    }
}
