//! Grid geometry derived from a sliced sprite sheet
//!
//! The map's local frame has its origin at the top-left corner of the grid.
//! Columns grow toward +x and rows grow toward -y, so every in-bounds
//! position has a negative local y.

use crate::{AtlasEntry, PaintError, SpriteAtlas, REPRESENTATIVE_INDEX};
use serde::{Deserialize, Serialize};

/// Pixels-to-units ratio used before any source image is loaded
pub const DEFAULT_PIXELS_TO_UNITS: u32 = 100;

/// Map size in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapSize {
    pub width: u32,
    pub height: u32,
}

impl Default for MapSize {
    fn default() -> Self {
        Self {
            width: 25,
            height: 25,
        }
    }
}

impl MapSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// At least one cell per axis, and few enough cells for every id to fit in an `i32`
    pub fn validate(self) -> Result<Self, PaintError> {
        let cells = self.width as i64 * self.height as i64;
        if self.width == 0 || self.height == 0 || cells > i32::MAX as i64 {
            Err(PaintError::InvalidMapSize {
                width: self.width,
                height: self.height,
            })
        } else {
            Ok(self)
        }
    }

    /// Whether the cell lies inside a grid of this size
    pub fn contains(&self, cell: CellCoord) -> bool {
        cell.row >= 0
            && cell.column >= 0
            && (cell.row as u32) < self.height
            && (cell.column as u32) < self.width
    }

    pub fn cell_count(&self) -> Option<u32> {
        self.width.checked_mul(self.height)
    }
}

/// A grid cell by row and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: i32,
    pub column: i32,
}

impl CellCoord {
    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }
}

/// Unique key of a cell: `row * map_width + column`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub i32);

impl CellId {
    pub fn from_cell(cell: CellCoord, map_size: MapSize) -> Self {
        Self(cell.row * map_size.width as i32 + cell.column)
    }

    /// Scene object name of the tile painted at this cell
    pub fn object_name(&self) -> String {
        format!("Tile_{}", self.0)
    }
}

impl std::fmt::Display for CellId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line segment of the grid overlay, in the map's local frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: [f32; 2],
    pub end: [f32; 2],
}

/// Map configuration. `grid_size_units` is always derived from the other fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    map_size: MapSize,
    pixels_to_units: u32,
    tile_size_pixels: [f32; 2],
    grid_size_units: [f32; 2],
}

impl MapConfig {
    pub fn new(
        tile_size_pixels: [f32; 2],
        pixels_to_units: u32,
        map_size: MapSize,
    ) -> Result<Self, PaintError> {
        let map_size = map_size.validate()?;
        if pixels_to_units == 0 {
            return Err(PaintError::InvalidTileGeometry(
                "pixels to units must be positive".to_string(),
            ));
        }
        if tile_size_pixels[0] <= 0.0 || tile_size_pixels[1] <= 0.0 {
            return Err(PaintError::InvalidTileGeometry(format!(
                "tile size {}x{} is empty",
                tile_size_pixels[0], tile_size_pixels[1]
            )));
        }

        let ppu = pixels_to_units as f32;
        let grid_size_units = [
            tile_size_pixels[0] / ppu * map_size.width as f32,
            tile_size_pixels[1] / ppu * map_size.height as f32,
        ];

        Ok(Self {
            map_size,
            pixels_to_units,
            tile_size_pixels,
            grid_size_units,
        })
    }

    /// Derive the configuration from one representative atlas entry.
    ///
    /// Pixels-to-units is the entry's pixel width over its authored world width.
    pub fn from_entry(entry: &AtlasEntry, map_size: MapSize) -> Result<Self, PaintError> {
        let width = entry.rect.width as f32;
        let height = entry.rect.height as f32;
        let world_width = entry.world_size[0];
        if world_width <= 0.0 {
            return Err(PaintError::InvalidTileGeometry(format!(
                "sprite '{}' has no world width",
                entry.name
            )));
        }

        // Rounded rather than truncated so 32 / 0.32 does not land on 99
        let pixels_to_units = (width / world_width).round();
        if pixels_to_units < 1.0 {
            return Err(PaintError::InvalidTileGeometry(format!(
                "sprite '{}' has less than one pixel per unit",
                entry.name
            )));
        }

        Self::new([width, height], pixels_to_units as u32, map_size)
    }

    /// Same configuration with a different map size
    pub fn with_map_size(&self, map_size: MapSize) -> Result<Self, PaintError> {
        Self::new(self.tile_size_pixels, self.pixels_to_units, map_size)
    }

    pub fn map_size(&self) -> MapSize {
        self.map_size
    }

    pub fn pixels_to_units(&self) -> u32 {
        self.pixels_to_units
    }

    pub fn tile_size_pixels(&self) -> [f32; 2] {
        self.tile_size_pixels
    }

    pub fn grid_size_units(&self) -> [f32; 2] {
        self.grid_size_units
    }

    /// Size of one tile in world units
    pub fn tile_size_units(&self) -> [f32; 2] {
        let ppu = self.pixels_to_units as f32;
        [self.tile_size_pixels[0] / ppu, self.tile_size_pixels[1] / ppu]
    }

    /// Edge length used for cell lookup. Taken from the tile width on both axes.
    pub fn tile_world_size(&self) -> f32 {
        self.tile_size_pixels[0] / self.pixels_to_units as f32
    }

    pub fn world_to_cell(&self, local: [f32; 2]) -> CellCoord {
        let tile = self.tile_world_size();
        let column = (local[0] / tile).floor() as i32;
        let row = ((local[1] / tile).floor() as i32).abs() - 1;
        CellCoord { row, column }
    }

    pub fn cell_to_identifier(&self, cell: CellCoord) -> CellId {
        CellId::from_cell(cell, self.map_size)
    }

    /// Strict bounds test; positions on the grid edge are outside.
    pub fn is_within_bounds(&self, local: [f32; 2]) -> bool {
        let [width, height] = self.grid_size_units;
        local[0] > 0.0 && local[0] < width && local[1] > -height && local[1] < 0.0
    }

    /// Center of a cell in the local frame
    pub fn cell_center(&self, cell: CellCoord) -> [f32; 2] {
        let [tile_w, tile_h] = self.tile_size_units();
        [
            cell.column as f32 * tile_w + tile_w / 2.0,
            -(cell.row as f32 * tile_h) - tile_h / 2.0,
        ]
    }

    /// Center of the whole grid in the local frame
    pub fn grid_center(&self) -> [f32; 2] {
        [self.grid_size_units[0] / 2.0, -self.grid_size_units[1] / 2.0]
    }

    /// Cell outlines as one line per column edge and one per row edge
    pub fn grid_lines(&self) -> Vec<GridLine> {
        let [tile_w, tile_h] = self.tile_size_units();
        let [grid_w, grid_h] = self.grid_size_units;
        let mut lines =
            Vec::with_capacity((self.map_size.width + self.map_size.height + 2) as usize);

        for column in 0..=self.map_size.width {
            let x = column as f32 * tile_w;
            lines.push(GridLine {
                start: [x, 0.0],
                end: [x, -grid_h],
            });
        }
        for row in 0..=self.map_size.height {
            let y = -(row as f32 * tile_h);
            lines.push(GridLine {
                start: [0.0, y],
                end: [grid_w, y],
            });
        }

        lines
    }
}

/// Owns the map size and the configuration derived from the current atlas
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridModel {
    map_size: MapSize,
    config: Option<MapConfig>,
}

impl GridModel {
    pub fn new(map_size: MapSize) -> Self {
        Self {
            map_size,
            config: None,
        }
    }

    pub fn map_size(&self) -> MapSize {
        self.map_size
    }

    pub fn config(&self) -> Option<&MapConfig> {
        self.config.as_ref()
    }

    /// Store a new map size without recomputing
    pub fn set_map_size(&mut self, map_size: MapSize) -> Result<(), PaintError> {
        self.map_size = map_size.validate()?;
        Ok(())
    }

    pub(crate) fn clear_config(&mut self) {
        self.config = None;
    }

    /// Recompute the configuration from the atlas' representative entry.
    ///
    /// On failure the previous configuration is kept.
    pub fn recompute(&mut self, atlas: Option<&SpriteAtlas>) -> Result<&MapConfig, PaintError> {
        let entry = atlas
            .and_then(|atlas| atlas.get(REPRESENTATIVE_INDEX))
            .ok_or(PaintError::NoSourceImage)?;
        let config = MapConfig::from_entry(entry, self.map_size)?;
        Ok(self.config.insert(config))
    }
}
