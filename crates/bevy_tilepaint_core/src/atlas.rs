//! Sprite atlas types and the default grid slicer

use crate::host::AtlasLoader;
use crate::{PaintError, DEFAULT_SPRITE_INDEX};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A source image selected by the designer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceImage {
    /// Asset key (usually the asset path)
    pub key: String,
    pub width: u32,
    pub height: u32,
}

impl SourceImage {
    pub fn new(key: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            key: key.into(),
            width,
            height,
        }
    }

    /// File stem of the key, used to name sliced sprites
    pub fn stem(&self) -> &str {
        Path::new(&self.key)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(self.key.as_str())
    }
}

/// Pixel rectangle within the source image, origin at the top-left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// One image of the atlas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasEntry {
    pub index: usize,
    pub name: String,
    /// Key of the source image this entry was sliced from
    pub source_key: String,
    pub rect: PixelRect,
    /// Authored size in world units
    pub world_size: [f32; 2],
}

/// Ordered set of tile images sliced from one source image.
///
/// Entry 0 is the whole sheet; tiles start at index 1.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteAtlas {
    source: SourceImage,
    entries: Vec<AtlasEntry>,
}

impl SpriteAtlas {
    pub fn new(source: SourceImage, entries: Vec<AtlasEntry>) -> Self {
        Self { source, entries }
    }

    pub fn source(&self) -> &SourceImage {
        &self.source
    }

    pub fn get(&self, index: usize) -> Option<&AtlasEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of paintable tiles (excludes the reserved whole-sheet entry)
    pub fn tile_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }

    /// Paintable entries, in index order
    pub fn tiles(&self) -> impl Iterator<Item = &AtlasEntry> {
        self.entries.iter().skip(1)
    }

    /// Check that `index` addresses a paintable tile
    pub fn validate_tile_index(&self, index: usize) -> Result<usize, PaintError> {
        if index == 0 || index >= self.entries.len() {
            Err(PaintError::StaleAtlasIndex {
                index,
                len: self.entries.len(),
            })
        } else {
            Ok(index)
        }
    }

    /// Clamp a possibly stale index back to the default tile
    pub fn resolve_index(&self, index: usize) -> usize {
        self.validate_tile_index(index).unwrap_or(DEFAULT_SPRITE_INDEX)
    }
}

/// Slices a sheet into fixed-size cells, row-major from the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSlicer {
    pub tile_width: u32,
    pub tile_height: u32,
    /// Authored pixels per world unit
    pub pixels_per_unit: f32,
}

impl Default for GridSlicer {
    fn default() -> Self {
        Self {
            tile_width: 32,
            tile_height: 32,
            pixels_per_unit: 100.0,
        }
    }
}

impl GridSlicer {
    pub fn new(tile_width: u32, tile_height: u32, pixels_per_unit: f32) -> Self {
        Self {
            tile_width,
            tile_height,
            pixels_per_unit,
        }
    }

    fn world_size(&self, width: u32, height: u32) -> [f32; 2] {
        [
            width as f32 / self.pixels_per_unit,
            height as f32 / self.pixels_per_unit,
        ]
    }

    pub fn slice(&self, source: &SourceImage) -> Result<SpriteAtlas, PaintError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(PaintError::AtlasLoad(format!(
                "tile size {}x{} is empty",
                self.tile_width, self.tile_height
            )));
        }
        if self.pixels_per_unit <= 0.0 {
            return Err(PaintError::AtlasLoad(format!(
                "pixels per unit must be positive, got {}",
                self.pixels_per_unit
            )));
        }

        let columns = source.width / self.tile_width;
        let rows = source.height / self.tile_height;
        if columns == 0 || rows == 0 {
            return Err(PaintError::AtlasLoad(format!(
                "{} ({}x{}) is smaller than one {}x{} tile",
                source.key, source.width, source.height, self.tile_width, self.tile_height
            )));
        }

        let mut entries = Vec::with_capacity((columns * rows) as usize + 1);
        entries.push(AtlasEntry {
            index: 0,
            name: source.stem().to_string(),
            source_key: source.key.clone(),
            rect: PixelRect::new(0, 0, source.width, source.height),
            world_size: self.world_size(source.width, source.height),
        });

        for row in 0..rows {
            for column in 0..columns {
                let index = entries.len();
                entries.push(AtlasEntry {
                    index,
                    name: format!("{}_{}", source.stem(), index - 1),
                    source_key: source.key.clone(),
                    rect: PixelRect::new(
                        column * self.tile_width,
                        row * self.tile_height,
                        self.tile_width,
                        self.tile_height,
                    ),
                    world_size: self.world_size(self.tile_width, self.tile_height),
                });
            }
        }

        Ok(SpriteAtlas::new(source.clone(), entries))
    }
}

impl AtlasLoader for GridSlicer {
    fn load_atlas(&mut self, source: &SourceImage) -> Result<SpriteAtlas, PaintError> {
        self.slice(source)
    }
}
