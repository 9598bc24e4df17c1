//! Core data structures for bevy_tilepaint
//!
//! This crate is engine-free. It provides:
//! - `GridModel` / `MapConfig` - grid geometry derived from a sliced sprite sheet
//! - `SpriteAtlas` - ordered tile images, entry 0 reserved for the whole sheet
//! - `TileMap` - a map with its placed tiles keyed by cell identifier
//! - `PaintSession` - the brush and paint/erase/clear state machine
//! - `SceneHost` / `AtlasLoader` - the narrow interface a host engine implements

mod atlas;
mod brush;
mod error;
mod grid;
mod host;
mod map;
mod session;
mod tile;

#[cfg(test)]
mod testing;

pub use atlas::{AtlasEntry, GridSlicer, PixelRect, SourceImage, SpriteAtlas};
pub use brush::BrushState;
pub use error::PaintError;
pub use grid::{
    CellCoord, CellId, GridLine, GridModel, MapConfig, MapSize, DEFAULT_PIXELS_TO_UNITS,
};
pub use host::{AtlasLoader, SceneHost};
pub use map::TileMap;
pub use session::{ClearOutcome, EraseOutcome, PaintOutcome, PaintSession, SessionState};
pub use tile::{PlacedTile, TileCollection};

/// Atlas index used to read tile geometry and as the default brush sprite.
/// Index 0 holds the whole sheet.
pub const REPRESENTATIVE_INDEX: usize = 1;

/// Sprite index the brush falls back to after the source image changes
pub const DEFAULT_SPRITE_INDEX: usize = REPRESENTATIVE_INDEX;

/// Scene object name of the brush preview
pub const BRUSH_OBJECT_NAME: &str = "Brush";

/// Scene object name of the container placed tiles are parented to
pub const TILES_OBJECT_NAME: &str = "Tiles";

/// Z offset for placed tiles within the map's local frame
pub const TILE_Z: f32 = 0.0;

/// Z offset for the brush preview, drawn above placed tiles
pub const BRUSH_Z: f32 = 1.0;
