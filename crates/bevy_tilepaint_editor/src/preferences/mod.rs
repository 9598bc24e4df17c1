//! Persisted editor preferences

mod file;

pub use file::PreferencesError;

use bevy::prelude::*;
use bevy_tilepaint_core::{GridSlicer, MapSize};
use serde::{Deserialize, Serialize};

/// User preferences, stored as JSON in the platform config directory
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PainterPreferences {
    /// Map size for new maps
    pub map_size: MapSize,
    /// How source images are sliced into tiles
    pub slicer: GridSlicer,
    pub show_grid: bool,
    /// Ask before clearing all tiles
    pub confirm_clear: bool,
    /// Source image to reopen on startup
    pub last_source_image: Option<String>,
}

impl Default for PainterPreferences {
    fn default() -> Self {
        Self {
            map_size: MapSize::default(),
            slicer: GridSlicer::default(),
            show_grid: true,
            confirm_clear: true,
            last_source_image: None,
        }
    }
}
