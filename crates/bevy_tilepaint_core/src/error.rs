//! Error type shared by the grid model and the paint session

/// Errors produced while configuring a map or editing it
#[derive(Debug, Clone, PartialEq)]
pub enum PaintError {
    /// Grid recompute attempted without a source image or atlas
    NoSourceImage,
    /// Sprite index does not address a tile in the current atlas
    StaleAtlasIndex { index: usize, len: usize },
    /// The representative atlas entry has unusable geometry
    InvalidTileGeometry(String),
    /// Map size must be at least one cell on each axis
    InvalidMapSize { width: u32, height: u32 },
    /// The atlas loader could not slice the source image
    AtlasLoad(String),
}

impl std::fmt::Display for PaintError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaintError::NoSourceImage => write!(f, "No source image selected"),
            PaintError::StaleAtlasIndex { index, len } => {
                write!(f, "Sprite index {} is out of range for atlas of {} entries", index, len)
            }
            PaintError::InvalidTileGeometry(e) => write!(f, "Invalid tile geometry: {}", e),
            PaintError::InvalidMapSize { width, height } => {
                write!(f, "Invalid map size: {}x{}", width, height)
            }
            PaintError::AtlasLoad(e) => write!(f, "Atlas load error: {}", e),
        }
    }
}

impl std::error::Error for PaintError {}
