//! Source image loading
//!
//! A source image is loaded through the `AssetServer`, sliced, and its
//! textures registered before the session is told about it, so every sprite
//! the session creates can be drawn straight away.

use bevy::asset::LoadState;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiTextureHandle};
use bevy_tilepaint_core::SourceImage;

use crate::host::AtlasTextureCache;
use crate::input::PainterSystems;
use crate::{Painter, PainterInput};

/// Plugin for source image loading
pub struct SourceImagePlugin;

impl Plugin for SourceImagePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<SourceImageRequest>()
            .init_resource::<AtlasTextureCache>()
            .init_resource::<PendingSource>()
            .add_systems(
                Update,
                (start_source_loads, poll_source_load)
                    .chain()
                    .before(PainterSystems::Apply),
            );
    }
}

/// Change the map's source image
#[derive(Message, Debug, Clone, PartialEq)]
pub enum SourceImageRequest {
    /// Load an image by asset path
    Load(String),
    /// Drop the current image
    Clear,
}

/// The image currently being loaded, if any
#[derive(Resource, Default)]
pub struct PendingSource {
    pub load: Option<(String, Handle<Image>)>,
}

impl PendingSource {
    pub fn is_loading(&self) -> bool {
        self.load.is_some()
    }
}

/// Convert a path to a format Bevy's AssetServer can load
pub fn to_asset_path(path: &str) -> String {
    path.trim().replace('\\', "/")
}

fn start_source_loads(
    mut requests: MessageReader<SourceImageRequest>,
    mut pending: ResMut<PendingSource>,
    mut painter: ResMut<Painter>,
    mut inputs: MessageWriter<PainterInput>,
    asset_server: Res<AssetServer>,
) {
    for request in requests.read() {
        match request {
            SourceImageRequest::Load(path) => {
                let path = to_asset_path(path);
                if path.is_empty() {
                    painter.set_status("No image path given");
                    continue;
                }
                info!("Loading source image {}", path);
                let handle: Handle<Image> = asset_server.load(path.clone());
                pending.load = Some((path, handle));
            }
            SourceImageRequest::Clear => {
                pending.load = None;
                inputs.write(PainterInput::SourceImageChanged(None));
            }
        }
    }
}

fn poll_source_load(
    mut pending: ResMut<PendingSource>,
    mut cache: ResMut<AtlasTextureCache>,
    mut painter: ResMut<Painter>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    mut contexts: EguiContexts,
    mut inputs: MessageWriter<PainterInput>,
    asset_server: Res<AssetServer>,
    images: Res<Assets<Image>>,
) {
    let Some((path, handle)) = pending.load.clone() else {
        return;
    };

    match asset_server.load_state(&handle) {
        LoadState::Loaded => {
            let Some(image) = images.get(&handle) else {
                return;
            };
            pending.load = None;

            let source = SourceImage::new(path.clone(), image.width(), image.height());
            match painter.slicer.slice(&source) {
                Ok(atlas) => {
                    cache.register(&atlas, handle.clone(), &mut layouts);
                    let texture_id = contexts.add_image(EguiTextureHandle::Strong(handle));
                    if let Some(cached) = cache.loaded.get_mut(&path) {
                        cached.egui_texture = Some(texture_id);
                    }
                    debug!(
                        "Sliced {} ({}x{}) into {} tiles",
                        path,
                        source.width,
                        source.height,
                        atlas.tile_count()
                    );
                    inputs.write(PainterInput::SourceImageChanged(Some(source)));
                }
                Err(e) => {
                    warn!("Could not slice {}: {}", path, e);
                    painter.set_status(e.to_string());
                }
            }
        }
        LoadState::Failed(e) => {
            pending.load = None;
            warn!("Failed to load source image {}: {}", path, e);
            painter.set_status(format!("Failed to load: {}", path));
        }
        LoadState::Loading | LoadState::NotLoaded => {}
    }
}
