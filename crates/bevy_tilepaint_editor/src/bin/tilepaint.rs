//! Standalone tile painter binary
//!
//! Run with: tilepaint [image-path]
//!
//! Left click paints, Shift+left click erases, Tab toggles editing and
//! Ctrl+Delete clears every tile.

use bevy::asset::{AssetPlugin, UnapprovedPathMode};
use bevy::image::{ImageFilterMode, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_tilepaint_editor::TilePaintPlugin;

fn main() {
    let mut plugin = TilePaintPlugin::new();
    if let Some(path) = std::env::args().nth(1) {
        plugin = plugin.with_source_image(path);
    }

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Tile Painter".to_string(),
                        resolution: WindowResolution::new(1280, 800),
                        ..default()
                    }),
                    ..default()
                })
                .set(ImagePlugin {
                    // Pixel-perfect rendering: use Nearest (point) sampling for crisp pixel art
                    default_sampler: ImageSamplerDescriptor {
                        mag_filter: ImageFilterMode::Nearest,
                        min_filter: ImageFilterMode::Nearest,
                        mipmap_filter: ImageFilterMode::Nearest,
                        ..default()
                    },
                })
                .set(AssetPlugin {
                    // Source images may live anywhere on disk
                    unapproved_path_mode: UnapprovedPathMode::Allow,
                    ..default()
                }),
        )
        .add_plugins(plugin)
        .run();
}
