//! bevy_tilepaint_editor - Grid tile painting for Bevy
//!
//! This crate hosts a `bevy_tilepaint_core` paint session inside a Bevy app:
//! - A brush preview that snaps to the grid cell under the cursor
//! - Paint, erase and clear-all against one tile map
//! - Grid overlay and camera framing
//! - An egui inspector with map settings and a tile palette
//!
//! # Usage
//!
//! ```rust,ignore
//! use bevy::prelude::*;
//! use bevy_tilepaint_editor::TilePaintPlugin;
//!
//! fn main() {
//!     App::new()
//!         .add_plugins(DefaultPlugins)
//!         .add_plugins(TilePaintPlugin::new().with_source_image("tiles/terrain.png"))
//!         .run();
//! }
//! ```

pub mod host;
pub mod input;
pub mod preferences;
pub mod render;
pub mod source;
pub mod ui;

pub use bevy_tilepaint_core;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_tilepaint_core::{
    GridSlicer, MapSize, PaintSession, SessionState, SourceImage, TileMap,
};

use input::PainterInputPlugin;
use preferences::PainterPreferences;
use render::PainterRenderPlugin;
use source::{SourceImagePlugin, SourceImageRequest};
use ui::PainterUiPlugin;

/// Default name of the map root entity
pub const DEFAULT_MAP_NAME: &str = "Tilemap";

/// Requests fed to the paint session, applied in order once per frame
#[derive(Message, Debug, Clone, PartialEq)]
pub enum PainterInput {
    SessionEnabled,
    SessionDisabled,
    /// A loaded and registered source image, or `None` to clear it
    SourceImageChanged(Option<SourceImage>),
    MapSizeChanged(MapSize),
    /// Cursor position in the map's local frame
    CursorSampled(Vec2),
    Paint,
    Erase,
    ClearAll,
    SelectSprite(usize),
}

/// The map being painted and the session editing it
#[derive(Resource)]
pub struct Painter {
    pub map: TileMap<Entity>,
    pub session: PaintSession<Entity>,
    /// Slicing applied to newly loaded source images
    pub slicer: GridSlicer,
    /// Last message shown in the inspector status line
    pub status: Option<String>,
}

impl Painter {
    pub fn new(map: TileMap<Entity>, slicer: GridSlicer) -> Self {
        Self {
            map,
            session: PaintSession::new(),
            slicer,
            status: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }
}

/// Runtime display and prompt settings
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PainterSettings {
    pub show_grid: bool,
    /// Ask before clearing all tiles
    pub confirm_clear: bool,
}

impl Default for PainterSettings {
    fn default() -> Self {
        Self {
            show_grid: true,
            confirm_clear: true,
        }
    }
}

/// Initial painter configuration. Unset fields come from saved preferences.
#[derive(Clone, Debug)]
pub struct PainterConfig {
    pub map_name: String,
    pub map_size: Option<MapSize>,
    pub source_image: Option<String>,
    pub slicer: Option<GridSlicer>,
    pub show_grid: Option<bool>,
    /// Start with the session enabled
    pub start_enabled: bool,
}

impl Default for PainterConfig {
    fn default() -> Self {
        Self {
            map_name: DEFAULT_MAP_NAME.to_string(),
            map_size: None,
            source_image: None,
            slicer: None,
            show_grid: None,
            start_enabled: true,
        }
    }
}

/// Main tile painting plugin
///
/// # Example
///
/// ```rust,ignore
/// use bevy::prelude::*;
/// use bevy_tilepaint_core::{GridSlicer, MapSize};
/// use bevy_tilepaint_editor::TilePaintPlugin;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(
///         TilePaintPlugin::new()
///             .with_map_size(MapSize::new(40, 30))
///             .with_slicer(GridSlicer::new(16, 16, 16.0))
///             .with_source_image("tiles/dungeon.png"),
///     )
///     .run();
/// ```
pub struct TilePaintPlugin {
    pub config: PainterConfig,
    /// Read and write the preferences file
    pub use_preferences: bool,
}

impl Default for TilePaintPlugin {
    fn default() -> Self {
        Self {
            config: PainterConfig::default(),
            use_preferences: true,
        }
    }
}

impl TilePaintPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the map root entity (default: "Tilemap")
    pub fn with_map_name(mut self, name: impl Into<String>) -> Self {
        self.config.map_name = name.into();
        self
    }

    pub fn with_map_size(mut self, map_size: MapSize) -> Self {
        self.config.map_size = Some(map_size);
        self
    }

    /// Asset path of the sprite sheet to open on startup
    pub fn with_source_image(mut self, path: impl Into<String>) -> Self {
        self.config.source_image = Some(path.into());
        self
    }

    pub fn with_slicer(mut self, slicer: GridSlicer) -> Self {
        self.config.slicer = Some(slicer);
        self
    }

    pub fn with_grid(mut self, show: bool) -> Self {
        self.config.show_grid = Some(show);
        self
    }

    /// Start with the session disabled (default: enabled)
    pub fn start_disabled(mut self) -> Self {
        self.config.start_enabled = false;
        self
    }

    /// Ignore the preferences file entirely
    pub fn without_preferences(mut self) -> Self {
        self.use_preferences = false;
        self
    }
}

impl Plugin for TilePaintPlugin {
    fn build(&self, app: &mut App) {
        let preferences = if self.use_preferences {
            let prefs = PainterPreferences::load();
            bevy::log::info!("Loaded painter preferences");
            prefs
        } else {
            PainterPreferences::default()
        };

        // Plugin config takes precedence over saved preferences
        let map_size = self
            .config
            .map_size
            .unwrap_or(preferences.map_size)
            .validate()
            .unwrap_or_else(|e| {
                bevy::log::warn!("{}; falling back to the default map size", e);
                MapSize::default()
            });
        let slicer = self.config.slicer.unwrap_or(preferences.slicer);
        let settings = PainterSettings {
            show_grid: self.config.show_grid.unwrap_or(preferences.show_grid),
            confirm_clear: preferences.confirm_clear,
        };
        let startup = StartupRequests {
            enable: self.config.start_enabled,
            source_image: self
                .config
                .source_image
                .clone()
                .or_else(|| preferences.last_source_image.clone()),
        };

        let name = self.config.map_name.clone();
        let root = app
            .world_mut()
            .spawn((Name::new(name.clone()), Transform::default(), Visibility::default()))
            .id();
        let map = match TileMap::new(name, root, map_size) {
            Ok(map) => map,
            Err(e) => {
                bevy::log::error!("TilePaintPlugin: could not create map: {}", e);
                return;
            }
        };
        bevy::log::info!(
            "TilePaintPlugin: map '{}' ({}x{})",
            map.name,
            map_size.width,
            map_size.height
        );

        app.add_message::<PainterInput>()
            .insert_resource(Painter::new(map, slicer))
            .insert_resource(settings)
            .insert_resource(preferences)
            .insert_resource(PreferencesEnabled(self.use_preferences))
            .insert_resource(startup)
            .add_plugins(EguiPlugin::default())
            .add_plugins(SourceImagePlugin)
            .add_plugins(PainterInputPlugin)
            .add_plugins(PainterRenderPlugin)
            .add_plugins(PainterUiPlugin)
            .add_systems(Startup, (setup_painter_camera, send_startup_requests));
    }
}

/// Whether preference changes are written back to disk
#[derive(Resource, Debug, Clone, Copy)]
pub struct PreferencesEnabled(pub bool);

#[derive(Resource, Debug, Clone)]
struct StartupRequests {
    enable: bool,
    source_image: Option<String>,
}

/// Spawns the camera if one doesn't exist
fn setup_painter_camera(mut commands: Commands, camera_query: Query<&Camera2d>) {
    if camera_query.is_empty() {
        commands.spawn(Camera2d);
    }
}

fn send_startup_requests(
    mut commands: Commands,
    startup: Res<StartupRequests>,
    mut inputs: MessageWriter<PainterInput>,
    mut requests: MessageWriter<SourceImageRequest>,
) {
    if startup.enable {
        inputs.write(PainterInput::SessionEnabled);
    }
    if let Some(path) = &startup.source_image {
        requests.write(SourceImageRequest::Load(path.clone()));
    }
    commands.remove_resource::<StartupRequests>();
}
