//! Viewport input and the paint session driver
//!
//! Mouse and keyboard input become `PainterInput` messages, and
//! `apply_painter_input` feeds them to the session in order.

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use bevy_tilepaint_core::{
    CellCoord, ClearOutcome, EraseOutcome, PaintError, PaintOutcome, SessionState,
};

use crate::host::{AtlasTextureCache, BevySceneHost, ConfirmMode};
use crate::preferences::PainterPreferences;
use crate::{Painter, PainterInput, PainterSettings, PreferencesEnabled};

/// Warning shown while the map has no source image
pub const NO_SOURCE_WARNING: &str = "You haven't selected a Tilemap/2D Texture yet.";

/// Ordering of the painter's frame
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PainterSystems {
    /// Turn raw input into `PainterInput`
    Input,
    /// Apply `PainterInput` to the session
    Apply,
}

/// Plugin for viewport input
pub struct PainterInputPlugin;

impl Plugin for PainterInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ViewportInputState>()
            .configure_sets(Update, (PainterSystems::Input, PainterSystems::Apply).chain())
            .add_systems(
                Update,
                (handle_keyboard_shortcuts, handle_viewport_input)
                    .chain()
                    .in_set(PainterSystems::Input),
            )
            .add_systems(Update, apply_painter_input.in_set(PainterSystems::Apply));
    }
}

/// State for viewport input handling
#[derive(Resource, Default)]
pub struct ViewportInputState {
    /// Last cursor position in the map's local frame
    pub last_local_pos: Option<Vec2>,
    /// Cell last painted or erased during the current stroke
    pub stroke_cell: Option<CellCoord>,
}

/// Convert a world position into the local frame of the map root
pub fn world_to_map_local(root: &GlobalTransform, world: Vec2) -> Vec2 {
    root.affine()
        .inverse()
        .transform_point3(world.extend(0.0))
        .truncate()
}

fn handle_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    painter: Res<Painter>,
    mut contexts: EguiContexts,
    mut inputs: MessageWriter<PainterInput>,
) {
    // Text fields keep their keys
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return;
        }
    }

    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);

    // Tab - toggle the session
    if keyboard.just_pressed(KeyCode::Tab) {
        match painter.state() {
            SessionState::Disabled => inputs.write(PainterInput::SessionEnabled),
            _ => inputs.write(PainterInput::SessionDisabled),
        };
    }

    // Ctrl+Delete - clear all tiles
    if ctrl && keyboard.just_pressed(KeyCode::Delete) {
        inputs.write(PainterInput::ClearAll);
    }
}

fn handle_viewport_input(
    mut contexts: EguiContexts,
    mut input_state: ResMut<ViewportInputState>,
    mut inputs: MessageWriter<PainterInput>,
    painter: Res<Painter>,
    windows: Query<&Window>,
    camera_q: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    root_q: Query<&GlobalTransform>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    keyboard: Res<ButtonInput<KeyCode>>,
) {
    if !mouse_buttons.pressed(MouseButton::Left) {
        input_state.stroke_cell = None;
    }

    if painter.state() != SessionState::Ready {
        return;
    }

    let Some(window) = windows.iter().next() else {
        return;
    };
    let Some((camera, camera_transform)) = camera_q.iter().next() else {
        return;
    };
    let Some(cursor_position) = window.cursor_position() else {
        return;
    };

    // The inspector window keeps the pointer
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.is_pointer_over_area() {
            return;
        }
    }

    let Ok(world_pos) = camera.viewport_to_world_2d(camera_transform, cursor_position) else {
        return;
    };
    let Ok(root) = root_q.get(painter.map.root()) else {
        return;
    };
    let local = world_to_map_local(root, world_pos);

    if input_state.last_local_pos != Some(local) {
        input_state.last_local_pos = Some(local);
        inputs.write(PainterInput::CursorSampled(local));
    }

    if !mouse_buttons.pressed(MouseButton::Left) {
        return;
    }
    let Some(config) = painter.map.config() else {
        return;
    };
    if !config.is_within_bounds(local.to_array()) {
        return;
    }

    // One paint or erase per cell per stroke
    let cell = config.world_to_cell(local.to_array());
    if mouse_buttons.just_pressed(MouseButton::Left) || input_state.stroke_cell != Some(cell) {
        input_state.stroke_cell = Some(cell);
        let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);
        inputs.write(if shift {
            PainterInput::Erase
        } else {
            PainterInput::Paint
        });
    }
}

/// Apply queued input to the paint session
pub fn apply_painter_input(
    mut commands: Commands,
    mut inputs: MessageReader<PainterInput>,
    mut painter: ResMut<Painter>,
    mut preferences: ResMut<PainterPreferences>,
    cache: Res<AtlasTextureCache>,
    settings: Res<PainterSettings>,
    preferences_enabled: Res<PreferencesEnabled>,
) {
    let confirm = if settings.confirm_clear {
        ConfirmMode::Dialog
    } else {
        ConfirmMode::Always
    };
    let mut host = BevySceneHost::new(&mut commands, &cache, confirm);
    let Painter {
        map,
        session,
        slicer,
        status,
    } = &mut *painter;
    let mut preferences_changed = false;

    for input in inputs.read() {
        match input {
            PainterInput::SessionEnabled => match session.on_session_enabled(map, &mut host) {
                Ok(state) => {
                    info!("Paint session enabled on '{}' ({:?})", map.name, state);
                    if state == SessionState::Inactive {
                        *status = Some(NO_SOURCE_WARNING.to_string());
                    }
                }
                Err(e) => {
                    warn!("Could not enable paint session: {}", e);
                    *status = Some(e.to_string());
                }
            },
            PainterInput::SessionDisabled => {
                session.on_session_disabled(&mut host);
                info!(
                    "Paint session disabled; '{}' keeps {} tiles",
                    map.name,
                    map.tiles().len()
                );
            }
            PainterInput::SourceImageChanged(source) => {
                let key = source.as_ref().map(|s| s.key.clone());
                match session.on_source_image_changed(map, &mut host, slicer, source.clone()) {
                    Ok(state) => {
                        match (&key, map.atlas()) {
                            (Some(key), Some(atlas)) => info!(
                                "Atlas rebuilt from {}: {} tiles ({:?})",
                                key,
                                atlas.tile_count(),
                                state
                            ),
                            _ => info!("Source image cleared ({:?})", state),
                        }
                        *status = None;
                        preferences.last_source_image = key;
                        preferences_changed = true;
                    }
                    Err(e) => {
                        warn!("Could not change source image: {}", e);
                        *status = Some(e.to_string());
                    }
                }
            }
            PainterInput::MapSizeChanged(map_size) => {
                match session.on_map_size_changed(map, &mut host, *map_size) {
                    Ok(dropped) => {
                        info!(
                            "Map resized to {}x{}; {} tiles dropped",
                            map_size.width, map_size.height, dropped
                        );
                        *status = None;
                    }
                    Err(PaintError::NoSourceImage) => {
                        debug!(
                            "Map size {}x{} stored; grid waits for a source image",
                            map_size.width, map_size.height
                        );
                    }
                    Err(e) => {
                        warn!("Could not resize map: {}", e);
                        *status = Some(e.to_string());
                    }
                }
                if preferences.map_size != map.map_size() {
                    preferences.map_size = map.map_size();
                    preferences_changed = true;
                }
            }
            PainterInput::CursorSampled(local) => {
                session.on_cursor_position_sampled(map, &mut host, local.to_array());
            }
            PainterInput::Paint => match session.on_paint_triggered(map, &mut host) {
                PaintOutcome::Created(cell_id) => info!("Painted {}", cell_id.object_name()),
                PaintOutcome::Overwritten(cell_id) => {
                    debug!("Overwrote {}", cell_id.object_name())
                }
                outcome => debug!("Paint ignored: {:?}", outcome),
            },
            PainterInput::Erase => match session.on_erase_triggered(map, &mut host) {
                EraseOutcome::Erased(cell_id) => info!("Erased {}", cell_id.object_name()),
                outcome => debug!("Erase ignored: {:?}", outcome),
            },
            PainterInput::ClearAll => match session.on_clear_all_triggered(map, &mut host) {
                ClearOutcome::Cleared(count) => {
                    info!("Cleared {} tiles from '{}'", count, map.name);
                    *status = Some(format!("Cleared {} tiles", count));
                }
                ClearOutcome::Declined => info!("Clear all declined"),
                ClearOutcome::NotReady => debug!("Clear all ignored: session disabled"),
            },
            PainterInput::SelectSprite(index) => {
                match session.select_sprite(map, &mut host, *index) {
                    Ok(()) => debug!("Selected sprite {}", index),
                    Err(e) => {
                        warn!("Could not select sprite: {}", e);
                        *status = Some(e.to_string());
                    }
                }
            }
        }
    }

    if preferences_changed && preferences_enabled.0 {
        if let Err(e) = preferences.save() {
            error!("Failed to save preferences: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_tilepaint_core::{GridSlicer, MapSize, SourceImage, TileMap, BRUSH_OBJECT_NAME};

    fn painter_app() -> App {
        let mut app = App::new();
        let root = app
            .world_mut()
            .spawn((Name::new("Tilemap"), Transform::default(), Visibility::default()))
            .id();
        let map = TileMap::new("Tilemap", root, MapSize::new(4, 4)).unwrap();

        app.add_message::<PainterInput>()
            .insert_resource(Painter::new(map, GridSlicer::new(100, 100, 100.0)))
            .insert_resource(PainterSettings {
                show_grid: true,
                confirm_clear: false,
            })
            .insert_resource(PainterPreferences::default())
            .insert_resource(PreferencesEnabled(false))
            .init_resource::<AtlasTextureCache>()
            .add_systems(Update, apply_painter_input);
        app
    }

    fn send(app: &mut App, inputs: impl IntoIterator<Item = PainterInput>) {
        for input in inputs {
            app.world_mut().write_message(input);
        }
        app.update();
    }

    fn names(app: &mut App, prefix: &str) -> Vec<String> {
        let mut query = app.world_mut().query::<&Name>();
        let mut names: Vec<String> = query
            .iter(app.world())
            .map(|n| n.as_str().to_string())
            .filter(|n| n.starts_with(prefix))
            .collect();
        names.sort();
        names
    }

    fn ready(app: &mut App) {
        send(
            app,
            [
                PainterInput::SessionEnabled,
                PainterInput::SourceImageChanged(Some(SourceImage::new(
                    "tiles/sheet.png",
                    400,
                    200,
                ))),
            ],
        );
    }

    #[test]
    fn test_world_to_map_local_applies_root_transform() {
        let root = GlobalTransform::from(Transform::from_xyz(10.0, 5.0, 0.0));
        let local = world_to_map_local(&root, Vec2::new(12.5, 3.7));
        assert!((local - Vec2::new(2.5, -1.3)).length() < 1e-5);
    }

    #[test]
    fn test_enable_without_source_sets_warning() {
        let mut app = painter_app();
        send(&mut app, [PainterInput::SessionEnabled]);

        let painter = app.world().resource::<Painter>();
        assert_eq!(painter.state(), SessionState::Inactive);
        assert_eq!(painter.status.as_deref(), Some(NO_SOURCE_WARNING));
    }

    #[test]
    fn test_source_change_spawns_brush() {
        let mut app = painter_app();
        ready(&mut app);

        assert_eq!(app.world().resource::<Painter>().state(), SessionState::Ready);
        assert_eq!(names(&mut app, BRUSH_OBJECT_NAME), vec![BRUSH_OBJECT_NAME]);
        assert_eq!(
            app.world()
                .resource::<PainterPreferences>()
                .last_source_image
                .as_deref(),
            Some("tiles/sheet.png")
        );
    }

    #[test]
    fn test_paint_and_erase_spawn_and_despawn_tiles() {
        let mut app = painter_app();
        ready(&mut app);

        send(
            &mut app,
            [
                PainterInput::CursorSampled(Vec2::new(2.5, -1.3)),
                PainterInput::Paint,
            ],
        );
        assert_eq!(names(&mut app, "Tile_"), vec!["Tile_6"]);

        send(&mut app, [PainterInput::Erase]);
        assert!(names(&mut app, "Tile_").is_empty());
    }

    #[test]
    fn test_clear_all_without_prompt() {
        let mut app = painter_app();
        ready(&mut app);

        send(
            &mut app,
            [
                PainterInput::CursorSampled(Vec2::new(0.5, -0.5)),
                PainterInput::Paint,
                PainterInput::CursorSampled(Vec2::new(3.5, -3.5)),
                PainterInput::Paint,
                PainterInput::ClearAll,
            ],
        );

        assert!(names(&mut app, "Tile_").is_empty());
        assert!(app.world().resource::<Painter>().map.tiles().is_empty());
        assert_eq!(
            app.world().resource::<Painter>().status.as_deref(),
            Some("Cleared 2 tiles")
        );
    }

    #[test]
    fn test_map_size_change_without_source_updates_preferences() {
        let mut app = painter_app();
        send(&mut app, [PainterInput::MapSizeChanged(MapSize::new(8, 2))]);

        assert_eq!(
            app.world().resource::<Painter>().map.map_size(),
            MapSize::new(8, 2)
        );
        assert_eq!(
            app.world().resource::<PainterPreferences>().map_size,
            MapSize::new(8, 2)
        );
    }

    #[test]
    fn test_stale_sprite_selection_sets_status() {
        let mut app = painter_app();
        ready(&mut app);
        send(&mut app, [PainterInput::SelectSprite(99)]);

        let painter = app.world().resource::<Painter>();
        assert_eq!(painter.map.selected_sprite(), 1);
        assert!(painter.status.is_some());
    }
}
