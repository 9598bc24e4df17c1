//! Grid overlay, camera framing and brush tint
//!
//! Tiles and the brush are plain sprites created by the session; this module
//! only draws what the session doesn't own.

use bevy::prelude::*;
use bevy_tilepaint_core::{GridLine, MapConfig, BRUSH_OBJECT_NAME};

use crate::input::PainterSystems;
use crate::{Painter, PainterSettings};

/// Z offset of the grid overlay, above tiles and brush
pub const GRID_Z: f32 = 2.0;

/// Brush preview tint
pub const BRUSH_TINT: Color = Color::srgba(1.0, 1.0, 1.0, 0.6);

const GRID_COLOR: Color = Color::srgba(0.5, 0.5, 0.5, 0.5);
const BORDER_COLOR: Color = Color::WHITE;

/// Fraction of the viewport left around the grid when framing
const FRAME_MARGIN: f32 = 1.2;

/// Plugin for painter rendering
pub struct PainterRenderPlugin;

impl Plugin for PainterRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GridRenderState>().add_systems(
            Update,
            (sync_grid_rendering, frame_camera_on_grid, tint_brush).after(PainterSystems::Apply),
        );
    }
}

/// Marker component for the grid overlay
#[derive(Component)]
pub struct GridLineMarker;

/// Tracks the spawned grid overlay
#[derive(Resource, Default)]
pub struct GridRenderState {
    /// Grid line entities
    pub grid_entities: Vec<Entity>,
    /// Configuration and visibility the grid was last built for
    pub last_grid: Option<(Option<MapConfig>, bool)>,
    /// Configuration the camera was last framed on
    pub last_framed: Option<MapConfig>,
}

/// Center and size of the sprite that draws `line` with the given thickness
pub fn line_sprite_geometry(line: &GridLine, thickness: f32) -> (Vec2, Vec2) {
    let start = Vec2::from(line.start);
    let end = Vec2::from(line.end);
    let extent = (end - start).abs();
    (
        (start + end) / 2.0,
        Vec2::new(extent.x.max(thickness), extent.y.max(thickness)),
    )
}

/// Orthographic scale that fits `content` into `viewport` with a margin
pub fn fit_scale(content: Vec2, viewport: Vec2) -> f32 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return 1.0;
    }
    (content.x / viewport.x).max(content.y / viewport.y) * FRAME_MARGIN
}

fn sync_grid_rendering(
    mut commands: Commands,
    mut render_state: ResMut<GridRenderState>,
    painter: Res<Painter>,
    settings: Res<PainterSettings>,
) {
    let config = painter.map.config().copied();
    let key = (config, settings.show_grid);
    if render_state.last_grid == Some(key) {
        return;
    }

    for entity in render_state.grid_entities.drain(..) {
        let _ = commands.get_entity(entity).map(|mut e| e.despawn());
    }
    render_state.last_grid = Some(key);

    let (Some(config), true) = key else {
        return;
    };

    // One source pixel wide
    let thickness = 1.0 / config.pixels_to_units() as f32;
    let lines = config.grid_lines();
    let columns = config.map_size().width as usize + 1;
    let root = painter.map.root();

    for (i, line) in lines.iter().enumerate() {
        let border = i == 0 || i == columns - 1 || i == columns || i == lines.len() - 1;
        let (center, size) = line_sprite_geometry(line, thickness);
        let entity = commands
            .spawn((
                Name::new("GridLine"),
                Sprite {
                    color: if border { BORDER_COLOR } else { GRID_COLOR },
                    custom_size: Some(size),
                    ..default()
                },
                Transform::from_translation(center.extend(GRID_Z)),
                GridLineMarker,
                ChildOf(root),
            ))
            .id();
        render_state.grid_entities.push(entity);
    }
}

fn frame_camera_on_grid(
    mut render_state: ResMut<GridRenderState>,
    painter: Res<Painter>,
    windows: Query<&Window>,
    root_q: Query<&GlobalTransform>,
    mut camera_q: Query<(&mut Transform, &mut Projection), With<Camera2d>>,
) {
    let Some(config) = painter.map.config().copied() else {
        return;
    };
    if render_state.last_framed == Some(config) {
        return;
    }
    let Some(window) = windows.iter().next() else {
        return;
    };
    let Ok(root) = root_q.get(painter.map.root()) else {
        return;
    };

    let center = root.transform_point(Vec2::from(config.grid_center()).extend(0.0));
    let scale = fit_scale(
        Vec2::from(config.grid_size_units()),
        Vec2::new(window.width(), window.height()),
    );

    for (mut transform, mut projection) in camera_q.iter_mut() {
        transform.translation.x = center.x;
        transform.translation.y = center.y;
        if let Projection::Orthographic(ref mut ortho) = *projection {
            ortho.scale = scale;
        }
    }
    render_state.last_framed = Some(config);
}

fn tint_brush(mut sprites: Query<(&Name, &mut Sprite), Changed<Sprite>>) {
    for (name, mut sprite) in sprites.iter_mut() {
        if name.as_str() == BRUSH_OBJECT_NAME && sprite.color != BRUSH_TINT {
            sprite.color = BRUSH_TINT;
        }
    }
}
