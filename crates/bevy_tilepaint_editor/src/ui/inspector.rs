//! Tile map inspector window

use bevy::math::UVec2;
use bevy_egui::egui;
use bevy_tilepaint_core::{MapSize, PixelRect, SessionState};

use super::UiState;
use crate::host::AtlasTextureCache;
use crate::input::NO_SOURCE_WARNING;
use crate::source::PendingSource;
use crate::{Painter, PainterSettings};

/// Largest map side the size fields accept
pub const MAX_MAP_SIDE: u32 = 512;

const PALETTE_TILE_SIZE: egui::Vec2 = egui::vec2(32.0, 32.0);
const SELECTED_COLOR: egui::Color32 = egui::Color32::from_rgb(66, 150, 250);

/// Result from rendering the inspector
#[derive(Default, Debug, PartialEq)]
pub struct InspectorResult {
    pub set_session_enabled: Option<bool>,
    pub map_size: Option<MapSize>,
    pub load_source: Option<String>,
    pub clear_source: bool,
    pub select_sprite: Option<usize>,
    pub clear_all: bool,
    /// Grid or prompt settings were toggled
    pub settings_changed: bool,
}

/// Render the inspector window
pub fn render_inspector(
    ctx: &egui::Context,
    ui_state: &mut UiState,
    settings: &mut PainterSettings,
    painter: &Painter,
    pending: &PendingSource,
    cache: &AtlasTextureCache,
) -> InspectorResult {
    let mut result = InspectorResult::default();

    egui::Window::new("Tile Map")
        .default_pos([12.0, 12.0])
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading(&painter.map.name);
            ui.separator();

            let mut enabled = painter.state() != SessionState::Disabled;
            if ui.checkbox(&mut enabled, "Editing (Tab)").changed() {
                result.set_session_enabled = Some(enabled);
            }

            render_map_size(ui, ui_state, painter.map.map_size(), &mut result);
            ui.separator();
            render_source(ui, ui_state, painter, pending, &mut result);
            ui.separator();

            if ui.checkbox(&mut settings.show_grid, "Show Grid").changed() {
                result.settings_changed = true;
            }
            if ui
                .checkbox(&mut settings.confirm_clear, "Confirm before clearing")
                .changed()
            {
                result.settings_changed = true;
            }

            if painter.map.atlas().is_some() {
                ui.separator();
                ui.label("Tiles");
                render_palette(ui, painter, cache, &mut result);
            }

            ui.separator();
            if let Some(brush) = painter.session.brush() {
                if let Some(cell) = brush.cell {
                    ui.label(format!("Brush: row {}, column {}", cell.row, cell.column));
                }
            }
            ui.label(format!("{} tiles placed", painter.map.tiles().len()));

            let can_clear = painter.state() != SessionState::Disabled;
            if ui
                .add_enabled(can_clear, egui::Button::new("Clear All Tiles"))
                .clicked()
            {
                result.clear_all = true;
            }

            if let Some(status) = &painter.status {
                ui.label(status);
            }
        });

    result
}

fn render_map_size(
    ui: &mut egui::Ui,
    ui_state: &mut UiState,
    current: MapSize,
    result: &mut InspectorResult,
) {
    let mut edit = ui_state.map_size.unwrap_or(current);

    ui.horizontal(|ui| {
        ui.label("Map Size");
        let width = ui.add(
            egui::DragValue::new(&mut edit.width)
                .range(1..=MAX_MAP_SIDE)
                .prefix("X: "),
        );
        let height = ui.add(
            egui::DragValue::new(&mut edit.height)
                .range(1..=MAX_MAP_SIDE)
                .prefix("Y: "),
        );

        // Dragging a field would re-key tiles every frame; commit on release
        let committed = [&width, &height].iter().any(|r| {
            r.drag_stopped() || r.lost_focus() || (r.changed() && !r.dragged() && !r.has_focus())
        });
        let editing = [&width, &height].iter().any(|r| r.dragged() || r.has_focus());

        if committed && edit != current {
            result.map_size = Some(edit);
            ui_state.map_size = None;
        } else if editing {
            ui_state.map_size = Some(edit);
        } else {
            ui_state.map_size = None;
        }
    });
}

fn render_source(
    ui: &mut egui::Ui,
    ui_state: &mut UiState,
    painter: &Painter,
    pending: &PendingSource,
    result: &mut InspectorResult,
) {
    ui.label("Texture 2D:");
    ui.horizontal(|ui| {
        ui.text_edit_singleline(&mut ui_state.source_path);

        #[cfg(feature = "native")]
        {
            if ui.button("Browse...").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Image", &["png", "jpg", "jpeg", "bmp", "tga", "webp"])
                    .pick_file()
                {
                    ui_state.source_path = path.to_string_lossy().to_string();
                    result.load_source = Some(ui_state.source_path.clone());
                }
            }
        }
    });

    ui.horizontal(|ui| {
        let can_load = !ui_state.source_path.trim().is_empty() && !pending.is_loading();
        if ui.add_enabled(can_load, egui::Button::new("Load")).clicked() {
            result.load_source = Some(ui_state.source_path.clone());
        }
        if ui
            .add_enabled(painter.map.source().is_some(), egui::Button::new("Clear"))
            .clicked()
        {
            result.clear_source = true;
            ui_state.source_path.clear();
        }
        if pending.is_loading() {
            ui.spinner();
        }
    });

    match (painter.map.source(), painter.map.config()) {
        (Some(_), Some(config)) => {
            let [tile_w, tile_h] = config.tile_size_pixels();
            let [grid_w, grid_h] = config.grid_size_units();
            ui.label(format!("Tile Size: {} x {}", tile_w, tile_h));
            ui.label(format!("Grid Size in Units: {} x {}", grid_w, grid_h));
            ui.label(format!("Pixels to Units: {}", config.pixels_to_units()));
        }
        _ => {
            ui.colored_label(egui::Color32::YELLOW, NO_SOURCE_WARNING);
        }
    }
}

fn render_palette(
    ui: &mut egui::Ui,
    painter: &Painter,
    cache: &AtlasTextureCache,
    result: &mut InspectorResult,
) {
    let Some(atlas) = painter.map.atlas() else {
        return;
    };
    let selected = painter.map.selected_sprite();
    let texture = cache
        .get(&atlas.source().key)
        .and_then(|cached| cached.egui_texture.map(|id| (id, cached.size)));

    egui::ScrollArea::vertical()
        .max_height(240.0)
        .show(ui, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.spacing_mut().item_spacing = egui::vec2(1.0, 1.0);
                for entry in atlas.tiles() {
                    let is_selected = entry.index == selected;
                    let response = match texture {
                        Some((texture_id, size)) => {
                            #[allow(deprecated)]
                            let response = ui.add(
                                egui::ImageButton::new(egui::load::SizedTexture::new(
                                    texture_id,
                                    PALETTE_TILE_SIZE,
                                ))
                                .uv(uv_rect(&entry.rect, size))
                                .frame(false),
                            );
                            if is_selected {
                                ui.painter().rect_stroke(
                                    response.rect,
                                    0.0,
                                    egui::Stroke::new(2.0, SELECTED_COLOR),
                                    egui::StrokeKind::Inside,
                                );
                            }
                            response
                        }
                        None => ui.selectable_label(is_selected, &entry.name),
                    };

                    if response.clicked() && !is_selected {
                        result.select_sprite = Some(entry.index);
                    }
                    response.on_hover_text(&entry.name);
                }
            });
        });
}

/// Normalized texture coordinates of a pixel rect within an image
pub fn uv_rect(rect: &PixelRect, image_size: UVec2) -> egui::Rect {
    let size = image_size.max(UVec2::ONE).as_vec2();
    egui::Rect::from_min_max(
        egui::pos2(rect.x as f32 / size.x, rect.y as f32 / size.y),
        egui::pos2(
            (rect.x + rect.width) as f32 / size.x,
            (rect.y + rect.height) as f32 / size.y,
        ),
    )
}
