//! Painter UI using bevy_egui

mod inspector;

pub use inspector::{render_inspector, InspectorResult};

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass};
use bevy_tilepaint_core::{MapSize, SessionState};

use crate::host::AtlasTextureCache;
use crate::preferences::PainterPreferences;
use crate::source::{PendingSource, SourceImageRequest};
use crate::{Painter, PainterInput, PainterSettings, PreferencesEnabled};

/// Main UI plugin
pub struct PainterUiPlugin;

impl Plugin for PainterUiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<UiState>()
            .add_systems(EguiPrimaryContextPass, render_ui);
    }
}

/// Edit buffers for the inspector
#[derive(Resource, Default)]
pub struct UiState {
    /// Source image path being typed
    pub source_path: String,
    /// Map size being edited, committed on release
    pub map_size: Option<MapSize>,
    /// Source key the path field was last synced from
    pub synced_source: Option<String>,
}

fn render_ui(
    mut contexts: EguiContexts,
    mut ui_state: ResMut<UiState>,
    mut settings: ResMut<PainterSettings>,
    mut preferences: ResMut<PainterPreferences>,
    mut inputs: MessageWriter<PainterInput>,
    mut requests: MessageWriter<SourceImageRequest>,
    painter: Res<Painter>,
    pending: Res<PendingSource>,
    cache: Res<AtlasTextureCache>,
    preferences_enabled: Res<PreferencesEnabled>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let source_key = painter.map.source().map(|s| s.key.clone());
    if ui_state.synced_source != source_key {
        if let Some(key) = &source_key {
            ui_state.source_path = key.clone();
        }
        ui_state.synced_source = source_key;
    }

    let result = render_inspector(
        ctx,
        &mut ui_state,
        &mut settings,
        &painter,
        &pending,
        &cache,
    );

    if let Some(enable) = result.set_session_enabled {
        let enabled = painter.state() != SessionState::Disabled;
        if enable != enabled {
            inputs.write(if enable {
                PainterInput::SessionEnabled
            } else {
                PainterInput::SessionDisabled
            });
        }
    }
    if let Some(map_size) = result.map_size {
        inputs.write(PainterInput::MapSizeChanged(map_size));
    }
    if let Some(path) = result.load_source {
        requests.write(SourceImageRequest::Load(path));
    }
    if result.clear_source {
        requests.write(SourceImageRequest::Clear);
    }
    if let Some(index) = result.select_sprite {
        inputs.write(PainterInput::SelectSprite(index));
    }
    if result.clear_all {
        inputs.write(PainterInput::ClearAll);
    }

    if result.settings_changed {
        preferences.show_grid = settings.show_grid;
        preferences.confirm_clear = settings.confirm_clear;
        if preferences_enabled.0 {
            if let Err(e) = preferences.save() {
                error!("Failed to save preferences: {}", e);
            }
        }
    }
}
