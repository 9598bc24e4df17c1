//! Bevy implementation of the paint session's scene interface
//!
//! Scene objects are entities with a `Name` and `Transform`. A renderable is
//! the `Sprite` on the object itself, so both share one `Entity` handle.

use bevy::prelude::*;
use bevy_egui::egui;
use bevy_tilepaint_core::{AtlasEntry, SceneHost, SpriteAtlas};
use std::collections::HashMap;

/// Textures and atlas layouts of every registered source image, keyed by source key
#[derive(Resource, Default)]
pub struct AtlasTextureCache {
    pub loaded: HashMap<String, CachedAtlas>,
}

/// GPU-side handles for one sliced source image
#[derive(Debug, Clone)]
pub struct CachedAtlas {
    pub image: Handle<Image>,
    pub layout: Handle<TextureAtlasLayout>,
    /// Image size in pixels
    pub size: UVec2,
    /// Texture registered with egui for the palette
    pub egui_texture: Option<egui::TextureId>,
}

impl AtlasTextureCache {
    /// Build the texture atlas layout for `atlas` and remember it with its image.
    ///
    /// Layout index `i` is atlas entry `i + 1`; entry 0 renders the whole image.
    pub fn register(
        &mut self,
        atlas: &SpriteAtlas,
        image: Handle<Image>,
        layouts: &mut Assets<TextureAtlasLayout>,
    ) -> Handle<TextureAtlasLayout> {
        let source = atlas.source();
        let size = UVec2::new(source.width, source.height);
        let mut layout = TextureAtlasLayout::new_empty(size);
        for entry in atlas.tiles() {
            let min = UVec2::new(entry.rect.x, entry.rect.y);
            let max = min + UVec2::new(entry.rect.width, entry.rect.height);
            layout.add_texture(URect::from_corners(min, max));
        }

        let layout = layouts.add(layout);
        self.loaded.insert(
            source.key.clone(),
            CachedAtlas {
                image,
                layout: layout.clone(),
                size,
                egui_texture: None,
            },
        );
        layout
    }

    pub fn get(&self, source_key: &str) -> Option<&CachedAtlas> {
        self.loaded.get(source_key)
    }

    /// Sprite showing one atlas entry at its world size
    pub fn sprite_for(&self, entry: &AtlasEntry) -> Option<Sprite> {
        let cached = self.get(&entry.source_key)?;
        let texture_atlas = (entry.index > 0).then(|| TextureAtlas {
            layout: cached.layout.clone(),
            index: entry.index - 1,
        });
        Some(Sprite {
            image: cached.image.clone(),
            texture_atlas,
            custom_size: Some(Vec2::from(entry.world_size)),
            ..default()
        })
    }
}

/// How `confirm` prompts are answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Native yes/no dialog
    Dialog,
    /// Accept without asking
    Always,
    /// Decline without asking
    Never,
}

/// `SceneHost` over deferred `Commands`
pub struct BevySceneHost<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    cache: &'a AtlasTextureCache,
    confirm: ConfirmMode,
}

impl<'a, 'w, 's> BevySceneHost<'a, 'w, 's> {
    pub fn new(
        commands: &'a mut Commands<'w, 's>,
        cache: &'a AtlasTextureCache,
        confirm: ConfirmMode,
    ) -> Self {
        Self {
            commands,
            cache,
            confirm,
        }
    }
}

impl SceneHost for BevySceneHost<'_, '_, '_> {
    type Handle = Entity;

    fn create_scene_object(&mut self, name: &str, parent: Option<Entity>) -> Entity {
        let mut entity = self.commands.spawn((
            Name::new(name.to_string()),
            Transform::default(),
            Visibility::default(),
        ));
        if let Some(parent) = parent {
            entity.insert(ChildOf(parent));
        }
        entity.id()
    }

    fn destroy_scene_object(&mut self, handle: Entity) {
        // Despawning also removes every descendant
        let _ = self.commands.get_entity(handle).map(|mut e| e.despawn());
    }

    fn attach_renderable(&mut self, handle: Entity) -> Entity {
        if let Ok(mut entity) = self.commands.get_entity(handle) {
            entity.insert(Sprite::default());
        }
        handle
    }

    fn set_renderable_image(&mut self, renderable: Entity, image: &AtlasEntry) {
        let sprite = match self.cache.sprite_for(image) {
            Some(sprite) => sprite,
            None => {
                warn!(
                    "No texture registered for '{}'; drawing {} as a placeholder",
                    image.source_key, image.name
                );
                Sprite {
                    custom_size: Some(Vec2::from(image.world_size)),
                    ..default()
                }
            }
        };
        if let Ok(mut entity) = self.commands.get_entity(renderable) {
            entity.insert(sprite);
        }
    }

    fn set_object_position(&mut self, handle: Entity, position: [f32; 3]) {
        if let Ok(mut entity) = self.commands.get_entity(handle) {
            entity.insert(Transform::from_translation(Vec3::from(position)));
        }
    }

    fn confirm(&mut self, title: &str, message: &str) -> bool {
        match self.confirm {
            ConfirmMode::Always => true,
            ConfirmMode::Never => false,
            ConfirmMode::Dialog => confirm_dialog(title, message),
        }
    }
}

#[cfg(feature = "native")]
fn confirm_dialog(title: &str, message: &str) -> bool {
    rfd::MessageDialog::new()
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::YesNo)
        .show()
        == rfd::MessageDialogResult::Yes
}

#[cfg(not(feature = "native"))]
fn confirm_dialog(title: &str, _message: &str) -> bool {
    info!("{}: no dialog support, accepting", title);
    true
}
