//! Interface the host engine implements for the paint session
//!
//! The session never touches the scene directly. Every object it creates,
//! moves or destroys goes through a `SceneHost`, and every atlas it uses
//! comes from an `AtlasLoader`.

use crate::{AtlasEntry, PaintError, SourceImage, SpriteAtlas};

/// Scene object lifecycle and user prompts
pub trait SceneHost {
    /// Handle to a scene object or to a renderable attached to one
    type Handle: Copy + Eq + std::fmt::Debug;

    /// Create a named object, optionally parented
    fn create_scene_object(&mut self, name: &str, parent: Option<Self::Handle>) -> Self::Handle;

    /// Destroy an object and everything parented to it
    fn destroy_scene_object(&mut self, handle: Self::Handle);

    /// Attach a renderable to an object and return its handle
    fn attach_renderable(&mut self, handle: Self::Handle) -> Self::Handle;

    fn set_renderable_image(&mut self, renderable: Self::Handle, image: &AtlasEntry);

    /// Position in the parent's local frame
    fn set_object_position(&mut self, handle: Self::Handle, position: [f32; 3]);

    /// Ask the user to confirm a destructive action
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// Image slicing service
pub trait AtlasLoader {
    fn load_atlas(&mut self, source: &SourceImage) -> Result<SpriteAtlas, PaintError>;
}
