//! Recording scene host for unit tests

use crate::{AtlasEntry, SceneHost};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct MockObject {
    pub name: String,
    pub parent: Option<u32>,
    pub position: [f32; 3],
    pub image: Option<usize>,
    /// Source key of the assigned image
    pub sheet: Option<String>,
}

/// Keeps every live object in a map; renderables get their own handles
#[derive(Debug, Default)]
pub struct RecordingHost {
    next: u32,
    pub objects: HashMap<u32, MockObject>,
    /// renderable handle -> owning object
    pub renderables: HashMap<u32, u32>,
    pub confirm_answer: bool,
    pub confirm_calls: usize,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            confirm_answer: true,
            ..Default::default()
        }
    }

    fn next_handle(&mut self) -> u32 {
        self.next += 1;
        self.next
    }

    pub fn named(&self, name: &str) -> Vec<(u32, &MockObject)> {
        let mut found: Vec<_> = self
            .objects
            .iter()
            .filter(|(_, o)| o.name == name)
            .map(|(h, o)| (*h, o))
            .collect();
        found.sort_by_key(|(h, _)| *h);
        found
    }

    pub fn children_of(&self, parent: u32) -> usize {
        self.objects
            .values()
            .filter(|o| o.parent == Some(parent))
            .count()
    }
}

impl SceneHost for RecordingHost {
    type Handle = u32;

    fn create_scene_object(&mut self, name: &str, parent: Option<u32>) -> u32 {
        let handle = self.next_handle();
        self.objects.insert(
            handle,
            MockObject {
                name: name.to_string(),
                parent,
                position: [0.0; 3],
                image: None,
                sheet: None,
            },
        );
        handle
    }

    fn destroy_scene_object(&mut self, handle: u32) {
        let children: Vec<u32> = self
            .objects
            .iter()
            .filter(|(_, o)| o.parent == Some(handle))
            .map(|(h, _)| *h)
            .collect();
        for child in children {
            self.destroy_scene_object(child);
        }
        self.objects.remove(&handle);
        self.renderables.retain(|_, owner| *owner != handle);
    }

    fn attach_renderable(&mut self, handle: u32) -> u32 {
        let renderable = self.next_handle();
        self.renderables.insert(renderable, handle);
        renderable
    }

    fn set_renderable_image(&mut self, renderable: u32, image: &AtlasEntry) {
        let owner = self.renderables[&renderable];
        if let Some(object) = self.objects.get_mut(&owner) {
            object.image = Some(image.index);
            object.sheet = Some(image.source_key.clone());
        }
    }

    fn set_object_position(&mut self, handle: u32, position: [f32; 3]) {
        if let Some(object) = self.objects.get_mut(&handle) {
            object.position = position;
        }
    }

    fn confirm(&mut self, _title: &str, _message: &str) -> bool {
        self.confirm_calls += 1;
        self.confirm_answer
    }
}
