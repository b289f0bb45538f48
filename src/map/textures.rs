use bevy::prelude::*;

use super::MapError;

/// Where a texture comes from.
#[derive(Clone, Debug)]
pub enum TextureSource {
    /// Asset path, loaded asynchronously through the `AssetServer`.
    Path(String),
    /// Image built in memory (a canvas, a generated pattern, ...).
    Image(Image),
    /// Already prepared handle, used verbatim.
    Handle(Handle<Image>),
}

impl From<&str> for TextureSource {
    fn from(path: &str) -> Self {
        Self::Path(path.to_owned())
    }
}

impl From<String> for TextureSource {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<Image> for TextureSource {
    fn from(image: Image) -> Self {
        Self::Image(image)
    }
}

impl From<Handle<Image>> for TextureSource {
    fn from(handle: Handle<Image>) -> Self {
        Self::Handle(handle)
    }
}

struct TextureSlot {
    source: TextureSource,
    handle: Option<Handle<Image>>,
}

/// Per-map texture catalog, indexed like [`super::MapOptions::textures`].
///
/// Slots start unresolved; the texture loading system turns each source into
/// an image handle and tracks asynchronous loads until the batch settles.
#[derive(Default)]
pub struct TextureCache {
    slots: Vec<TextureSlot>,
    pending: Vec<usize>,
    failed: Vec<usize>,
    announced: bool,
}

impl TextureCache {
    /// Cache with one unresolved slot per source.
    pub fn from_sources(sources: &[TextureSource]) -> Self {
        Self {
            slots: sources
                .iter()
                .map(|source| TextureSlot {
                    source: source.clone(),
                    handle: None,
                })
                .collect(),
            ..default()
        }
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// `true` when the catalog has no textures.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Handle for slot `index`, once resolved.
    pub fn handle(&self, index: usize) -> Result<&Handle<Image>, MapError> {
        let slot = self.slots.get(index).ok_or(MapError::TextureOutOfRange {
            index,
            available: self.slots.len(),
        })?;
        slot.handle
            .as_ref()
            .ok_or(MapError::TextureNotReady { index })
    }

    /// Source of slot `index`.
    pub fn source(&self, index: usize) -> Option<&TextureSource> {
        self.slots.get(index).map(|slot| &slot.source)
    }

    /// Path loads still in flight.
    pub fn pending(&self) -> &[usize] {
        &self.pending
    }

    /// Slots whose load failed.
    pub fn failed(&self) -> &[usize] {
        &self.failed
    }

    /// Swaps the source of slot `index`; the slot is resolved again on the
    /// next loading pass.
    pub(crate) fn replace(&mut self, index: usize, source: TextureSource) -> Result<(), MapError> {
        let available = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(MapError::TextureOutOfRange { index, available })?;
        slot.source = source;
        slot.handle = None;
        self.pending.retain(|&i| i != index);
        self.failed.retain(|&i| i != index);
        Ok(())
    }

    /// Indices of slots without a handle.
    pub(crate) fn unresolved(&self) -> Vec<usize> {
        (0..self.slots.len())
            .filter(|&i| self.slots[i].handle.is_none() && !self.failed.contains(&i))
            .collect()
    }

    pub(crate) fn resolve(&mut self, index: usize, handle: Handle<Image>, track: bool) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.handle = Some(handle);
            if track && !self.pending.contains(&index) {
                self.pending.push(index);
            }
        }
    }

    pub(crate) fn settle(&mut self, index: usize, failed: bool) {
        self.pending.retain(|&i| i != index);
        if failed && !self.failed.contains(&index) {
            self.failed.push(index);
        }
    }

    /// Marks the batch as announced when nothing is left in flight.
    ///
    /// Returns `true` exactly once per cache.
    pub(crate) fn take_completion(&mut self) -> bool {
        if self.announced || !self.pending.is_empty() {
            return false;
        }
        self.announced = true;
        true
    }
}
