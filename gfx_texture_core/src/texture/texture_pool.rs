/// Texture pool - registry of texture entities
///
/// Textures are keyed by a stable `TextureId`. Textures with a shared
/// locator are also indexed by it, which is how shared-depth render targets
/// find their depth provider.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::error::Result;
use crate::texture::{Locator, Texture};
use crate::engine_bail;

const SOURCE: &str = "gfx::TexturePool";

new_key_type! {
    /// Stable identifier of a texture in the pool
    pub struct TextureId;
}

#[derive(Debug, Default)]
pub struct TexturePool {
    textures: SlotMap<TextureId, Texture>,
    locators: FxHashMap<Locator, TextureId>,
}

impl TexturePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a texture, indexing it by its locator if shared
    ///
    /// Fails if another texture already uses the same shared locator.
    pub fn insert(&mut self, texture: Texture) -> Result<TextureId> {
        let locator = texture.setup().locator.clone();
        if locator.is_shared() && self.locators.contains_key(&locator) {
            engine_bail!(SOURCE, "Locator '{}' is already in use", locator.name());
        }
        let id = self.textures.insert(texture);
        if locator.is_shared() {
            self.locators.insert(locator, id);
        }
        Ok(id)
    }

    /// Remove a texture from the pool (its GPU objects are the caller's concern)
    pub fn remove(&mut self, id: TextureId) -> Option<Texture> {
        let texture = self.textures.remove(id)?;
        let locator = &texture.setup().locator;
        if locator.is_shared() {
            self.locators.remove(locator);
        }
        Some(texture)
    }

    pub fn lookup(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id)
    }

    pub fn lookup_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(id)
    }

    pub fn lookup_by_locator(&self, locator: &Locator) -> Option<&Texture> {
        self.id_by_locator(locator).and_then(|id| self.textures.get(id))
    }

    pub fn id_by_locator(&self, locator: &Locator) -> Option<TextureId> {
        self.locators.get(locator).copied()
    }

    pub fn contains_locator(&self, locator: &Locator) -> bool {
        self.locators.contains_key(locator)
    }

    /// Move a texture out, leaving an empty entity with the same setup
    ///
    /// Lets a texture be rebuilt while the pool stays readable; the id and
    /// locator stay registered until `restore`.
    pub(crate) fn take(&mut self, id: TextureId) -> Option<Texture> {
        let slot = self.textures.get_mut(id)?;
        let placeholder = Texture::new(slot.setup().clone());
        Some(std::mem::replace(slot, placeholder))
    }

    pub(crate) fn restore(&mut self, id: TextureId, texture: Texture) {
        if let Some(slot) = self.textures.get_mut(id) {
            *slot = texture;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (TextureId, &Texture)> {
        self.textures.iter()
    }

    pub fn ids(&self) -> Vec<TextureId> {
        self.textures.keys().collect()
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
#[path = "texture_pool_tests.rs"]
mod tests;
