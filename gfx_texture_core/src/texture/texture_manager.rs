/// Texture manager - facade over display, renderer, factory and pool
///
/// Owns every texture entity and drives its whole lifecycle: creation through
/// the factory, streamed updates, recreation of relative-size render targets
/// on resize, and deferred destruction.

use std::sync::Arc;
use bytemuck::Pod;
use rustc_hash::FxHashMap;
use winit::dpi::LogicalSize;
use crate::config::GfxConfig;
use crate::device::{CommandList, GraphicsDevice};
use crate::display::{DisplayManager, SurfaceScaling};
use crate::error::Result;
use crate::renderer::Renderer;
use crate::texture::{
    Locator, ResourceState, Texture, TextureAttrs, TextureFactory, TextureId, TexturePool, TextureSetup,
};
use crate::{engine_bail, engine_debug, engine_err, engine_error, engine_info, engine_warn};

const SOURCE: &str = "gfx::TextureManager";

/// Texture manager
pub struct TextureManager {
    display: DisplayManager,
    renderer: Renderer,
    factory: TextureFactory,
    pool: TexturePool,
}

impl TextureManager {
    /// Set up the display and renderer and create an empty manager
    ///
    /// # Errors
    ///
    /// Returns an error if the display cannot be set up or the descriptor
    /// heaps cannot be created.
    pub fn new(
        config: &GfxConfig,
        surface: Box<dyn SurfaceScaling>,
        device: Box<dyn GraphicsDevice>,
        command_list: Box<dyn CommandList>,
    ) -> Result<Self> {
        let mut display = DisplayManager::new(surface);
        display.setup_display(config)?;
        let renderer = Renderer::new(device, command_list, config)?;
        let mut factory = TextureFactory::new();
        factory.setup();

        Ok(Self {
            display,
            renderer,
            factory,
            pool: TexturePool::new(),
        })
    }

    // ===== CREATION =====

    /// Create a render target or an empty texture
    ///
    /// The texture is registered whatever the returned state, so it can be
    /// queried and destroyed like any other.
    ///
    /// # Errors
    ///
    /// Returns an error on a fatal creation failure (native allocation,
    /// descriptor heap exhaustion, missing depth provider) or if the locator
    /// is already in use. Whatever was allocated before the failure is queued
    /// for release.
    pub fn create_texture(&mut self, setup: TextureSetup) -> Result<(TextureId, ResourceState)> {
        self.check_locator(&setup.locator)?;
        let mut texture = Texture::new(setup);
        let result = self.factory.setup_resource(&mut self.renderer, &self.display, &self.pool, &mut texture);
        self.register(texture, result)
    }

    /// Create an immutable texture from raw pixel bytes
    pub fn create_texture_from_data(&mut self, setup: TextureSetup, data: &[u8]) -> Result<(TextureId, ResourceState)> {
        self.check_locator(&setup.locator)?;
        let mut texture = Texture::new(setup);
        let result = self.factory.setup_resource_with_data(&mut self.renderer, &mut texture, data);
        self.register(texture, result)
    }

    /// Create an immutable texture from typed pixels (e.g. `[u8; 4]` or `f32`)
    pub fn create_texture_from_pixels<P: Pod>(
        &mut self,
        setup: TextureSetup,
        pixels: &[P],
    ) -> Result<(TextureId, ResourceState)> {
        self.create_texture_from_data(setup, bytemuck::cast_slice(pixels))
    }

    fn check_locator(&self, locator: &Locator) -> Result<()> {
        if locator.is_shared() && self.pool.contains_locator(locator) {
            engine_bail!(SOURCE, "Texture '{}' already exists", locator.name());
        }
        Ok(())
    }

    fn register(&mut self, mut texture: Texture, result: Result<ResourceState>) -> Result<(TextureId, ResourceState)> {
        match result {
            Ok(state) => {
                texture.state = state;
                let id = self.pool.insert(texture)?;
                Ok((id, state))
            }
            Err(err) => {
                if let Err(cleanup) = self.factory.destroy_resource(&mut self.renderer, &mut texture) {
                    engine_error!(SOURCE, "Releasing a failed texture failed: {}", cleanup);
                }
                Err(err)
            }
        }
    }

    // ===== DESTRUCTION =====

    /// Destroy a texture
    ///
    /// Its GPU objects are released once the current frame has retired. The
    /// texture is unbound first if it is the bound render target.
    pub fn destroy_texture(&mut self, id: TextureId) -> Result<()> {
        let mut texture = self
            .pool
            .remove(id)
            .ok_or_else(|| engine_err!(SOURCE, "Unknown texture {:?}", id))?;
        if self.renderer.bound_render_target() == Some(id) {
            self.renderer.bind_render_target(None);
        }
        self.factory.destroy_resource(&mut self.renderer, &mut texture)
    }

    /// Destroy every texture, flush all pending releases and discard the display
    ///
    /// The device must be idle.
    pub fn shutdown(&mut self) -> Result<()> {
        if !self.factory.is_valid() {
            return Ok(());
        }
        for id in self.pool.ids() {
            self.destroy_texture(id)?;
        }
        self.renderer.shutdown();
        self.factory.discard();
        self.display.discard_display();
        engine_info!(SOURCE, "Texture manager shut down");
        Ok(())
    }

    // ===== UPDATES AND BINDING =====

    /// Upload new contents into a Stream or Dynamic texture
    pub fn update_texture(&mut self, id: TextureId, data: &[u8]) -> Result<()> {
        let texture = self
            .pool
            .lookup_mut(id)
            .ok_or_else(|| engine_err!(SOURCE, "Unknown texture {:?}", id))?;
        self.renderer.update_texture(texture, data)
    }

    /// Bind a render target for the next pass (`None` = default framebuffer)
    pub fn bind_render_target(&mut self, id: Option<TextureId>) -> Result<()> {
        if let Some(id) = id {
            let is_render_target = self
                .pool
                .lookup(id)
                .is_some_and(|texture| texture.state() == ResourceState::Valid && texture.attrs().is_render_target);
            if !is_render_target {
                engine_bail!(SOURCE, "Texture {:?} is not a valid render target", id);
            }
        }
        self.renderer.bind_render_target(id);
        Ok(())
    }

    // ===== FRAME =====

    pub fn begin_frame(&mut self) -> usize {
        self.renderer.begin_frame()
    }

    /// Present and end the frame, recycling retired resources
    pub fn end_frame(&mut self) -> usize {
        self.display.present();
        self.renderer.end_frame()
    }

    /// Track a window resize
    ///
    /// When the framebuffer size changes the binding state cache is reset and
    /// every relative-size render target is destroyed and recreated at the new
    /// size, together with the render targets sharing its depth buffer (after
    /// their provider). Returns true if the framebuffer size changed.
    pub fn on_window_did_resize(&mut self, width: u32, height: u32) -> Result<bool> {
        if !self.display.on_window_did_resize(LogicalSize::new(width, height)) {
            return Ok(false);
        }
        self.renderer.reset_state_cache();

        let affected = self.resize_dependent_textures();
        if affected.is_empty() {
            return Ok(true);
        }
        engine_debug!(SOURCE, "Recreating {} render targets", affected.len());

        // Resolved before destruction clears the depth buffers
        let providers: FxHashMap<TextureId, TextureId> = affected
            .iter()
            .filter_map(|&id| self.provider_of(id).map(|provider| (id, provider)))
            .collect();

        for &id in &affected {
            if let Some(mut texture) = self.pool.take(id) {
                let destroyed = self.factory.destroy_resource(&mut self.renderer, &mut texture);
                self.pool.restore(id, texture);
                destroyed?;
            }
        }

        let mut remaining = affected;
        while !remaining.is_empty() {
            let index = remaining
                .iter()
                .position(|id| !providers.get(id).is_some_and(|provider| remaining.contains(provider)))
                .unwrap_or(0);
            let id = remaining.remove(index);
            let Some(mut texture) = self.pool.take(id) else {
                continue;
            };
            let result = self.factory.setup_resource(&mut self.renderer, &self.display, &self.pool, &mut texture);
            if let Ok(state) = &result {
                texture.state = *state;
            }
            self.pool.restore(id, texture);
            if result? != ResourceState::Valid {
                engine_warn!(SOURCE, "Render target {:?} could not be recreated", id);
            }
        }
        Ok(true)
    }

    /// Relative-size render targets plus everything sharing their depth
    fn resize_dependent_textures(&self) -> Vec<TextureId> {
        let mut affected: Vec<TextureId> = self
            .pool
            .iter()
            .filter(|(_, texture)| {
                texture.state() == ResourceState::Valid && texture.setup().is_rel_size_render_target()
            })
            .map(|(id, _)| id)
            .collect();

        loop {
            let dependents: Vec<TextureId> = self
                .pool
                .iter()
                .filter(|(id, texture)| texture.state() == ResourceState::Valid && !affected.contains(id))
                .filter(|(id, _)| self.provider_of(*id).is_some_and(|provider| affected.contains(&provider)))
                .map(|(id, _)| id)
                .collect();
            if dependents.is_empty() {
                return affected;
            }
            affected.extend(dependents);
        }
    }

    /// Texture whose depth buffer `id` currently shares
    ///
    /// `None` once the texture registered under the provider locator no
    /// longer owns that depth buffer (the original provider was destroyed).
    fn provider_of(&self, id: TextureId) -> Option<TextureId> {
        let texture = self.pool.lookup(id)?;
        let locator = texture.setup().depth_render_target.as_ref()?;
        let provider_id = self.pool.id_by_locator(locator)?;
        let provider_depth = self.pool.lookup(provider_id)?.depth_buffer()?;
        Arc::ptr_eq(texture.depth_buffer()?.resource(), provider_depth.resource()).then_some(provider_id)
    }

    // ===== ACCESSORS =====

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.pool.lookup(id)
    }

    pub fn texture_attrs(&self, id: TextureId) -> Option<&TextureAttrs> {
        self.pool.lookup(id).map(Texture::attrs)
    }

    pub fn texture_by_locator(&self, locator: &Locator) -> Option<TextureId> {
        self.pool.id_by_locator(locator)
    }

    pub fn num_textures(&self) -> usize {
        self.pool.len()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn display(&self) -> &DisplayManager {
        &self.display
    }
}

#[cfg(test)]
#[path = "texture_manager_tests.rs"]
mod tests;
