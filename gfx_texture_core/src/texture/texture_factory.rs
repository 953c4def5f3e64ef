/// Texture factory - creation paths and destruction of texture entities
///
/// Three mutually exclusive creation paths, chosen from the setup:
/// - render target (color + optional own or shared depth buffer, view slots)
/// - empty texture (1 slot, or 2 for Stream usage, each with an upload buffer)
/// - texture from pixel data (one slot, upload recorded into the command list)
///
/// Fatal conditions (native allocation failure, heap exhaustion, missing
/// depth provider) are returned as `Err`. Rejected configurations (3D pixel
/// data, unmapped formats, sizes past the device limit) return
/// `Ok(ResourceState::Failed)` and setups that match no path or break a path's
/// requirements return `Ok(ResourceState::InvalidState)`; in both cases nothing
/// is allocated. If a fatal error interrupts a creation, every object
/// allocated so far is already recorded in the texture, so
/// `destroy_resource` releases it.

use std::sync::Arc;
use crate::device::{PixelFormat, ResourceStates};
use crate::display::DisplayManager;
use crate::error::Result;
use crate::renderer::{GpuResource, Renderer};
use crate::texture::{
    DepthAttachment, ResourceState, Texture, TextureAttrs, TexturePool, TextureSetup, TextureType, Usage,
};
use crate::{engine_bail, engine_err, engine_trace, engine_warn};

const SOURCE: &str = "gfx::TextureFactory";

/// Texture factory
#[derive(Debug, Default)]
pub struct TextureFactory {
    is_valid: bool,
}

impl TextureFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setup(&mut self) {
        debug_assert!(!self.is_valid);
        self.is_valid = true;
    }

    pub fn discard(&mut self) {
        debug_assert!(self.is_valid);
        self.is_valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    // ===== CREATION =====

    /// Create the GPU objects of a texture without initial data
    ///
    /// Handles render targets and empty textures; any other setup returns
    /// `InvalidState`.
    pub fn setup_resource(
        &self,
        renderer: &mut Renderer,
        display: &DisplayManager,
        pool: &TexturePool,
        texture: &mut Texture,
    ) -> Result<ResourceState> {
        debug_assert!(self.is_valid);
        let setup = texture.setup();
        if setup.should_setup_as_render_target() {
            self.setup_render_target(renderer, display, pool, texture)
        } else if setup.should_setup_empty() {
            self.setup_empty_resource(renderer, texture)
        } else {
            engine_warn!(SOURCE, "Setup matches no creation path without pixel data");
            Ok(ResourceState::InvalidState)
        }
    }

    /// Create a render target
    pub fn setup_render_target(
        &self,
        renderer: &mut Renderer,
        display: &DisplayManager,
        pool: &TexturePool,
        texture: &mut Texture,
    ) -> Result<ResourceState> {
        debug_assert!(texture.is_empty());
        let setup = texture.setup().clone();
        if !is_valid_render_target_setup(&setup) {
            engine_warn!(SOURCE, "Invalid render target setup (usage {:?}, {} mips, {:?}, format {:?})",
                setup.usage, setup.num_mip_maps, setup.texture_type, setup.color_format);
            return Ok(ResourceState::InvalidState);
        }

        // Shared depth buffer and its size, looked up from the provider
        let shared_depth = match &setup.depth_render_target {
            Some(locator) => {
                let provider = pool.lookup_by_locator(locator).ok_or_else(|| {
                    engine_err!(SOURCE, "Depth provider '{}' not found", locator.name())
                })?;
                let depth = provider.depth_buffer().ok_or_else(|| {
                    engine_err!(SOURCE, "Depth provider '{}' has no depth buffer", locator.name())
                })?;
                Some((Arc::clone(depth.resource()), provider.attrs().clone()))
            }
            None => None,
        };

        let (width, height) = if setup.is_rel_size_render_target() {
            let framebuffer = display.framebuffer_size();
            (
                (framebuffer.width as f32 * setup.rel_width) as u32,
                (framebuffer.height as f32 * setup.rel_height) as u32,
            )
        } else if let Some((_, provider_attrs)) = &shared_depth {
            (provider_attrs.width, provider_attrs.height)
        } else {
            (setup.width, setup.height)
        };
        if width == 0 || height == 0 {
            engine_bail!(SOURCE, "Render target resolves to an empty size {}x{}", width, height);
        }
        if exceeds_device_limits(renderer, width, height) {
            return Ok(ResourceState::Failed);
        }

        let Renderer { device, res_allocator, desc_allocator, rtv_heap, dsv_heap, .. } = renderer;

        // Color target and its view
        let color = res_allocator.alloc_render_target(
            device.as_mut(), width, height, setup.color_format, &setup.clear_hint, setup.sample_count,
        )?;
        let color_handle = color.handle();
        texture.slots[0].texture = Some(color);
        texture.slots[0].state = ResourceStates::RENDER_TARGET;

        let rtv_slot = desc_allocator.alloc_slot(*rtv_heap)?;
        texture.rtv_slot = Some(rtv_slot);
        device.create_render_target_view(color_handle, desc_allocator.cpu_handle(*rtv_heap, rtv_slot)?);

        // Depth buffer (own or shared) and its view
        let mut depth_format = PixelFormat::None;
        if setup.has_depth() {
            let attachment = match shared_depth {
                Some((resource, provider_attrs)) => {
                    depth_format = provider_attrs.depth_format;
                    DepthAttachment::Shared(resource)
                }
                None => {
                    depth_format = setup.depth_format;
                    let depth = res_allocator.alloc_render_target(
                        device.as_mut(), width, height, setup.depth_format, &setup.clear_hint, setup.sample_count,
                    )?;
                    DepthAttachment::Owned(Arc::new(depth))
                }
            };
            let depth_handle = attachment.handle();
            texture.depth_buffer = Some(attachment);
            texture.depth_buffer_state = ResourceStates::DEPTH_WRITE;

            let dsv_slot = desc_allocator.alloc_slot(*dsv_heap)?;
            texture.dsv_slot = Some(dsv_slot);
            device.create_depth_stencil_view(depth_handle, desc_allocator.cpu_handle(*dsv_heap, dsv_slot)?);
        }

        texture.attrs = TextureAttrs {
            width,
            height,
            depth: 1,
            num_mip_maps: 1,
            depth_format,
            is_render_target: true,
            has_depth_buffer: setup.has_depth(),
            has_shared_depth_buffer: setup.has_shared_depth(),
            ..base_attrs(&setup)
        };
        texture.state = ResourceState::Valid;

        engine_trace!(SOURCE, "Created render target {}x{} (depth: {:?}, shared: {})",
            width, height, depth_format, setup.has_shared_depth());
        Ok(ResourceState::Valid)
    }

    /// Create an empty texture to be filled by CPU updates
    pub fn setup_empty_resource(&self, renderer: &mut Renderer, texture: &mut Texture) -> Result<ResourceState> {
        debug_assert!(texture.is_empty());
        let setup = texture.setup().clone();
        if !is_valid_empty_setup(&setup) {
            engine_warn!(SOURCE, "Invalid empty texture setup (usage {:?}, {} mips, {:?}, format {:?})",
                setup.usage, setup.num_mip_maps, setup.texture_type, setup.color_format);
            return Ok(ResourceState::InvalidState);
        }
        if setup.color_format.as_native_format().is_none() {
            engine_warn!(SOURCE, "Unknown texture format {:?}", setup.color_format);
            return Ok(ResourceState::Failed);
        }
        if exceeds_device_limits(renderer, setup.width, setup.height) {
            return Ok(ResourceState::Failed);
        }

        let num_slots = if setup.usage == Usage::Stream { 2 } else { 1 };
        let frame_index = renderer.frame_index;
        let Renderer { device, command_list, res_allocator, .. } = renderer;
        let copy_footprint = res_allocator.compute_texture_copy_footprint(device.as_ref(), &setup)?;

        texture.num_slots = num_slots;
        for slot in &mut texture.slots[..num_slots] {
            let resource = res_allocator.alloc_texture(
                device.as_mut(), command_list.as_mut(), frame_index, &setup, None,
            )?;
            slot.texture = Some(resource);
            slot.state = ResourceStates::PIXEL_SHADER_RESOURCE;
            slot.upload_buffer = Some(res_allocator.alloc_upload_buffer(device.as_mut(), copy_footprint)?);
        }

        texture.attrs = base_attrs(&setup);
        texture.state = ResourceState::Valid;

        engine_trace!(SOURCE, "Created empty texture {}x{} ({} slots)", setup.width, setup.height, num_slots);
        Ok(ResourceState::Valid)
    }

    /// Create an immutable texture from pixel data
    ///
    /// `data` holds every face (1, or 6 for cube maps), each face holding
    /// mips 0..n tightly packed.
    pub fn setup_resource_with_data(
        &self,
        renderer: &mut Renderer,
        texture: &mut Texture,
        data: &[u8],
    ) -> Result<ResourceState> {
        debug_assert!(self.is_valid);
        debug_assert!(texture.is_empty());
        let setup = texture.setup().clone();
        if !setup.should_setup_from_pixel_data() {
            engine_warn!(SOURCE, "Setup does not describe a texture from pixel data");
            return Ok(ResourceState::InvalidState);
        }
        if setup.usage != Usage::Immutable || setup.num_mip_maps == 0 || setup.width == 0 || setup.height == 0 {
            engine_warn!(SOURCE, "Invalid pixel data setup (usage {:?}, {} mips, {}x{})",
                setup.usage, setup.num_mip_maps, setup.width, setup.height);
            return Ok(ResourceState::InvalidState);
        }
        if setup.texture_type == TextureType::Texture3D {
            engine_warn!(SOURCE, "3d textures not yet implemented");
            return Ok(ResourceState::Failed);
        }
        if exceeds_device_limits(renderer, setup.width, setup.height) {
            return Ok(ResourceState::Failed);
        }

        let frame_index = renderer.frame_index;
        let Renderer { device, command_list, res_allocator, .. } = renderer;
        let Some(footprints) = res_allocator.texture_footprints(device.as_ref(), &setup) else {
            engine_warn!(SOURCE, "Unknown texture format {:?}", setup.color_format);
            return Ok(ResourceState::Failed);
        };
        let packed_size = footprints.packed_size();
        if (data.len() as u64) < packed_size {
            engine_warn!(SOURCE, "Pixel data too small: {} bytes, expected {}", data.len(), packed_size);
            return Ok(ResourceState::Failed);
        }

        let resource = res_allocator.alloc_texture(
            device.as_mut(), command_list.as_mut(), frame_index, &setup, Some(data),
        )?;
        texture.slots[0].texture = Some(resource);
        texture.slots[0].state = ResourceStates::PIXEL_SHADER_RESOURCE;
        texture.attrs = base_attrs(&setup);
        texture.state = ResourceState::Valid;

        engine_trace!(SOURCE, "Created texture {}x{} from {} bytes", setup.width, setup.height, data.len());
        Ok(ResourceState::Valid)
    }

    // ===== DESTRUCTION =====

    /// Queue every GPU object of the texture for deferred release and reset
    /// it to the empty state
    pub fn destroy_resource(&self, renderer: &mut Renderer, texture: &mut Texture) -> Result<()> {
        let frame_index = renderer.frame_index;
        let Renderer { res_allocator, desc_allocator, rtv_heap, dsv_heap, .. } = renderer;

        for slot in &mut texture.slots {
            let resources: [Option<GpuResource>; 2] = [slot.texture.take(), slot.upload_buffer.take()];
            for resource in resources.into_iter().flatten() {
                res_allocator.release_deferred(frame_index, resource);
            }
        }
        if let Some(depth) = texture.depth_buffer.take() {
            res_allocator.release_shared_deferred(frame_index, depth.into_resource());
        }
        if let Some(slot) = texture.rtv_slot.take() {
            desc_allocator.release_slot_deferred(*rtv_heap, frame_index, slot)?;
        }
        if let Some(slot) = texture.dsv_slot.take() {
            desc_allocator.release_slot_deferred(*dsv_heap, frame_index, slot)?;
        }

        texture.clear();
        Ok(())
    }
}

fn is_valid_render_target_setup(setup: &TextureSetup) -> bool {
    setup.usage == Usage::Immutable
        && setup.num_mip_maps == 1
        && setup.texture_type == TextureType::Texture2D
        && setup.color_format.is_valid_render_target_color_format()
        && (setup.depth_format == PixelFormat::None || setup.depth_format.is_valid_render_target_depth_format())
}

fn is_valid_empty_setup(setup: &TextureSetup) -> bool {
    setup.usage != Usage::Immutable
        && setup.num_mip_maps >= 1
        && setup.texture_type == TextureType::Texture2D
        && !setup.color_format.is_compressed_format()
        && setup.width > 0
        && setup.height > 0
}

/// Warn and return true if `width`x`height` is larger than the device supports
fn exceeds_device_limits(renderer: &Renderer, width: u32, height: u32) -> bool {
    let max = renderer.device.limits().max_texture_dimension_2d;
    if width > max || height > max {
        engine_warn!(SOURCE, "Texture size {}x{} exceeds device limit {}", width, height, max);
        return true;
    }
    false
}

/// Attributes shared by every creation path
fn base_attrs(setup: &TextureSetup) -> TextureAttrs {
    TextureAttrs {
        locator: setup.locator.clone(),
        texture_type: setup.texture_type,
        color_format: setup.color_format,
        depth_format: PixelFormat::None,
        usage: setup.usage,
        width: setup.width,
        height: setup.height,
        depth: if setup.texture_type == TextureType::Texture3D { setup.depth } else { 1 },
        num_mip_maps: setup.num_mip_maps,
        is_render_target: false,
        has_depth_buffer: false,
        has_shared_depth_buffer: false,
    }
}

#[cfg(test)]
#[path = "texture_factory_tests.rs"]
mod tests;
