/// Renderer - frame clock, command list and shared allocators
///
/// Owns the graphics device, the command list uploads are recorded into, the
/// resource and descriptor allocators, and the render-target-view /
/// depth-stencil-view heaps. The frame index starts at 1 and advances once per
/// `end_frame`; everything released during frame F is recycled once the device
/// reports frame F retired.

use crate::config::GfxConfig;
use crate::device::{CommandList, DescriptorHeapKind, GraphicsDevice, ResourceStates};
use crate::error::Result;
use crate::renderer::{DescriptorAllocator, DescriptorHeapId, ResourceAllocator, ResourceAllocatorStats};
use crate::texture::{ResourceState, Texture, TextureId, Usage};
use crate::{engine_bail, engine_debug, engine_info, engine_trace};

const SOURCE: &str = "gfx::Renderer";

// ============================================================================
// State cache
// ============================================================================

/// Cached GPU binding state
///
/// Cleared whenever the objects it refers to may be recreated (window resize).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCache {
    /// Render target bound for the current pass (`None` = default framebuffer)
    pub render_target: Option<TextureId>,
}

/// Renderer statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    /// Frame currently being recorded
    pub frame_index: u64,
    /// Last frame the GPU has fully retired
    pub completed_frame_index: u64,
    /// Native resources waiting for their frame to retire
    pub pending_releases: usize,
    pub resources: ResourceAllocatorStats,
}

// ============================================================================
// Renderer
// ============================================================================

/// Renderer owning the device and the allocators
pub struct Renderer {
    pub(crate) device: Box<dyn GraphicsDevice>,
    pub(crate) command_list: Box<dyn CommandList>,
    pub(crate) res_allocator: ResourceAllocator,
    pub(crate) desc_allocator: DescriptorAllocator,
    pub(crate) rtv_heap: DescriptorHeapId,
    pub(crate) dsv_heap: DescriptorHeapId,
    pub(crate) frame_index: u64,
    state_cache: StateCache,
}

impl Renderer {
    /// Create the renderer and its fixed-capacity descriptor heaps
    pub fn new(
        mut device: Box<dyn GraphicsDevice>,
        command_list: Box<dyn CommandList>,
        config: &GfxConfig,
    ) -> Result<Self> {
        let mut desc_allocator = DescriptorAllocator::new();
        let rtv_heap = desc_allocator.alloc_heap(
            device.as_mut(),
            DescriptorHeapKind::RenderTargetView,
            config.rtv_heap_capacity,
        )?;
        let dsv_heap = desc_allocator.alloc_heap(
            device.as_mut(),
            DescriptorHeapKind::DepthStencilView,
            config.dsv_heap_capacity,
        )?;

        engine_info!(SOURCE, "Renderer created (rtv heap: {}, dsv heap: {})",
            config.rtv_heap_capacity, config.dsv_heap_capacity);

        Ok(Self {
            device,
            command_list,
            res_allocator: ResourceAllocator::new(),
            desc_allocator,
            rtv_heap,
            dsv_heap,
            frame_index: 1,
            state_cache: StateCache::default(),
        })
    }

    // ===== FRAME =====

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Recycle whatever retired since the last frame ended
    pub fn begin_frame(&mut self) -> usize {
        self.garbage_collect()
    }

    /// Signal the end of the current frame, advance the frame index and
    /// recycle retired resources
    ///
    /// Returns the number of native resources destroyed.
    pub fn end_frame(&mut self) -> usize {
        self.device.signal_frame(self.frame_index);
        self.frame_index += 1;
        self.garbage_collect()
    }

    /// Destroy resources and recycle descriptor slots of every retired frame
    pub fn garbage_collect(&mut self) -> usize {
        let completed = self.device.completed_frame_index();
        let freed = self.res_allocator.garbage_collect(self.device.as_mut(), completed);
        let recycled = self.desc_allocator.garbage_collect(completed);
        if freed > 0 || recycled > 0 {
            engine_trace!(SOURCE, "Frame {} retired: {} resources freed, {} descriptor slots recycled",
                completed, freed, recycled);
        }
        freed
    }

    /// Flush every pending release immediately
    ///
    /// Only valid once the device is idle (no frame in flight).
    pub fn shutdown(&mut self) {
        let freed = self.res_allocator.destroy_all(self.device.as_mut());
        let recycled = self.desc_allocator.free_all_pending();
        self.state_cache = StateCache::default();
        engine_info!(SOURCE, "Renderer shut down ({} resources freed, {} descriptor slots recycled)",
            freed, recycled);
    }

    // ===== STATE CACHE =====

    pub fn state_cache(&self) -> &StateCache {
        &self.state_cache
    }

    pub fn reset_state_cache(&mut self) {
        engine_debug!(SOURCE, "State cache reset");
        self.state_cache = StateCache::default();
    }

    pub fn bind_render_target(&mut self, texture: Option<TextureId>) {
        self.state_cache.render_target = texture;
    }

    pub fn bound_render_target(&self) -> Option<TextureId> {
        self.state_cache.render_target
    }

    // ===== ACCESSORS =====

    pub fn device(&self) -> &dyn GraphicsDevice {
        self.device.as_ref()
    }

    pub fn resource_allocator(&self) -> &ResourceAllocator {
        &self.res_allocator
    }

    pub fn descriptor_allocator(&self) -> &DescriptorAllocator {
        &self.desc_allocator
    }

    pub fn rtv_heap(&self) -> DescriptorHeapId {
        self.rtv_heap
    }

    pub fn dsv_heap(&self) -> DescriptorHeapId {
        self.dsv_heap
    }

    pub fn stats(&self) -> RendererStats {
        RendererStats {
            frame_index: self.frame_index,
            completed_frame_index: self.device.completed_frame_index(),
            pending_releases: self.res_allocator.pending_release_count(),
            resources: self.res_allocator.stats(),
        }
    }

    // ===== STREAMING =====

    /// Upload new contents into a Stream/Dynamic texture
    ///
    /// Writes the next slot's upload buffer, records the copy bracketed by
    /// barriers, then makes that slot the active one. A texture accepts at
    /// most one update per frame.
    ///
    /// # Errors
    ///
    /// Returns an error without touching the slot if the frame that last
    /// copied out of its upload buffer has not retired on the GPU yet.
    pub fn update_texture(&mut self, texture: &mut Texture, data: &[u8]) -> Result<()> {
        let setup = texture.setup();
        if texture.state() != ResourceState::Valid {
            engine_bail!(SOURCE, "Cannot update texture in state {:?}", texture.state());
        }
        if setup.usage == Usage::Immutable {
            engine_bail!(SOURCE, "Cannot update an immutable texture");
        }
        if setup.color_format.is_compressed_format() {
            engine_bail!(SOURCE, "Cannot update compressed texture format {:?}", setup.color_format);
        }
        if texture.update_frame_index == Some(self.frame_index) {
            engine_bail!(SOURCE, "Texture already updated in frame {}", self.frame_index);
        }

        let next = (texture.active_slot + 1) % texture.num_slots;
        {
            let slot = &texture.slots[next];
            let (Some(resource), Some(upload)) = (slot.texture.as_ref(), slot.upload_buffer.as_ref()) else {
                engine_bail!(SOURCE, "Texture slot {} has no resources", next);
            };
            let completed = self.device.completed_frame_index();
            if let Some(last_upload) = slot.last_upload_frame.filter(|&frame| frame > completed) {
                engine_bail!(SOURCE, "Texture slot {} still read by frame {} (completed: {})",
                    next, last_upload, completed);
            }
            let packed_size = self.device.copyable_footprints(resource.desc()).packed_size();
            if (data.len() as u64) < packed_size {
                engine_bail!(SOURCE, "Update data too small: {} bytes, expected {}", data.len(), packed_size);
            }

            self.command_list.resource_barrier(resource.handle(), slot.state, ResourceStates::COPY_DEST);
            self.res_allocator.upload_texture_data(
                self.device.as_mut(),
                self.command_list.as_mut(),
                resource,
                upload,
                data,
            )?;
            self.command_list.resource_barrier(
                resource.handle(),
                ResourceStates::COPY_DEST,
                ResourceStates::PIXEL_SHADER_RESOURCE,
            );
        }

        texture.slots[next].state = ResourceStates::PIXEL_SHADER_RESOURCE;
        texture.slots[next].last_upload_frame = Some(self.frame_index);
        texture.active_slot = next;
        texture.update_frame_index = Some(self.frame_index);
        Ok(())
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
