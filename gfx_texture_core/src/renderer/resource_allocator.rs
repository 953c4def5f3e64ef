/// Resource allocator - native resource creation and frame-deferred release
///
/// The GPU consumes resources up to N frames after the CPU recorded the work
/// that references them. A resource handed to `release_deferred` at frame F is
/// therefore only destroyed by `garbage_collect` once the device reports frame
/// F fully retired. Until then its native handle stays alive, so the device
/// can never reissue it to another logical resource.

use std::sync::Arc;
use crate::device::{
    ClearValue, CommandList, CopyableFootprints, GraphicsDevice, HeapType, PixelFormat,
    ResourceDesc, ResourceDimension, ResourceFlags, ResourceHandle, ResourceStates,
};
use crate::error::Result;
use crate::texture::{ClearHint, TextureSetup, TextureType};
use crate::{engine_bail, engine_err, engine_error, engine_trace};

const SOURCE: &str = "gfx::ResourceAllocator";

// ============================================================================
// GpuResource
// ============================================================================

/// Owning handle of one native resource
///
/// Not `Clone`: a resource is released exactly once, by moving its handle
/// into `ResourceAllocator::release_deferred`. Sharing goes through
/// `Arc<GpuResource>` and `release_shared_deferred`.
#[derive(Debug, PartialEq)]
pub struct GpuResource {
    handle: ResourceHandle,
    desc: ResourceDesc,
}

impl GpuResource {
    pub fn handle(&self) -> ResourceHandle {
        self.handle
    }

    pub fn desc(&self) -> &ResourceDesc {
        &self.desc
    }
}

// ============================================================================
// ResourceAllocator
// ============================================================================

#[derive(Debug, Clone, Copy)]
struct PendingRelease {
    frame_index: u64,
    resource: ResourceHandle,
}

/// Counters of the resource allocator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceAllocatorStats {
    /// Resources created
    pub allocated: u64,
    /// Resources queued for deferred release
    pub queued: u64,
    /// Resources actually destroyed
    pub freed: u64,
}

/// Native resource allocator with frame-tagged deferred release
#[derive(Debug, Default)]
pub struct ResourceAllocator {
    pending: Vec<PendingRelease>,
    stats: ResourceAllocatorStats,
}

impl ResourceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    fn create(&mut self, device: &mut dyn GraphicsDevice, desc: ResourceDesc, what: &str) -> Result<GpuResource> {
        match device.create_committed_resource(&desc) {
            Ok(handle) => {
                self.stats.allocated += 1;
                engine_trace!(SOURCE, "Created {} {:?} ({}x{})", what, handle, desc.width, desc.height);
                Ok(GpuResource { handle, desc })
            }
            Err(err) => {
                engine_error!(SOURCE, "Failed to create {}: {}", what, err);
                Err(err)
            }
        }
    }

    /// Allocate a color or depth render target
    ///
    /// The format decides which: depth formats get a depth-stencil resource
    /// in DEPTH_WRITE state, color formats a render target in RENDER_TARGET
    /// state. Both carry the optimized clear value from `clear_hint`.
    pub fn alloc_render_target(
        &mut self,
        device: &mut dyn GraphicsDevice,
        width: u32,
        height: u32,
        format: PixelFormat,
        clear_hint: &ClearHint,
        sample_count: u32,
    ) -> Result<GpuResource> {
        let native = format.as_native_format().ok_or_else(|| {
            engine_err!(SOURCE, "Render target format {:?} has no native equivalent", format)
        })?;

        let (flags, initial_state, clear_value) = if format.is_depth_format() {
            (
                ResourceFlags::ALLOW_DEPTH_STENCIL,
                ResourceStates::DEPTH_WRITE,
                ClearValue::DepthStencil {
                    format: native,
                    depth: clear_hint.depth,
                    stencil: clear_hint.stencil,
                },
            )
        } else {
            (
                ResourceFlags::ALLOW_RENDER_TARGET,
                ResourceStates::RENDER_TARGET,
                ClearValue::Color {
                    format: native,
                    rgba: clear_hint.color,
                },
            )
        };

        let desc = ResourceDesc {
            dimension: ResourceDimension::Texture2D,
            width: width as u64,
            height,
            depth_or_array_size: 1,
            mip_levels: 1,
            format: Some(native),
            sample_count: sample_count.max(1),
            heap_type: HeapType::Default,
            flags,
            initial_state,
            clear_value: Some(clear_value),
        };
        self.create(device, desc, "render target")
    }

    /// Allocate a sampled texture, optionally uploading initial pixel data
    ///
    /// With `data`, a staging buffer is filled, one copy per subresource plus
    /// a COPY_DEST -> PIXEL_SHADER_RESOURCE barrier are recorded into
    /// `cmd_list`, and the staging buffer is released deferred at
    /// `frame_index`. The copy executes when the command list does.
    pub fn alloc_texture(
        &mut self,
        device: &mut dyn GraphicsDevice,
        cmd_list: &mut dyn CommandList,
        frame_index: u64,
        setup: &TextureSetup,
        data: Option<&[u8]>,
    ) -> Result<GpuResource> {
        let mut desc = texture_desc(setup).ok_or_else(|| {
            engine_err!(SOURCE, "Texture format {:?} has no native equivalent", setup.color_format)
        })?;
        if data.is_some() {
            desc.initial_state = ResourceStates::COPY_DEST;
        }
        let texture = self.create(device, desc, "texture")?;

        let Some(data) = data else {
            return Ok(texture);
        };

        let footprints = device.copyable_footprints(texture.desc());
        let upload = match self.alloc_upload_buffer(device, footprints.total_bytes) {
            Ok(upload) => upload,
            Err(err) => {
                self.release_deferred(frame_index, texture);
                return Err(err);
            }
        };
        let staged = self.upload_texture_data(device, cmd_list, &texture, &upload, data);
        self.release_deferred(frame_index, upload);
        if let Err(err) = staged {
            self.release_deferred(frame_index, texture);
            return Err(err);
        }
        cmd_list.resource_barrier(
            texture.handle(),
            ResourceStates::COPY_DEST,
            ResourceStates::PIXEL_SHADER_RESOURCE,
        );
        Ok(texture)
    }

    /// Allocate a CPU-writable staging buffer of `size` bytes
    pub fn alloc_upload_buffer(&mut self, device: &mut dyn GraphicsDevice, size: u64) -> Result<GpuResource> {
        self.create(device, ResourceDesc::upload_buffer(size), "upload buffer")
    }

    /// Subresource layout of the texture described by `setup`
    ///
    /// `None` if the color format has no native equivalent.
    pub fn texture_footprints(&self, device: &dyn GraphicsDevice, setup: &TextureSetup) -> Option<CopyableFootprints> {
        texture_desc(setup).map(|desc| device.copyable_footprints(&desc))
    }

    /// Byte size a staging buffer needs to hold one full copy of the texture
    pub fn compute_texture_copy_footprint(&self, device: &dyn GraphicsDevice, setup: &TextureSetup) -> Result<u64> {
        self.texture_footprints(device, setup)
            .map(|footprints| footprints.total_bytes)
            .ok_or_else(|| {
                engine_err!(SOURCE, "Texture format {:?} has no native equivalent", setup.color_format)
            })
    }

    /// Stage tightly packed `data` into `upload` and record the copies into `texture`
    ///
    /// `data` holds faces one after another, each with mips 0..n. Barriers
    /// are left to the caller; `texture` must be in COPY_DEST state when the
    /// command list executes.
    pub fn upload_texture_data(
        &self,
        device: &mut dyn GraphicsDevice,
        cmd_list: &mut dyn CommandList,
        texture: &GpuResource,
        upload: &GpuResource,
        data: &[u8],
    ) -> Result<()> {
        let footprints = device.copyable_footprints(texture.desc());
        let packed_size = footprints.packed_size();
        if (data.len() as u64) < packed_size {
            engine_bail!(SOURCE, "Pixel data too small: {} bytes, expected {}", data.len(), packed_size);
        }
        if upload.desc().width < footprints.total_bytes {
            engine_bail!(SOURCE, "Upload buffer too small: {} bytes, expected {}",
                upload.desc().width, footprints.total_bytes);
        }

        let mut staging = vec![0u8; footprints.total_bytes as usize];
        let mut src = 0usize;
        for footprint in &footprints.layouts {
            let row_size = footprint.row_size_in_bytes as usize;
            let rows = (footprint.num_rows * footprint.depth) as usize;
            for row in 0..rows {
                let dst = footprint.offset as usize + row * footprint.row_pitch as usize;
                staging[dst..dst + row_size].copy_from_slice(&data[src..src + row_size]);
                src += row_size;
            }
        }
        device.write_buffer(upload.handle(), 0, &staging)?;

        for (subresource, footprint) in footprints.layouts.iter().enumerate() {
            cmd_list.copy_buffer_to_texture(texture.handle(), subresource as u32, upload.handle(), footprint);
        }
        Ok(())
    }

    /// Queue `resource` for destruction once frame `frame_index` has retired
    pub fn release_deferred(&mut self, frame_index: u64, resource: GpuResource) {
        engine_trace!(SOURCE, "Queued {:?} for release at frame {}", resource.handle, frame_index);
        self.pending.push(PendingRelease {
            frame_index,
            resource: resource.handle,
        });
        self.stats.queued += 1;
    }

    /// Drop one reference to a shared resource
    ///
    /// The resource is queued for release only when this was the last
    /// reference. Returns true if it was queued.
    pub fn release_shared_deferred(&mut self, frame_index: u64, resource: Arc<GpuResource>) -> bool {
        match Arc::try_unwrap(resource) {
            Ok(resource) => {
                self.release_deferred(frame_index, resource);
                true
            }
            Err(shared) => {
                engine_trace!(SOURCE, "Released reference to {:?} ({} left)",
                    shared.handle, Arc::strong_count(&shared) - 1);
                false
            }
        }
    }

    /// Destroy every pending resource whose frame has retired
    ///
    /// Returns the number of resources destroyed.
    pub fn garbage_collect(&mut self, device: &mut dyn GraphicsDevice, completed_frame_index: u64) -> usize {
        let mut freed = 0;
        self.pending.retain(|release| {
            if release.frame_index <= completed_frame_index {
                device.destroy_resource(release.resource);
                freed += 1;
                false
            } else {
                true
            }
        });
        self.stats.freed += freed as u64;
        freed
    }

    /// Destroy every pending resource now (device must be idle)
    pub fn destroy_all(&mut self, device: &mut dyn GraphicsDevice) -> usize {
        let freed = self.pending.len();
        for release in self.pending.drain(..) {
            device.destroy_resource(release.resource);
        }
        self.stats.freed += freed as u64;
        freed
    }

    pub fn pending_release_count(&self) -> usize {
        self.pending.len()
    }

    /// True if `resource` is waiting in the deferred-release queue
    pub fn is_release_pending(&self, resource: ResourceHandle) -> bool {
        self.pending.iter().any(|release| release.resource == resource)
    }

    pub fn stats(&self) -> ResourceAllocatorStats {
        self.stats
    }
}

/// Native description of a sampled texture (`None` if the format is unmapped)
fn texture_desc(setup: &TextureSetup) -> Option<ResourceDesc> {
    let format = setup.color_format.as_native_format()?;
    let (dimension, depth_or_array_size) = match setup.texture_type {
        TextureType::Texture2D => (ResourceDimension::Texture2D, 1),
        TextureType::TextureCube => (ResourceDimension::Texture2D, 6),
        TextureType::Texture3D => (ResourceDimension::Texture3D, setup.depth.max(1)),
    };
    Some(ResourceDesc {
        dimension,
        width: setup.width as u64,
        height: setup.height,
        depth_or_array_size,
        mip_levels: setup.num_mip_maps.max(1),
        format: Some(format),
        sample_count: 1,
        heap_type: HeapType::Default,
        flags: ResourceFlags::empty(),
        initial_state: ResourceStates::PIXEL_SHADER_RESOURCE,
        clear_value: None,
    })
}

#[cfg(test)]
#[path = "resource_allocator_tests.rs"]
mod tests;
