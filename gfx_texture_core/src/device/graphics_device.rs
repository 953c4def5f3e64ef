/// GraphicsDevice and CommandList traits - the native backend seam
///
/// Device and swap-chain creation live outside this crate. The texture
/// lifecycle core only consumes an already-created device through this
/// trait, plus the handle of the command list uploads are recorded into.

use bitflags::bitflags;
use glam::Vec4;
use crate::error::Result;
use super::format::NativeFormat;
use super::footprint::{self, CopyableFootprints};

// ============================================================================
// Handles
// ============================================================================

/// Opaque native resource handle (texture, depth buffer or upload buffer)
///
/// Handles are only unique among *live* resources: the backend is free to
/// reissue the value of a destroyed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceHandle(u64);

impl ResourceHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// CPU-addressable location of a descriptor slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CpuDescriptorHandle {
    pub ptr: usize,
}

impl CpuDescriptorHandle {
    /// Address of the descriptor `index` slots after this one
    pub fn offset(self, index: u32, increment_size: u32) -> Self {
        Self {
            ptr: self.ptr + index as usize * increment_size as usize,
        }
    }
}

/// Kind of descriptor heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescriptorHeapKind {
    /// Render-target views
    RenderTargetView,
    /// Depth-stencil views
    DepthStencilView,
}

// ============================================================================
// Resource states and flags
// ============================================================================

bitflags! {
    /// Access state a resource is currently in (barrier tracking)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceStates: u32 {
        const RENDER_TARGET = 1 << 0;
        const DEPTH_WRITE = 1 << 1;
        const DEPTH_READ = 1 << 2;
        const PIXEL_SHADER_RESOURCE = 1 << 3;
        const COPY_DEST = 1 << 4;
        const COPY_SOURCE = 1 << 5;
        /// Required state of upload-heap buffers
        const GENERIC_READ = 1 << 6;
    }
}

impl ResourceStates {
    /// Common state (no bits set)
    pub const COMMON: Self = Self::empty();
}

impl Default for ResourceStates {
    fn default() -> Self {
        Self::COMMON
    }
}

bitflags! {
    /// Creation flags of a resource
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ResourceFlags: u32 {
        const ALLOW_RENDER_TARGET = 1 << 0;
        const ALLOW_DEPTH_STENCIL = 1 << 1;
    }
}

impl Default for ResourceFlags {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// Resource description
// ============================================================================

/// Dimension of a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceDimension {
    Buffer,
    Texture2D,
    Texture3D,
}

/// Memory heap a committed resource lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapType {
    /// GPU-local memory
    Default,
    /// CPU-writable staging memory
    Upload,
}

/// Optimized clear value passed at render target creation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    Color {
        format: NativeFormat,
        rgba: Vec4,
    },
    DepthStencil {
        format: NativeFormat,
        depth: f32,
        stencil: u8,
    },
}

/// Description of a committed resource
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDesc {
    pub dimension: ResourceDimension,
    /// Width in pixels, or byte size for buffers
    pub width: u64,
    pub height: u32,
    /// Depth for 3D textures, array size otherwise (6 for cube maps)
    pub depth_or_array_size: u32,
    pub mip_levels: u32,
    /// `None` for buffers
    pub format: Option<NativeFormat>,
    pub sample_count: u32,
    pub heap_type: HeapType,
    pub flags: ResourceFlags,
    pub initial_state: ResourceStates,
    pub clear_value: Option<ClearValue>,
}

impl ResourceDesc {
    /// Upload-heap buffer of `size` bytes
    pub fn upload_buffer(size: u64) -> Self {
        Self {
            dimension: ResourceDimension::Buffer,
            width: size,
            height: 1,
            depth_or_array_size: 1,
            mip_levels: 1,
            format: None,
            sample_count: 1,
            heap_type: HeapType::Upload,
            flags: ResourceFlags::empty(),
            initial_state: ResourceStates::GENERIC_READ,
            clear_value: None,
        }
    }

    /// Number of subresources (mips x array slices; 3D textures have one slice)
    pub fn subresource_count(&self) -> u32 {
        match self.dimension {
            ResourceDimension::Buffer => 1,
            ResourceDimension::Texture3D => self.mip_levels,
            ResourceDimension::Texture2D => self.mip_levels * self.depth_or_array_size,
        }
    }
}

/// Placement of one subresource inside a linear staging buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubresourceFootprint {
    /// Byte offset of the subresource in the buffer
    pub offset: u64,
    pub format: NativeFormat,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Aligned distance between two rows in the buffer
    pub row_pitch: u32,
    pub num_rows: u32,
    /// Tightly packed size of one row
    pub row_size_in_bytes: u32,
}

/// Alignment rules and limits of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceLimits {
    /// Row pitch alignment of texture copies in buffers
    pub texture_data_pitch_alignment: u32,
    /// Offset alignment of each subresource in buffers
    pub texture_data_placement_alignment: u64,
    pub max_texture_dimension_2d: u32,
}

impl Default for DeviceLimits {
    fn default() -> Self {
        Self {
            texture_data_pitch_alignment: 256,
            texture_data_placement_alignment: 512,
            max_texture_dimension_2d: 16384,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Native graphics device
///
/// All methods are called from the single thread driving resource creation.
pub trait GraphicsDevice: Send + Sync {
    /// Alignment rules and limits of this device
    fn limits(&self) -> DeviceLimits;

    /// Create a committed resource (memory + resource in one)
    fn create_committed_resource(&mut self, desc: &ResourceDesc) -> Result<ResourceHandle>;

    /// Destroy a resource immediately
    ///
    /// Only the deferred-release paths of the allocators call this, once the
    /// GPU has retired every frame that could reference `resource`.
    fn destroy_resource(&mut self, resource: ResourceHandle);

    /// Create a descriptor heap, returning the CPU handle of slot 0
    fn create_descriptor_heap(&mut self, kind: DescriptorHeapKind, capacity: u32) -> Result<CpuDescriptorHandle>;

    /// Distance in bytes between two slots of a heap of this kind
    fn descriptor_handle_increment_size(&self, kind: DescriptorHeapKind) -> u32;

    /// Write a render-target view of `resource` into `dest`
    fn create_render_target_view(&mut self, resource: ResourceHandle, dest: CpuDescriptorHandle);

    /// Write a depth-stencil view of `resource` into `dest`
    fn create_depth_stencil_view(&mut self, resource: ResourceHandle, dest: CpuDescriptorHandle);

    /// Copy `data` into a mapped upload buffer at `offset`
    fn write_buffer(&mut self, buffer: ResourceHandle, offset: u64, data: &[u8]) -> Result<()>;

    /// Signal the frame fence once all work of `frame_index` is submitted
    fn signal_frame(&mut self, frame_index: u64);

    /// Highest frame index whose GPU work has fully retired
    fn completed_frame_index(&self) -> u64;

    /// Copy layout of every subresource of `desc` in a linear buffer
    fn copyable_footprints(&self, desc: &ResourceDesc) -> CopyableFootprints {
        footprint::compute_copyable_footprints(desc, &self.limits())
    }
}

/// Command list uploads and barriers are recorded into
///
/// Recording is asynchronous relative to execution: commands run on the GPU
/// once the surrounding renderer submits the list.
pub trait CommandList: Send {
    /// Transition `resource` between access states
    fn resource_barrier(&mut self, resource: ResourceHandle, before: ResourceStates, after: ResourceStates);

    /// Copy one subresource from a staging buffer into a texture
    fn copy_buffer_to_texture(
        &mut self,
        dst: ResourceHandle,
        dst_subresource: u32,
        src: ResourceHandle,
        footprint: &SubresourceFootprint,
    );
}
