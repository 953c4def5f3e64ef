/// Texture entity: creation parameters, GPU slots and derived attributes
///
/// A `Texture` starts empty, is populated exactly once by one of the
/// `TextureFactory` creation paths, and is reset to empty by
/// `TextureFactory::destroy_resource` after every GPU object it references has
/// been handed to a deferred-release queue.

use std::sync::Arc;
use glam::Vec4;
use crate::device::{PixelFormat, ResourceHandle, ResourceStates};
use crate::renderer::GpuResource;

/// Maximum number of GPU slots of a texture (double-buffering for streaming)
pub const MAX_TEXTURE_SLOTS: usize = 2;

// ============================================================================
// Setup enums
// ============================================================================

/// Texture type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureType {
    #[default]
    Texture2D,
    /// Six 2D faces
    TextureCube,
    Texture3D,
}

/// Usage class of a texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Usage {
    /// Contents set once at creation
    #[default]
    Immutable,
    /// Updated every frame (double-buffered)
    Stream,
    /// Updated occasionally
    Dynamic,
}

/// Result code of a creation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResourceState {
    /// Not set up yet (or destroyed)
    #[default]
    Initial,
    /// Fully created and usable
    Valid,
    /// Rejected configuration, nothing allocated
    Failed,
    /// Setup matches no creation path, nothing touched
    InvalidState,
}

/// Opaque identity used to look up shared textures (e.g. depth providers)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Locator(String);

impl Locator {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Locator of a texture nobody looks up
    pub fn non_shared() -> Self {
        Self(String::new())
    }

    pub fn is_shared(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Optimized clear values for render targets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearHint {
    pub color: Vec4,
    pub depth: f32,
    pub stencil: u8,
}

impl Default for ClearHint {
    fn default() -> Self {
        Self {
            color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            depth: 1.0,
            stencil: 0,
        }
    }
}

// ============================================================================
// TextureSetup
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetupMode {
    RenderTarget,
    Empty,
    FromPixelData,
}

/// Immutable creation parameters of a texture
#[derive(Debug, Clone)]
pub struct TextureSetup {
    pub locator: Locator,
    pub texture_type: TextureType,
    pub usage: Usage,
    pub width: u32,
    pub height: u32,
    /// Depth of 3D textures (1 otherwise)
    pub depth: u32,
    /// Fraction of the framebuffer width (relative-size render targets)
    pub rel_width: f32,
    /// Fraction of the framebuffer height (relative-size render targets)
    pub rel_height: f32,
    pub num_mip_maps: u32,
    pub color_format: PixelFormat,
    /// `PixelFormat::None` for no depth buffer
    pub depth_format: PixelFormat,
    pub sample_count: u32,
    pub clear_hint: ClearHint,
    /// Texture whose depth buffer this render target shares
    pub depth_render_target: Option<Locator>,
    mode: SetupMode,
}

impl TextureSetup {
    fn with_mode(mode: SetupMode) -> Self {
        Self {
            locator: Locator::non_shared(),
            texture_type: TextureType::Texture2D,
            usage: Usage::Immutable,
            width: 0,
            height: 0,
            depth: 1,
            rel_width: 0.0,
            rel_height: 0.0,
            num_mip_maps: 1,
            color_format: PixelFormat::RGBA8,
            depth_format: PixelFormat::None,
            sample_count: 1,
            clear_hint: ClearHint::default(),
            depth_render_target: None,
            mode,
        }
    }

    /// Render target with an absolute size
    pub fn render_target(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::with_mode(SetupMode::RenderTarget)
        }
    }

    /// Render target sized as a fraction of the framebuffer
    pub fn rel_size_render_target(rel_width: f32, rel_height: f32) -> Self {
        Self {
            rel_width,
            rel_height,
            ..Self::with_mode(SetupMode::RenderTarget)
        }
    }

    /// Render target sharing the depth buffer (and size) of `depth_provider`
    pub fn shared_depth_render_target(depth_provider: Locator) -> Self {
        Self {
            depth_render_target: Some(depth_provider),
            ..Self::with_mode(SetupMode::RenderTarget)
        }
    }

    /// Immutable 2D texture created from pixel data
    pub fn from_pixel_data_2d(width: u32, height: u32, num_mip_maps: u32, color_format: PixelFormat) -> Self {
        Self {
            width,
            height,
            num_mip_maps,
            color_format,
            ..Self::with_mode(SetupMode::FromPixelData)
        }
    }

    /// Immutable cube map created from pixel data (6 faces)
    pub fn from_pixel_data_cube(width: u32, height: u32, num_mip_maps: u32, color_format: PixelFormat) -> Self {
        Self {
            texture_type: TextureType::TextureCube,
            ..Self::from_pixel_data_2d(width, height, num_mip_maps, color_format)
        }
    }

    /// Immutable volume texture created from pixel data
    pub fn from_pixel_data_3d(width: u32, height: u32, depth: u32, num_mip_maps: u32, color_format: PixelFormat) -> Self {
        Self {
            texture_type: TextureType::Texture3D,
            depth,
            ..Self::from_pixel_data_2d(width, height, num_mip_maps, color_format)
        }
    }

    /// Texture without initial data, updated later from the CPU
    pub fn empty(width: u32, height: u32, num_mip_maps: u32, color_format: PixelFormat, usage: Usage) -> Self {
        Self {
            width,
            height,
            num_mip_maps,
            color_format,
            usage,
            ..Self::with_mode(SetupMode::Empty)
        }
    }

    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_color_format(mut self, format: PixelFormat) -> Self {
        self.color_format = format;
        self
    }

    pub fn with_depth_format(mut self, format: PixelFormat) -> Self {
        self.depth_format = format;
        self
    }

    pub fn with_clear_hint(mut self, clear_hint: ClearHint) -> Self {
        self.clear_hint = clear_hint;
        self
    }

    pub fn with_sample_count(mut self, sample_count: u32) -> Self {
        self.sample_count = sample_count;
        self
    }

    pub fn should_setup_as_render_target(&self) -> bool {
        self.mode == SetupMode::RenderTarget
    }

    pub fn should_setup_empty(&self) -> bool {
        self.mode == SetupMode::Empty
    }

    pub fn should_setup_from_pixel_data(&self) -> bool {
        self.mode == SetupMode::FromPixelData
    }

    pub fn is_rel_size_render_target(&self) -> bool {
        self.rel_width > 0.0 && self.rel_height > 0.0
    }

    /// True if the render target has a depth buffer (own or shared)
    pub fn has_depth(&self) -> bool {
        self.depth_format != PixelFormat::None || self.has_shared_depth()
    }

    pub fn has_shared_depth(&self) -> bool {
        self.depth_render_target.is_some()
    }

    /// Number of faces of the pixel data (6 for cube maps)
    pub fn num_faces(&self) -> u32 {
        match self.texture_type {
            TextureType::TextureCube => 6,
            _ => 1,
        }
    }
}

// ============================================================================
// TextureAttrs
// ============================================================================

/// Derived, read-only attributes computed at creation time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextureAttrs {
    pub locator: Locator,
    pub texture_type: TextureType,
    pub color_format: PixelFormat,
    pub depth_format: PixelFormat,
    pub usage: Usage,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub num_mip_maps: u32,
    pub is_render_target: bool,
    pub has_depth_buffer: bool,
    pub has_shared_depth_buffer: bool,
}

// ============================================================================
// GPU slots
// ============================================================================

/// One GPU copy of the texture plus its staging buffer
#[derive(Debug, Default)]
pub struct TextureSlot {
    pub(crate) texture: Option<GpuResource>,
    pub(crate) upload_buffer: Option<GpuResource>,
    pub(crate) state: ResourceStates,
    /// Frame that last recorded a copy out of the upload buffer
    pub(crate) last_upload_frame: Option<u64>,
}

impl TextureSlot {
    pub fn texture_handle(&self) -> Option<ResourceHandle> {
        self.texture.as_ref().map(GpuResource::handle)
    }

    pub fn upload_buffer_handle(&self) -> Option<ResourceHandle> {
        self.upload_buffer.as_ref().map(GpuResource::handle)
    }

    /// Current access state of the texture resource
    pub fn state(&self) -> ResourceStates {
        self.state
    }

    pub fn last_upload_frame(&self) -> Option<u64> {
        self.last_upload_frame
    }

    fn is_empty(&self) -> bool {
        self.texture.is_none() && self.upload_buffer.is_none()
    }
}

/// Depth buffer reference of a render target
///
/// Both variants hold a strong reference; the reference count of the shared
/// `Arc` is the number of render targets using the depth buffer. The native
/// resource is queued for release when the last reference is released.
#[derive(Debug)]
pub enum DepthAttachment {
    /// Allocated by this render target
    Owned(Arc<GpuResource>),
    /// Borrowed from another render target
    Shared(Arc<GpuResource>),
}

impl DepthAttachment {
    pub fn resource(&self) -> &Arc<GpuResource> {
        match self {
            DepthAttachment::Owned(resource) | DepthAttachment::Shared(resource) => resource,
        }
    }

    pub fn handle(&self) -> ResourceHandle {
        self.resource().handle()
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, DepthAttachment::Shared(_))
    }

    /// Number of render targets referencing the depth buffer
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(self.resource())
    }

    pub(crate) fn into_resource(self) -> Arc<GpuResource> {
        match self {
            DepthAttachment::Owned(resource) | DepthAttachment::Shared(resource) => resource,
        }
    }
}

// ============================================================================
// Texture
// ============================================================================

/// Tracked texture resource
#[derive(Debug)]
pub struct Texture {
    setup: TextureSetup,
    pub(crate) state: ResourceState,
    pub(crate) slots: [TextureSlot; MAX_TEXTURE_SLOTS],
    pub(crate) num_slots: usize,
    pub(crate) active_slot: usize,
    pub(crate) depth_buffer: Option<DepthAttachment>,
    pub(crate) depth_buffer_state: ResourceStates,
    pub(crate) rtv_slot: Option<u32>,
    pub(crate) dsv_slot: Option<u32>,
    pub(crate) attrs: TextureAttrs,
    /// Frame of the last CPU update (at most one per frame)
    pub(crate) update_frame_index: Option<u64>,
}

impl Texture {
    /// Create an empty texture entity
    pub fn new(setup: TextureSetup) -> Self {
        Self {
            setup,
            state: ResourceState::Initial,
            slots: Default::default(),
            num_slots: 1,
            active_slot: 0,
            depth_buffer: None,
            depth_buffer_state: ResourceStates::COMMON,
            rtv_slot: None,
            dsv_slot: None,
            attrs: TextureAttrs::default(),
            update_frame_index: None,
        }
    }

    pub fn setup(&self) -> &TextureSetup {
        &self.setup
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    pub fn attrs(&self) -> &TextureAttrs {
        &self.attrs
    }

    pub fn num_slots(&self) -> usize {
        self.num_slots
    }

    /// Populated slot `index` (`None` past `num_slots`)
    pub fn slot(&self, index: usize) -> Option<&TextureSlot> {
        self.slots[..self.num_slots].get(index)
    }

    pub fn active_slot_index(&self) -> usize {
        self.active_slot
    }

    /// Texture resource the GPU should currently sample from
    pub fn active_resource(&self) -> Option<ResourceHandle> {
        self.slots[self.active_slot].texture_handle()
    }

    pub fn depth_buffer(&self) -> Option<&DepthAttachment> {
        self.depth_buffer.as_ref()
    }

    pub fn depth_buffer_state(&self) -> ResourceStates {
        self.depth_buffer_state
    }

    pub fn rtv_slot(&self) -> Option<u32> {
        self.rtv_slot
    }

    pub fn dsv_slot(&self) -> Option<u32> {
        self.dsv_slot
    }

    /// True if no GPU object or descriptor slot is referenced
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(TextureSlot::is_empty)
            && self.depth_buffer.is_none()
            && self.rtv_slot.is_none()
            && self.dsv_slot.is_none()
    }

    /// Reset to the empty state, keeping the setup
    ///
    /// Every GPU object must already have been taken out of the entity.
    pub(crate) fn clear(&mut self) {
        debug_assert!(self.is_empty(), "clearing a texture that still references GPU objects");
        let setup = self.setup.clone();
        *self = Texture::new(setup);
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
