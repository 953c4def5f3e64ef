/// Configuration of the display, renderer and descriptor heaps

use crate::device::PixelFormat;

/// Graphics configuration
#[derive(Debug, Clone)]
pub struct GfxConfig {
    /// Initial window width (logical units)
    pub width: u32,
    /// Initial window height (logical units)
    pub height: u32,
    /// Windowed or fullscreen
    pub windowed: bool,
    /// Vertical sync interval passed to present
    pub swap_interval: u32,
    /// MSAA sample count of the default framebuffer
    pub sample_count: u32,
    /// Color format of the default framebuffer
    pub color_format: PixelFormat,
    /// Depth format of the default framebuffer (`None` for no depth)
    pub depth_format: PixelFormat,
    /// Render at full resolution on high-DPI displays
    pub high_dpi: bool,
    /// Fixed capacity of the render-target-view heap
    pub rtv_heap_capacity: u32,
    /// Fixed capacity of the depth-stencil-view heap
    pub dsv_heap_capacity: u32,
}

impl GfxConfig {
    /// Configuration for a window of the given size
    pub fn window(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}

impl Default for GfxConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 400,
            windowed: true,
            swap_interval: 1,
            sample_count: 1,
            color_format: PixelFormat::RGBA8,
            depth_format: PixelFormat::DEPTHSTENCIL,
            high_dpi: false,
            rtv_heap_capacity: 128,
            dsv_heap_capacity: 128,
        }
    }
}
