/// Display manager - window and framebuffer sizes
///
/// The window size is logical (device-independent units); the framebuffer
/// size is what relative-size render targets are resolved against. How one
/// maps to the other depends on the host surface, expressed as a
/// `SurfaceScaling` implementation chosen when the display manager is built.

use winit::dpi::{LogicalSize, PhysicalSize};
use crate::config::GfxConfig;
use crate::device::PixelFormat;
use crate::error::{Error, Result};
use crate::{engine_debug, engine_info};

const SOURCE: &str = "gfx::DisplayManager";

/// DPI at which one logical unit is one pixel
const BASE_DPI: f32 = 96.0;

// ============================================================================
// Surface scaling
// ============================================================================

/// Conversion from the logical window size to the framebuffer size
pub trait SurfaceScaling: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &'static str;

    /// Framebuffer size for a window of the given logical size
    fn framebuffer_size(&self, window: LogicalSize<u32>) -> PhysicalSize<u32>;
}

/// Desktop surface: the framebuffer matches the window size
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopSurface;

impl SurfaceScaling for DesktopSurface {
    fn name(&self) -> &'static str {
        "desktop"
    }

    fn framebuffer_size(&self, window: LogicalSize<u32>) -> PhysicalSize<u32> {
        PhysicalSize::new(window.width, window.height)
    }
}

/// DPI-scaled surface: logical units are converted with the display DPI
///
/// Without `high_dpi`, displays above 192 DPI render at half resolution.
#[derive(Debug, Clone, Copy)]
pub struct DpiScaledSurface {
    pub logical_dpi: f32,
    pub high_dpi: bool,
}

impl DpiScaledSurface {
    pub fn new(logical_dpi: f32, high_dpi: bool) -> Self {
        Self { logical_dpi, high_dpi }
    }

    /// DPI actually used for the conversion
    pub fn effective_dpi(&self) -> f32 {
        if !self.high_dpi && self.logical_dpi > 2.0 * BASE_DPI {
            self.logical_dpi * 0.5
        } else {
            self.logical_dpi
        }
    }

    pub fn scale_factor(&self) -> f64 {
        let dpi = self.effective_dpi();
        if dpi.is_finite() && dpi > 0.0 {
            f64::from(dpi / BASE_DPI)
        } else {
            1.0
        }
    }
}

impl SurfaceScaling for DpiScaledSurface {
    fn name(&self) -> &'static str {
        "dpi-scaled"
    }

    fn framebuffer_size(&self, window: LogicalSize<u32>) -> PhysicalSize<u32> {
        // Width and height round independently: floor(x + 0.5)
        window.to_physical::<u32>(self.scale_factor())
    }
}

// ============================================================================
// Display manager
// ============================================================================

/// Display attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayAttrs {
    pub window_width: u32,
    pub window_height: u32,
    pub framebuffer_width: u32,
    pub framebuffer_height: u32,
    pub sample_count: u32,
    pub windowed: bool,
    pub swap_interval: u32,
    pub color_format: PixelFormat,
    pub depth_format: PixelFormat,
}

/// Display manager
pub struct DisplayManager {
    surface: Box<dyn SurfaceScaling>,
    attrs: DisplayAttrs,
    valid: bool,
    num_presents: u64,
}

impl DisplayManager {
    pub fn new(surface: Box<dyn SurfaceScaling>) -> Self {
        Self {
            surface,
            attrs: DisplayAttrs::default(),
            valid: false,
            num_presents: 0,
        }
    }

    /// Display manager for a plain desktop window
    pub fn desktop() -> Self {
        Self::new(Box::new(DesktopSurface))
    }

    /// Initialize the display from the configuration
    pub fn setup_display(&mut self, config: &GfxConfig) -> Result<()> {
        if self.valid {
            return Err(Error::InitializationFailed("display already set up".to_string()));
        }
        if config.width == 0 || config.height == 0 {
            return Err(Error::InitializationFailed(format!(
                "invalid window size {}x{}",
                config.width, config.height
            )));
        }

        let framebuffer = self.surface.framebuffer_size(LogicalSize::new(config.width, config.height));
        self.attrs = DisplayAttrs {
            window_width: config.width,
            window_height: config.height,
            framebuffer_width: framebuffer.width,
            framebuffer_height: framebuffer.height,
            sample_count: config.sample_count,
            windowed: config.windowed,
            swap_interval: config.swap_interval,
            color_format: config.color_format,
            depth_format: config.depth_format,
        };
        self.valid = true;

        engine_info!(SOURCE, "Display set up ({} surface): window {}x{}, framebuffer {}x{}",
            self.surface.name(), config.width, config.height, framebuffer.width, framebuffer.height);
        Ok(())
    }

    pub fn discard_display(&mut self) {
        self.valid = false;
        self.attrs = DisplayAttrs::default();
    }

    pub fn is_display_valid(&self) -> bool {
        self.valid
    }

    pub fn display_attrs(&self) -> &DisplayAttrs {
        &self.attrs
    }

    pub fn framebuffer_size(&self) -> PhysicalSize<u32> {
        PhysicalSize::new(self.attrs.framebuffer_width, self.attrs.framebuffer_height)
    }

    /// Track a window resize
    ///
    /// Returns true if the framebuffer size changed, in which case
    /// relative-size render targets must be recreated.
    pub fn on_window_did_resize(&mut self, window: LogicalSize<u32>) -> bool {
        if !self.valid {
            return false;
        }
        self.attrs.window_width = window.width;
        self.attrs.window_height = window.height;

        let framebuffer = self.surface.framebuffer_size(window);
        if framebuffer == self.framebuffer_size() {
            return false;
        }
        engine_debug!(SOURCE, "Framebuffer resized {}x{} -> {}x{}",
            self.attrs.framebuffer_width, self.attrs.framebuffer_height,
            framebuffer.width, framebuffer.height);
        self.attrs.framebuffer_width = framebuffer.width;
        self.attrs.framebuffer_height = framebuffer.height;
        true
    }

    /// Present the current frame
    pub fn present(&mut self) {
        self.num_presents += 1;
    }

    pub fn num_presents(&self) -> u64 {
        self.num_presents
    }
}

#[cfg(test)]
#[path = "display_manager_tests.rs"]
mod tests;
