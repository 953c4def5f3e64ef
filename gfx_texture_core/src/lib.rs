/*!
# gfx_texture_core

GPU texture and render-target lifecycle for a pipelined renderer.

The GPU executes command lists up to several frames after the CPU recorded
them, so nothing a texture references may be destroyed as soon as the texture
is. This crate creates textures, render targets and their descriptor slots,
shares depth buffers between render targets, and releases every GPU object
only once the frame that last used it has retired.

## Architecture

- **GraphicsDevice / CommandList**: native backend seam (a mock is provided)
- **ResourceAllocator**: native resources with frame-tagged deferred release
- **DescriptorAllocator**: fixed-capacity view heaps with deferred slot release
- **Texture**: the tracked entity (slots, depth attachment, view slots, attrs)
- **TextureFactory**: render target / empty / from-pixel-data creation paths
- **TextureManager**: facade tying display, renderer, factory and pool together
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod config;
pub mod utils;
pub mod device;
pub mod display;
pub mod renderer;
pub mod texture;

// Main gfx namespace module
pub mod gfx {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine facade (global logger)
    pub use crate::engine::Engine;

    // Configuration
    pub use crate::config::GfxConfig;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Native backend seam
    pub mod device {
        pub use crate::device::*;
    }

    // Display sub-module
    pub mod display {
        pub use crate::display::*;
    }

    // Renderer and allocators
    pub mod render {
        pub use crate::renderer::*;
    }

    // Texture sub-module
    pub mod texture {
        pub use crate::texture::*;
    }
}

// Re-export math and window-size types at crate root
pub use glam;
pub use winit::dpi;
