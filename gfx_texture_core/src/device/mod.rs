/// Device module - native backend seam (device, command list, formats)

pub mod graphics_device;
pub mod format;
pub mod footprint;

// Mock graphics device (no GPU required), used by unit and integration tests
pub mod mock_graphics_device;

pub use graphics_device::*;
pub use format::*;
pub use footprint::*;
