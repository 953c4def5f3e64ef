/// Renderer module - frame clock and GPU memory / descriptor allocators

// Module declarations
pub mod renderer;
pub mod resource_allocator;
pub mod descriptor_allocator;

// Re-export everything from renderer.rs
pub use renderer::*;

// Re-export from other modules
pub use resource_allocator::*;
pub use descriptor_allocator::*;
