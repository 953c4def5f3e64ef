/// Texture module - texture entities, their registry, factory and facade

// Module declarations
pub mod texture;
pub mod texture_pool;
pub mod texture_factory;
pub mod texture_manager;

// Re-export everything from texture.rs
pub use texture::*;

// Re-export from other modules
pub use texture_pool::*;
pub use texture_factory::*;
pub use texture_manager::*;
