/// Display module - window / framebuffer size tracking

pub mod display_manager;

pub use display_manager::*;
