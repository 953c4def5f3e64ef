//! Error types for the texture lifecycle core
//!
//! Every error in this module is a *fatal* condition for the creation attempt
//! that produced it: native device failures, descriptor heap exhaustion and
//! missing collaborators. Non-fatal outcomes (rejected configurations, invalid
//! request shapes) are reported through `ResourceState` instead.

use std::fmt;
use crate::device::DescriptorHeapKind;

/// Result type for texture lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Texture lifecycle errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (native device call failed)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (unknown texture, heap, missing depth provider, ...)
    InvalidResource(String),

    /// Initialization failed (display, renderer, heaps)
    InitializationFailed(String),

    /// A fixed-capacity descriptor heap has no free slot left
    DescriptorHeapExhausted {
        /// Kind of heap that ran out of slots
        heap: DescriptorHeapKind,
        /// Capacity the heap was created with
        capacity: u32,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::DescriptorHeapExhausted { heap, capacity } => {
                write!(f, "Descriptor heap exhausted: {:?} heap (capacity {})", heap, capacity)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
