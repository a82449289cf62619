//! mesh-ngin
//!
//! CPU-side geometry containers for a wgpu renderer. A model stages raw
//! vertex and index bytes, derives bounds from them through typed strided
//! views, and hands them over to GPU buffers. A procedural grid generator
//! produces water planes as a single triangle strip.
//!
//! High-level modules
//! - `context`: headless wgpu device/queue implementing the GPU backend
//! - `data_structures`: models, meshes, bounding boxes, vertex views, textures
//! - `error`: geometry precondition errors
//! - `gpu`: the backend trait models upload through, and owned buffer handles
//! - `resources`: grid generation and texture loading
//!

pub mod context;
pub mod data_structures;
pub mod error;
pub mod gpu;
pub mod resources;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::Point3;
pub use wgpu;

/// Install a logger for the current platform. Repeated calls are harmless.
pub fn init_logging() {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            log::debug!("Logger already initialized: {}", e);
        }
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            log::debug!("Logger already initialized: {}", e);
        }
    }
}
