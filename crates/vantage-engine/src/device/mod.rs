//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu device and queue against a window surface
//! - keeping the surface and the depth target sized to the framebuffer
//! - acquiring frames and mapping surface errors to loop actions

mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::{Gpu, GpuHandles};
pub use init::GpuInit;

/// Depth format used by every pipeline drawing into the frame.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
