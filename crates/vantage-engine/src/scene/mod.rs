//! Transform adapters.
//!
//! Each adapter keeps the scalar parameters of one matrix, rebuilds the
//! matrix from them on every change, and pushes it with a forced render.
//! Rebuilding from the same scalars always yields the same matrix.

mod camera;
mod model;
mod projection;

pub use camera::Camera;
pub use model::{Axis, Model, wrap_degrees};
pub use projection::Projection;
