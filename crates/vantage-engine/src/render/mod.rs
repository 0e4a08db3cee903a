//! Render coalescing and GPU drawing.
//!
//! [`RenderObject`] holds a matrix that any thread may update and request to
//! render; sink writes always happen on the render thread, at most once per
//! object per frame. Deferred requests are debounced through a
//! [`TimerFacility`] and flushed in the next draw phase.
//!
//! [`MeshRenderer`] is the wgpu side: a depth-tested mesh pipeline whose
//! projection, camera and model uniforms are exposed as [`UniformSlot`]
//! sinks.

mod error;
mod mesh;
mod object;
mod sink;
mod thread;
mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{RenderError, SinkError};
pub use mesh::{MeshRenderer, MeshUniform, MeshVertex};
pub use object::{DEFAULT_DEBOUNCE, FlushState, RenderHandle, RenderObject};
pub use sink::{MAT4_SIZE, MatrixSink, UniformSlot};
pub use thread::RenderThread;
pub use timer::{ManualTimer, ThreadTimer, TimerCallback, TimerFacility, TimerHandle};
