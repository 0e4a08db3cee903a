//! Core engine-facing contracts.
//!
//! Defines the shared [`Engine`] handle set and the contexts handed to `run`
//! and `draw` subscribers, so user code never touches platform internals.

mod ctx;
mod engine;

pub use ctx::{DrawPass, FrameCtx, FrameInfo, RunCtx};
pub use engine::Engine;
