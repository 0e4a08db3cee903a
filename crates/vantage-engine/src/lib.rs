//! Vantage engine crate.
//!
//! Owns the real-time viewer loop: event dispatch, input latching, the
//! fixed-timestep frame scheduler, and the render coalescer that funnels
//! transform updates from any thread into single-threaded GPU writes.

pub mod core;
pub mod device;
pub mod events;
pub mod input;
pub mod platform;
pub mod render;
pub mod scene;
pub mod time;

pub mod logging;
