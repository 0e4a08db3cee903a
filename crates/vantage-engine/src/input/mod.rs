//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The platform layer translates window-system events into bus events, and
//! the [`InputLatch`] subscribes to those to keep "is down" tables current.

mod error;
mod latch;
mod types;

pub use error::InputError;
pub use latch::{InputLatch, KEY_COUNT, MOUSE_BUTTON_COUNT};
pub use types::{Action, Key, Modifiers, MouseButton};
