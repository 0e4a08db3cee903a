//! Event bus.
//!
//! Ordered, append-only subscriber lists for platform input, startup and
//! per-frame events. Firing runs every subscriber of a kind once, in
//! registration order, on the calling thread.

mod bus;
mod types;

pub use bus::{EventBus, FireReport, SubscriberFailure};
pub use types::{CursorPos, EventKind, FramebufferSize, KeyEvent, MouseButtonEvent, Scroll};
