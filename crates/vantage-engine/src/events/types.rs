use std::fmt;

use crate::input::{Action, Key, Modifiers, MouseButton};

/// Subscriber registry selector.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum EventKind {
    Key,
    MouseButton,
    CursorPos,
    Scroll,
    FramebufferSize,
    /// Fired once, on the render thread, before the first frame.
    Run,
    /// Fired once per frame between clear and present.
    Draw,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Key => "key",
            EventKind::MouseButton => "mouse-button",
            EventKind::CursorPos => "cursor-pos",
            EventKind::Scroll => "scroll",
            EventKind::FramebufferSize => "framebuffer-size",
            EventKind::Run => "run",
            EventKind::Draw => "draw",
        };
        f.write_str(name)
    }
}

/// Keyboard transition.
///
/// `code` is the latch index; it equals `key.code()` for keys the platform
/// layer recognizes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub code: u32,
    pub action: Action,
    pub modifiers: Modifiers,
}

/// Mouse button transition.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub code: u32,
    pub action: Action,
    pub modifiers: Modifiers,
}

/// Cursor position in physical pixels, origin top-left.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CursorPos {
    pub x: f64,
    pub y: f64,
}

/// Scroll offsets. Positive `y` scrolls away from the user.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Scroll {
    pub x_offset: f64,
    pub y_offset: f64,
}

/// New framebuffer size in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FramebufferSize {
    pub width: u32,
    pub height: u32,
}
