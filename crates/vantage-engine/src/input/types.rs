use std::fmt;

/// Keyboard key identifier.
///
/// Every variant maps to a stable numeric code via [`Key::code`]; the codes
/// follow the classic desktop layout (printable keys use their ASCII value,
/// control keys start at 256). Platform keys without a variant travel as
/// `Key::Unknown(code)`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Space,

    Escape,
    Enter,
    Tab,
    Backspace,
    Insert,
    Delete,

    ArrowRight,
    ArrowLeft,
    ArrowDown,
    ArrowUp,

    PageUp,
    PageDown,
    Home,
    End,

    LeftShift,
    LeftControl,
    LeftAlt,
    LeftSuper,
    RightShift,
    RightControl,
    RightAlt,
    RightSuper,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Digits
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    /// Platform key not represented here, carrying its raw code.
    Unknown(u32),
}

impl Key {
    /// Highest code a named key maps to.
    pub const LAST: u32 = 348;

    /// Stable numeric code used to index the input latch.
    pub fn code(self) -> u32 {
        match self {
            Key::Space => 32,

            Key::Escape => 256,
            Key::Enter => 257,
            Key::Tab => 258,
            Key::Backspace => 259,
            Key::Insert => 260,
            Key::Delete => 261,

            Key::ArrowRight => 262,
            Key::ArrowLeft => 263,
            Key::ArrowDown => 264,
            Key::ArrowUp => 265,

            Key::PageUp => 266,
            Key::PageDown => 267,
            Key::Home => 268,
            Key::End => 269,

            Key::LeftShift => 340,
            Key::LeftControl => 341,
            Key::LeftAlt => 342,
            Key::LeftSuper => 343,
            Key::RightShift => 344,
            Key::RightControl => 345,
            Key::RightAlt => 346,
            Key::RightSuper => 347,

            // Letters
            Key::A => 65,
            Key::B => 66,
            Key::C => 67,
            Key::D => 68,
            Key::E => 69,
            Key::F => 70,
            Key::G => 71,
            Key::H => 72,
            Key::I => 73,
            Key::J => 74,
            Key::K => 75,
            Key::L => 76,
            Key::M => 77,
            Key::N => 78,
            Key::O => 79,
            Key::P => 80,
            Key::Q => 81,
            Key::R => 82,
            Key::S => 83,
            Key::T => 84,
            Key::U => 85,
            Key::V => 86,
            Key::W => 87,
            Key::X => 88,
            Key::Y => 89,
            Key::Z => 90,

            // Digits
            Key::Digit0 => 48,
            Key::Digit1 => 49,
            Key::Digit2 => 50,
            Key::Digit3 => 51,
            Key::Digit4 => 52,
            Key::Digit5 => 53,
            Key::Digit6 => 54,
            Key::Digit7 => 55,
            Key::Digit8 => 56,
            Key::Digit9 => 57,

            // Function keys
            Key::F1 => 290,
            Key::F2 => 291,
            Key::F3 => 292,
            Key::F4 => 293,
            Key::F5 => 294,
            Key::F6 => 295,
            Key::F7 => 296,
            Key::F8 => 297,
            Key::F9 => 298,
            Key::F10 => 299,
            Key::F11 => 300,
            Key::F12 => 301,

            Key::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Mouse button identifier.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Back,
    Forward,
    Other(u16),
}

impl MouseButton {
    /// Stable numeric code used to index the input latch.
    pub fn code(self) -> u32 {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
            MouseButton::Back => 3,
            MouseButton::Forward => 4,
            MouseButton::Other(n) => u32::from(n),
        }
    }
}

/// Transition reported by the platform for a key or button.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    Press,
    Release,
    /// Auto-repeat of a held key. Does not change latch state.
    Repeat,
}

/// Modifier keys state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn printable_keys_use_ascii_codes() {
        assert_eq!(Key::Space.code(), 32);
        assert_eq!(Key::A.code(), 'A' as u32);
        assert_eq!(Key::Z.code(), 'Z' as u32);
        assert_eq!(Key::Digit0.code(), '0' as u32);
        assert_eq!(Key::Digit9.code(), '9' as u32);
    }

    #[test]
    fn letter_digit_and_function_keys_are_contiguous() {
        let letters = [
            Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
            Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
            Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
        ];
        for (i, key) in letters.into_iter().enumerate() {
            assert_eq!(key.code(), 'A' as u32 + i as u32, "{key}");
        }

        let digits = [
            Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4,
            Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
        ];
        for (i, key) in digits.into_iter().enumerate() {
            assert_eq!(key.code(), '0' as u32 + i as u32, "{key}");
        }

        let function = [
            Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
            Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
        ];
        for (i, key) in function.into_iter().enumerate() {
            assert_eq!(key.code(), 290 + i as u32, "{key}");
        }
    }

    #[test]
    fn control_keys_stay_within_table() {
        assert_eq!(Key::Escape.code(), 256);
        assert_eq!(Key::F1.code(), 290);
        assert_eq!(Key::F12.code(), 301);
        assert!(Key::RightSuper.code() <= Key::LAST);
    }

    #[test]
    fn unknown_key_carries_raw_code() {
        assert_eq!(Key::Unknown(1234).code(), 1234);
    }

    #[test]
    fn mouse_button_codes() {
        assert_eq!(MouseButton::Left.code(), 0);
        assert_eq!(MouseButton::Right.code(), 1);
        assert_eq!(MouseButton::Other(7).code(), 7);
    }
}
