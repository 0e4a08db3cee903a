use thiserror::Error;

/// Input latch failures.
#[derive(Debug, Clone, Copy, Error, Eq, PartialEq)]
pub enum InputError {
    #[error("key code {code} is outside the key table")]
    InvalidKeyCode { code: u32 },

    #[error("mouse button code {code} is outside the button table")]
    InvalidButtonCode { code: u32 },
}
