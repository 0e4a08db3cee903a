use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::events::EventBus;

use super::error::InputError;
use super::types::{Action, Key, MouseButton};

/// Number of key slots. Codes `0..=Key::LAST` are valid.
pub const KEY_COUNT: usize = Key::LAST as usize + 1;

/// Number of mouse button slots.
pub const MOUSE_BUTTON_COUNT: usize = 8;

/// Latched "is down" state for keys and mouse buttons.
///
/// Written by the platform input callbacks, read from anywhere. There is no
/// edge detection: a held key and a freshly pressed key look the same, and
/// callers wanting press/release edges diff two polls themselves.
///
/// Slots are independent booleans with no derived invariants, so relaxed
/// atomics are enough.
pub struct InputLatch {
    keys: Box<[AtomicBool]>,
    buttons: Box<[AtomicBool]>,
}

impl InputLatch {
    pub fn new() -> Self {
        Self {
            keys: (0..KEY_COUNT).map(|_| AtomicBool::new(false)).collect(),
            buttons: (0..MOUSE_BUTTON_COUNT).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    /// Subscribes the latch to key and mouse-button events on `bus`.
    pub fn attach(self: &Arc<Self>, bus: &EventBus) {
        let latch = Arc::clone(self);
        bus.on_key(move |ev| {
            match ev.action {
                Action::Press => latch.on_press(ev.code)?,
                Action::Release => latch.on_release(ev.code)?,
                Action::Repeat => {}
            }
            Ok(())
        });

        let latch = Arc::clone(self);
        bus.on_mouse_button(move |ev| {
            match ev.action {
                Action::Press => latch.on_button_press(ev.code)?,
                Action::Release => latch.on_button_release(ev.code)?,
                Action::Repeat => {}
            }
            Ok(())
        });
    }

    pub fn on_press(&self, code: u32) -> Result<(), InputError> {
        self.key_slot(code)?.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub fn on_release(&self, code: u32) -> Result<(), InputError> {
        self.key_slot(code)?.store(false, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_down(&self, code: u32) -> Result<bool, InputError> {
        Ok(self.key_slot(code)?.load(Ordering::Relaxed))
    }

    pub fn on_button_press(&self, code: u32) -> Result<(), InputError> {
        self.button_slot(code)?.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub fn on_button_release(&self, code: u32) -> Result<(), InputError> {
        self.button_slot(code)?.store(false, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_button_down(&self, code: u32) -> Result<bool, InputError> {
        Ok(self.button_slot(code)?.load(Ordering::Relaxed))
    }

    /// Helper queries for named keys. Named keys are always in range.
    pub fn key_down(&self, key: Key) -> bool {
        self.is_down(key.code()).unwrap_or(false)
    }

    pub fn button_down(&self, button: MouseButton) -> bool {
        self.is_button_down(button.code()).unwrap_or(false)
    }

    fn key_slot(&self, code: u32) -> Result<&AtomicBool, InputError> {
        self.keys
            .get(code as usize)
            .ok_or(InputError::InvalidKeyCode { code })
    }

    fn button_slot(&self, code: u32) -> Result<&AtomicBool, InputError> {
        self.buttons
            .get(code as usize)
            .ok_or(InputError::InvalidButtonCode { code })
    }
}

impl Default for InputLatch {
    fn default() -> Self {
        Self::new()
    }
}
