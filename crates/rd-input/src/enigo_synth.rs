use std::sync::Mutex;

use enigo::{Axis, Button, Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};

use rd_protocol::MouseButton;

use crate::keymap::lookup;
use crate::{InputError, InputSynth};

fn to_enigo_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Middle => Button::Middle,
        MouseButton::Right => Button::Right,
    }
}

/// OS input synthesizer backed by the cross-platform `enigo` crate.
///
/// `Enigo` itself isn't `Sync`; sessions only ever hold one input
/// synthesizer shared across the whole process (spec §5: "access is
/// serialized by the OS"), so calls are serialized here with a mutex
/// rather than requiring `&mut self` all the way up through the
/// dispatcher.
pub struct EnigoSynth {
    enigo: Mutex<Enigo>,
}

impl EnigoSynth {
    /// # Errors
    ///
    /// Returns [`InputError::Backend`] if the platform input backend
    /// can't be initialized (e.g. no accessibility permission granted).
    pub fn new() -> Result<Self, InputError> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| InputError::Backend(e.to_string()))?;
        Ok(Self { enigo: Mutex::new(enigo) })
    }
}

impl InputSynth for EnigoSynth {
    fn move_mouse(&self, x: i32, y: i32) -> Result<(), InputError> {
        self.enigo
            .lock()
            .unwrap()
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| InputError::Backend(e.to_string()))
    }

    fn mouse_button(&self, button: MouseButton, down: bool) -> Result<(), InputError> {
        let direction = if down { Direction::Press } else { Direction::Release };
        self.enigo
            .lock()
            .unwrap()
            .button(to_enigo_button(button), direction)
            .map_err(|e| InputError::Backend(e.to_string()))
    }

    fn scroll(&self, dy: i32) -> Result<(), InputError> {
        self.enigo
            .lock()
            .unwrap()
            .scroll(-dy, Axis::Vertical)
            .map_err(|e| InputError::Backend(e.to_string()))
    }

    fn key_down(&self, name: &str) -> Result<(), InputError> {
        let key = lookup(name).ok_or_else(|| InputError::UnknownKey(name.to_owned()))?;
        self.enigo
            .lock()
            .unwrap()
            .key(key, Direction::Press)
            .map_err(|e| InputError::Backend(e.to_string()))
    }

    fn key_up(&self, name: &str) -> Result<(), InputError> {
        let key = lookup(name).ok_or_else(|| InputError::UnknownKey(name.to_owned()))?;
        self.enigo
            .lock()
            .unwrap()
            .key(key, Direction::Release)
            .map_err(|e| InputError::Backend(e.to_string()))
    }
}
