//! Input injection abstraction for webrd-server.
//!
//! Provides the [`InputSynth`] trait and one implementation:
//! - `enigo_synth`: cross-platform injection via the `enigo` crate.
//! - `keymap`: symbolic key name to `enigo::Key` mapping.

mod enigo_synth;
mod error;
pub mod keymap;

pub use enigo_synth::EnigoSynth;
pub use error::InputError;

use rd_protocol::MouseButton;

/// Moves the mouse, presses/releases buttons and keys by symbolic name.
///
/// Methods take `&self`, not `&mut self`: the one real synthesizer is
/// shared across every session in the process, and the OS already
/// serializes actual device writes (spec §5), so implementations are
/// expected to hold any required mutable state behind interior
/// mutability (a mutex, in the shipped adapter).
pub trait InputSynth: Send + Sync {
    /// # Errors
    ///
    /// Returns [`InputError::Backend`] on an OS-level failure.
    fn move_mouse(&self, x: i32, y: i32) -> Result<(), InputError>;

    /// # Errors
    ///
    /// Returns [`InputError::Backend`] on an OS-level failure.
    fn mouse_button(&self, button: MouseButton, down: bool) -> Result<(), InputError>;

    /// `dy > 0` scrolls up, `dy < 0` scrolls down (spec §4.4).
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Backend`] on an OS-level failure.
    fn scroll(&self, dy: i32) -> Result<(), InputError>;

    /// # Errors
    ///
    /// Returns [`InputError::UnknownKey`] if `name` isn't in this
    /// synthesizer's vocabulary, or [`InputError::Backend`] on an
    /// OS-level failure.
    fn key_down(&self, name: &str) -> Result<(), InputError>;

    /// # Errors
    ///
    /// Returns [`InputError::UnknownKey`] if `name` isn't in this
    /// synthesizer's vocabulary, or [`InputError::Backend`] on an
    /// OS-level failure.
    fn key_up(&self, name: &str) -> Result<(), InputError>;
}

#[cfg(any(test, feature = "test-util"))]
pub mod fakes {
    use super::{InputError, InputSynth};
    use rd_protocol::MouseButton;
    use std::sync::Mutex;

    /// Every call an [`InputSynth`] received, for assertions in tests.
    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedCall {
        MoveMouse { x: i32, y: i32 },
        MouseButton { button: MouseButton, down: bool },
        Scroll { dy: i32 },
        KeyDown { name: String },
        KeyUp { name: String },
    }

    /// Records every call instead of touching the real OS input queue.
    #[derive(Default)]
    pub struct RecordingSynth {
        calls: Mutex<Vec<RecordedCall>>,
    }

    impl RecordingSynth {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl InputSynth for RecordingSynth {
        fn move_mouse(&self, x: i32, y: i32) -> Result<(), InputError> {
            self.calls.lock().unwrap().push(RecordedCall::MoveMouse { x, y });
            Ok(())
        }

        fn mouse_button(&self, button: MouseButton, down: bool) -> Result<(), InputError> {
            self.calls.lock().unwrap().push(RecordedCall::MouseButton { button, down });
            Ok(())
        }

        fn scroll(&self, dy: i32) -> Result<(), InputError> {
            self.calls.lock().unwrap().push(RecordedCall::Scroll { dy });
            Ok(())
        }

        fn key_down(&self, name: &str) -> Result<(), InputError> {
            if name == "Unmapped" {
                return Err(InputError::UnknownKey(name.to_owned()));
            }
            self.calls.lock().unwrap().push(RecordedCall::KeyDown { name: name.to_owned() });
            Ok(())
        }

        fn key_up(&self, name: &str) -> Result<(), InputError> {
            if name == "Unmapped" {
                return Err(InputError::UnknownKey(name.to_owned()));
            }
            self.calls.lock().unwrap().push(RecordedCall::KeyUp { name: name.to_owned() });
            Ok(())
        }
    }
}
