//! Screen capture abstraction for webrd-server.
//!
//! Provides the [`DisplayCapture`] trait and one implementation:
//! - `xcap_capture`: cross-platform capture via the `xcap` crate.

mod error;
mod xcap_capture;

pub use error::CaptureError;
pub use xcap_capture::XcapCapture;

use rd_protocol::Image;

/// Acquires a pixel buffer for the current desktop.
///
/// Implementations are synchronous; callers that run on an async
/// executor are expected to invoke `capture` from
/// `tokio::task::spawn_blocking`, since real capture backends block on
/// GPU/compositor round-trips.
pub trait DisplayCapture: Send + Sync {
    /// Capture the primary display, or the union of all displays when
    /// `fullscreen` is set.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError`] on any transient backend failure.
    fn capture(&self, fullscreen: bool) -> Result<Image, CaptureError>;
}

#[cfg(any(test, feature = "test-util"))]
pub mod fakes {
    use super::{CaptureError, DisplayCapture};
    use rd_protocol::Image;
    use std::sync::Mutex;

    /// A capture backend returning a fixed sequence of canned images,
    /// for session-level unit tests that must not touch a real display.
    pub struct FakeCapture {
        frames: Mutex<std::collections::VecDeque<Result<Image, CaptureError>>>,
        last: Mutex<Option<Image>>,
    }

    impl FakeCapture {
        #[must_use]
        pub fn new(frames: Vec<Image>) -> Self {
            Self {
                frames: Mutex::new(frames.into_iter().map(Ok).collect()),
                last: Mutex::new(None),
            }
        }

        pub fn push_error(&self, err: CaptureError) {
            self.frames.lock().unwrap().push_back(Err(err));
        }
    }

    impl DisplayCapture for FakeCapture {
        fn capture(&self, _fullscreen: bool) -> Result<Image, CaptureError> {
            let mut queue = self.frames.lock().unwrap();
            match queue.pop_front() {
                Some(Ok(img)) => {
                    *self.last.lock().unwrap() = Some(img.clone());
                    Ok(img)
                }
                Some(Err(e)) => Err(e),
                // Once exhausted, keep repeating the last frame (a stationary display).
                None => self
                    .last
                    .lock()
                    .unwrap()
                    .clone()
                    .ok_or(CaptureError::NoMonitors),
            }
        }
    }
}
