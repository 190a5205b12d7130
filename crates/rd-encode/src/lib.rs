//! Resize and JPEG-encode abstraction for webrd-server.
//!
//! Provides the [`JpegEncoder`] trait, a concrete implementation built
//! on the `image` crate, and the deterministic [`resize`] helper used
//! by the capture-encode pipeline (spec §4.3).

mod error;
mod image_codec;

pub use error::EncodeError;
pub use image_codec::{resize, ImageJpegEncoder};

use rd_protocol::Image;

/// Encodes a rectangular pixel region as JPEG at a given quality.
pub trait JpegEncoder: Send + Sync {
    /// # Errors
    ///
    /// Returns [`EncodeError`] if the backend codec fails.
    fn encode(&self, image: &Image, quality: u8) -> Result<Vec<u8>, EncodeError>;
}

#[cfg(any(test, feature = "test-util"))]
pub mod fakes {
    use super::{EncodeError, JpegEncoder};
    use rd_protocol::Image;

    /// An encoder that always "succeeds" with a tiny fixed payload,
    /// so pipeline tests don't depend on real JPEG bytes.
    pub struct FakeEncoder;

    impl JpegEncoder for FakeEncoder {
        fn encode(&self, image: &Image, quality: u8) -> Result<Vec<u8>, EncodeError> {
            Ok(vec![quality, (image.width % 256) as u8, (image.height % 256) as u8])
        }
    }

    /// An encoder that always fails, for testing the `EncodeError` path.
    pub struct FailingEncoder;

    impl JpegEncoder for FailingEncoder {
        fn encode(&self, _image: &Image, _quality: u8) -> Result<Vec<u8>, EncodeError> {
            Err(EncodeError::Backend("synthetic failure".into()))
        }
    }
}
