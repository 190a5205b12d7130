use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder as CodecJpegEncoder;
use image::{imageops::FilterType, ImageBuffer, Rgba};

use rd_protocol::Image;

use crate::error::EncodeError;
use crate::JpegEncoder;

fn to_rgba_buffer(image: &Image) -> Option<ImageBuffer<Rgba<u8>, Vec<u8>>> {
    ImageBuffer::from_raw(image.width, image.height, image.pixels.clone())
}

fn from_rgba_buffer(buf: ImageBuffer<Rgba<u8>, Vec<u8>>) -> Image {
    let (width, height) = buf.dimensions();
    Image::new(width, height, buf.into_raw())
}

/// Resize `image` to `(width, height)` using a fixed, deterministic
/// filter (bilinear/"triangle"), matching spec §4.3 step 3.
///
/// # Panics
///
/// Panics if `image`'s pixel buffer doesn't match its declared
/// dimensions (an invariant [`Image::new`] already enforces).
#[must_use]
pub fn resize(image: &Image, width: u32, height: u32) -> Image {
    if (image.width, image.height) == (width, height) {
        return image.clone();
    }
    let buf = to_rgba_buffer(image).expect("Image invariant guarantees a valid buffer");
    let resized = image::imageops::resize(&buf, width, height, FilterType::Triangle);
    from_rgba_buffer(resized)
}

/// JPEG encoder backed by the `image` crate's built-in JPEG codec.
#[derive(Debug, Default)]
pub struct ImageJpegEncoder;

impl ImageJpegEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl JpegEncoder for ImageJpegEncoder {
    fn encode(&self, image: &Image, quality: u8) -> Result<Vec<u8>, EncodeError> {
        let buf = to_rgba_buffer(image)
            .ok_or_else(|| EncodeError::Backend("pixel buffer size mismatch".into()))?;
        // JPEG has no alpha channel; flatten onto an opaque background.
        let rgb = image::DynamicImage::ImageRgba8(buf).to_rgb8();

        let mut out = Vec::new();
        CodecJpegEncoder::new_with_quality(Cursor::new(&mut out), quality)
            .encode_image(&rgb)
            .map_err(|e| EncodeError::Backend(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resize_produces_requested_dimensions() {
        let img = Image::blank(100, 50);
        let resized = resize(&img, 40, 20);
        assert_eq!(resized.dimensions(), (40, 20));
    }

    #[test]
    fn resize_is_noop_for_matching_dimensions() {
        let img = Image::blank(64, 64);
        let resized = resize(&img, 64, 64);
        assert_eq!(resized, img);
    }

    #[test]
    fn encode_produces_valid_jpeg_magic_bytes() {
        let img = Image::blank(16, 16);
        let encoder = ImageJpegEncoder::new();
        let jpeg = encoder.encode(&img, 80).unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn higher_quality_is_not_smaller_for_noisy_image() {
        let mut img = Image::blank(32, 32);
        for (i, px) in img.pixels.chunks_exact_mut(4).enumerate() {
            px[0] = (i * 37 % 256) as u8;
            px[1] = (i * 91 % 256) as u8;
            px[2] = (i * 53 % 256) as u8;
        }
        let encoder = ImageJpegEncoder::new();
        let low = encoder.encode(&img, 10).unwrap();
        let high = encoder.encode(&img, 95).unwrap();
        assert!(high.len() >= low.len());
    }
}
