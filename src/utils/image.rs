//! Image decode/encode helpers.
//!
//! The pipeline operates on decoded [`RgbImage`] buffers; these helpers
//! cover the byte-level boundary for callers that receive uploads or need
//! to ship the redacted result back out. Transport concerns (base64, data
//! URLs) stay with the caller.

use crate::core::{PrivacyError, PrivacyResult, ProcessingStage};
use image::{ImageFormat, RgbImage};
use std::io::Cursor;

/// Decodes raw image bytes (any format the `image` crate recognizes) into
/// an RGB buffer.
pub fn decode_image(bytes: &[u8]) -> PrivacyResult<RgbImage> {
    let dynamic = image::load_from_memory(bytes).map_err(PrivacyError::Decode)?;
    Ok(dynamic.to_rgb8())
}

/// Encodes an RGB buffer as PNG.
pub fn encode_png(image: &RgbImage) -> PrivacyResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| PrivacyError::processing(ProcessingStage::Generic, "png encode", e))?;
    Ok(bytes)
}

/// Builds an RGB image from raw interleaved bytes.
///
/// Returns `None` when `data` does not match `width * height * 3`.
pub fn create_rgb_image(width: u32, height: u32, data: Vec<u8>) -> Option<RgbImage> {
    RgbImage::from_raw(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn garbage_bytes_fail_with_decode_error() {
        let err = decode_image(&[0u8, 1, 2, 3, 4]);
        assert!(matches!(err, Err(PrivacyError::Decode(_))));
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let image = RgbImage::from_fn(9, 7, |x, y| Rgb([x as u8, y as u8, 42]));
        let bytes = encode_png(&image).unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn create_rgb_image_checks_length() {
        assert!(create_rgb_image(2, 2, vec![0u8; 12]).is_some());
        assert!(create_rgb_image(2, 2, vec![0u8; 11]).is_none());
    }
}
