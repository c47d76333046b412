//! Image decoding into an RGB pixel buffer.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces an
//! 8-bit-per-channel [`RgbImage`]. Grayscale and palette images are
//! expanded so each gray level becomes an `(l, l, l)` color; alpha is
//! dropped.

use crate::types::{PipelineError, RgbImage};

/// Decode raw image bytes into an RGB image.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_rgb8())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Encode an RGB image as PNG bytes.
    pub(crate) fn encode_png(img: &RgbImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        let result = decode_rgb(&[]);
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode_rgb(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn png_roundtrips_exact_colors() {
        let img = RgbImage::from_fn(3, 2, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            image::Rgb([x as u8 * 50, y as u8 * 70, 9])
        });
        let decoded = decode_rgb(&encode_png(&img)).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn grayscale_png_expands_to_gray_triplets() {
        let gray =
            image::GrayImage::from_fn(2, 1, |x, _| image::Luma([if x == 0 { 10 } else { 200 }]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            gray.as_raw(),
            gray.width(),
            gray.height(),
            image::ExtendedColorType::L8,
        )
        .unwrap();

        let decoded = decode_rgb(&buf).unwrap();
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 10, 10]);
        assert_eq!(decoded.get_pixel(1, 0).0, [200, 200, 200]);
    }

    #[test]
    fn alpha_is_dropped() {
        let img = image::RgbaImage::from_fn(1, 1, |_, _| image::Rgba([12, 34, 56, 128]));
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();

        let decoded = decode_rgb(&buf).unwrap();
        assert_eq!(decoded.get_pixel(0, 0).0, [12, 34, 56]);
    }
}
