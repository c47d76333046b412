//! Optional Gaussian pre-smoothing before color extraction.
//!
//! Smoothing merges sensor noise into fewer distinct colors, which shrinks
//! the vertex set the MST has to span. It is off by default
//! (`blur_sigma == 0.0`).
//!
//! [`gaussian_blur_rgb`] wraps [`imageproc::filter::gaussian_blur_f32`],
//! which only accepts `GrayImage`, by blurring each channel independently.

use image::GrayImage;

use crate::types::{Color, PipelineError, PixelBuffer, RgbImage};

/// Apply Gaussian blur to an RGB image by blurring each channel
/// independently.
///
/// The result equals blurring in color space, since Gaussian blur is a
/// linear, per-channel operation. Non-positive sigma values return the
/// image unchanged, since `imageproc`'s underlying function panics on
/// `sigma <= 0.0`.
#[must_use = "returns the blurred RGB image"]
pub fn gaussian_blur_rgb(image: &RgbImage, sigma: f32) -> RgbImage {
    if sigma <= 0.0 || image.width() == 0 || image.height() == 0 {
        return image.clone();
    }

    let (w, h) = image.dimensions();

    let channels: [GrayImage; 3] = std::array::from_fn(|c| {
        GrayImage::from_fn(w, h, |x, y| image::Luma([image.get_pixel(x, y).0[c]]))
    });

    let blurred: [GrayImage; 3] =
        std::array::from_fn(|c| imageproc::filter::gaussian_blur_f32(&channels[c], sigma));

    RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([
            blurred[0].get_pixel(x, y).0[0],
            blurred[1].get_pixel(x, y).0[0],
            blurred[2].get_pixel(x, y).0[0],
        ])
    })
}

/// Copy any pixel buffer into an [`RgbImage`].
///
/// # Errors
///
/// Returns [`PipelineError::InvalidBuffer`] if the buffer is ragged or a
/// dimension does not fit in `u32`.
pub fn to_rgb_image<B: PixelBuffer + ?Sized>(buffer: &B) -> Result<RgbImage, PipelineError> {
    buffer.check_shape()?;
    let (width, height) = (buffer.width(), buffer.height());
    let too_large =
        || PipelineError::InvalidBuffer(format!("{width}x{height} exceeds image size limits"));
    let w = u32::try_from(width).map_err(|_| too_large())?;
    let h = u32::try_from(height).map_err(|_| too_large())?;

    Ok(RgbImage::from_fn(w, h, |x, y| {
        image::Rgb::from(buffer.pixel(y as usize, x as usize))
    }))
}

/// Smooth a pixel buffer and return the result as an image.
///
/// # Errors
///
/// See [`to_rgb_image`].
pub fn smooth_buffer<B: PixelBuffer + ?Sized>(
    buffer: &B,
    sigma: f32,
) -> Result<RgbImage, PipelineError> {
    Ok(gaussian_blur_rgb(&to_rgb_image(buffer)?, sigma))
}

/// Average color of an image, used to sanity-check smoothing.
#[cfg(test)]
fn mean_color(image: &RgbImage) -> [f64; 3] {
    let mut sum = [0.0; 3];
    for p in image.pixels() {
        for (c, s) in sum.iter_mut().enumerate() {
            *s += f64::from(p.0[c]);
        }
    }
    let n = f64::from(image.width() * image.height());
    sum.map(|s| s / n)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::distinct::extract_distinct_colors;
    use crate::types::PixelGrid;

    fn split_image() -> RgbImage {
        RgbImage::from_fn(10, 10, |x, _y| {
            if x < 5 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        })
    }

    #[test]
    fn zero_sigma_returns_identical_image() {
        let img = split_image();
        assert_eq!(gaussian_blur_rgb(&img, 0.0), img);
    }

    #[test]
    fn negative_sigma_returns_identical_image() {
        let img = split_image();
        assert_eq!(gaussian_blur_rgb(&img, -2.0), img);
    }

    #[test]
    fn output_dimensions_preserved() {
        let img = RgbImage::new(17, 31);
        let blurred = gaussian_blur_rgb(&img, 1.4);
        assert_eq!(blurred.dimensions(), (17, 31));
    }

    #[test]
    fn blur_mixes_colors_at_the_boundary() {
        let blurred = gaussian_blur_rgb(&split_image(), 2.0);
        let left = blurred.get_pixel(4, 5).0;
        let right = blurred.get_pixel(5, 5).0;
        assert!(left[0] < 255, "expected red to drop near boundary");
        assert!(left[2] > 0, "expected blue to rise near boundary");
        assert!(right[0] > 0, "expected red to rise near boundary");
    }

    #[test]
    fn blur_creates_intermediate_colors() {
        let img = split_image();
        let before = extract_distinct_colors(&img).unwrap().len();
        let after = extract_distinct_colors(&gaussian_blur_rgb(&img, 2.0))
            .unwrap()
            .len();
        assert_eq!(before, 2);
        assert!(after > before);
    }

    #[test]
    fn uniform_image_unchanged_by_blur() {
        let img = RgbImage::from_fn(10, 10, |_, _| image::Rgb([100, 150, 200]));
        let blurred = gaussian_blur_rgb(&img, 1.4);
        let mean = mean_color(&blurred);
        for (c, expected) in [100.0, 150.0, 200.0].into_iter().enumerate() {
            assert!(
                (mean[c] - expected).abs() <= 1.0,
                "channel {c}: expected ~{expected}, got {}",
                mean[c]
            );
        }
    }

    #[test]
    fn to_rgb_image_preserves_layout() {
        let grid = PixelGrid::new(
            2,
            1,
            vec![Color::new(1, 2, 3), Color::new(4, 5, 6)],
        )
        .unwrap();
        let img = to_rgb_image(&grid).unwrap();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(1, 0).0, [4, 5, 6]);
    }

    #[test]
    fn to_rgb_image_rejects_ragged_rows() {
        let rows = vec![vec![Color::default(); 2], vec![Color::default(); 1]];
        let result = to_rgb_image(rows.as_slice());
        assert!(matches!(result, Err(PipelineError::InvalidBuffer(_))));
    }
}
