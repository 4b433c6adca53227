//! Image resizing for fitting loaded images into the editing surface.
//!
//! All functions return new `DecodedImage` instances without modifying the input.
//! Downscaling always uses Lanczos3.

use image::imageops::FilterType;

use super::{DecodeError, DecodedImage};

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if a target dimension is zero.
pub fn resize(image: &DecodedImage, width: u32, height: u32) -> Result<DecodedImage, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgb_image = image
        .to_rgb_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbImage".to_string()))?;

    let resized = image::imageops::resize(&rgb_image, width, height, FilterType::Lanczos3);

    Ok(DecodedImage::from_rgb_image(resized))
}

/// Shrink an image to fit within `max_width` x `max_height`, preserving aspect ratio.
///
/// The scale factor is `min(max_width / w, max_height / h)` and is only
/// applied when the image is oversized on either axis; smaller images are
/// returned unchanged (never upscaled).
///
/// # Errors
///
/// Returns `DecodeError::InvalidDimensions` if either bound is zero.
pub fn fit_within(
    image: &DecodedImage,
    max_width: u32,
    max_height: u32,
) -> Result<DecodedImage, DecodeError> {
    if max_width == 0 || max_height == 0 {
        return Err(DecodeError::InvalidDimensions {
            width: max_width,
            height: max_height,
        });
    }

    let (new_width, new_height) =
        calculate_fit_dimensions(image.width, image.height, max_width, max_height);

    resize(image, new_width, new_height)
}

/// Calculate dimensions that fit within the bounds while preserving aspect ratio.
pub fn calculate_fit_dimensions(
    width: u32,
    height: u32,
    max_width: u32,
    max_height: u32,
) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let ratio = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
    let new_width = (width as f64 * ratio).round() as u32;
    let new_height = (height as f64 * ratio).round() as u32;

    (new_width.clamp(1, max_width), new_height.clamp(1, max_height))
}
