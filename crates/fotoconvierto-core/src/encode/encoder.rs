//! Encoding of RGB bitmaps into the export containers.
//!
//! PNG and JPEG go through the `image` crate's encoders, lossy WebP through
//! libwebp via the `webp` crate. The quality factor follows the canvas
//! convention (`0.0..=1.0`) and is ignored by PNG.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::io::Cursor;
use thiserror::Error;

use super::ExportFormat;
use crate::decode::DecodedImage;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {reason}")]
    EncodingFailed { format: ExportFormat, reason: String },
}

/// Map a canvas quality factor in `[0, 1]` to a JPEG quality in `1..=100`.
///
/// Non-finite input uses the JPEG default.
pub fn jpeg_quality(quality: f32) -> u8 {
    ((clamp_quality(quality, ExportFormat::Jpeg) * 100.0).round() as u8).max(1)
}

/// Map a canvas quality factor to the libwebp scale `0.0..=100.0`.
pub fn webp_quality(quality: f32) -> f32 {
    clamp_quality(quality, ExportFormat::WebP) * 100.0
}

fn clamp_quality(quality: f32, format: ExportFormat) -> f32 {
    if quality.is_finite() {
        quality.clamp(0.0, 1.0)
    } else {
        format.default_quality()
    }
}

/// Encode an image in the given container.
///
/// # Arguments
///
/// * `image` - RGB image to encode
/// * `format` - Target container
/// * `quality` - Quality factor in `[0, 1]`, ignored by lossless formats
///
/// # Errors
///
/// Returns `EncodeError` if the image is empty or the encoder fails.
pub fn encode_image(
    image: &DecodedImage,
    format: ExportFormat,
    quality: f32,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        ExportFormat::Png => encode_png(&image.pixels, image.width, image.height),
        ExportFormat::Jpeg => encode_jpeg(
            &image.pixels,
            image.width,
            image.height,
            jpeg_quality(quality),
        ),
        ExportFormat::WebP => encode_webp(
            &image.pixels,
            image.width,
            image.height,
            webp_quality(quality),
        ),
    }
}

/// Encode RGB pixel data to JPEG bytes.
///
/// `quality` is clamped to 1-100.
pub fn encode_jpeg(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100))
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| failed(ExportFormat::Jpeg, e))?;

    Ok(buffer.into_inner())
}

/// Encode RGB pixel data to PNG bytes.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| failed(ExportFormat::Png, e))?;

    Ok(buffer)
}

/// Encode RGB pixel data to lossy WebP bytes.
///
/// `quality` is on the libwebp scale and clamped to 0-100.
pub fn encode_webp(
    pixels: &[u8],
    width: u32,
    height: u32,
    quality: f32,
) -> Result<Vec<u8>, EncodeError> {
    validate(pixels, width, height)?;

    let memory = webp::Encoder::from_rgb(pixels, width, height)
        .encode_simple(false, quality.clamp(0.0, 100.0))
        .map_err(|e| EncodeError::EncodingFailed {
            format: ExportFormat::WebP,
            reason: format!("{e:?}"),
        })?;

    Ok(memory.to_vec())
}

fn validate(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }

    Ok(())
}

fn failed(format: ExportFormat, err: image::ImageError) -> EncodeError {
    EncodeError::EncodingFailed {
        format,
        reason: err.to_string(),
    }
}
