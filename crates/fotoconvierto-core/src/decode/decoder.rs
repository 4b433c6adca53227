//! Image decoding with signature validation and EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::ImageReader;

use super::{DecodeError, DecodedImage, ExifOrientation, SourceFormat};

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// Browsers honor the EXIF orientation tag when drawing an image to a
/// canvas, so the decoded bitmap is corrected the same way.
///
/// # Errors
///
/// Returns `DecodeError::EmptyInput` for zero-length input,
/// `DecodeError::InvalidFormat` if the bytes carry no known image signature,
/// and `DecodeError::CorruptedFile` if the decoder rejects the data.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let format = sniff(bytes)?;

    let orientation = if format.carries_exif() {
        extract_orientation(bytes)
    } else {
        ExifOrientation::Normal
    };

    let decoded = decode_with_format(bytes, format)?;
    Ok(orientation.correction().apply(&decoded))
}

fn sniff(bytes: &[u8]) -> Result<SourceFormat, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }
    SourceFormat::detect(bytes).ok_or(DecodeError::InvalidFormat)
}

fn decode_with_format(bytes: &[u8], format: SourceFormat) -> Result<DecodedImage, DecodeError> {
    let reader = ImageReader::with_format(Cursor::new(bytes), format.to_image_format());

    let img = reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let rgb_img = img.into_rgb8();
    let (width, height) = rgb_img.dimensions();
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidDimensions { width, height });
    }

    tracing::debug!(?format, width, height, "decoded image");
    Ok(DecodedImage::from_rgb_image(rgb_img))
}

/// Extract EXIF orientation from container bytes.
///
/// Returns `ExifOrientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> ExifOrientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(ExifOrientation::from)
            .unwrap_or_default(),
        Err(_) => ExifOrientation::Normal,
    }
}
