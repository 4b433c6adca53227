//! Magic-byte detection for the image containers the editor accepts.
//!
//! Input is validated before any decoder runs, so a renamed text file or an
//! arbitrary blob is rejected with `InvalidFormat` instead of surfacing as a
//! decoder failure.

use image::ImageFormat;

/// Image containers recognized by their leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
    Tiff,
    Ico,
}

impl SourceFormat {
    /// Sniff the container from the first bytes of the input.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(SourceFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(SourceFormat::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(SourceFormat::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(SourceFormat::WebP)
        } else if bytes.starts_with(b"BM") {
            Some(SourceFormat::Bmp)
        } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
            Some(SourceFormat::Tiff)
        } else if bytes.starts_with(&[0x00, 0x00, 0x01, 0x00]) {
            Some(SourceFormat::Ico)
        } else {
            None
        }
    }

    /// MIME type of the container.
    pub fn mime_type(self) -> &'static str {
        match self {
            SourceFormat::Png => "image/png",
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Gif => "image/gif",
            SourceFormat::WebP => "image/webp",
            SourceFormat::Bmp => "image/bmp",
            SourceFormat::Tiff => "image/tiff",
            SourceFormat::Ico => "image/x-icon",
        }
    }

    /// Whether the container can carry an EXIF orientation tag that browsers honor.
    pub fn carries_exif(self) -> bool {
        matches!(self, SourceFormat::Jpeg | SourceFormat::Tiff | SourceFormat::WebP | SourceFormat::Png)
    }

    pub(crate) fn to_image_format(self) -> ImageFormat {
        match self {
            SourceFormat::Png => ImageFormat::Png,
            SourceFormat::Jpeg => ImageFormat::Jpeg,
            SourceFormat::Gif => ImageFormat::Gif,
            SourceFormat::WebP => ImageFormat::WebP,
            SourceFormat::Bmp => ImageFormat::Bmp,
            SourceFormat::Tiff => ImageFormat::Tiff,
            SourceFormat::Ico => ImageFormat::Ico,
        }
    }
}

/// Check a MIME type declared by the host (file picker, data URL) before reading bytes.
pub fn is_image_mime(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}
