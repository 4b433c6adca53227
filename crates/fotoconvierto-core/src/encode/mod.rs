//! Export encoding for FotoConvierto.
//!
//! This module provides functionality for:
//! - Encoding the edited image as PNG, JPEG or WebP
//! - Mapping the canvas-style quality factor onto the JPEG and WebP encoders
//! - Building safe download filenames and human-readable sizes
//!
//! # Examples
//!
//! ```ignore
//! use fotoconvierto_core::encode::{encode_image, export_filename, ExportFormat};
//!
//! let bytes = encode_image(&image, ExportFormat::Jpeg, 0.9).unwrap();
//! let name = export_filename("my photo", ExportFormat::Jpeg); // "my-photo.jpg"
//! ```

mod encoder;
mod filename;
mod format;

pub use encoder::{
    encode_image, encode_jpeg, encode_png, encode_webp, jpeg_quality, webp_quality, EncodeError,
};
pub use filename::{
    default_filename, export_filename, format_file_size, sanitize_filename, sanitize_filename_or,
    FALLBACK_FILENAME, MAX_FILENAME_CHARS,
};
pub use format::{ExportFormat, UnknownFormat};
