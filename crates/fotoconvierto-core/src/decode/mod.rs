//! Image decoding pipeline for FotoConvierto.
//!
//! This module provides functionality for:
//! - Validating the container signature of user-supplied bytes
//! - Decoding PNG, JPEG, GIF, WebP, BMP, TIFF and ICO images to RGB
//! - Applying the EXIF orientation tag the way browsers do
//! - Fitting decoded images into the bounded editing surface
//!
//! # Architecture
//!
//! The decoding pipeline is called from the WASM bindings on the UI thread.
//! All operations are synchronous and single-threaded within WASM.
//!
//! # Examples
//!
//! ```ignore
//! use fotoconvierto_core::decode::{decode_image, fit_within};
//!
//! let bytes = std::fs::read("photo.jpg").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! let fitted = fit_within(&image, 800, 600).unwrap();
//! println!("Editing at {}x{}", fitted.width, fitted.height);
//! ```

mod decoder;
mod resize;
mod signature;
mod types;

pub use decoder::decode_image;
pub use resize::{calculate_fit_dimensions, fit_within, resize};
pub use signature::{is_image_mime, SourceFormat};
pub use types::{DecodeError, DecodedImage, ExifOrientation};
