//! WASM-compatible wrapper types for image data.
//!
//! Renders cross the boundary as copies: `pixels()` for the RGB buffer and
//! `rgba()` for the layout `ImageData` expects.

use fotoconvierto_core::decode::DecodedImage;
use fotoconvierto_core::LoadTicket;
use wasm_bindgen::prelude::*;

/// A decoded image wrapper for JavaScript.
///
/// The pixel data lives in WASM memory; every accessor returns a copy.
#[wasm_bindgen]
pub struct JsDecodedImage {
    inner: DecodedImage,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create a new JsDecodedImage from dimensions and RGB pixel data.
    ///
    /// The buffer is checked when the image is loaded into a session.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            inner: DecodedImage {
                width,
                height,
                pixels,
            },
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Bytes in the RGB buffer (width * height * 3).
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// RGB pixel data as a Uint8Array copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// Opaque RGBA pixel data, ready for `new ImageData(...)`.
    pub fn rgba(&self) -> Vec<u8> {
        self.inner.to_rgba()
    }

    /// Explicitly free WASM memory. Optional; the finalizer also does this.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(inner: DecodedImage) -> Self {
        Self { inner }
    }

    pub(crate) fn to_decoded(&self) -> DecodedImage {
        self.inner.clone()
    }
}

/// Handle for a load in flight; pass it back to `complete_load`.
#[wasm_bindgen]
#[derive(Debug, Clone, Copy)]
pub struct JsLoadTicket {
    inner: LoadTicket,
}

#[wasm_bindgen]
impl JsLoadTicket {
    #[wasm_bindgen(getter)]
    pub fn generation(&self) -> f64 {
        self.inner.generation() as f64
    }
}

impl JsLoadTicket {
    pub(crate) fn new(inner: LoadTicket) -> Self {
        Self { inner }
    }

    pub(crate) fn inner(&self) -> LoadTicket {
        self.inner
    }
}
