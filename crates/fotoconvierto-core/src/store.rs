//! Canonical bitmap ownership.
//!
//! `ImageStore` holds the source bitmap (changed only by loads and crop
//! commits), the composed [`Orientation`] applied to it, the oriented view
//! derived from both, and the display render shown to the user.
//!
//! # Revisions and generations
//!
//! - `revision` increases whenever the oriented view changes. Render caches
//!   key on it.
//! - `generation` increases whenever a load begins. A decode completion
//!   carrying an older [`LoadTicket`] is discarded (last load wins).

use crate::config::EditorConfig;
use crate::decode::{decode_image, fit_within, DecodedImage};
use crate::encode::{encode_image, ExportFormat};
use crate::error::EditorError;
use crate::transform::Orientation;

/// Proof that a load was requested; required to complete it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owner of the canonical image and the current display render.
#[derive(Debug, Clone)]
pub struct ImageStore {
    source: Option<DecodedImage>,
    orientation: Orientation,
    oriented: Option<DecodedImage>,
    display: Option<DecodedImage>,
    revision: u64,
    generation: u64,
    max_width: u32,
    max_height: u32,
    placeholder: (u32, u32),
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl ImageStore {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            source: None,
            orientation: Orientation::IDENTITY,
            oriented: None,
            display: None,
            revision: 0,
            generation: 0,
            max_width: config.max_width,
            max_height: config.max_height,
            placeholder: (config.placeholder_width, config.placeholder_height),
        }
    }

    /// Start a load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        tracing::debug!(generation = self.generation, "Load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Whether `ticket` belongs to the most recent load request.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Decode `bytes` and install them as the canonical image.
    ///
    /// The image is EXIF-oriented, fitted into the configured bounds and
    /// shown unfiltered. Orientation resets to identity.
    ///
    /// # Errors
    ///
    /// - `StaleLoad` if a newer load began after `ticket` was issued
    /// - `InvalidFormat` if the bytes are not a recognized image
    /// - `DecodeFailure` if the image data is corrupt
    ///
    /// The store is untouched on error.
    #[tracing::instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        bytes: &[u8],
    ) -> Result<(u32, u32), EditorError> {
        if !self.is_current(ticket) {
            tracing::warn!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale load"
            );
            return Err(EditorError::StaleLoad);
        }

        let decoded = decode_image(bytes)?;
        let fitted = fit_within(&decoded, self.max_width, self.max_height)?;
        tracing::info!(
            source_width = decoded.width,
            source_height = decoded.height,
            width = fitted.width,
            height = fitted.height,
            "Image loaded"
        );

        self.install(fitted);
        Ok(self.dimensions())
    }

    /// [`begin_load`](Self::begin_load) followed by [`complete_load`](Self::complete_load).
    pub fn load(&mut self, bytes: &[u8]) -> Result<(u32, u32), EditorError> {
        let ticket = self.begin_load();
        self.complete_load(ticket, bytes)
    }

    /// Install an already decoded image as the canonical image.
    pub fn load_decoded(&mut self, image: DecodedImage) -> Result<(u32, u32), EditorError> {
        image
            .validate()
            .map_err(|e| EditorError::InvalidFormat(e.to_string()))?;
        self.generation += 1;
        let fitted = fit_within(&image, self.max_width, self.max_height)?;
        self.install(fitted);
        Ok(self.dimensions())
    }

    fn install(&mut self, image: DecodedImage) {
        self.source = Some(image);
        self.orientation = Orientation::IDENTITY;
        self.refresh();
    }

    /// Drop the image. The canvas falls back to the placeholder size.
    pub fn reset(&mut self) {
        self.source = None;
        self.oriented = None;
        self.display = None;
        self.orientation = Orientation::IDENTITY;
        self.revision += 1;
        tracing::debug!("Image store reset");
    }

    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }

    /// The oriented canonical image: what crop coordinates and dimensions refer to.
    pub fn canonical(&self) -> Option<&DecodedImage> {
        self.oriented.as_ref()
    }

    /// The stored bitmap before orientation.
    pub fn source(&self) -> Option<&DecodedImage> {
        self.source.as_ref()
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Replace the composed orientation and re-derive the oriented view.
    ///
    /// # Errors
    ///
    /// Returns `NoImage` when nothing is loaded.
    pub fn set_orientation(&mut self, orientation: Orientation) -> Result<(), EditorError> {
        if self.source.is_none() {
            return Err(EditorError::NoImage);
        }
        self.orientation = orientation;
        self.refresh();
        Ok(())
    }

    /// Replace the source bitmap, keeping the current orientation.
    ///
    /// # Errors
    ///
    /// Returns `NoImage` when nothing is loaded.
    pub fn replace_source(&mut self, image: DecodedImage) -> Result<(), EditorError> {
        if self.source.is_none() {
            return Err(EditorError::NoImage);
        }
        self.source = Some(image);
        self.refresh();
        Ok(())
    }

    fn refresh(&mut self) {
        self.oriented = self.source.as_ref().map(|src| self.orientation.apply(src));
        self.display = self.oriented.clone();
        self.revision += 1;
    }

    /// The render currently shown to the user.
    pub fn display(&self) -> Option<&DecodedImage> {
        self.display.as_ref()
    }

    pub fn set_display(&mut self, render: DecodedImage) {
        self.display = Some(render);
    }

    /// Show the oriented canonical image without filters.
    pub fn show_canonical(&mut self) {
        self.display = self.oriented.clone();
    }

    /// Width and height of the oriented image, or the placeholder size.
    pub fn dimensions(&self) -> (u32, u32) {
        self.oriented
            .as_ref()
            .map(|img| (img.width, img.height))
            .unwrap_or(self.placeholder)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Encode the current display render.
    ///
    /// # Errors
    ///
    /// - `NoImage` when nothing is loaded
    /// - `EncodingFailed` if the encoder fails
    pub fn export(&self, format: ExportFormat, quality: f32) -> Result<Vec<u8>, EditorError> {
        let render = self.display.as_ref().ok_or(EditorError::NoImage)?;
        Ok(encode_image(render, format, quality)?)
    }
}
