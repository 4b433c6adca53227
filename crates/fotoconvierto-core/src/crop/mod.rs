//! Interactive crop selection.
//!
//! `CropController` is a small state machine driven by pointer events:
//!
//! ```text
//! Inactive --start--> Active{Idle}
//! Active{Idle} --pointer_down--> Active{Drafting | Moving | Resizing}
//! Active{..}   --pointer_up-->   Active{Idle}
//! Active{..}   --commit/cancel--> Inactive
//! ```
//!
//! Pointer positions are backing pixels of the oriented canonical image; use
//! [`CanvasMapping`] to convert client coordinates first. A commit crops the
//! source bitmap through the inverse orientation, so the oriented result is
//! exactly the selected region.

mod geometry;
mod overlay;

use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::store::ImageStore;
use crate::transform::{extract_region, PixelRegion};

pub use geometry::{AspectPreset, CanvasMapping, CropRect, CursorHint, Handle, Point};
pub use overlay::{CropOverlay, Line};

/// What the current pointer drag is doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// No button held.
    Idle,
    /// Building a new rectangle from `anchor`.
    Drafting { anchor: Point },
    /// Translating `origin` by the pointer's offset from `grab`.
    Moving { grab: Point, origin: CropRect },
    /// Dragging one corner of `origin`.
    Resizing { handle: Handle, origin: CropRect },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CropState {
    #[default]
    Inactive,
    Active {
        rect: CropRect,
        interaction: Interaction,
    },
}

/// Crop selection state machine.
#[derive(Debug, Clone)]
pub struct CropController {
    state: CropState,
    aspect_ratio: Option<f64>,
    canvas_width: f64,
    canvas_height: f64,
    handle_size: f64,
    initial_fraction: f64,
    max_initial_width: f64,
    max_initial_height: f64,
}

impl Default for CropController {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl CropController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: CropState::Inactive,
            aspect_ratio: None,
            canvas_width: config.placeholder_width as f64,
            canvas_height: config.placeholder_height as f64,
            handle_size: config.crop_handle_size,
            initial_fraction: config.crop_initial_fraction,
            max_initial_width: config.crop_max_initial_width,
            max_initial_height: config.crop_max_initial_height,
        }
    }

    pub fn state(&self) -> CropState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, CropState::Active { .. })
    }

    pub fn rect(&self) -> Option<CropRect> {
        match self.state {
            CropState::Active { rect, .. } => Some(rect),
            CropState::Inactive => None,
        }
    }

    pub fn interaction(&self) -> Option<Interaction> {
        match self.state {
            CropState::Active { interaction, .. } => Some(interaction),
            CropState::Inactive => None,
        }
    }

    pub fn aspect_ratio(&self) -> Option<f64> {
        self.aspect_ratio
    }

    /// Enter crop mode with a centred selection.
    ///
    /// The selection is `min(fraction * W, max_w)` wide and either
    /// `width / ratio` or `min(fraction * H, max_h)` tall, scaled down to
    /// fit the canvas.
    ///
    /// # Errors
    ///
    /// Returns `NoImage` (and stays inactive) when nothing is loaded.
    pub fn start(&mut self, store: &ImageStore) -> Result<CropRect, EditorError> {
        if !store.has_image() {
            tracing::warn!("No image to crop");
            return Err(EditorError::NoImage);
        }

        let (width, height) = store.dimensions();
        self.canvas_width = width as f64;
        self.canvas_height = height as f64;

        let w = (self.canvas_width * self.initial_fraction).min(self.max_initial_width);
        let h = match self.aspect_ratio {
            Some(ratio) => w / ratio,
            None => (self.canvas_height * self.initial_fraction).min(self.max_initial_height),
        };
        let size = CropRect::new(0.0, 0.0, w, h).shrunk_to(self.canvas_width, self.canvas_height);
        let rect = CropRect::centered(
            self.canvas_width,
            self.canvas_height,
            size.width,
            size.height,
        );

        self.state = CropState::Active {
            rect,
            interaction: Interaction::Idle,
        };
        tracing::debug!(?rect, "Crop started");
        Ok(rect)
    }

    /// Classify a press: corner handle, inside the selection, or outside.
    ///
    /// # Errors
    ///
    /// Returns `CropNotActive` outside crop mode.
    pub fn pointer_down(&mut self, p: Point) -> Result<CursorHint, EditorError> {
        let CropState::Active { rect, .. } = self.state else {
            return Err(EditorError::CropNotActive);
        };
        if !is_finite(p) {
            return Ok(self.cursor_at(p));
        }

        let (rect, interaction) = if let Some(handle) = rect.handle_at(p, self.handle_size) {
            (
                rect,
                Interaction::Resizing {
                    handle,
                    origin: rect,
                },
            )
        } else if rect.contains(p) {
            (rect, Interaction::Moving { grab: p, origin: rect })
        } else {
            (
                CropRect::new(p.x, p.y, 0.0, 0.0),
                Interaction::Drafting { anchor: p },
            )
        };

        tracing::debug!(?interaction, "Crop pointer down");
        self.state = CropState::Active { rect, interaction };
        Ok(interaction_cursor(interaction))
    }

    /// Update the selection for the current drag, or report the hover cursor.
    ///
    /// # Errors
    ///
    /// Returns `CropNotActive` outside crop mode.
    pub fn pointer_move(&mut self, p: Point) -> Result<CursorHint, EditorError> {
        let CropState::Active { rect, interaction } = self.state else {
            return Err(EditorError::CropNotActive);
        };
        if !is_finite(p) {
            return Ok(interaction_cursor(interaction));
        }

        let rect = match interaction {
            Interaction::Idle => return Ok(self.cursor_at(p)),
            Interaction::Moving { grab, origin } => CropRect::new(
                origin.x + p.x - grab.x,
                origin.y + p.y - grab.y,
                origin.width,
                origin.height,
            )
            .constrained(self.canvas_width, self.canvas_height),
            Interaction::Drafting { anchor } => self.draft(anchor, self.clamp_point(p)),
            Interaction::Resizing { handle, origin } => {
                self.resize(handle, origin, self.clamp_point(p))
            }
        };

        self.state = CropState::Active { rect, interaction };
        Ok(interaction_cursor(interaction))
    }

    /// End the current drag. The selection stays.
    pub fn pointer_up(&mut self) {
        if let CropState::Active { rect, .. } = self.state {
            self.state = CropState::Active {
                rect,
                interaction: Interaction::Idle,
            };
        }
    }

    /// Cursor for hovering at `p` with no button held.
    pub fn cursor_at(&self, p: Point) -> CursorHint {
        let CropState::Active { rect, .. } = self.state else {
            return CursorHint::Default;
        };
        if let Some(handle) = rect.handle_at(p, self.handle_size) {
            handle.cursor()
        } else if rect.contains(p) {
            CursorHint::Move
        } else {
            CursorHint::Crosshair
        }
    }

    fn draft(&self, anchor: Point, p: Point) -> CropRect {
        let mut dx = p.x - anchor.x;
        let mut dy = p.y - anchor.y;

        if let Some(ratio) = self.aspect_ratio {
            if dx.abs() > dy.abs() {
                dy = dx / ratio;
            } else {
                dx = dy * ratio;
            }
        }

        CropRect::new(anchor.x, anchor.y, dx, dy)
            .normalized()
            .fitted_from(anchor, self.canvas_width, self.canvas_height)
    }

    fn resize(&self, handle: Handle, origin: CropRect, p: Point) -> CropRect {
        let mut rect = handle.drag(origin, p);

        if let Some(ratio) = self.aspect_ratio {
            rect.height = rect.width / ratio;
            if matches!(handle, Handle::TopLeft | Handle::TopRight) {
                // Keep the bottom edge fixed.
                rect.y = origin.bottom() - rect.height;
            }
        }

        let fixed = origin.handle_position(handle.opposite());
        rect.normalized()
            .fitted_from(fixed, self.canvas_width, self.canvas_height)
    }

    fn clamp_point(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(0.0, self.canvas_width),
            p.y.clamp(0.0, self.canvas_height),
        )
    }

    /// Lock the selection to `width / height = ratio`, or free it with `None`.
    ///
    /// An active selection is reshaped at once (`height = width / ratio`),
    /// shrunk if the new height would not fit and slid back onto the canvas.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAspectRatio` for zero, negative or non-finite ratios.
    pub fn set_aspect_ratio(&mut self, ratio: Option<f64>) -> Result<(), EditorError> {
        if let Some(r) = ratio {
            if !r.is_finite() || r <= 0.0 {
                return Err(EditorError::InvalidAspectRatio(r));
            }
        }

        self.aspect_ratio = ratio;
        if let (Some(r), CropState::Active { rect, interaction }) = (ratio, self.state) {
            let rect = CropRect {
                height: rect.width / r,
                ..rect
            }
            .shrunk_to(self.canvas_width, self.canvas_height)
            .constrained(self.canvas_width, self.canvas_height);
            self.state = CropState::Active { rect, interaction };
        }
        tracing::debug!(?ratio, "Crop aspect ratio set");
        Ok(())
    }

    pub fn set_preset(&mut self, preset: AspectPreset) -> Result<(), EditorError> {
        self.set_aspect_ratio(preset.ratio())
    }

    /// Crop the canonical image to the selection and leave crop mode.
    ///
    /// # Returns
    ///
    /// The committed region in oriented coordinates.
    ///
    /// # Errors
    ///
    /// - `CropNotActive` outside crop mode
    /// - `NoImage` when nothing is loaded
    /// - `InvalidCropRegion` when the selection has no area on the canvas
    ///
    /// The image and the selection are untouched on error.
    pub fn commit(&mut self, store: &mut ImageStore) -> Result<PixelRegion, EditorError> {
        let CropState::Active { rect, .. } = self.state else {
            tracing::warn!("Crop commit outside crop mode");
            return Err(EditorError::CropNotActive);
        };
        let invalid = || EditorError::InvalidCropRegion {
            width: rect.width,
            height: rect.height,
        };
        if !(rect.width > 0.0 && rect.height > 0.0) {
            tracing::warn!(?rect, "Invalid crop region");
            return Err(invalid());
        }

        let orientation = store.orientation();
        let (width, height) = store.dimensions();
        let source = store.source().ok_or(EditorError::NoImage)?;

        let region = rect.to_region(width, height);
        if region.is_empty() {
            return Err(invalid());
        }
        let source_region = orientation
            .inverse()
            .map_region(region, width, height);
        let cropped = extract_region(source, source_region).ok_or_else(invalid)?;

        store.replace_source(cropped)?;
        self.state = CropState::Inactive;
        tracing::info!(?region, ?source_region, "Crop committed");
        Ok(region)
    }

    /// Leave crop mode without touching the image.
    pub fn cancel(&mut self) -> CursorHint {
        if self.is_active() {
            tracing::debug!("Crop cancelled");
        }
        self.state = CropState::Inactive;
        CursorHint::Default
    }

    /// Cancel and forget the aspect ratio.
    pub fn reset(&mut self) {
        self.cancel();
        self.aspect_ratio = None;
    }

    /// Geometry for drawing the current selection.
    pub fn overlay(&self) -> Option<CropOverlay> {
        self.rect()
            .map(|rect| CropOverlay::new(rect, self.handle_size))
    }
}

fn interaction_cursor(interaction: Interaction) -> CursorHint {
    match interaction {
        Interaction::Idle => CursorHint::Default,
        Interaction::Drafting { .. } => CursorHint::Crosshair,
        Interaction::Moving { .. } => CursorHint::Move,
        Interaction::Resizing { handle, .. } => handle.cursor(),
    }
}

fn is_finite(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}
