//! Geometric transforms: quarter-turn rotation, flips and region extraction.
//!
//! Rotations and flips are non-destructive. Each operation composes into the
//! store's [`Orientation`]; the source bitmap only changes on load and on
//! crop commit.
//!
//! # Coordinate System
//!
//! - Rotation is in degrees, positive = clockwise, always one of 0/90/180/270
//! - Origin is the top-left corner

mod orientation;
mod region;

use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::store::ImageStore;

pub use orientation::Orientation;
pub use region::{extract_region, PixelRegion};

/// Cumulative log of the transforms the user applied.
///
/// Informational only: different operation sequences can produce the same
/// log but different images. The applied geometry lives in [`Orientation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformState {
    /// Clockwise rotation in degrees: 0, 90, 180 or 270.
    pub rotation: u16,
    #[serde(rename = "flippedH")]
    pub flipped_horizontal: bool,
    #[serde(rename = "flippedV")]
    pub flipped_vertical: bool,
}

impl TransformState {
    /// Snap the rotation to the nearest quarter turn in `0..360`.
    pub fn normalized(self) -> Self {
        let quarter_turns = ((self.rotation as f64 / 90.0).round() as u32) % 4;
        Self {
            rotation: (quarter_turns * 90) as u16,
            ..self
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }
}

/// A single user-level transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOp {
    RotateClockwise,
    RotateCounterClockwise,
    FlipHorizontal,
    FlipVertical,
}

impl TransformOp {
    /// Compose this operation after `orientation`.
    pub fn compose(self, orientation: Orientation) -> Orientation {
        match self {
            TransformOp::RotateClockwise => orientation.then_rotate_cw(),
            TransformOp::RotateCounterClockwise => orientation.then_rotate_ccw(),
            TransformOp::FlipHorizontal => orientation.then_flip_horizontal(),
            TransformOp::FlipVertical => orientation.then_flip_vertical(),
        }
    }

    fn record(self, state: &mut TransformState) {
        match self {
            TransformOp::RotateClockwise => state.rotation = (state.rotation + 90) % 360,
            TransformOp::RotateCounterClockwise => state.rotation = (state.rotation + 270) % 360,
            TransformOp::FlipHorizontal => state.flipped_horizontal = !state.flipped_horizontal,
            TransformOp::FlipVertical => state.flipped_vertical = !state.flipped_vertical,
        }
    }
}

/// Applies rotate and flip operations to the image store.
#[derive(Debug, Clone, Default)]
pub struct TransformEngine {
    state: TransformState,
}

impl TransformEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TransformState {
        self.state
    }

    /// Replace the log, e.g. when restoring saved state.
    pub fn set_state(&mut self, state: TransformState) {
        self.state = state.normalized();
    }

    /// Clear the log. The store's orientation is not touched.
    pub fn reset(&mut self) {
        self.state = TransformState::default();
    }

    pub fn rotate_clockwise(&mut self, store: &mut ImageStore) -> Result<(), EditorError> {
        self.apply(store, TransformOp::RotateClockwise)
    }

    pub fn rotate_counter_clockwise(&mut self, store: &mut ImageStore) -> Result<(), EditorError> {
        self.apply(store, TransformOp::RotateCounterClockwise)
    }

    pub fn flip_horizontal(&mut self, store: &mut ImageStore) -> Result<(), EditorError> {
        self.apply(store, TransformOp::FlipHorizontal)
    }

    pub fn flip_vertical(&mut self, store: &mut ImageStore) -> Result<(), EditorError> {
        self.apply(store, TransformOp::FlipVertical)
    }

    /// Compose `op` into the store's orientation and log it.
    ///
    /// # Errors
    ///
    /// Returns `NoImage` (and changes nothing) when no image is loaded.
    pub fn apply(&mut self, store: &mut ImageStore, op: TransformOp) -> Result<(), EditorError> {
        if !store.has_image() {
            tracing::warn!(?op, "No image to transform");
            return Err(EditorError::NoImage);
        }

        let orientation = op.compose(store.orientation());
        store.set_orientation(orientation)?;
        op.record(&mut self.state);

        tracing::debug!(?op, ?orientation, state = ?self.state, "Transform applied");
        Ok(())
    }
}
