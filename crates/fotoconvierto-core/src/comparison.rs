//! Before/after comparison.
//!
//! Two modes share one snapshot of the edited render:
//!
//! - **Toggle**: the display shows the unfiltered oriented image while active.
//! - **Split**: the original fills `[0, split_x)`, the snapshot fills the
//!   rest, with a divider drawn centred on `split_x`.
//!
//! The snapshot is only valid until the next edit; the session calls
//! [`ComparisonController::end`] before every mutation.

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::decode::DecodedImage;
use crate::error::EditorError;
use crate::filter::FilterEngine;
use crate::store::ImageStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComparisonMode {
    #[default]
    Toggle,
    Split,
}

/// Persisted comparison flags.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonState {
    #[serde(rename = "isComparing")]
    pub active: bool,
    pub mode: ComparisonMode,
    /// Divider position as a fraction of the width, in `[0, 1]`.
    pub split_position: f64,
}

impl Default for ComparisonState {
    fn default() -> Self {
        Self {
            active: false,
            mode: ComparisonMode::Toggle,
            split_position: 0.5,
        }
    }
}

impl ComparisonState {
    /// Clamp the split position; a non-finite one falls back to the centre.
    pub fn sanitized(self) -> Self {
        Self {
            split_position: clamp_position(self.split_position, 0.5),
            ..self
        }
    }
}

fn clamp_position(position: f64, fallback: f64) -> f64 {
    if position.is_finite() {
        position.clamp(0.0, 1.0)
    } else {
        fallback
    }
}

/// Pixel columns of a split view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitLayout {
    /// First column showing the edited snapshot.
    pub split_x: u32,
    /// First divider column.
    pub divider_start: u32,
    /// Divider columns actually on the canvas.
    pub divider_width: u32,
}

impl SplitLayout {
    pub fn new(width: u32, position: f64, divider_width: u32) -> Self {
        let position = clamp_position(position, 0.5);
        let split_x = ((width as f64 * position).floor() as u32).min(width);
        let divider_start = split_x.saturating_sub(divider_width / 2).min(width);
        let divider_end = (divider_start + divider_width).min(width);
        Self {
            split_x,
            divider_start,
            divider_width: divider_end - divider_start,
        }
    }
}

/// Compose `original` left of the split and `edited` right of it, then
/// paint the divider.
///
/// Both images must have the same dimensions.
pub fn split_composite(
    original: &DecodedImage,
    edited: &DecodedImage,
    layout: SplitLayout,
    divider_color: [u8; 3],
) -> DecodedImage {
    let row_bytes = original.width as usize * 3;
    let split = layout.split_x as usize * 3;
    let divider = layout.divider_start as usize * 3..
        (layout.divider_start + layout.divider_width) as usize * 3;

    let mut pixels = Vec::with_capacity(original.pixels.len());
    for (left, right) in original
        .pixels
        .chunks_exact(row_bytes)
        .zip(edited.pixels.chunks_exact(row_bytes))
    {
        let start = pixels.len();
        pixels.extend_from_slice(&left[..split]);
        pixels.extend_from_slice(&right[split..]);
        for px in pixels[start + divider.start..start + divider.end].chunks_exact_mut(3) {
            px.copy_from_slice(&divider_color);
        }
    }

    DecodedImage::new(original.width, original.height, pixels)
}

/// Comparison state plus the snapshot of the edited render.
#[derive(Debug, Clone)]
pub struct ComparisonController {
    state: ComparisonState,
    snapshot: Option<DecodedImage>,
    divider_width: u32,
    divider_color: [u8; 3],
}

impl Default for ComparisonController {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl ComparisonController {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: ComparisonState::default(),
            snapshot: None,
            divider_width: config.divider_width,
            divider_color: config.divider_color,
        }
    }

    pub fn state(&self) -> ComparisonState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Flip between the original and the edited render.
    ///
    /// # Returns
    ///
    /// Whether comparison is now active.
    ///
    /// # Errors
    ///
    /// Returns `NoImage` (and changes nothing) when nothing is loaded.
    pub fn toggle(
        &mut self,
        store: &mut ImageStore,
        filters: &mut FilterEngine,
    ) -> Result<bool, EditorError> {
        if !store.has_image() {
            tracing::warn!("No image to compare");
            return Err(EditorError::NoImage);
        }

        self.state.active = !self.state.active;
        if self.state.active {
            self.take_snapshot(store, filters);
        }
        self.render(store, filters)?;

        tracing::debug!(active = self.state.active, "Comparison toggled");
        Ok(self.state.active)
    }

    /// Switch to split view at `position`.
    ///
    /// The snapshot is taken only if none exists yet.
    ///
    /// # Errors
    ///
    /// Returns `NoImage` (and changes nothing) when nothing is loaded.
    pub fn enter_split(
        &mut self,
        store: &mut ImageStore,
        filters: &mut FilterEngine,
        position: f64,
    ) -> Result<SplitLayout, EditorError> {
        if !store.has_image() {
            tracing::warn!("No image to compare");
            return Err(EditorError::NoImage);
        }

        self.state.mode = ComparisonMode::Split;
        self.state.active = true;
        self.state.split_position = clamp_position(position, self.state.split_position);
        if self.snapshot.is_none() {
            self.take_snapshot(store, filters);
        }
        self.render(store, filters)?;

        let layout = self.split_layout(store.dimensions().0);
        tracing::debug!(?layout, "Split view entered");
        Ok(layout)
    }

    /// Move the divider. Re-composites when the split view is showing.
    pub fn update_split_position(
        &mut self,
        store: &mut ImageStore,
        filters: &mut FilterEngine,
        position: f64,
    ) -> Result<f64, EditorError> {
        self.state.split_position = clamp_position(position, self.state.split_position);
        if self.showing_split() && store.has_image() {
            self.render(store, filters)?;
        }
        Ok(self.state.split_position)
    }

    /// Back to toggle mode, showing the original if still active.
    pub fn exit_split(
        &mut self,
        store: &mut ImageStore,
        filters: &mut FilterEngine,
    ) -> Result<(), EditorError> {
        self.state.mode = ComparisonMode::Toggle;
        tracing::debug!(active = self.state.active, "Split view exited");
        if store.has_image() {
            self.render(store, filters)?;
        }
        Ok(())
    }

    /// Leave comparison and drop the snapshot without rendering.
    ///
    /// The split position is kept.
    pub fn end(&mut self) {
        if self.state.active {
            tracing::debug!("Comparison ended");
        }
        self.state.active = false;
        self.state.mode = ComparisonMode::Toggle;
        self.snapshot = None;
    }

    /// Defaults, no snapshot.
    pub fn reset(&mut self) {
        self.state = ComparisonState::default();
        self.snapshot = None;
    }

    /// Re-enter saved comparison state against the current image.
    ///
    /// Without an image the state is kept but inactive.
    pub fn restore(
        &mut self,
        state: ComparisonState,
        store: &mut ImageStore,
        filters: &mut FilterEngine,
    ) -> Result<(), EditorError> {
        self.state = state.sanitized();
        self.snapshot = None;
        if !store.has_image() {
            self.state.active = false;
            return Ok(());
        }
        if self.state.active {
            self.take_snapshot(store, filters);
            self.render(store, filters)?;
        }
        Ok(())
    }

    /// Column layout for a canvas `width` pixels wide.
    pub fn split_layout(&self, width: u32) -> SplitLayout {
        SplitLayout::new(width, self.state.split_position, self.divider_width)
    }

    fn showing_split(&self) -> bool {
        self.state.active && self.state.mode == ComparisonMode::Split
    }

    fn take_snapshot(&mut self, store: &ImageStore, filters: &mut FilterEngine) {
        self.snapshot = store
            .canonical()
            .map(|canonical| filters.render(canonical, store.revision()));
    }

    /// Show what the current state calls for.
    fn render(
        &mut self,
        store: &mut ImageStore,
        filters: &mut FilterEngine,
    ) -> Result<(), EditorError> {
        if !self.state.active {
            return filters.apply_all(store);
        }

        match self.state.mode {
            ComparisonMode::Toggle => store.show_canonical(),
            ComparisonMode::Split => {
                let original = store.canonical().ok_or(EditorError::NoImage)?;
                let stale = self.snapshot.as_ref().map_or(true, |snap| {
                    (snap.width, snap.height) != (original.width, original.height)
                });
                if stale {
                    self.take_snapshot(store, filters);
                }
                let (Some(original), Some(edited)) = (store.canonical(), self.snapshot.as_ref())
                else {
                    return Err(EditorError::NoImage);
                };
                let layout = self.split_layout(original.width);
                let composite = split_composite(original, edited, layout, self.divider_color);
                store.set_display(composite);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 3] = [200, 0, 0];

    fn setup(width: u32, height: u32) -> (ImageStore, FilterEngine) {
        let mut store = ImageStore::default();
        store
            .load_decoded(DecodedImage::filled(width, height, RED))
            .unwrap();
        let mut filters = FilterEngine::new();
        filters.set_brightness(&mut store, 50.0).unwrap();
        (store, filters)
    }

    // ===== Toggle Tests =====

    #[test]
    fn test_toggle_shows_original_then_restores_edit() {
        let (mut store, mut filters) = setup(8, 4);
        let mut comparison = ComparisonController::default();
        let edited = store.display().cloned();

        assert!(comparison.toggle(&mut store, &mut filters).unwrap());
        assert_eq!(store.display(), store.canonical());

        assert!(!comparison.toggle(&mut store, &mut filters).unwrap());
        assert_eq!(store.display().cloned(), edited);
    }

    #[test]
    fn test_toggle_without_image() {
        let mut store = ImageStore::default();
        let mut filters = FilterEngine::new();
        let mut comparison = ComparisonController::default();

        assert!(matches!(
            comparison.toggle(&mut store, &mut filters),
            Err(EditorError::NoImage)
        ));
        assert!(!comparison.is_active());
    }

    // ===== Split Tests =====

    #[test]
    fn test_split_layout_at_thirty_percent() {
        let layout = SplitLayout::new(800, 0.3, 3);
        assert_eq!(layout.split_x, 240);
        assert_eq!(layout.divider_start, 239);
        assert_eq!(layout.divider_width, 3);
    }

    #[test]
    fn test_split_layout_at_edges() {
        assert_eq!(SplitLayout::new(800, 0.0, 3).divider_start, 0);
        let right = SplitLayout::new(800, 1.0, 3);
        assert_eq!(right.split_x, 800);
        assert_eq!(right.divider_start, 799);
        assert_eq!(right.divider_width, 1);
    }

    #[test]
    fn test_split_view_composites_original_and_edit() {
        let (mut store, mut filters) = setup(800, 400);
        let mut comparison = ComparisonController::default();
        let edited = store.display().map(|d| d.pixel(0, 0)).unwrap();
        assert_eq!(edited, [100, 0, 0]);

        let layout = comparison.enter_split(&mut store, &mut filters, 0.3).unwrap();
        assert_eq!(layout.split_x, 240);

        let display = store.display().unwrap();
        for y in [0, 199, 399] {
            assert_eq!(display.pixel(0, y), RED);
            assert_eq!(display.pixel(238, y), RED);
            assert_eq!(display.pixel(239, y), [255, 255, 255]);
            assert_eq!(display.pixel(241, y), [255, 255, 255]);
            assert_eq!(display.pixel(242, y), edited);
            assert_eq!(display.pixel(799, y), edited);
        }
    }

    #[test]
    fn test_split_original_band_width() {
        let original = DecodedImage::filled(800, 2, RED);
        let edited = DecodedImage::filled(800, 2, [0, 0, 200]);
        let layout = SplitLayout::new(800, 0.3, 0);
        let composite = split_composite(&original, &edited, layout, [255, 255, 255]);

        assert!((0..240).all(|x| composite.pixel(x, 1) == RED));
        assert!((240..800).all(|x| composite.pixel(x, 1) == [0, 0, 200]));
    }

    #[test]
    fn test_update_split_position_clamps() {
        let (mut store, mut filters) = setup(100, 10);
        let mut comparison = ComparisonController::default();
        comparison.enter_split(&mut store, &mut filters, 0.5).unwrap();

        let p = comparison
            .update_split_position(&mut store, &mut filters, 1.7)
            .unwrap();
        assert_eq!(p, 1.0);
        assert_eq!(store.display().map(|d| d.pixel(50, 0)), Some(RED));
    }

    #[test]
    fn test_exit_split_keeps_original_while_active() {
        let (mut store, mut filters) = setup(10, 10);
        let mut comparison = ComparisonController::default();
        comparison.enter_split(&mut store, &mut filters, 0.5).unwrap();
        comparison.exit_split(&mut store, &mut filters).unwrap();

        assert_eq!(comparison.state().mode, ComparisonMode::Toggle);
        assert!(comparison.is_active());
        assert_eq!(store.display(), store.canonical());
    }

    // ===== State Tests =====

    #[test]
    fn test_end_drops_snapshot() {
        let (mut store, mut filters) = setup(10, 10);
        let mut comparison = ComparisonController::default();
        comparison.toggle(&mut store, &mut filters).unwrap();
        comparison.end();

        assert!(!comparison.is_active());
        assert!(!comparison.has_snapshot());
    }

    #[test]
    fn test_state_serde_field_names() {
        let json = serde_json::to_string(&ComparisonState::default()).unwrap();
        assert_eq!(
            json,
            r#"{"isComparing":false,"mode":"toggle","splitPosition":0.5}"#
        );

        let state: ComparisonState =
            serde_json::from_str(r#"{"mode":"split","splitPosition":3}"#).unwrap();
        assert_eq!(state.mode, ComparisonMode::Split);
        assert_eq!(state.sanitized().split_position, 1.0);
    }

    #[test]
    fn test_restore_reenters_split() {
        let (mut store, mut filters) = setup(10, 2);
        let mut comparison = ComparisonController::default();
        comparison
            .restore(
                ComparisonState {
                    active: true,
                    mode: ComparisonMode::Split,
                    split_position: 0.5,
                },
                &mut store,
                &mut filters,
            )
            .unwrap();

        assert!(comparison.has_snapshot());
        let display = store.display().unwrap();
        assert_eq!(display.pixel(0, 0), RED);
        assert_eq!(display.pixel(9, 0), [100, 0, 0]);
        assert_eq!(filters.parameters().brightness, 50.0);
    }
}
