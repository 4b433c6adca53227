//! The editing session.
//!
//! `EditorSession` owns every component and sequences their side effects:
//!
//! - a successful load resets filters, the transform log, crop and comparison
//! - every edit (filter, transform, crop commit) ends the comparison
//! - transforms and crop commits re-render the filters over the new geometry
//!
//! Hosts drive one session per editor; there is no global state.

use chrono::NaiveDateTime;

use crate::comparison::{ComparisonController, ComparisonState, SplitLayout};
use crate::config::EditorConfig;
use crate::crop::{AspectPreset, CropController, CropOverlay, CropRect, CursorHint, Point};
use crate::decode::DecodedImage;
use crate::encode::{default_filename, encode_image, sanitize_filename_or, ExportFormat};
use crate::error::EditorError;
use crate::filter::{FilterEngine, FilterName, FilterPatch};
use crate::persist::{KeyValueStore, PersistenceAdapter};
use crate::store::{ImageStore, LoadTicket};
use crate::transform::{PixelRegion, TransformEngine, TransformOp, TransformState};
use crate::FilterParameters;

/// One editor: image, filters, transforms, crop, comparison.
#[derive(Debug, Clone)]
pub struct EditorSession {
    config: EditorConfig,
    store: ImageStore,
    filters: FilterEngine,
    transforms: TransformEngine,
    crop: CropController,
    comparison: ComparisonController,
    persistence: PersistenceAdapter,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            store: ImageStore::new(&config),
            filters: FilterEngine::new(),
            transforms: TransformEngine::new(),
            crop: CropController::new(&config),
            comparison: ComparisonController::new(&config),
            persistence: PersistenceAdapter::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn has_image(&self) -> bool {
        self.store.has_image()
    }

    /// Canvas size: the oriented image, or the placeholder.
    pub fn dimensions(&self) -> (u32, u32) {
        self.store.dimensions()
    }

    /// What the canvas should show right now.
    pub fn display(&self) -> Option<&DecodedImage> {
        self.store.display()
    }

    /// The oriented canonical image, unfiltered.
    pub fn canonical(&self) -> Option<&DecodedImage> {
        self.store.canonical()
    }

    // ===== Loading =====

    pub fn begin_load(&mut self) -> LoadTicket {
        self.store.begin_load()
    }

    /// Finish a load started with [`begin_load`](Self::begin_load).
    ///
    /// On success every edit is discarded. On error (including `StaleLoad`)
    /// nothing changes.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        bytes: &[u8],
    ) -> Result<(u32, u32), EditorError> {
        let dims = self.store.complete_load(ticket, bytes)?;
        self.reset_edits();
        Ok(dims)
    }

    pub fn load(&mut self, bytes: &[u8]) -> Result<(u32, u32), EditorError> {
        let ticket = self.begin_load();
        self.complete_load(ticket, bytes)
    }

    pub fn load_decoded(&mut self, image: DecodedImage) -> Result<(u32, u32), EditorError> {
        let dims = self.store.load_decoded(image)?;
        self.reset_edits();
        Ok(dims)
    }

    fn reset_edits(&mut self) {
        self.filters.restore(FilterParameters::default());
        self.filters.invalidate();
        self.transforms.reset();
        self.crop.cancel();
        self.comparison.end();
    }

    /// Drop the image and every edit.
    pub fn clear(&mut self) {
        self.store.reset();
        self.reset_edits();
        self.crop.reset();
        self.comparison.reset();
        tracing::info!("Session cleared");
    }

    // ===== Filters =====

    pub fn filters(&self) -> FilterParameters {
        self.filters.parameters()
    }

    pub fn has_active_filters(&self) -> bool {
        self.filters.has_active_filters()
    }

    /// CSS `filter` description of the current parameters.
    pub fn filter_string(&self) -> String {
        self.filters.filter_string()
    }

    /// Set a filter by name (`brightness`, `contrast`, `saturation`, `blur`, `grayscale`).
    pub fn update_filter(&mut self, name: &str, value: f64) -> Result<FilterParameters, EditorError> {
        let params = self.filters.update(&mut self.store, name, value)?;
        self.comparison.end();
        Ok(params)
    }

    pub fn set_filter(
        &mut self,
        name: FilterName,
        value: f64,
    ) -> Result<FilterParameters, EditorError> {
        let params = self.filters.set(&mut self.store, name, value)?;
        self.comparison.end();
        Ok(params)
    }

    pub fn set_brightness(&mut self, value: f64) -> Result<FilterParameters, EditorError> {
        self.set_filter(FilterName::Brightness, value)
    }

    pub fn set_contrast(&mut self, value: f64) -> Result<FilterParameters, EditorError> {
        self.set_filter(FilterName::Contrast, value)
    }

    pub fn set_saturation(&mut self, value: f64) -> Result<FilterParameters, EditorError> {
        self.set_filter(FilterName::Saturation, value)
    }

    pub fn set_blur(&mut self, value: f64) -> Result<FilterParameters, EditorError> {
        self.set_filter(FilterName::Blur, value)
    }

    pub fn set_grayscale(&mut self, value: f64) -> Result<FilterParameters, EditorError> {
        self.set_filter(FilterName::Grayscale, value)
    }

    pub fn set_filters(&mut self, patch: FilterPatch) -> Result<FilterParameters, EditorError> {
        let params = self.filters.set_parameters(&mut self.store, patch)?;
        self.comparison.end();
        Ok(params)
    }

    pub fn reset_filters(&mut self) -> FilterParameters {
        let params = self.filters.reset(&mut self.store);
        self.comparison.end();
        params
    }

    // ===== Transforms =====

    pub fn transform_state(&self) -> TransformState {
        self.transforms.state()
    }

    pub fn rotate_clockwise(&mut self) -> Result<(), EditorError> {
        self.transform(TransformOp::RotateClockwise)
    }

    pub fn rotate_counter_clockwise(&mut self) -> Result<(), EditorError> {
        self.transform(TransformOp::RotateCounterClockwise)
    }

    pub fn flip_horizontal(&mut self) -> Result<(), EditorError> {
        self.transform(TransformOp::FlipHorizontal)
    }

    pub fn flip_vertical(&mut self) -> Result<(), EditorError> {
        self.transform(TransformOp::FlipVertical)
    }

    /// Apply one transform. An active crop selection is cancelled, since its
    /// coordinates refer to the previous orientation.
    pub fn transform(&mut self, op: TransformOp) -> Result<(), EditorError> {
        self.transforms.apply(&mut self.store, op)?;
        self.crop.cancel();
        self.after_geometry_change()
    }

    /// Clear the transform log. The image keeps its current geometry.
    pub fn reset_transforms(&mut self) {
        self.transforms.reset();
    }

    fn after_geometry_change(&mut self) -> Result<(), EditorError> {
        self.comparison.end();
        self.filters.invalidate();
        self.filters.apply_all(&mut self.store)
    }

    // ===== Crop =====

    pub fn crop(&self) -> &CropController {
        &self.crop
    }

    pub fn is_cropping(&self) -> bool {
        self.crop.is_active()
    }

    pub fn crop_rect(&self) -> Option<CropRect> {
        self.crop.rect()
    }

    pub fn crop_overlay(&self) -> Option<CropOverlay> {
        self.crop.overlay()
    }

    /// Enter crop mode. A running comparison ends so the edit is visible.
    pub fn start_crop(&mut self) -> Result<CropRect, EditorError> {
        let rect = self.crop.start(&self.store)?;
        if self.comparison.is_active() {
            self.comparison.end();
            self.filters.apply_all(&mut self.store)?;
        }
        Ok(rect)
    }

    pub fn crop_pointer_down(&mut self, p: Point) -> Result<CursorHint, EditorError> {
        self.crop.pointer_down(p)
    }

    pub fn crop_pointer_move(&mut self, p: Point) -> Result<CursorHint, EditorError> {
        self.crop.pointer_move(p)
    }

    pub fn crop_pointer_up(&mut self) {
        self.crop.pointer_up();
    }

    pub fn crop_cursor_at(&self, p: Point) -> CursorHint {
        self.crop.cursor_at(p)
    }

    pub fn set_crop_aspect_ratio(&mut self, ratio: Option<f64>) -> Result<(), EditorError> {
        self.crop.set_aspect_ratio(ratio)
    }

    pub fn set_crop_preset(&mut self, preset: AspectPreset) -> Result<(), EditorError> {
        self.crop.set_preset(preset)
    }

    /// Crop to the selection and re-render the filters over the result.
    pub fn commit_crop(&mut self) -> Result<PixelRegion, EditorError> {
        let region = self.crop.commit(&mut self.store)?;
        self.after_geometry_change()?;
        Ok(region)
    }

    pub fn cancel_crop(&mut self) -> CursorHint {
        self.crop.cancel()
    }

    // ===== Comparison =====

    pub fn comparison_state(&self) -> ComparisonState {
        self.comparison.state()
    }

    pub fn toggle_comparison(&mut self) -> Result<bool, EditorError> {
        self.comparison.toggle(&mut self.store, &mut self.filters)
    }

    pub fn enter_split(&mut self, position: f64) -> Result<SplitLayout, EditorError> {
        self.comparison
            .enter_split(&mut self.store, &mut self.filters, position)
    }

    pub fn update_split_position(&mut self, position: f64) -> Result<f64, EditorError> {
        self.comparison
            .update_split_position(&mut self.store, &mut self.filters, position)
    }

    pub fn exit_split(&mut self) -> Result<(), EditorError> {
        self.comparison.exit_split(&mut self.store, &mut self.filters)
    }

    pub fn split_layout(&self) -> SplitLayout {
        self.comparison.split_layout(self.dimensions().0)
    }

    /// Back to defaults, showing the edited render.
    pub fn reset_comparison(&mut self) -> Result<(), EditorError> {
        self.comparison.reset();
        if self.store.has_image() {
            self.filters.apply_all(&mut self.store)?;
        }
        Ok(())
    }

    // ===== Export =====

    /// Encode the edited image: oriented, cropped and filtered, without any
    /// comparison overlay.
    ///
    /// # Errors
    ///
    /// - `NoImage` when nothing is loaded
    /// - `EncodingFailed` if the encoder fails
    #[tracing::instrument(skip(self))]
    pub fn export(&mut self, format: ExportFormat, quality: f32) -> Result<Vec<u8>, EditorError> {
        let Some(canonical) = self.store.canonical() else {
            tracing::warn!("No image to export");
            return Err(EditorError::NoImage);
        };
        let render = self.filters.render(canonical, self.store.revision());
        let bytes = encode_image(&render, format, quality)?;
        tracing::info!(bytes = bytes.len(), "Image exported");
        Ok(bytes)
    }

    /// Encoded size for a format and quality, e.g. for a size preview.
    pub fn approximate_size(
        &mut self,
        format: ExportFormat,
        quality: f32,
    ) -> Result<usize, EditorError> {
        self.export(format, quality).map(|bytes| bytes.len())
    }

    /// Download name: the sanitized `name`, or a timestamped default, plus the extension.
    pub fn export_filename(
        &self,
        name: Option<&str>,
        format: ExportFormat,
        now: NaiveDateTime,
    ) -> String {
        let stem = match name {
            Some(name) if !name.trim().is_empty() => {
                sanitize_filename_or(name, &self.config.fallback_filename)
            }
            _ => default_filename(now),
        };
        format!("{}.{}", stem, format.extension())
    }

    // ===== Persistence =====

    /// Write the image and every state slot. Slots are attempted
    /// independently; the session is never affected.
    ///
    /// # Errors
    ///
    /// The first failure, e.g. `StorageQuotaExceeded`. Hosts report it as a warning.
    pub fn save(&self, kv: &mut dyn KeyValueStore) -> Result<(), EditorError> {
        let results = [
            match self.store.canonical() {
                Some(image) => self.persistence.save_image(kv, image),
                None => Ok(()),
            },
            self.persistence.save_filters(kv, &self.filters.parameters()),
            self.persistence.save_transforms(kv, &self.transforms.state()),
            self.persistence.save_comparison(kv, &self.comparison.state()),
        ];

        match results.into_iter().find_map(Result::err) {
            Some(err) => {
                tracing::warn!(error = %err, "Session saved partially");
                Err(err)
            }
            None => {
                tracing::debug!("Session saved");
                Ok(())
            }
        }
    }

    /// Restore a saved session. Missing or corrupt slots keep their defaults.
    ///
    /// # Returns
    ///
    /// Whether an image was restored.
    pub fn restore(&mut self, kv: &dyn KeyValueStore) -> bool {
        if let Some(bytes) = self.persistence.load_image(kv) {
            if let Err(e) = self.load(&bytes) {
                tracing::warn!(error = %e, "Saved image could not be loaded");
            }
        }

        if let Some(params) = self.persistence.load_filters(kv) {
            self.filters.restore(params);
        }
        if let Some(state) = self.persistence.load_transforms(kv) {
            self.transforms.set_state(state);
        }
        if self.store.has_image() {
            // Only fails without an image.
            let _ = self.filters.apply_all(&mut self.store);
        }
        if let Some(state) = self.persistence.load_comparison(kv) {
            if let Err(e) = self
                .comparison
                .restore(state, &mut self.store, &mut self.filters)
            {
                tracing::warn!(error = %e, "Saved comparison could not be restored");
            }
        }

        tracing::info!(has_image = self.store.has_image(), "Session restored");
        self.store.has_image()
    }

    /// Remove every saved slot.
    pub fn clear_saved(&self, kv: &mut dyn KeyValueStore) -> Result<(), EditorError> {
        self.persistence.clear(kv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::ComparisonMode;
    use crate::persist::MemoryStore;
    use image::codecs::png::PngEncoder;
    use image::{ExtendedColorType, ImageEncoder};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x % 251) as u8, (y % 241) as u8, 120]);
            }
        }
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(&pixels, width, height, ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    fn loaded(width: u32, height: u32) -> EditorSession {
        let mut session = EditorSession::default();
        session.load(&png_bytes(width, height)).unwrap();
        session
    }

    // ===== Load Tests =====

    #[test]
    fn test_load_scales_into_bounds() {
        let session = loaded(2000, 1000);
        assert_eq!(session.dimensions(), (800, 400));
        assert_eq!(session.display(), session.canonical());
    }

    #[test]
    fn test_load_resets_edits() {
        let mut session = loaded(20, 10);
        session.set_brightness(150.0).unwrap();
        session.rotate_clockwise().unwrap();
        session.toggle_comparison().unwrap();

        session.load(&png_bytes(8, 8)).unwrap();

        assert!(session.filters().is_default());
        assert!(session.transform_state().is_identity());
        assert!(!session.comparison_state().active);
        assert_eq!(session.display(), session.canonical());
    }

    #[test]
    fn test_stale_load_keeps_newer_image() {
        let mut session = EditorSession::default();
        let first = session.begin_load();
        let second = session.begin_load();

        session.complete_load(second, &png_bytes(30, 20)).unwrap();
        session.set_contrast(120.0).unwrap();
        let err = session.complete_load(first, &png_bytes(5, 5)).unwrap_err();

        assert!(err.is_precondition());
        assert_eq!(session.dimensions(), (30, 20));
        assert_eq!(session.filters().contrast, 120.0);
    }

    #[test]
    fn test_invalid_input_is_reported() {
        let mut session = EditorSession::default();
        let err = session.load(b"plain text").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
        assert!(!session.has_image());
    }

    #[test]
    fn test_malformed_decoded_image_keeps_previous() {
        let mut session = loaded(4, 4);
        session.set_brightness(120.0).unwrap();

        let err = session
            .load_decoded(DecodedImage::new(10, 10, vec![0; 5]))
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);

        assert_eq!(session.dimensions(), (4, 4));
        assert_eq!(session.filters().brightness, 120.0);
        session.set_blur(2.0).unwrap();
        assert_eq!(session.display().map(|img| img.pixels.len()), Some(48));
    }

    // ===== Filter Tests =====

    #[test]
    fn test_apply_is_idempotent() {
        let mut session = loaded(32, 16);
        session.set_brightness(130.0).unwrap();
        session.set_blur(1.5).unwrap();
        let first = session.display().cloned();

        session.set_blur(1.5).unwrap();
        assert_eq!(session.display().cloned(), first);
    }

    #[test]
    fn test_reset_filters_restores_canonical() {
        let mut session = loaded(16, 16);
        session.set_brightness(150.0).unwrap();
        session.set_contrast(120.0).unwrap();
        assert_ne!(session.display(), session.canonical());

        let params = session.reset_filters();
        assert_eq!(params, FilterParameters::default());
        assert_eq!(session.display(), session.canonical());
    }

    #[test]
    fn test_unknown_filter_leaves_comparison() {
        let mut session = loaded(10, 10);
        session.toggle_comparison().unwrap();

        let err = session.update_filter("sepia", 50.0).unwrap_err();
        assert!(matches!(err, EditorError::UnknownFilter(_)));
        assert!(session.comparison_state().active);
    }

    #[test]
    fn test_filter_edit_ends_comparison() {
        let mut session = loaded(10, 10);
        session.toggle_comparison().unwrap();
        session.update_filter("Grayscale", 100.0).unwrap();

        assert!(!session.comparison_state().active);
        let px = session.display().unwrap().pixel(3, 3);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
    }

    // ===== Transform Tests =====

    #[test]
    fn test_four_rotations_round_trip() {
        let mut session = loaded(40, 20);
        let original = session.canonical().cloned();
        for _ in 0..4 {
            session.rotate_clockwise().unwrap();
        }
        assert_eq!(session.dimensions(), (40, 20));
        assert_eq!(session.transform_state().rotation, 0);
        assert_eq!(session.canonical().cloned(), original);
    }

    #[test]
    fn test_double_flip_round_trip() {
        let mut session = loaded(9, 5);
        let original = session.canonical().cloned();
        session.flip_horizontal().unwrap();
        session.flip_horizontal().unwrap();
        assert_eq!(session.canonical().cloned(), original);
    }

    #[test]
    fn test_rotation_keeps_filters_applied() {
        let mut session = loaded(12, 6);
        session.set_grayscale(100.0).unwrap();
        session.rotate_counter_clockwise().unwrap();

        assert_eq!(session.dimensions(), (6, 12));
        let display = session.display().unwrap();
        assert_eq!((display.width, display.height), (6, 12));
        let px = display.pixel(2, 7);
        assert_eq!(px[0], px[2]);
    }

    #[test]
    fn test_transform_without_image() {
        let mut session = EditorSession::default();
        assert!(session.rotate_clockwise().unwrap_err().is_precondition());
    }

    // ===== Crop Tests =====

    #[test]
    fn test_crop_commit_with_filters() {
        let mut session = loaded(100, 60);
        session.set_brightness(120.0).unwrap();
        session.start_crop().unwrap();

        session.crop_pointer_down(Point::new(0.0, 0.0)).unwrap();
        session.crop_pointer_move(Point::new(50.0, 30.0)).unwrap();
        session.crop_pointer_up();
        let region = session.commit_crop().unwrap();

        assert_eq!(region, PixelRegion::new(0, 0, 50, 30));
        assert_eq!(session.dimensions(), (50, 30));
        assert!(!session.is_cropping());
        assert_ne!(session.display(), session.canonical());
        assert_eq!(session.filters().brightness, 120.0);
    }

    #[test]
    fn test_zero_width_crop_is_rejected() {
        let mut session = loaded(100, 60);
        let before = session.canonical().cloned();
        session.start_crop().unwrap();
        session.crop_pointer_down(Point::new(1.0, 1.0)).unwrap();
        session.crop_pointer_move(Point::new(1.0, 40.0)).unwrap();

        let err = session.commit_crop().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidInput);
        assert_eq!(session.canonical().cloned(), before);
    }

    #[test]
    fn test_rotation_cancels_crop() {
        let mut session = loaded(100, 60);
        session.start_crop().unwrap();
        session.rotate_clockwise().unwrap();
        assert!(!session.is_cropping());
    }

    #[test]
    fn test_start_crop_ends_comparison() {
        let mut session = loaded(20, 20);
        session.set_brightness(50.0).unwrap();
        let edited = session.display().cloned();
        session.toggle_comparison().unwrap();

        session.start_crop().unwrap();
        assert!(!session.comparison_state().active);
        assert_eq!(session.display().cloned(), edited);
    }

    // ===== Comparison Tests =====

    #[test]
    fn test_toggle_twice_restores_filtered_composite() {
        let mut session = loaded(16, 8);
        session.set_saturation(40.0).unwrap();
        let edited = session.display().cloned();

        assert!(session.toggle_comparison().unwrap());
        assert_eq!(session.display(), session.canonical());
        assert!(!session.toggle_comparison().unwrap());
        assert_eq!(session.display().cloned(), edited);
    }

    #[test]
    fn test_split_at_thirty_percent() {
        let mut session = loaded(800, 400);
        session.set_brightness(50.0).unwrap();
        let edited = session.display().cloned().unwrap();

        let layout = session.enter_split(0.3).unwrap();
        assert_eq!(layout.split_x, 240);

        let display = session.display().unwrap();
        let canonical = session.canonical().unwrap();
        for x in [0, 100, 238] {
            assert_eq!(display.pixel(x, 10), canonical.pixel(x, 10));
        }
        for x in [242, 500, 799] {
            assert_eq!(display.pixel(x, 10), edited.pixel(x, 10));
        }
    }

    // ===== Export Tests =====

    #[test]
    fn test_export_ignores_comparison_overlay() {
        let mut session = loaded(8, 8);
        session.set_brightness(0.0).unwrap();
        session.toggle_comparison().unwrap();

        let png = session.export(ExportFormat::Png, 1.0).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().into_rgb8();
        assert!(decoded.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_export_without_image() {
        let mut session = EditorSession::default();
        assert!(matches!(
            session.export(ExportFormat::Jpeg, 0.9),
            Err(EditorError::NoImage)
        ));
    }

    #[test]
    fn test_export_filename() {
        let session = EditorSession::default();
        let now = chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_opt(14, 7, 9))
            .unwrap();

        assert_eq!(
            session.export_filename(Some("../secret:name??"), ExportFormat::Png, now),
            "secretname.png"
        );
        assert_eq!(
            session.export_filename(None, ExportFormat::Jpeg, now),
            "fotoconvierto-20240305-140709.jpg"
        );
        assert_eq!(
            session.export_filename(Some("???"), ExportFormat::WebP, now),
            "imagen.webp"
        );
    }

    #[test]
    fn test_lower_quality_is_smaller() {
        let mut session = loaded(64, 64);
        let high = session.approximate_size(ExportFormat::Jpeg, 1.0).unwrap();
        let low = session.approximate_size(ExportFormat::Jpeg, 0.1).unwrap();
        assert!(low < high);
    }

    #[test]
    fn test_webp_quality_changes_size() {
        let mut session = loaded(64, 64);
        session.set_contrast(180.0).unwrap();
        let high = session.approximate_size(ExportFormat::WebP, 1.0).unwrap();
        let low = session.approximate_size(ExportFormat::WebP, 0.1).unwrap();
        assert!(low < high);
    }

    // ===== Persistence Tests =====

    #[test]
    fn test_save_and_restore() {
        let config = EditorConfig {
            persist_format: ExportFormat::Png,
            ..Default::default()
        };
        let mut session = EditorSession::new(config.clone());
        session.load(&png_bytes(30, 20)).unwrap();
        session.rotate_clockwise().unwrap();
        session.set_brightness(140.0).unwrap();
        session.enter_split(0.25).unwrap();

        let mut kv = MemoryStore::new();
        session.save(&mut kv).unwrap();

        let mut restored = EditorSession::new(config);
        assert!(restored.restore(&kv));
        assert_eq!(restored.dimensions(), (20, 30));
        assert_eq!(restored.canonical(), session.canonical());
        assert_eq!(restored.filters().brightness, 140.0);
        assert_eq!(restored.transform_state().rotation, 90);

        let comparison = restored.comparison_state();
        assert!(comparison.active);
        assert_eq!(comparison.mode, ComparisonMode::Split);
        assert_eq!(restored.display(), session.display());
    }

    #[test]
    fn test_restore_from_empty_store() {
        let mut session = EditorSession::default();
        assert!(!session.restore(&MemoryStore::new()));
        assert!(session.filters().is_default());
    }

    #[test]
    fn test_restore_ignores_corrupt_slots() {
        let mut kv = MemoryStore::new();
        kv.set("fotoconvierto-image", "data:image/png;base64,AAAA")
            .unwrap();
        kv.set("fotoconvierto-filters", "[1, 2").unwrap();
        kv.set("fotoconvierto-transforms", r#"{"rotation":180}"#)
            .unwrap();

        let mut session = EditorSession::default();
        assert!(!session.restore(&kv));
        assert!(session.filters().is_default());
        assert_eq!(session.transform_state().rotation, 180);
    }

    #[test]
    fn test_quota_does_not_disturb_session() {
        let mut session = loaded(64, 64);
        session.set_contrast(130.0).unwrap();
        let display = session.display().cloned();

        let mut kv = MemoryStore::with_quota(256);
        let err = session.save(&mut kv).unwrap_err();

        assert_eq!(err.kind(), crate::ErrorKind::StorageQuotaExceeded);
        assert_eq!(session.display().cloned(), display);
        assert_eq!(session.filters().contrast, 130.0);
        // Small slots still fit.
        assert!(kv.contains_key("fotoconvierto-filters"));
    }

    #[test]
    fn test_clear() {
        let mut session = loaded(10, 10);
        session.set_blur(3.0).unwrap();
        session.set_crop_aspect_ratio(Some(1.0)).unwrap();
        session.clear();

        assert!(!session.has_image());
        assert!(session.filters().is_default());
        assert_eq!(session.crop().aspect_ratio(), None);
        assert_eq!(session.dimensions(), (600, 400));
    }
}
