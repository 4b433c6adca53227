//! Non-destructive filter pipeline.
//!
//! `FilterEngine` holds the five filter parameters and renders them over the
//! oriented canonical image. The canonical image is never modified; the
//! result only replaces the store's display render.
//!
//! # Pipeline
//!
//! brightness -> contrast -> saturation -> blur -> grayscale, each step
//! skipped at its neutral value. Rendering is deterministic: the same input
//! and parameters always produce byte-identical output.
//!
//! # Caching
//!
//! The last render is cached on `(store revision, parameters)`. Any change
//! to the canonical image bumps the revision, so a stale render is never
//! reused.

mod color;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::decode::DecodedImage;
use crate::error::EditorError;
use crate::store::ImageStore;
use crate::FilterParameters;

pub use color::{
    apply_brightness, apply_color_filters, apply_contrast, apply_grayscale, grayscale_matrix,
    saturate_matrix, LUMINANCE_B, LUMINANCE_G, LUMINANCE_R,
};

/// One of the five adjustable filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterName {
    Brightness,
    Contrast,
    Saturation,
    Blur,
    Grayscale,
}

impl FilterName {
    /// All filters in pipeline order.
    pub const ALL: [FilterName; 5] = [
        FilterName::Brightness,
        FilterName::Contrast,
        FilterName::Saturation,
        FilterName::Blur,
        FilterName::Grayscale,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterName::Brightness => "brightness",
            FilterName::Contrast => "contrast",
            FilterName::Saturation => "saturation",
            FilterName::Blur => "blur",
            FilterName::Grayscale => "grayscale",
        }
    }

    /// Accepted value range (inclusive).
    pub fn range(self) -> (f32, f32) {
        match self {
            FilterName::Brightness | FilterName::Contrast | FilterName::Saturation => (0.0, 200.0),
            FilterName::Blur => (0.0, 10.0),
            FilterName::Grayscale => (0.0, 100.0),
        }
    }

    /// The value at which the filter has no effect.
    pub fn neutral(self) -> f32 {
        match self {
            FilterName::Brightness | FilterName::Contrast | FilterName::Saturation => 100.0,
            FilterName::Blur | FilterName::Grayscale => 0.0,
        }
    }

    /// Validate and clamp a user value for this filter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilterValue` for NaN or infinite input.
    pub fn clamp(self, value: f64) -> Result<f32, EditorError> {
        if !value.is_finite() {
            return Err(EditorError::InvalidFilterValue {
                name: self.as_str(),
                value,
            });
        }
        let (min, max) = self.range();
        Ok((value as f32).clamp(min, max))
    }
}

impl fmt::Display for FilterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterName {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brightness" => Ok(FilterName::Brightness),
            "contrast" => Ok(FilterName::Contrast),
            "saturation" | "saturate" => Ok(FilterName::Saturation),
            "blur" => Ok(FilterName::Blur),
            "grayscale" => Ok(FilterName::Grayscale),
            _ => Err(EditorError::UnknownFilter(s.to_string())),
        }
    }
}

/// A partial update: only the fields present are changed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterPatch {
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub saturation: Option<f64>,
    pub blur: Option<f64>,
    pub grayscale: Option<f64>,
}

impl FilterPatch {
    fn entries(&self) -> [(FilterName, Option<f64>); 5] {
        [
            (FilterName::Brightness, self.brightness),
            (FilterName::Contrast, self.contrast),
            (FilterName::Saturation, self.saturation),
            (FilterName::Blur, self.blur),
            (FilterName::Grayscale, self.grayscale),
        ]
    }
}

/// Render `source` with `params`.
///
/// # Arguments
///
/// * `source` - Oriented canonical image
/// * `params` - Filter values in user units
///
/// # Returns
///
/// A new image; `source` is untouched.
pub fn composite(source: &DecodedImage, params: &FilterParameters) -> DecodedImage {
    let mut pixels = source.pixels.clone();
    color::apply_color_filters(&mut pixels, params);

    let mut render = DecodedImage::new(source.width, source.height, pixels);
    if params.blur > 0.0 {
        if let Some(rgb) = render.to_rgb_image() {
            render = DecodedImage::from_rgb_image(image::imageops::blur(&rgb, params.blur));
        }
    }

    color::apply_grayscale(&mut render.pixels, params.grayscale);
    render
}

#[derive(Debug, Clone)]
struct CachedRender {
    revision: u64,
    params: FilterParameters,
    render: DecodedImage,
}

/// Owns the filter parameters and the cached composite.
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    params: FilterParameters,
    cache: Option<CachedRender>,
}

impl FilterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parameters(&self) -> FilterParameters {
        self.params
    }

    /// Whether any parameter differs from its default.
    pub fn has_active_filters(&self) -> bool {
        !self.params.is_default()
    }

    /// Drop the cached render.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Composite for the image at `revision`, reusing the cache when possible.
    pub fn render(&mut self, source: &DecodedImage, revision: u64) -> DecodedImage {
        if let Some(cached) = &self.cache {
            if cached.revision == revision && cached.params == self.params {
                return cached.render.clone();
            }
        }

        let render = if self.params.is_default() {
            source.clone()
        } else {
            composite(source, &self.params)
        };
        self.cache = Some(CachedRender {
            revision,
            params: self.params,
            render: render.clone(),
        });
        render
    }

    /// Recompute the display render from the oriented canonical image.
    ///
    /// # Errors
    ///
    /// Returns `NoImage` when nothing is loaded.
    #[tracing::instrument(skip_all, fields(params = %self.params))]
    pub fn apply_all(&mut self, store: &mut ImageStore) -> Result<(), EditorError> {
        let revision = store.revision();
        let render = match store.canonical() {
            Some(canonical) => self.render(canonical, revision),
            None => {
                tracing::warn!("No image to filter");
                return Err(EditorError::NoImage);
            }
        };
        store.set_display(render);
        Ok(())
    }

    /// Set a filter by name and re-apply.
    ///
    /// The value is clamped into the filter's range. Without an image the
    /// parameter is still stored.
    ///
    /// # Errors
    ///
    /// - `UnknownFilter` if `name` is not one of the five filters
    /// - `InvalidFilterValue` if `value` is not finite
    pub fn update(
        &mut self,
        store: &mut ImageStore,
        name: &str,
        value: f64,
    ) -> Result<FilterParameters, EditorError> {
        let name: FilterName = name.parse().inspect_err(|_| {
            tracing::warn!(name, "Unknown filter");
        })?;
        self.set(store, name, value)
    }

    /// Set one filter and re-apply.
    pub fn set(
        &mut self,
        store: &mut ImageStore,
        name: FilterName,
        value: f64,
    ) -> Result<FilterParameters, EditorError> {
        let value = name.clamp(value)?;
        self.params.set(name, value);
        tracing::debug!(%name, value, "Filter updated");
        self.reapply(store);
        Ok(self.params)
    }

    pub fn set_brightness(
        &mut self,
        store: &mut ImageStore,
        value: f64,
    ) -> Result<FilterParameters, EditorError> {
        self.set(store, FilterName::Brightness, value)
    }

    pub fn set_contrast(
        &mut self,
        store: &mut ImageStore,
        value: f64,
    ) -> Result<FilterParameters, EditorError> {
        self.set(store, FilterName::Contrast, value)
    }

    pub fn set_saturation(
        &mut self,
        store: &mut ImageStore,
        value: f64,
    ) -> Result<FilterParameters, EditorError> {
        self.set(store, FilterName::Saturation, value)
    }

    pub fn set_blur(
        &mut self,
        store: &mut ImageStore,
        value: f64,
    ) -> Result<FilterParameters, EditorError> {
        self.set(store, FilterName::Blur, value)
    }

    pub fn set_grayscale(
        &mut self,
        store: &mut ImageStore,
        value: f64,
    ) -> Result<FilterParameters, EditorError> {
        self.set(store, FilterName::Grayscale, value)
    }

    /// Merge a partial update and re-apply.
    ///
    /// Every present value is validated before any is written.
    pub fn set_parameters(
        &mut self,
        store: &mut ImageStore,
        patch: FilterPatch,
    ) -> Result<FilterParameters, EditorError> {
        let mut next = self.params;
        for (name, value) in patch.entries() {
            if let Some(value) = value {
                next.set(name, name.clamp(value)?);
            }
        }
        self.params = next;
        self.reapply(store);
        Ok(self.params)
    }

    /// Back to defaults and re-apply.
    pub fn reset(&mut self, store: &mut ImageStore) -> FilterParameters {
        self.params = FilterParameters::default();
        tracing::debug!("Filters reset");
        self.reapply(store);
        self.params
    }

    /// Replace the parameters without rendering, e.g. when restoring saved state.
    pub fn restore(&mut self, params: FilterParameters) {
        self.params = params.sanitized();
    }

    /// Filter description in the CSS `filter` property syntax.
    pub fn filter_string(&self) -> String {
        self.params.to_string()
    }

    fn reapply(&mut self, store: &mut ImageStore) {
        if store.has_image() {
            // Only fails without an image.
            let _ = self.apply_all(store);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_store(width: u32, height: u32) -> ImageStore {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push((x * 255 / width) as u8);
                pixels.push((y * 255 / height) as u8);
                pixels.push(96);
            }
        }
        let mut store = ImageStore::default();
        store
            .load_decoded(DecodedImage::new(width, height, pixels))
            .unwrap();
        store
    }

    // ===== Name Tests =====

    #[test]
    fn test_filter_name_parsing() {
        assert_eq!("brightness".parse::<FilterName>().unwrap(), FilterName::Brightness);
        assert_eq!("Saturate".parse::<FilterName>().unwrap(), FilterName::Saturation);
        assert!(matches!(
            "sepia".parse::<FilterName>(),
            Err(EditorError::UnknownFilter(_))
        ));
    }

    #[test]
    fn test_clamp_into_range() {
        assert_eq!(FilterName::Blur.clamp(25.0).unwrap(), 10.0);
        assert_eq!(FilterName::Brightness.clamp(-5.0).unwrap(), 0.0);
        assert!(FilterName::Contrast.clamp(f64::NAN).is_err());
    }

    // ===== Blur Tests =====

    #[test]
    fn test_blur_spreads_single_pixel() {
        let mut pixels = vec![0u8; 7 * 7 * 3];
        let center = (3 * 7 + 3) * 3;
        pixels[center..center + 3].copy_from_slice(&[255, 255, 255]);
        let img = DecodedImage::new(7, 7, pixels);
        let params = FilterParameters {
            blur: 1.0,
            ..FilterParameters::default()
        };

        let out = composite(&img, &params);

        assert_eq!((out.width, out.height), (7, 7));
        assert!(out.pixel(3, 3)[0] < 255);
        assert!(out.pixel(2, 3)[0] > 0);
        assert!(out.pixel(4, 3)[0] > 0);
    }

    #[test]
    fn test_blur_keeps_flat_image_flat() {
        let img = DecodedImage::filled(6, 4, [10, 20, 30]);
        let params = FilterParameters {
            blur: 2.0,
            ..FilterParameters::default()
        };

        let out = composite(&img, &params);

        for px in out.pixels.chunks_exact(3) {
            assert!(px[0].abs_diff(10) <= 1, "{:?}", px);
            assert!(px[1].abs_diff(20) <= 1, "{:?}", px);
            assert!(px[2].abs_diff(30) <= 1, "{:?}", px);
        }
    }

    // ===== Apply Tests =====

    #[test]
    fn test_apply_all_is_idempotent() {
        let mut store = gradient_store(24, 16);
        let mut engine = FilterEngine::new();
        engine.set_brightness(&mut store, 130.0).unwrap();
        engine.set_blur(&mut store, 2.0).unwrap();

        engine.apply_all(&mut store).unwrap();
        let first = store.display().cloned();
        engine.invalidate();
        engine.apply_all(&mut store).unwrap();

        assert_eq!(store.display().cloned(), first);
    }

    #[test]
    fn test_filters_never_touch_canonical() {
        let mut store = gradient_store(8, 8);
        let canonical = store.canonical().cloned();
        let mut engine = FilterEngine::new();

        engine.set_grayscale(&mut store, 100.0).unwrap();

        assert_eq!(store.canonical().cloned(), canonical);
        assert_ne!(store.display().cloned(), canonical);
    }

    #[test]
    fn test_reset_restores_unfiltered_render() {
        let mut store = gradient_store(16, 8);
        let mut engine = FilterEngine::new();
        engine.update(&mut store, "brightness", 150.0).unwrap();
        engine.update(&mut store, "contrast", 120.0).unwrap();
        assert!(engine.has_active_filters());

        let params = engine.reset(&mut store);

        assert_eq!(params, FilterParameters::default());
        assert!(!engine.has_active_filters());
        assert_eq!(store.display(), store.canonical());
    }

    #[test]
    fn test_unknown_filter_leaves_state() {
        let mut store = gradient_store(4, 4);
        let mut engine = FilterEngine::new();
        let before = store.display().cloned();

        assert!(engine.update(&mut store, "sepia", 50.0).is_err());
        assert_eq!(engine.parameters(), FilterParameters::default());
        assert_eq!(store.display().cloned(), before);
    }

    #[test]
    fn test_apply_without_image() {
        let mut store = ImageStore::default();
        let mut engine = FilterEngine::new();
        assert!(matches!(engine.apply_all(&mut store), Err(EditorError::NoImage)));
        // Parameters are still accepted.
        engine.set_contrast(&mut store, 150.0).unwrap();
        assert_eq!(engine.parameters().contrast, 150.0);
    }

    #[test]
    fn test_cache_follows_revision() {
        let mut store = gradient_store(10, 6);
        let mut engine = FilterEngine::new();
        engine.set_saturation(&mut store, 0.0).unwrap();

        store
            .set_orientation(crate::transform::Orientation::new(1, false))
            .unwrap();
        engine.apply_all(&mut store).unwrap();

        let display = store.display().map(|d| (d.width, d.height));
        assert_eq!(display, Some((6, 10)));
    }

    #[test]
    fn test_set_parameters_is_atomic() {
        let mut store = gradient_store(4, 4);
        let mut engine = FilterEngine::new();
        let patch = FilterPatch {
            brightness: Some(120.0),
            blur: Some(f64::INFINITY),
            ..Default::default()
        };
        assert!(engine.set_parameters(&mut store, patch).is_err());
        assert_eq!(engine.parameters(), FilterParameters::default());

        let patch = FilterPatch {
            brightness: Some(120.0),
            grayscale: Some(250.0),
            ..Default::default()
        };
        let params = engine.set_parameters(&mut store, patch).unwrap();
        assert_eq!(params.brightness, 120.0);
        assert_eq!(params.grayscale, 100.0);
        assert_eq!(params.contrast, 100.0);
    }

    // ===== Filter String Tests =====

    #[test]
    fn test_filter_string() {
        let mut store = ImageStore::default();
        let mut engine = FilterEngine::new();
        assert_eq!(engine.filter_string(), "none");

        engine.set_brightness(&mut store, 120.0).unwrap();
        engine.set_saturation(&mut store, 50.0).unwrap();
        engine.set_blur(&mut store, 1.5).unwrap();
        assert_eq!(
            engine.filter_string(),
            "brightness(120%) saturate(50%) blur(1.5px)"
        );
    }
}
