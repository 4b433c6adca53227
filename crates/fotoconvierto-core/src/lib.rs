//! FotoConvierto Core - Image editing library
//!
//! This crate provides the editing state machine and compositing pipeline
//! for FotoConvierto: image loading, filters, rotation and flips, cropping,
//! before/after comparison, persistence and export.

pub mod comparison;
pub mod config;
pub mod crop;
pub mod decode;
pub mod encode;
pub mod error;
pub mod filter;
pub mod persist;
pub mod session;
pub mod store;
pub mod transform;

use std::fmt;

use filter::FilterName;

pub use comparison::{ComparisonController, ComparisonMode, ComparisonState, SplitLayout};
pub use config::EditorConfig;
pub use crop::{CropController, CropRect, CursorHint, Handle, Point};
pub use encode::ExportFormat;
pub use error::{EditorError, ErrorKind};
pub use filter::{FilterEngine, FilterPatch};
pub use persist::{KeyValueStore, MemoryStore, PersistenceAdapter, StorageError};
pub use session::EditorSession;
pub use store::{ImageStore, LoadTicket};
pub use transform::{Orientation, TransformEngine, TransformState};

/// The five filter values, in user units.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FilterParameters {
    /// Brightness percent (0 to 200, 100 = unchanged)
    pub brightness: f32,
    /// Contrast percent (0 to 200, 100 = unchanged)
    pub contrast: f32,
    /// Saturation percent (0 to 200, 100 = unchanged)
    pub saturation: f32,
    /// Gaussian blur radius in pixels (0 to 10)
    pub blur: f32,
    /// Grayscale percent (0 to 100)
    pub grayscale: f32,
}

impl Default for FilterParameters {
    fn default() -> Self {
        Self {
            brightness: Self::NEUTRAL_BRIGHTNESS,
            contrast: Self::NEUTRAL_CONTRAST,
            saturation: Self::NEUTRAL_SATURATION,
            blur: 0.0,
            grayscale: 0.0,
        }
    }
}

impl FilterParameters {
    pub const NEUTRAL_BRIGHTNESS: f32 = 100.0;
    pub const NEUTRAL_CONTRAST: f32 = 100.0;
    pub const NEUTRAL_SATURATION: f32 = 100.0;

    /// Create a new FilterParameters with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn get(&self, name: FilterName) -> f32 {
        match name {
            FilterName::Brightness => self.brightness,
            FilterName::Contrast => self.contrast,
            FilterName::Saturation => self.saturation,
            FilterName::Blur => self.blur,
            FilterName::Grayscale => self.grayscale,
        }
    }

    /// Store a value as-is. Callers clamp first.
    pub fn set(&mut self, name: FilterName, value: f32) {
        match name {
            FilterName::Brightness => self.brightness = value,
            FilterName::Contrast => self.contrast = value,
            FilterName::Saturation => self.saturation = value,
            FilterName::Blur => self.blur = value,
            FilterName::Grayscale => self.grayscale = value,
        }
    }

    /// Clamp every value into range; non-finite values fall back to neutral.
    pub fn sanitized(mut self) -> Self {
        for name in FilterName::ALL {
            let value = self.get(name);
            let value = if value.is_finite() {
                let (min, max) = name.range();
                value.clamp(min, max)
            } else {
                name.neutral()
            };
            self.set(name, value);
        }
        self
    }
}

/// CSS `filter` property syntax, e.g. `brightness(120%) blur(2px)`, or `none`.
impl fmt::Display for FilterParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.brightness != Self::NEUTRAL_BRIGHTNESS {
            parts.push(format!("brightness({}%)", self.brightness));
        }
        if self.contrast != Self::NEUTRAL_CONTRAST {
            parts.push(format!("contrast({}%)", self.contrast));
        }
        if self.saturation != Self::NEUTRAL_SATURATION {
            parts.push(format!("saturate({}%)", self.saturation));
        }
        if self.blur > 0.0 {
            parts.push(format!("blur({}px)", self.blur));
        }
        if self.grayscale > 0.0 {
            parts.push(format!("grayscale({}%)", self.grayscale));
        }

        if parts.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&parts.join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parameters_default() {
        let params = FilterParameters::new();
        assert!(params.is_default());
        assert_eq!(params.brightness, 100.0);
        assert_eq!(params.blur, 0.0);
    }

    #[test]
    fn test_filter_parameters_display() {
        assert_eq!(FilterParameters::default().to_string(), "none");
        let params = FilterParameters {
            contrast: 110.0,
            grayscale: 40.0,
            ..Default::default()
        };
        assert_eq!(params.to_string(), "contrast(110%) grayscale(40%)");
    }

    #[test]
    fn test_sanitized() {
        let params = FilterParameters {
            brightness: 500.0,
            blur: f32::NAN,
            grayscale: -3.0,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(params.brightness, 200.0);
        assert_eq!(params.blur, 0.0);
        assert_eq!(params.grayscale, 0.0);
    }

    #[test]
    fn test_filter_parameters_serde_partial() {
        let params: FilterParameters = serde_json::from_str(r#"{"brightness":120}"#).unwrap();
        assert_eq!(params.brightness, 120.0);
        assert_eq!(params.contrast, 100.0);
    }
}
