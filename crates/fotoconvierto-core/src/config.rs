//! Editor configuration.
//!
//! Every field has a default, so a host may pass a partial object (or none
//! at all). Field names are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::encode::ExportFormat;

/// Tunables for an [`EditorSession`](crate::EditorSession).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Largest bitmap kept after loading; bigger images are scaled down to fit.
    pub max_width: u32,
    pub max_height: u32,
    /// Canvas size reported while no image is loaded.
    pub placeholder_width: u32,
    pub placeholder_height: u32,
    /// Side of the square hit area centred on each crop corner.
    pub crop_handle_size: f64,
    /// Fraction of the canvas covered by a freshly started crop.
    pub crop_initial_fraction: f64,
    pub crop_max_initial_width: f64,
    pub crop_max_initial_height: f64,
    /// Width of the split-view divider in pixels.
    pub divider_width: u32,
    pub divider_color: [u8; 3],
    /// Prefix for every persisted key.
    pub storage_prefix: String,
    /// Container used for the persisted bitmap.
    pub persist_format: ExportFormat,
    pub persist_quality: f32,
    pub default_export_quality: f32,
    /// Export name used when sanitizing leaves nothing.
    pub fallback_filename: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_width: 800,
            max_height: 600,
            placeholder_width: 600,
            placeholder_height: 400,
            crop_handle_size: 12.0,
            crop_initial_fraction: 0.6,
            crop_max_initial_width: 400.0,
            crop_max_initial_height: 300.0,
            divider_width: 3,
            divider_color: [255, 255, 255],
            storage_prefix: "fotoconvierto".to_string(),
            persist_format: ExportFormat::Jpeg,
            persist_quality: 0.8,
            default_export_quality: 0.9,
            fallback_filename: "imagen".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage key for one slot, e.g. `fotoconvierto-filters`.
    pub fn storage_key(&self, slot: &str) -> String {
        format!("{}-{}", self.storage_prefix, slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!((config.max_width, config.max_height), (800, 600));
        assert_eq!(config.crop_handle_size, 12.0);
        assert_eq!(config.divider_width, 3);
        assert_eq!(config.persist_format, ExportFormat::Jpeg);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"maxWidth":1024,"storagePrefix":"test"}"#).unwrap();
        assert_eq!(config.max_width, 1024);
        assert_eq!(config.max_height, 600);
        assert_eq!(config.storage_key("image"), "test-image");
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(
            EditorConfig::default().storage_key("filters"),
            "fotoconvierto-filters"
        );
    }
}
