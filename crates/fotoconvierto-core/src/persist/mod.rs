//! Best-effort persistence of the editing session.
//!
//! Four keys share the configured prefix:
//!
//! | Key | Value |
//! |---|---|
//! | `{prefix}-image` | `data:` URL of the oriented canonical image |
//! | `{prefix}-filters` | `FilterParameters` JSON |
//! | `{prefix}-transforms` | `TransformState` JSON |
//! | `{prefix}-comparison` | `ComparisonState` JSON |
//!
//! Saving can fail (quota); loading never does. Absent, unreadable or
//! corrupt entries load as `None` with a warning, and restored values are
//! clamped into range.

mod store;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::comparison::ComparisonState;
use crate::config::EditorConfig;
use crate::decode::DecodedImage;
use crate::encode::{encode_image, ExportFormat};
use crate::error::EditorError;
use crate::transform::TransformState;
use crate::FilterParameters;

pub use store::{KeyValueStore, MemoryStore, StorageError};

pub const IMAGE_SLOT: &str = "image";
pub const FILTERS_SLOT: &str = "filters";
pub const TRANSFORMS_SLOT: &str = "transforms";
pub const COMPARISON_SLOT: &str = "comparison";

/// Why a `data:` URL could not be read.
#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("missing data: prefix")]
    MissingPrefix,

    #[error("payload is not base64")]
    NotBase64,

    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Wrap encoded image bytes as `data:{mime};base64,{payload}`.
pub fn encode_data_url(bytes: &[u8], format: ExportFormat) -> String {
    format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(bytes))
}

/// Split a base64 `data:` URL into its media type and decoded bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), DataUrlError> {
    let rest = url
        .trim()
        .strip_prefix("data:")
        .ok_or(DataUrlError::MissingPrefix)?;
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::NotBase64)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(DataUrlError::NotBase64)?;
    let bytes = STANDARD.decode(payload)?;
    Ok((mime.to_string(), bytes))
}

/// Reads and writes session state under the configured keys.
#[derive(Debug, Clone)]
pub struct PersistenceAdapter {
    image_key: String,
    filters_key: String,
    transforms_key: String,
    comparison_key: String,
    format: ExportFormat,
    quality: f32,
}

impl Default for PersistenceAdapter {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl PersistenceAdapter {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            image_key: config.storage_key(IMAGE_SLOT),
            filters_key: config.storage_key(FILTERS_SLOT),
            transforms_key: config.storage_key(TRANSFORMS_SLOT),
            comparison_key: config.storage_key(COMPARISON_SLOT),
            format: config.persist_format,
            quality: config.persist_quality,
        }
    }

    /// All keys this adapter writes.
    pub fn keys(&self) -> [&str; 4] {
        [
            &self.image_key,
            &self.filters_key,
            &self.transforms_key,
            &self.comparison_key,
        ]
    }

    // ===== Save =====

    /// Encode `image` with the persist format and store it as a `data:` URL.
    ///
    /// # Errors
    ///
    /// - `EncodingFailed` if the image cannot be encoded
    /// - `StorageQuotaExceeded` or `Storage` if the write fails
    #[tracing::instrument(skip_all, fields(key = %self.image_key))]
    pub fn save_image(
        &self,
        kv: &mut dyn KeyValueStore,
        image: &DecodedImage,
    ) -> Result<(), EditorError> {
        let bytes = encode_image(image, self.format, self.quality)?;
        let url = encode_data_url(&bytes, self.format);
        tracing::debug!(bytes = bytes.len(), chars = url.len(), "Saving image");
        write(kv, &self.image_key, &url)
    }

    pub fn save_filters(
        &self,
        kv: &mut dyn KeyValueStore,
        params: &FilterParameters,
    ) -> Result<(), EditorError> {
        save_json(kv, &self.filters_key, params)
    }

    pub fn save_transforms(
        &self,
        kv: &mut dyn KeyValueStore,
        state: &TransformState,
    ) -> Result<(), EditorError> {
        save_json(kv, &self.transforms_key, state)
    }

    pub fn save_comparison(
        &self,
        kv: &mut dyn KeyValueStore,
        state: &ComparisonState,
    ) -> Result<(), EditorError> {
        save_json(kv, &self.comparison_key, state)
    }

    // ===== Load =====

    /// Stored image bytes, ready for [`ImageStore::load`](crate::ImageStore::load).
    ///
    /// # Errors
    ///
    /// - `Storage` if the backend cannot be read
    /// - `CorruptState` if the value is not a base64 `data:` URL
    pub fn try_load_image(&self, kv: &dyn KeyValueStore) -> Result<Option<Vec<u8>>, EditorError> {
        let Some(url) = read(kv, &self.image_key)? else {
            return Ok(None);
        };
        let (mime, bytes) = decode_data_url(&url).map_err(|e| EditorError::CorruptState {
            key: self.image_key.clone(),
            reason: e.to_string(),
        })?;
        tracing::debug!(%mime, bytes = bytes.len(), "Loaded saved image");
        Ok(Some(bytes))
    }

    pub fn try_load_filters(
        &self,
        kv: &dyn KeyValueStore,
    ) -> Result<Option<FilterParameters>, EditorError> {
        let params: Option<FilterParameters> = load_json(kv, &self.filters_key)?;
        Ok(params.map(FilterParameters::sanitized))
    }

    pub fn try_load_transforms(
        &self,
        kv: &dyn KeyValueStore,
    ) -> Result<Option<TransformState>, EditorError> {
        let state: Option<TransformState> = load_json(kv, &self.transforms_key)?;
        Ok(state.map(TransformState::normalized))
    }

    pub fn try_load_comparison(
        &self,
        kv: &dyn KeyValueStore,
    ) -> Result<Option<ComparisonState>, EditorError> {
        let state: Option<ComparisonState> = load_json(kv, &self.comparison_key)?;
        Ok(state.map(ComparisonState::sanitized))
    }

    /// Like [`try_load_image`](Self::try_load_image), with failures logged and dropped.
    pub fn load_image(&self, kv: &dyn KeyValueStore) -> Option<Vec<u8>> {
        lenient(self.try_load_image(kv))
    }

    pub fn load_filters(&self, kv: &dyn KeyValueStore) -> Option<FilterParameters> {
        lenient(self.try_load_filters(kv))
    }

    pub fn load_transforms(&self, kv: &dyn KeyValueStore) -> Option<TransformState> {
        lenient(self.try_load_transforms(kv))
    }

    pub fn load_comparison(&self, kv: &dyn KeyValueStore) -> Option<ComparisonState> {
        lenient(self.try_load_comparison(kv))
    }

    /// Remove every key, attempting all of them.
    ///
    /// # Errors
    ///
    /// The first removal failure, after the remaining keys were tried.
    pub fn clear(&self, kv: &mut dyn KeyValueStore) -> Result<(), EditorError> {
        let mut first_error = None;
        for key in self.keys() {
            if let Err(e) = kv.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove saved state");
                if first_error.is_none() {
                    first_error = Some(EditorError::from_storage(key, e));
                }
            }
        }
        tracing::debug!("Saved state cleared");
        first_error.map_or(Ok(()), Err)
    }
}

fn write(kv: &mut dyn KeyValueStore, key: &str, value: &str) -> Result<(), EditorError> {
    kv.set(key, value).map_err(|e| {
        tracing::warn!(key, error = %e, "Failed to save state");
        EditorError::from_storage(key, e)
    })
}

fn read(kv: &dyn KeyValueStore, key: &str) -> Result<Option<String>, EditorError> {
    kv.get(key).map_err(|e| EditorError::from_storage(key, e))
}

fn save_json<T: Serialize>(
    kv: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), EditorError> {
    let json = serde_json::to_string(value).map_err(|e| EditorError::Storage(e.to_string()))?;
    tracing::debug!(key, %json, "Saving state");
    write(kv, key, &json)
}

fn load_json<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, EditorError> {
    let Some(json) = read(kv, key)? else {
        return Ok(None);
    };
    serde_json::from_str(&json)
        .map(Some)
        .map_err(|e| EditorError::CorruptState {
            key: key.to_string(),
            reason: e.to_string(),
        })
}

fn lenient<T>(result: Result<Option<T>, EditorError>) -> Option<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring saved state");
        None
    })
}
