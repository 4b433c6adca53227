//! Editor-wide error type.
//!
//! Module-level errors (`DecodeError`, `EncodeError`, `StorageError`) convert
//! into [`EditorError`] with `?`. Every operation that returns an error
//! leaves the session in its last valid state.

use thiserror::Error;

use crate::decode::DecodeError;
use crate::encode::EncodeError;
use crate::persist::StorageError;

/// Coarse classification used by callers to decide how to surface a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad user input: non-image file, empty crop, unknown filter name.
    InvalidInput,
    DecodeFailure,
    EncodingFailed,
    /// Persistence hit the storage quota. The session is unaffected.
    StorageQuotaExceeded,
    /// An operation that needs a loaded image (or active crop) was called without one.
    PreconditionNotMet,
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Invalid image: {0}")]
    InvalidFormat(String),

    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Invalid value {value} for filter {name}")]
    InvalidFilterValue { name: &'static str, value: f64 },

    #[error("Invalid crop region {width}x{height}")]
    InvalidCropRegion { width: f64, height: f64 },

    #[error("Invalid aspect ratio: {0}")]
    InvalidAspectRatio(f64),

    #[error("No crop selection is active")]
    CropNotActive,

    #[error("Failed to decode image: {0}")]
    DecodeFailure(String),

    #[error("Failed to encode image: {0}")]
    EncodingFailed(#[from] EncodeError),

    #[error("Storage quota exceeded while saving {0}")]
    StorageQuotaExceeded(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupt saved state under {key}: {reason}")]
    CorruptState { key: String, reason: String },

    #[error("No image loaded")]
    NoImage,

    #[error("Load superseded by a newer request")]
    StaleLoad,
}

impl EditorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EditorError::InvalidFormat(_)
            | EditorError::UnknownFilter(_)
            | EditorError::InvalidFilterValue { .. }
            | EditorError::InvalidCropRegion { .. }
            | EditorError::InvalidAspectRatio(_)
            | EditorError::CorruptState { .. } => ErrorKind::InvalidInput,
            EditorError::DecodeFailure(_) => ErrorKind::DecodeFailure,
            EditorError::EncodingFailed(_) => ErrorKind::EncodingFailed,
            EditorError::StorageQuotaExceeded(_) | EditorError::Storage(_) => {
                ErrorKind::StorageQuotaExceeded
            }
            EditorError::NoImage | EditorError::CropNotActive | EditorError::StaleLoad => {
                ErrorKind::PreconditionNotMet
            }
        }
    }

    /// Whether the failure should be reported as a no-op rather than a fault.
    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::PreconditionNotMet
    }
}

impl From<DecodeError> for EditorError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::InvalidFormat
            | DecodeError::EmptyInput
            | DecodeError::BufferMismatch { .. } => {
                EditorError::InvalidFormat(err.to_string())
            }
            DecodeError::CorruptedFile(_) | DecodeError::InvalidDimensions { .. } => {
                EditorError::DecodeFailure(err.to_string())
            }
        }
    }
}

impl EditorError {
    /// Attach the storage key being written to a storage failure.
    pub fn from_storage(key: &str, err: StorageError) -> Self {
        match err {
            StorageError::QuotaExceeded => EditorError::StorageQuotaExceeded(key.to_string()),
            StorageError::Unavailable(reason) => EditorError::Storage(reason),
        }
    }
}
