//! Export container formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Containers the editor can export to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossless; quality is ignored.
    Png,
    /// Lossy; quality in [0, 1].
    #[default]
    Jpeg,
    /// Lossy; quality in [0, 1].
    #[serde(rename = "webp")]
    WebP,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Png, ExportFormat::Jpeg, ExportFormat::WebP];

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::WebP => "image/webp",
        }
    }

    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::WebP => "webp",
        }
    }

    /// Short name used in configuration and by the host UI.
    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::WebP => "webp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG (lossless)",
            ExportFormat::Jpeg => "JPEG (compressed)",
            ExportFormat::WebP => "WebP (modern)",
        }
    }

    /// Whether the quality argument changes the encoded output.
    pub fn supports_quality(self) -> bool {
        matches!(self, ExportFormat::Jpeg | ExportFormat::WebP)
    }

    pub fn default_quality(self) -> f32 {
        match self {
            ExportFormat::Png => 1.0,
            ExportFormat::Jpeg | ExportFormat::WebP => 0.9,
        }
    }

    /// Parse a format name or MIME type, falling back to JPEG.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            tracing::warn!(format = value, "Unsupported export format, using jpeg");
            ExportFormat::default()
        })
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no known export format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported export format: {0}")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let name = normalized.strip_prefix("image/").unwrap_or(&normalized);
        match name {
            "png" => Ok(ExportFormat::Png),
            "jpeg" | "jpg" => Ok(ExportFormat::Jpeg),
            "webp" => Ok(ExportFormat::WebP),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names_and_mime_types() {
        assert_eq!("png".parse::<ExportFormat>(), Ok(ExportFormat::Png));
        assert_eq!("JPG".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert_eq!("image/webp".parse::<ExportFormat>(), Ok(ExportFormat::WebP));
        assert!("gif".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_unknown_falls_back_to_jpeg() {
        assert_eq!(ExportFormat::parse_or_default("tiff"), ExportFormat::Jpeg);
    }

    #[test]
    fn test_format_info() {
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::Png.default_quality(), 1.0);
        assert!(!ExportFormat::Png.supports_quality());
        assert!(ExportFormat::Jpeg.supports_quality());
        assert!(ExportFormat::WebP.supports_quality());
        assert_eq!(ExportFormat::WebP.mime_type(), "image/webp");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&ExportFormat::WebP).unwrap(), "\"webp\"");
        let f: ExportFormat = serde_json::from_str("\"png\"").unwrap();
        assert_eq!(f, ExportFormat::Png);
    }
}
