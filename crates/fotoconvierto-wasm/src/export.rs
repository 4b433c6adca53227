//! Export helpers: formats, filenames and sizes.
//!
//! # Example
//!
//! ```typescript
//! import { export_filename, format_file_size, format_info } from '@fotoconvierto/wasm';
//!
//! const bytes = session.export('webp', 0.9);
//! const name = export_filename('mi foto', 'webp'); // "mi-foto.webp"
//! console.log(format_file_size(bytes.byteLength));  // "12.34 KB"
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use fotoconvierto_core::encode::{self, ExportFormat};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Format metadata handed to the UI.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormatInfo {
    name: &'static str,
    mime_type: &'static str,
    extension: &'static str,
    label: &'static str,
    supports_quality: bool,
    default_quality: f32,
}

impl From<ExportFormat> for FormatInfo {
    fn from(format: ExportFormat) -> Self {
        Self {
            name: format.name(),
            mime_type: format.mime_type(),
            extension: format.extension(),
            label: format.label(),
            supports_quality: format.supports_quality(),
            default_quality: format.default_quality(),
        }
    }
}

/// Local wall-clock time from `Date`.
pub(crate) fn now_local() -> NaiveDateTime {
    let date = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        date.get_full_year() as i32,
        date.get_month() + 1,
        date.get_date(),
    )
    .and_then(|day| day.and_hms_opt(date.get_hours(), date.get_minutes(), date.get_seconds()))
    .unwrap_or_default()
}

/// Metadata for one format; unknown names fall back to JPEG.
#[wasm_bindgen]
pub fn format_info(format: &str) -> Result<JsValue, JsValue> {
    let info = FormatInfo::from(ExportFormat::parse_or_default(format));
    serde_wasm_bindgen::to_value(&info).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Metadata for every supported format.
#[wasm_bindgen]
pub fn supported_formats() -> Result<JsValue, JsValue> {
    let all: Vec<FormatInfo> = ExportFormat::ALL.into_iter().map(FormatInfo::from).collect();
    serde_wasm_bindgen::to_value(&all).map_err(|e| JsValue::from_str(&e.to_string()))
}

#[wasm_bindgen]
pub fn sanitize_filename(name: &str) -> String {
    encode::sanitize_filename(name)
}

/// Sanitized name plus the extension of `format`.
#[wasm_bindgen]
pub fn export_filename(name: &str, format: &str) -> String {
    encode::export_filename(name, ExportFormat::parse_or_default(format))
}

/// `fotoconvierto-YYYYMMDD-HHMMSS` for the current local time.
#[wasm_bindgen]
pub fn default_filename() -> String {
    encode::default_filename(now_local())
}

/// Human-readable size, e.g. `"2.5 MB"`.
#[wasm_bindgen]
pub fn format_file_size(bytes: f64) -> String {
    let bytes = if bytes.is_finite() && bytes > 0.0 {
        bytes as u64
    } else {
        0
    };
    encode::format_file_size(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_info_fields() {
        let info = FormatInfo::from(ExportFormat::Png);
        assert_eq!(info.mime_type, "image/png");
        assert!(!info.supports_quality);
        assert_eq!(info.default_quality, 1.0);
    }

    #[test]
    fn test_export_filename_parses_format() {
        assert_eq!(export_filename("../secret:name??", "png"), "secretname.png");
        assert_eq!(export_filename("foto", "bogus"), "foto.jpg");
    }

    #[test]
    fn test_format_file_size_rejects_negative() {
        assert_eq!(format_file_size(-5.0), "0 Bytes");
        assert_eq!(format_file_size(f64::NAN), "0 Bytes");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_default_filename_shape() {
        let name = default_filename();
        assert!(name.starts_with("fotoconvierto-"));
        assert_eq!(name.len(), "fotoconvierto-20240101-000000".len());
    }

    #[wasm_bindgen_test]
    fn test_supported_formats_is_array() {
        let formats = supported_formats().unwrap();
        assert!(js_sys::Array::is_array(&formats));
        assert_eq!(js_sys::Array::from(&formats).length(), 3);
    }
}
