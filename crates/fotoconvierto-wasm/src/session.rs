//! `EditorSession` bindings.
//!
//! Error convention: operations that need a loaded image (or an active
//! crop) return `false` when called without one, and stale loads return
//! `false` too. Persistence failures are logged and return `false`. Every
//! other failure throws an `Error` whose message is the error's display text.
//!
//! # Example
//!
//! ```typescript
//! const session = new JsEditorSession({ maxWidth: 1024 });
//! session.load(new Uint8Array(await file.arrayBuffer()));
//! session.update_filter('brightness', 120);
//! const frame = session.display();
//! ctx.putImageData(new ImageData(new Uint8ClampedArray(frame.rgba()), frame.width), 0, 0);
//! ```

use fotoconvierto_core::crop::{AspectPreset, CanvasMapping, Point};
use fotoconvierto_core::{EditorConfig, EditorError, EditorSession, ExportFormat};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::export::now_local;
use crate::storage::LocalStorageStore;
use crate::types::{JsDecodedImage, JsLoadTicket};

fn js_error(err: &EditorError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn serialize<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// `true` on success, `false` for an unmet precondition, thrown otherwise.
fn done(result: Result<(), EditorError>) -> Result<bool, JsValue> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_precondition() => Ok(false),
        Err(e) => Err(js_error(&e)),
    }
}

/// Persistence failures are warnings: `false`, never a thrown error.
fn persisted(operation: &'static str, result: Result<(), EditorError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(operation, kind = ?e.kind(), error = %e, "Persistence failed");
            false
        }
    }
}

/// The serialized value on success, `false` for an unmet precondition.
fn value<T: Serialize>(result: Result<T, EditorError>) -> Result<JsValue, JsValue> {
    match result {
        Ok(v) => serialize(&v),
        Err(e) if e.is_precondition() => Ok(JsValue::FALSE),
        Err(e) => Err(js_error(&e)),
    }
}

/// An editor session for one canvas.
#[wasm_bindgen]
pub struct JsEditorSession {
    inner: EditorSession,
}

#[wasm_bindgen]
impl JsEditorSession {
    /// Create a session. `config` is an optional partial `EditorConfig`
    /// object with camelCase fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditorSession, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?
        };
        Ok(Self {
            inner: EditorSession::new(config),
        })
    }

    // ===== Image =====

    pub fn begin_load(&mut self) -> JsLoadTicket {
        JsLoadTicket::new(self.inner.begin_load())
    }

    /// Finish a load; `false` when a newer load superseded it.
    pub fn complete_load(&mut self, ticket: &JsLoadTicket, bytes: &[u8]) -> Result<bool, JsValue> {
        done(self.inner.complete_load(ticket.inner(), bytes).map(|_| ()))
    }

    pub fn load(&mut self, bytes: &[u8]) -> Result<bool, JsValue> {
        done(self.inner.load(bytes).map(|_| ()))
    }

    /// Load RGB pixels that were decoded elsewhere.
    pub fn load_image(&mut self, image: &JsDecodedImage) -> Result<bool, JsValue> {
        done(self.inner.load_decoded(image.to_decoded()).map(|_| ()))
    }

    pub fn has_image(&self) -> bool {
        self.inner.has_image()
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.dimensions().0
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.dimensions().1
    }

    /// The render to draw, or `undefined` without an image.
    pub fn display(&self) -> Option<JsDecodedImage> {
        self.inner.display().cloned().map(JsDecodedImage::from_decoded)
    }

    /// Drop the image and every edit.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    // ===== Filters =====

    pub fn filters(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.filters())
    }

    pub fn has_active_filters(&self) -> bool {
        self.inner.has_active_filters()
    }

    pub fn filter_string(&self) -> String {
        self.inner.filter_string()
    }

    /// Set one filter by name; returns the new parameters.
    pub fn update_filter(&mut self, name: &str, value: f64) -> Result<JsValue, JsValue> {
        let params = self
            .inner
            .update_filter(name, value)
            .map_err(|e| js_error(&e))?;
        serialize(&params)
    }

    /// Merge a partial `{brightness, contrast, ...}` object.
    pub fn set_filters(&mut self, patch: JsValue) -> Result<JsValue, JsValue> {
        let patch = serde_wasm_bindgen::from_value(patch)
            .map_err(|e| JsValue::from_str(&format!("Invalid filters: {}", e)))?;
        let params = self.inner.set_filters(patch).map_err(|e| js_error(&e))?;
        serialize(&params)
    }

    pub fn reset_filters(&mut self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.reset_filters())
    }

    // ===== Transforms =====

    pub fn rotate_clockwise(&mut self) -> Result<bool, JsValue> {
        done(self.inner.rotate_clockwise())
    }

    pub fn rotate_counter_clockwise(&mut self) -> Result<bool, JsValue> {
        done(self.inner.rotate_counter_clockwise())
    }

    pub fn flip_horizontal(&mut self) -> Result<bool, JsValue> {
        done(self.inner.flip_horizontal())
    }

    pub fn flip_vertical(&mut self) -> Result<bool, JsValue> {
        done(self.inner.flip_vertical())
    }

    pub fn transform_state(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.transform_state())
    }

    pub fn reset_transforms(&mut self) {
        self.inner.reset_transforms();
    }

    // ===== Crop =====

    /// Enter crop mode; returns the initial rect.
    pub fn start_crop(&mut self) -> Result<JsValue, JsValue> {
        value(self.inner.start_crop())
    }

    /// Press at backing-pixel `(x, y)`; returns the CSS cursor.
    pub fn crop_pointer_down(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        value(
            self.inner
                .crop_pointer_down(Point::new(x, y))
                .map(|c| c.as_css()),
        )
    }

    pub fn crop_pointer_move(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        value(
            self.inner
                .crop_pointer_move(Point::new(x, y))
                .map(|c| c.as_css()),
        )
    }

    pub fn crop_pointer_up(&mut self) {
        self.inner.crop_pointer_up();
    }

    pub fn crop_cursor_at(&self, x: f64, y: f64) -> String {
        self.inner.crop_cursor_at(Point::new(x, y)).to_string()
    }

    /// Lock to `width / height = ratio`, or free with `undefined`.
    pub fn set_crop_aspect_ratio(&mut self, ratio: Option<f64>) -> Result<(), JsValue> {
        self.inner
            .set_crop_aspect_ratio(ratio)
            .map_err(|e| js_error(&e))
    }

    /// `free`, `1:1`, `4:3`, `3:2` or `16:9`.
    pub fn set_crop_preset(&mut self, preset: &str) -> Result<(), JsValue> {
        let preset: AspectPreset = preset.parse().map_err(|e| js_error(&e))?;
        self.inner.set_crop_preset(preset).map_err(|e| js_error(&e))
    }

    /// Crop to the selection; returns the committed region.
    pub fn commit_crop(&mut self) -> Result<JsValue, JsValue> {
        value(self.inner.commit_crop())
    }

    pub fn cancel_crop(&mut self) -> String {
        self.inner.cancel_crop().to_string()
    }

    pub fn is_cropping(&self) -> bool {
        self.inner.is_cropping()
    }

    /// Overlay geometry, or `null` outside crop mode.
    pub fn crop_overlay(&self) -> Result<JsValue, JsValue> {
        match self.inner.crop_overlay() {
            Some(overlay) => serialize(&overlay),
            None => Ok(JsValue::NULL),
        }
    }

    // ===== Comparison =====

    /// Returns whether comparison is now active.
    pub fn toggle_comparison(&mut self) -> Result<bool, JsValue> {
        match self.inner.toggle_comparison() {
            Ok(active) => Ok(active),
            Err(e) if e.is_precondition() => Ok(false),
            Err(e) => Err(js_error(&e)),
        }
    }

    /// Show the split view; returns the column layout.
    pub fn enter_split(&mut self, position: f64) -> Result<JsValue, JsValue> {
        value(self.inner.enter_split(position))
    }

    /// Returns the clamped position.
    pub fn update_split_position(&mut self, position: f64) -> Result<JsValue, JsValue> {
        value(self.inner.update_split_position(position))
    }

    pub fn exit_split(&mut self) -> Result<bool, JsValue> {
        done(self.inner.exit_split())
    }

    pub fn reset_comparison(&mut self) -> Result<bool, JsValue> {
        done(self.inner.reset_comparison())
    }

    pub fn comparison_state(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.comparison_state())
    }

    pub fn split_layout(&self) -> Result<JsValue, JsValue> {
        serialize(&self.inner.split_layout())
    }

    // ===== Export =====

    /// Encoded bytes of the edited image, or `false` without an image.
    ///
    /// `quality` defaults to the format's default quality.
    pub fn export(&mut self, format: &str, quality: Option<f32>) -> Result<JsValue, JsValue> {
        let format = ExportFormat::parse_or_default(format);
        let quality = quality.unwrap_or_else(|| format.default_quality());
        match self.inner.export(format, quality) {
            Ok(bytes) => Ok(js_sys::Uint8Array::from(bytes.as_slice()).into()),
            Err(e) if e.is_precondition() => Ok(JsValue::FALSE),
            Err(e) => Err(js_error(&e)),
        }
    }

    pub fn approximate_size(&mut self, format: &str, quality: Option<f32>) -> Result<JsValue, JsValue> {
        let format = ExportFormat::parse_or_default(format);
        let quality = quality.unwrap_or_else(|| format.default_quality());
        value(self.inner.approximate_size(format, quality))
    }

    /// Download name for `name` (or a timestamped default) in `format`.
    pub fn export_filename(&self, name: Option<String>, format: &str) -> String {
        self.inner.export_filename(
            name.as_deref(),
            ExportFormat::parse_or_default(format),
            now_local(),
        )
    }

    // ===== Persistence =====

    /// Best-effort save; `false` (with a console warning) when anything
    /// could not be written. The session is never affected.
    pub fn save(&self, storage: &mut LocalStorageStore) -> bool {
        persisted("save", self.inner.save(storage))
    }

    /// Returns whether an image was restored.
    pub fn restore(&mut self, storage: &LocalStorageStore) -> bool {
        self.inner.restore(storage)
    }

    pub fn clear_saved(&self, storage: &mut LocalStorageStore) -> bool {
        persisted("clear_saved", self.inner.clear_saved(storage))
    }
}

/// Convert a pointer event's client position to canvas backing pixels.
///
/// `mapping` is `{backingWidth, backingHeight, displayLeft, displayTop,
/// displayWidth, displayHeight}`.
#[wasm_bindgen]
pub fn canvas_point(mapping: JsValue, client_x: f64, client_y: f64) -> Result<JsValue, JsValue> {
    let mapping: CanvasMapping = serde_wasm_bindgen::from_value(mapping)
        .map_err(|e| JsValue::from_str(&format!("Invalid canvas mapping: {}", e)))?;
    serialize(&mapping.to_backing(client_x, client_y))
}
