//! FotoConvierto WASM - WebAssembly bindings for the FotoConvierto editor
//!
//! This crate exposes the fotoconvierto-core editor session to
//! JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `session` - The editor session: loading, filters, transforms, crop, comparison, export
//! - `storage` - `localStorage` persistence backend
//! - `export` - Format metadata, filenames and file sizes
//! - `types` - WASM-compatible wrapper types for image data
//! - `logging` - `tracing` output routed to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsEditorSession, LocalStorageStore } from '@fotoconvierto/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const session = new JsEditorSession();
//! const storage = new LocalStorageStore();
//! session.restore(storage);
//!
//! session.load(new Uint8Array(await file.arrayBuffer()));
//! session.rotate_clockwise();
//! session.save(storage);
//! ```

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use wasm_bindgen::prelude::*;

mod export;
mod logging;
mod session;
mod storage;
mod types;

// Re-export public types
pub use export::{
    default_filename, export_filename, format_file_size, format_info, sanitize_filename,
    supported_formats,
};
pub use logging::{BrowserConsole, ConsoleLayer, ConsoleSink};
pub use session::{canvas_point, JsEditorSession};
pub use storage::LocalStorageStore;
pub use types::{JsDecodedImage, JsLoadTicket};

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    let subscriber = tracing_subscriber::registry().with(ConsoleLayer::new(Level::DEBUG));
    // Already set when the module is instantiated twice.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Whether a file picker MIME type should be offered to `load`.
#[wasm_bindgen]
pub fn is_supported_image_type(mime: &str) -> bool {
    fotoconvierto_core::decode::is_image_mime(mime)
}
