//! Forwards `tracing` events to the browser console.

use std::fmt::{self, Write as _};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Destination for formatted log lines.
pub trait ConsoleSink: Send + Sync + 'static {
    fn write(&self, level: Level, line: &str);
}

/// `console.error` / `warn` / `info` / `log` / `debug`, by level.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserConsole;

impl ConsoleSink for BrowserConsole {
    fn write(&self, level: Level, line: &str) {
        let line = wasm_bindgen::JsValue::from_str(line);
        match level {
            Level::ERROR => web_sys::console::error_1(&line),
            Level::WARN => web_sys::console::warn_1(&line),
            Level::INFO => web_sys::console::info_1(&line),
            Level::DEBUG => web_sys::console::log_1(&line),
            Level::TRACE => web_sys::console::debug_1(&line),
        }
    }
}

/// A `tracing-subscriber` layer writing one line per event.
///
/// Lines look like `INFO fotoconvierto_core::store: Image loaded width=800 height=400`.
#[derive(Debug)]
pub struct ConsoleLayer<W = BrowserConsole> {
    sink: W,
    max_level: Level,
}

impl ConsoleLayer<BrowserConsole> {
    pub fn new(max_level: Level) -> Self {
        Self::with_sink(BrowserConsole, max_level)
    }
}

impl<W: ConsoleSink> ConsoleLayer<W> {
    pub fn with_sink(sink: W, max_level: Level) -> Self {
        Self { sink, max_level }
    }
}

impl<S, W> Layer<S> for ConsoleLayer<W>
where
    S: Subscriber,
    W: ConsoleSink,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() > self.max_level {
            return;
        }

        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);
        let line = format!("{} {}: {}", meta.level(), meta.target(), visitor.finish());
        self.sink.write(*meta.level(), &line);
    }
}

/// Collects the message and the remaining fields as `key=value`.
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl LineVisitor {
    fn finish(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else {
            format!("{}{}", self.message, self.fields)
        }
    }
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
