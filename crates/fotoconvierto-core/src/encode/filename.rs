//! Download filename helpers.

use chrono::NaiveDateTime;

use super::ExportFormat;

/// Longest sanitized filename, in characters.
pub const MAX_FILENAME_CHARS: usize = 200;

/// Name used when sanitizing leaves nothing.
pub const FALLBACK_FILENAME: &str = "imagen";

fn is_forbidden(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || ('\0'..='\x1F').contains(&c)
}

/// Make a user-supplied name safe to use as a download filename.
///
/// Forbidden and control characters are removed, whitespace runs become a
/// single `-`, dot runs become a single `.`, and leading or trailing dots
/// are trimmed, so no path traversal survives. The result is truncated to
/// 200 characters; an empty result becomes `fallback`.
pub fn sanitize_filename_or(name: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_space = false;
    for c in name.chars().filter(|&c| !is_forbidden(c)) {
        if c.is_whitespace() {
            if !in_space {
                out.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if c == '.' && out.ends_with('.') {
            continue;
        }
        out.push(c);
    }

    let trimmed: String = out
        .trim_matches('.')
        .chars()
        .take(MAX_FILENAME_CHARS)
        .collect();

    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed
    }
}

/// [`sanitize_filename_or`] with the default fallback name.
pub fn sanitize_filename(name: &str) -> String {
    sanitize_filename_or(name, FALLBACK_FILENAME)
}

/// Sanitized name plus the format's extension.
pub fn export_filename(name: &str, format: ExportFormat) -> String {
    format!("{}.{}", sanitize_filename(name), format.extension())
}

/// Timestamped default name, e.g. `fotoconvierto-20240131-094512`.
pub fn default_filename(now: NaiveDateTime) -> String {
    format!("fotoconvierto-{}", now.format("%Y%m%d-%H%M%S"))
}

/// Human-readable size in 1024-based units with at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;

    format!("{} {}", rounded, UNITS[exponent])
}
