//! Encoding detection and conversion utilities
//!
//! URL lists are hand-edited on several platforms, so text is decoded with a
//! short fallback chain instead of assuming UTF-8.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252, WINDOWS_1258};
use tracing::debug;

/// Decode raw file contents into text.
///
/// A UTF-8 BOM is stripped. Invalid UTF-8 is retried as Windows-1258 and then
/// Windows-1252; lossy UTF-8 is the last resort.
pub fn decode_text(data: &[u8]) -> (String, &'static Encoding) {
    let data = data.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(data);

    if let Ok(text) = std::str::from_utf8(data) {
        return (text.to_string(), UTF_8);
    }

    for encoding in [WINDOWS_1258, WINDOWS_1252] {
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(data) {
            debug!("Decoded text as {}", encoding.name());
            return (text.into_owned(), encoding);
        }
    }

    (String::from_utf8_lossy(data).into_owned(), UTF_8)
}
