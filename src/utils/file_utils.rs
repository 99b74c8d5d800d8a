//! File system utilities

use std::fs;
use std::path::Path;

use crate::core::models::AppResult;

/// Ensure directory exists
pub fn ensure_dir_exists(path: &Path) -> AppResult<()> {
    if !path.is_dir() {
        fs::create_dir_all(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to create directory {}: {}", path.display(), e),
            )
        })?;
    }
    Ok(())
}

/// Sanitize a title for use as a file name.
///
/// Reserved characters become spaces, runs of whitespace collapse to one
/// space, and leading/trailing dots and spaces are dropped.
pub fn sanitize_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' => ' ',
            '/' | '\\' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();

    replaced
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '.' || c == ' ')
        .to_string()
}

/// Truncate to at most `max_bytes` bytes without splitting a character
pub fn truncate_to_bytes(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
