//! URL list persistence
//!
//! A URL list is a plain text file with one video link per line
//! (conventionally `url_yt.txt`). Loading trims every line, drops blank and
//! comment lines, and removes duplicates while keeping the first occurrence.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::models::{AppError, AppResult, UrlEntry};
use crate::utils::encoding::decode_text;

/// Conventional URL list file name
pub const DEFAULT_URL_FILE_NAME: &str = "url_yt.txt";

/// Result of merging freshly collected URLs into an existing list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MergeOutcome {
    pub url_file: PathBuf,
    /// URLs that were not already present and were placed on top
    pub added: usize,
    /// Lines kept from the previous file
    pub kept: usize,
    pub backup: Option<PathBuf>,
}

pub struct UrlStore;

impl UrlStore {
    /// Load the ordered, de-duplicated entries of a URL list
    pub fn load(path: &Path) -> AppResult<Vec<UrlEntry>> {
        let text = read_text(path)?;
        let entries = Self::parse(&text);

        debug!("Loaded {} URL(s) from {}", entries.len(), path.display());
        Ok(entries)
    }

    /// Parse URL list text
    pub fn parse(text: &str) -> Vec<UrlEntry> {
        let mut seen = HashSet::new();
        text.lines()
            .filter(|line| !is_comment(line.trim()))
            .filter_map(UrlEntry::new)
            .filter(|entry| seen.insert(entry.clone()))
            .collect()
    }

    /// Write entries one per line, creating parent directories
    pub fn save(path: &Path, entries: &[UrlEntry]) -> AppResult<()> {
        write_lines(path, entries.iter().map(UrlEntry::as_str))?;
        debug!("Saved {} URL(s) to {}", entries.len(), path.display());
        Ok(())
    }

    /// Place URLs that are not yet listed on top of the existing file.
    ///
    /// Every non-blank line of the existing file, comments and repeats
    /// included, is kept verbatim below the new URLs. An existing file is
    /// backed up first as `<stem>_<YYYYmmdd_HHMMSS>.bak.<ext>` next to the
    /// original.
    pub fn merge_prepend(path: &Path, fetched: &[UrlEntry]) -> AppResult<MergeOutcome> {
        let existed = path.is_file();
        let text = if existed {
            read_text(path)?
        } else {
            String::new()
        };
        let kept_lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let known: HashSet<UrlEntry> = Self::parse(&text).into_iter().collect();
        let mut seen = HashSet::new();
        let new_entries: Vec<&UrlEntry> = fetched
            .iter()
            .filter(|entry| !known.contains(*entry) && seen.insert(*entry))
            .collect();

        let backup = if existed {
            Some(Self::backup(path)?)
        } else {
            None
        };

        write_lines(
            path,
            new_entries
                .iter()
                .copied()
                .map(UrlEntry::as_str)
                .chain(kept_lines.iter().copied()),
        )?;

        info!(
            "📝 {}: {} new URL(s) prepended, {} line(s) kept",
            path.display(),
            new_entries.len(),
            kept_lines.len()
        );

        Ok(MergeOutcome {
            url_file: path.to_path_buf(),
            added: new_entries.len(),
            kept: kept_lines.len(),
            backup,
        })
    }

    /// Copy the file to a timestamped backup next to it
    pub fn backup(path: &Path) -> AppResult<PathBuf> {
        let backup_path = backup_path_for(path, chrono::Local::now().naive_local());
        fs::copy(path, &backup_path)?;
        info!("🗂️ Backup created: {}", backup_path.display());
        Ok(backup_path)
    }
}

fn read_text(path: &Path) -> AppResult<String> {
    let bytes = fs::read(path).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("Cannot read URL list {}: {}", path.display(), e),
        ))
    })?;
    let (text, encoding) = decode_text(&bytes);
    debug!("Decoded {} as {}", path.display(), encoding.name());
    Ok(text)
}

fn write_lines<'a>(path: &Path, lines: impl Iterator<Item = &'a str>) -> AppResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#')
        || line.starts_with("//")
        || line
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("rem "))
}

fn backup_path_for(path: &Path, at: chrono::NaiveDateTime) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "urls".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "txt".to_string());
    let name = format!("{}_{}.bak.{}", stem, at.format("%Y%m%d_%H%M%S"), ext);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn entries(items: &[&str]) -> Vec<UrlEntry> {
        items.iter().filter_map(|s| UrlEntry::new(s)).collect()
    }

    #[test]
    fn test_parse_dedup_preserves_first_occurrence() {
        let parsed = UrlStore::parse("vid1\nvid1\nvid2\n");
        assert_eq!(parsed, entries(&["vid1", "vid2"]));
    }

    #[test]
    fn test_parse_drops_blank_lines_and_comments() {
        let text = "\n  \nhttps://youtu.be/a\n# note\n\t\n// old\nREM legacy\n\
                    \x20 https://youtu.be/b  \r\nhttps://youtu.be/a\n";
        let parsed = UrlStore::parse(text);
        assert_eq!(parsed, entries(&["https://youtu.be/a", "https://youtu.be/b"]));
    }

    #[test]
    fn test_parse_count_never_exceeds_line_count() {
        let text = "a\n\nb\na\n   \nc\nb\n";
        let parsed = UrlStore::parse(text);
        assert!(parsed.len() <= text.lines().count());
        assert_eq!(parsed, entries(&["a", "b", "c"]));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let result = UrlStore::load(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(AppError::Io(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(DEFAULT_URL_FILE_NAME);
        let urls = entries(&["https://youtu.be/a", "https://youtu.be/b"]);

        UrlStore::save(&path, &urls).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "https://youtu.be/a\nhttps://youtu.be/b\n"
        );
        assert_eq!(UrlStore::load(&path).unwrap(), urls);
    }

    #[test]
    fn test_merge_prepend_into_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_URL_FILE_NAME);

        let outcome = UrlStore::merge_prepend(&path, &entries(&["a", "b", "a"])).unwrap();
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.kept, 0);
        assert!(outcome.backup.is_none());
        assert_eq!(UrlStore::load(&path).unwrap(), entries(&["a", "b"]));
    }

    #[test]
    fn test_merge_prepend_puts_new_urls_on_top_and_backs_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_URL_FILE_NAME);
        fs::write(&path, "old1\nold2\n").unwrap();

        let outcome = UrlStore::merge_prepend(&path, &entries(&["new1", "old2", "new2"])).unwrap();
        assert_eq!(outcome.added, 2);
        assert_eq!(outcome.kept, 2);

        let backup = outcome.backup.expect("backup expected");
        assert_eq!(fs::read_to_string(&backup).unwrap(), "old1\nold2\n");
        assert_eq!(
            UrlStore::load(&path).unwrap(),
            entries(&["new1", "new2", "old1", "old2"])
        );
    }

    #[test]
    fn test_merge_prepend_keeps_comment_and_repeated_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(DEFAULT_URL_FILE_NAME);
        fs::write(
            &path,
            "# Course A\nhttps://y/1\n\n// paused\nhttps://y/2\n  https://y/1\n",
        )
        .unwrap();

        let outcome =
            UrlStore::merge_prepend(&path, &entries(&["https://y/3", "https://y/1"])).unwrap();
        assert_eq!(outcome.added, 1);
        assert_eq!(outcome.kept, 5);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "https://y/3\n# Course A\nhttps://y/1\n// paused\nhttps://y/2\nhttps://y/1\n"
        );
        assert_eq!(
            UrlStore::load(&path).unwrap(),
            entries(&["https://y/3", "https://y/1", "https://y/2"])
        );
    }

    #[test]
    fn test_backup_path_naming() {
        let at = NaiveDate::from_ymd_opt(2025, 10, 7)
            .unwrap()
            .and_hms_opt(8, 30, 5)
            .unwrap();
        let path = backup_path_for(Path::new("/data/url_yt.txt"), at);
        assert_eq!(path, PathBuf::from("/data/url_yt_20251007_083005.bak.txt"));
    }
}
