//! Storage configuration.

use std::path::{Path, PathBuf};

use lexis_common::{Result, error::Error, verify_arg};
use lexis_text::{TokenizerKind, tokenizers::DEFAULT_SEPARATORS};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_STRINGS_CHANNELS: usize = 16;

pub const DEFAULT_MAX_STRINGS_CHANNEL_SIZE: u64 = 1_000_000;

/// Strings of this many bytes or more are stored but never indexed.
pub const DEFAULT_MAX_SEARCHABLE_STRING_SIZE: usize = 1_000;

/// Configuration of a [`StringStorage`](crate::StringStorage).
///
/// Every field has a default, so a JSON configuration only needs to name the
/// fields it changes:
///
/// ```json
/// { "repo_path": "/var/lib/kb", "max_strings_channels": 4 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreOptions {
    /// Directory holding the index and channel files.
    pub repo_path: PathBuf,
    /// Remove every storage file on initialization.
    pub clear: bool,
    /// Number of channel files the offset space is spread over.
    pub max_strings_channels: usize,
    /// Byte size of the offset slice owned by one channel.
    pub max_strings_channel_size: u64,
    pub max_searchable_string_size: usize,
    /// Bytes splitting strings into terms, used by the `separators` tokenizer.
    pub term_separators: String,
    /// Index every term of a string rather than its first term only. Without
    /// it, substring queries only find strings by their leading term.
    pub search_by_substring: bool,
    /// Tokenizer name: `separators` or `trivial`.
    pub tokenizer: String,
    /// Return the content of the referenced file for strings naming an
    /// existing regular file.
    pub resolve_file_links: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            repo_path: PathBuf::new(),
            clear: false,
            max_strings_channels: DEFAULT_MAX_STRINGS_CHANNELS,
            max_strings_channel_size: DEFAULT_MAX_STRINGS_CHANNEL_SIZE,
            max_searchable_string_size: DEFAULT_MAX_SEARCHABLE_STRING_SIZE,
            term_separators: DEFAULT_SEPARATORS.to_string(),
            search_by_substring: true,
            tokenizer: TokenizerKind::Separators.name().to_string(),
            resolve_file_links: true,
        }
    }
}

impl StoreOptions {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::invalid_format("store options", e.to_string()))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::read(path.display().to_string(), e))?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::invalid_format("store options", e.to_string()))
    }

    /// Checks the values an engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        verify_arg!(repo_path, !self.repo_path.as_os_str().is_empty());
        verify_arg!(max_strings_channels, self.max_strings_channels > 0);
        verify_arg!(max_strings_channel_size, self.max_strings_channel_size > 0);
        TokenizerKind::try_from(self.tokenizer.as_str())?;
        Ok(())
    }

    pub fn with_clear(mut self, clear: bool) -> Self {
        self.clear = clear;
        self
    }

    pub fn with_channels(mut self, max_channels: usize, max_channel_size: u64) -> Self {
        self.max_strings_channels = max_channels;
        self.max_strings_channel_size = max_channel_size;
        self
    }

    pub fn with_search_by_substring(mut self, search_by_substring: bool) -> Self {
        self.search_by_substring = search_by_substring;
        self
    }

    pub fn with_max_searchable_string_size(mut self, size: usize) -> Self {
        self.max_searchable_string_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use lexis_common::Status;

    use super::*;

    #[test]
    fn test_defaults() {
        let options = StoreOptions::new("/tmp/kb");
        assert_eq!(options.max_strings_channels, 16);
        assert_eq!(options.max_strings_channel_size, 1_000_000);
        assert_eq!(options.max_searchable_string_size, 1_000);
        assert_eq!(options.term_separators, " _\t\n\r");
        assert!(options.search_by_substring);
        assert!(!options.clear);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_json() {
        let options = StoreOptions::from_json(
            r#"{ "repo_path": "/tmp/kb", "max_strings_channels": 4, "tokenizer": "trivial" }"#,
        )
        .expect("parse");
        assert_eq!(options.repo_path, PathBuf::from("/tmp/kb"));
        assert_eq!(options.max_strings_channels, 4);
        assert_eq!(options.tokenizer, "trivial");
        assert_eq!(options.max_strings_channel_size, DEFAULT_MAX_STRINGS_CHANNEL_SIZE);

        let err = StoreOptions::from_json(r#"{ "repo_pth": "/tmp" }"#).unwrap_err();
        assert_eq!(err.status(), Status::ReadError);

        let json = options.to_json().expect("serialize");
        assert_eq!(StoreOptions::from_json(&json).expect("parse"), options);
    }

    #[test]
    fn test_from_json_file() {
        let tempdir = tempfile::tempdir().expect("tempdir");
        let path = tempdir.path().join("storage.json");
        std::fs::write(&path, r#"{ "repo_path": "kb", "search_by_substring": false }"#)
            .expect("write");
        let options = StoreOptions::from_json_file(&path).expect("load");
        assert!(!options.search_by_substring);
        assert!(StoreOptions::from_json_file(tempdir.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_validate() {
        assert!(StoreOptions::default().validate().is_err());
        assert!(StoreOptions::new("kb").with_channels(0, 10).validate().is_err());
        assert!(StoreOptions::new("kb").with_channels(1, 0).validate().is_err());

        let mut options = StoreOptions::new("kb");
        options.tokenizer = "stemming".to_string();
        assert!(options.validate().is_err());
    }
}
