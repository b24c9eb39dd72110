//! Where the dump files live.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ArticleError, Result};

pub const DEFAULT_INDEX_PATH: &str = "dumps/enwiktionary-latest-pages-articles-multistream-index.txt.bz2";
pub const DEFAULT_ARCHIVE_PATH: &str = "dumps/enwiktionary-latest-pages-articles-multistream.xml.bz2";

/// Paths of the multistream index and archive.
///
/// ```yaml
/// index_path: dumps/enwiktionary-20240601-pages-articles-multistream-index.txt.bz2
/// archive_path: dumps/enwiktionary-20240601-pages-articles-multistream.xml.bz2
/// ```
///
/// Missing keys fall back to the `dumps/enwiktionary-latest-*` defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DumpConfig {
    pub index_path: PathBuf,
    pub archive_path: PathBuf,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            index_path: PathBuf::from(DEFAULT_INDEX_PATH),
            archive_path: PathBuf::from(DEFAULT_ARCHIVE_PATH),
        }
    }
}

impl DumpConfig {
    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents)
            .map_err(|e| ArticleError::Config(format!("Failed to parse config YAML: {e}")))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ArticleError::Config(format!("Failed to read config file {:?}: {e}", path))
        })?;
        Self::from_yaml(&contents)
    }

    /// Replace paths with explicitly given ones (command-line flags).
    pub fn with_overrides(mut self, index: Option<PathBuf>, archive: Option<PathBuf>) -> Self {
        if let Some(index) = index {
            self.index_path = index;
        }
        if let Some(archive) = archive {
            self.archive_path = archive;
        }
        self
    }
}
