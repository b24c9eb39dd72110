//! Index records (`offset:id:title`) and the in-memory index built from them.

use bzip2::read::MultiBzDecoder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::error::{ArticleError, Result};

/// How often the progress callback of [`ArticleIndex::load_with`] fires.
const PROGRESS_EVERY: usize = 100_000;

/// One line of the multistream index: where an article's stream starts,
/// the article id and its title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRecord {
    pub byte_offset: u64,
    pub article_id: u64,
    pub title: String,
}

impl IndexRecord {
    /// Parse one index line.
    ///
    /// The split stops after the second colon, so titles such as
    /// `Appendix:Glossary` keep their colons. Leading and trailing whitespace
    /// (including the line break) is trimmed from the title only.
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = |reason| ArticleError::Format {
            line: line.to_string(),
            reason,
        };

        let mut parts = line.splitn(3, ':');
        let offset = parts.next().ok_or_else(|| malformed("missing byte offset"))?;
        let id = parts.next().ok_or_else(|| malformed("missing article id"))?;
        let title = parts.next().ok_or_else(|| malformed("missing title"))?;

        let byte_offset = offset
            .trim()
            .parse::<u64>()
            .map_err(|_| malformed("byte offset is not a non-negative integer"))?;
        let article_id = id
            .trim()
            .parse::<u64>()
            .map_err(|_| malformed("article id is not a non-negative integer"))?;

        Ok(Self {
            byte_offset,
            article_id,
            title: title.trim().to_string(),
        })
    }
}

/// The whole index held as an explicit value.
///
/// Records keep file order, so `get(n)` is the n-th line of the index file.
/// Title lookups go through a map to the first record carrying that title.
#[derive(Debug, Default)]
pub struct ArticleIndex {
    records: Vec<IndexRecord>,
    by_title: HashMap<String, usize>,
    skipped: usize,
}

impl ArticleIndex {
    /// Load a bzip2-compressed index file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, |_| {})
    }

    /// Load a bzip2-compressed index file, reporting the running line count
    /// to `on_progress` every 100k lines.
    pub fn load_with(path: impl AsRef<Path>, on_progress: impl FnMut(usize)) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading index: {}", path.display());
        let start = Instant::now();

        let file = File::open(path)?;
        let reader = BufReader::with_capacity(256 * 1024, MultiBzDecoder::new(file));
        let index = Self::read_lines(reader, on_progress)?;

        info!(
            "Loaded {} indices in {:.2} seconds.",
            index.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(index)
    }

    /// Build an index from already-decompressed lines.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        Self::read_lines(reader, |_| {})
    }

    fn read_lines(reader: impl BufRead, mut on_progress: impl FnMut(usize)) -> Result<Self> {
        let mut index = Self::default();

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match IndexRecord::parse(&line) {
                Ok(record) => index.push(record),
                Err(e) => {
                    warn!("Skipping index line {}: {}", line_no + 1, e);
                    index.skipped += 1;
                }
            }
            if (line_no + 1) % PROGRESS_EVERY == 0 {
                on_progress(line_no + 1);
            }
        }

        debug!(
            "Index holds {} records ({} skipped)",
            index.records.len(),
            index.skipped
        );
        Ok(index)
    }

    fn push(&mut self, record: IndexRecord) {
        self.by_title
            .entry(record.title.clone())
            .or_insert(self.records.len());
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of malformed lines dropped while loading.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn records(&self) -> &[IndexRecord] {
        &self.records
    }

    pub fn get(&self, position: usize) -> Option<&IndexRecord> {
        self.records.get(position)
    }

    /// First record with exactly this title. The query is NFC-normalized,
    /// matching how titles are stored in the dump.
    pub fn find(&self, title: &str) -> Option<&IndexRecord> {
        let normalized: String = title.trim().nfc().collect();
        self.by_title
            .get(&normalized)
            .map(|&position| &self.records[position])
    }

    /// Like [`Self::find`], but a missing title is an error.
    pub fn require(&self, title: &str) -> Result<&IndexRecord> {
        self.find(title).ok_or_else(|| ArticleError::NotIndexed {
            title: title.to_string(),
        })
    }

    /// Number of distinct compressed streams the records point into.
    pub fn distinct_streams(&self) -> usize {
        self.records
            .iter()
            .map(|r| r.byte_offset)
            .collect::<HashSet<_>>()
            .len()
    }
}
