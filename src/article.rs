//! Picking one article out of a decompressed batch of pages.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::archive::{fetch_page_fragment, PAGE_END};
use crate::error::{ArticleError, Result};
use crate::index::IndexRecord;
use crate::sections::split_language_sections;

/// Distance from `<title>` back to the `<page>` that opens it: the tag, its
/// line break and the four spaces indenting the title line.
pub const TITLE_BACK_OFFSET: usize = "<page>\n    ".len();

/// Finds a single page inside decompressed XML holding several.
pub trait PageIsolator {
    /// Return the `<page>...</page>` slice of `decoded` whose title is `title`.
    fn isolate<'a>(&self, decoded: &'a str, title: &str) -> Result<&'a str>;
}

/// String-search isolator; never parses the XML.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextualIsolator;

impl PageIsolator for TextualIsolator {
    fn isolate<'a>(&self, decoded: &'a str, title: &str) -> Result<&'a str> {
        isolate_article(decoded, title)
    }
}

/// Slice the page titled `title` out of `decoded`, boundary tags included.
///
/// The start is a fixed [`TITLE_BACK_OFFSET`] before the first
/// `<title>{title}</title>`; the end is the first `</page>` after it. A
/// title that appears earlier in the buffer as part of another page wins,
/// which is a known limitation of matching text instead of structure.
pub fn isolate_article<'a>(decoded: &'a str, title: &str) -> Result<&'a str> {
    let not_found = || ArticleError::NotFound {
        title: title.to_string(),
    };

    let marker = format!("<title>{}</title>", escape_title(title));
    let title_at = decoded.find(&marker).ok_or_else(not_found)?;
    let end = decoded[title_at..]
        .find(PAGE_END)
        .map(|i| title_at + i + PAGE_END.len())
        .ok_or_else(not_found)?;
    let start = title_at
        .checked_sub(TITLE_BACK_OFFSET)
        .filter(|&s| decoded.is_char_boundary(s))
        .ok_or_else(not_found)?;

    Ok(&decoded[start..end])
}

/// Titles in the index are plain text; inside the XML `&`, `<` and `>` are
/// escaped. Quotes are left as they are in element text.
fn escape_title(title: &str) -> Cow<'_, str> {
    if !title.contains(['&', '<', '>']) {
        return Cow::Borrowed(title);
    }
    let mut escaped = String::with_capacity(title.len() + 8);
    for ch in title.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    Cow::Owned(escaped)
}

/// An archive plus the isolator used to cut pages out of it.
///
/// Holds no open handle; every lookup opens the archive afresh, so one
/// source can be shared between threads.
#[derive(Debug, Clone)]
pub struct ArticleSource<I = TextualIsolator> {
    archive_path: PathBuf,
    isolator: I,
}

impl ArticleSource {
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Self::with_isolator(archive_path, TextualIsolator)
    }
}

impl<I: PageIsolator> ArticleSource<I> {
    pub fn with_isolator(archive_path: impl Into<PathBuf>, isolator: I) -> Self {
        Self {
            archive_path: archive_path.into(),
            isolator,
        }
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    /// Fetch and isolate the raw markup of the article `record` points at.
    pub fn get_article(&self, record: &IndexRecord) -> Result<String> {
        let bytes = fetch_page_fragment(&self.archive_path, record.byte_offset)?;
        let decoded = String::from_utf8_lossy(&bytes);
        match self.isolator.isolate(&decoded, &record.title) {
            Ok(article) => Ok(article.to_string()),
            Err(e) => {
                debug!(
                    "No page titled {:?} in stream at offset {}",
                    record.title, record.byte_offset
                );
                Err(e)
            }
        }
    }

    /// Same as [`Self::get_article`], starting from a raw index line.
    pub fn get_article_line(&self, index_line: &str) -> Result<String> {
        let record = IndexRecord::parse(index_line)?;
        self.get_article(&record)
    }

    /// Fetch an article by index line and split it into language sections.
    pub fn language_sections_of(&self, index_line: &str) -> Result<Vec<String>> {
        let article = self.get_article_line(index_line)?;
        Ok(split_language_sections(&article)
            .map(str::to_string)
            .collect())
    }
}
