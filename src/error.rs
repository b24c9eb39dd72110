//! Error types for article lookup and decoding.

use thiserror::Error;

/// Every failure the lookup pipeline can report.
///
/// Section and tag extraction never fail, so nothing here comes from the
/// [`crate::sections`] module.
#[derive(Debug, Error)]
pub enum ArticleError {
    /// An index line is not `offset:id:title` with integer offset and id.
    #[error("Malformed index line {line:?}: {reason}")]
    Format { line: String, reason: &'static str },

    /// The bytes at the requested offset are not a valid bzip2 stream.
    #[error("Cannot decompress archive at offset {offset}: {reason}")]
    Decode { offset: u64, reason: String },

    /// The stream ended before any `</page>` terminator was produced.
    #[error("Stream at offset {offset} ended before a complete page was read")]
    TruncatedStream { offset: u64 },

    /// The decompressed data does not contain the requested page.
    #[error("Article not found or incomplete: {title:?}")]
    NotFound { title: String },

    /// No index record carries the requested title.
    #[error("Title not in index: {title:?}")]
    NotIndexed { title: String },

    /// The archive or index file could not be opened, sought or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A dump configuration file is unreadable or invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Tags or trees could not be written out as JSON.
    #[error("Cannot serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ArticleError {
    /// True when the error means "no such article here" rather than corrupt
    /// input, so batch callers can skip the record and carry on.
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            ArticleError::TruncatedStream { .. }
                | ArticleError::NotFound { .. }
                | ArticleError::NotIndexed { .. }
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, ArticleError>;
