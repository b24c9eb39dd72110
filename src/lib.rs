//! Random-access article lookup for Wiktionary multistream dumps.
//!
//! A lookup runs in three stages:
//!
//! 1. [`IndexRecord::parse`] turns an `offset:id:title` index line into a record.
//! 2. [`fetch_page_fragment`] decompresses the bzip2 stream at the record's
//!    offset until a whole `</page>` is out, and [`isolate_article`] cuts the
//!    titled page from that batch.
//! 3. [`split_language_sections`] splits the page at `==Language==` headings
//!    and [`extract_tags`] turns each section into `(heading, body)` tags.
//!
//! ```no_run
//! use wiktionary_articles::{extract_tags, split_language_sections, ArticleSource};
//!
//! let source = ArticleSource::new("dumps/enwiktionary-latest-pages-articles-multistream.xml.bz2");
//! let article = source.get_article_line("568:10:dictionary")?;
//! for section in split_language_sections(&article) {
//!     for tag in extract_tags(section) {
//!         println!("{}: {} bytes", tag.label, tag.body.len());
//!     }
//! }
//! # Ok::<(), wiktionary_articles::ArticleError>(())
//! ```

pub mod archive;
pub mod article;
pub mod config;
pub mod error;
pub mod index;
pub mod sections;
pub mod tree;

pub use archive::fetch_page_fragment;
pub use article::{isolate_article, ArticleSource, PageIsolator, TextualIsolator};
pub use config::DumpConfig;
pub use error::{ArticleError, Result};
pub use index::{ArticleIndex, IndexRecord};
pub use sections::{extract_tags, language_name, split_language_sections, LanguageSections, SectionTag};
pub use tree::{build_tag_tree, TagNode};
