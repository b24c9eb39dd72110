//! Random access into a bzip2 multistream archive.
//!
//! The dump is a concatenation of independent bzip2 streams, each holding a
//! batch of `<page>` elements. An index offset points at the first byte of
//! one of those streams, so decompression can start there with a fresh
//! decoder and stop as soon as a whole page has come out.

use bzip2::{Decompress, Status};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

use crate::error::{ArticleError, Result};

/// Compressed bytes fed to the decoder per read.
pub const CHUNK_SIZE: usize = 1024;

/// Marks the end of one article in the decompressed XML.
pub const PAGE_END: &str = "</page>";

/// Offset 0 is the dump's header stream (`<siteinfo>`), which never holds a
/// page. It doubles as the "no offset" sentinel and is rejected up front.
pub const SENTINEL_OFFSET: u64 = 0;

/// Spare output capacity reserved before each decoder call.
const OUTPUT_RESERVE: usize = 8 * CHUNK_SIZE;

/// Decompress the stream at `byte_offset` until it yields a complete page.
///
/// The returned bytes hold at least one whole `<page>...</page>` element and
/// usually several; picking the right one is [`crate::article`]'s job.
///
/// # Errors
/// - [`ArticleError::TruncatedStream`] for the sentinel offset, or when the
///   stream or file ends before `</page>` appears.
/// - [`ArticleError::Decode`] when the offset is past the end of the file or
///   the bytes there are not a bzip2 stream (a misaligned offset, corruption).
/// - [`ArticleError::Io`] when the archive cannot be opened or read.
pub fn fetch_page_fragment(archive_path: impl AsRef<Path>, byte_offset: u64) -> Result<Vec<u8>> {
    if byte_offset == SENTINEL_OFFSET {
        return Err(ArticleError::TruncatedStream {
            offset: byte_offset,
        });
    }

    let mut file = File::open(archive_path.as_ref())?;
    let len = file.metadata()?.len();
    if byte_offset >= len {
        return Err(ArticleError::Decode {
            offset: byte_offset,
            reason: format!("offset is beyond end of archive ({len} bytes)"),
        });
    }
    file.seek(SeekFrom::Start(byte_offset))?;

    let fragment = decompress_until_page_end(&mut file, byte_offset)?;
    debug!(
        "Decompressed {} bytes from stream at offset {}",
        fragment.len(),
        byte_offset
    );
    Ok(fragment)
}

/// Feed `reader` to a fresh decoder in [`CHUNK_SIZE`] pieces until the output
/// contains [`PAGE_END`]. `offset` is only used for error reporting.
pub fn decompress_until_page_end(reader: &mut impl Read, offset: u64) -> Result<Vec<u8>> {
    let mut decoder = Decompress::new(false);
    let mut output = Vec::new();
    let mut chunk = [0u8; CHUNK_SIZE];
    let mut search = PageEndSearch::default();

    loop {
        let bytes_read = reader.read(&mut chunk)?;
        if bytes_read == 0 {
            return Err(ArticleError::TruncatedStream { offset });
        }

        let stream_ended = feed(&mut decoder, &chunk[..bytes_read], &mut output, offset)?;

        if search.found_in(&output) {
            return Ok(output);
        }
        if stream_ended {
            return Err(ArticleError::TruncatedStream { offset });
        }
    }
}

/// Push one chunk through the decoder, draining all output it can produce.
/// Returns true once the bzip2 end-of-stream marker has been decoded.
fn feed(decoder: &mut Decompress, mut input: &[u8], output: &mut Vec<u8>, offset: u64) -> Result<bool> {
    loop {
        output.reserve(OUTPUT_RESERVE);
        let in_before = decoder.total_in();
        let out_before = decoder.total_out();

        let status = decoder
            .decompress_vec(input, output)
            .map_err(|e| ArticleError::Decode {
                offset,
                reason: e.to_string(),
            })?;

        let consumed = (decoder.total_in() - in_before) as usize;
        let produced = decoder.total_out() - out_before;
        input = &input[consumed..];

        if matches!(status, Status::StreamEnd) {
            return Ok(true);
        }
        // A full output buffer may be hiding more pending output.
        let output_full = output.len() == output.capacity();
        if input.is_empty() && !output_full {
            return Ok(false);
        }
        if consumed == 0 && produced == 0 {
            if input.is_empty() {
                return Ok(false);
            }
            return Err(ArticleError::Decode {
                offset,
                reason: "decoder stalled with input left".to_string(),
            });
        }
    }
}

/// Incremental search for [`PAGE_END`] in a buffer that only ever grows.
///
/// Only the tail that could still complete a marker split between two
/// decoder calls is rescanned.
#[derive(Debug, Default)]
struct PageEndSearch {
    scanned: usize,
}

impl PageEndSearch {
    fn found_in(&mut self, output: &[u8]) -> bool {
        if contains_page_end(&output[self.scanned..]) {
            return true;
        }
        self.scanned = output.len().saturating_sub(PAGE_END.len() - 1);
        false
    }
}

fn contains_page_end(haystack: &[u8]) -> bool {
    haystack
        .windows(PAGE_END.len())
        .any(|window| window == PAGE_END.as_bytes())
}
