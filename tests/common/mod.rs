//! Builds small multistream dumps shaped like the real enwiktionary files.

#![allow(dead_code)]

use bzip2::write::BzEncoder;
use bzip2::Compression;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tempfile::TempDir;

pub struct Dump {
    pub dir: TempDir,
    pub archive: PathBuf,
    pub index: PathBuf,
    /// Index lines, in file order.
    pub lines: Vec<String>,
    /// Offset of the closing `</mediawiki>` stream.
    pub trailer_offset: u64,
}

const HEADER: &str = "<mediawiki xmlns=\"http://www.mediawiki.org/xml/export-0.11/\" version=\"0.11\" xml:lang=\"en\">\n  <siteinfo>\n    <sitename>Wiktionary</sitename>\n    <dbname>enwiktionary</dbname>\n  </siteinfo>\n";

const TRAILER: &str = "</mediawiki>\n";

pub fn page(id: u64, title: &str, text: &str) -> String {
    let escaped = title.replace('&', "&amp;");
    format!(
        "  <page>\n    <title>{escaped}</title>\n    <ns>0</ns>\n    <id>{id}</id>\n    <revision>\n      <model>wikitext</model>\n      <format>text/x-wiki</format>\n      <text bytes=\"{}\" xml:space=\"preserve\">{text}</text>\n    </revision>\n  </page>\n",
        text.len()
    )
}

pub fn free_text() -> String {
    let senses: String = (1..=30)
        .map(|n| format!("# Sense number {n} of the adjective, unconstrained and at liberty.\n"))
        .collect();
    format!(
        "{{{{also|Free|fre-}}}}\n==English==\n===Etymology===\nFrom {{{{inh|en|enm|free}}}}, from {{{{inh|en|ang|frēo}}}}.\n\n===Pronunciation===\n* {{{{IPA|en|/fɹiː/}}}}\n\n===Adjective===\n{{{{en-adj|freer}}}}\n\n{senses}\n====Synonyms====\n* [[gratis]]\n\n====Antonyms====\n\n===Verb===\n\n====Conjugation====\nregular\n\n[[Category:English lemmas]]\n\n----\n\n==Danish==\n===Adjective===\n# [[free]]\n"
    )
}

fn compress(text: &str) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(text.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

/// Header stream, two page streams, trailer stream.
pub fn build() -> Dump {
    let streams: Vec<Vec<(u64, &str, String)>> = vec![
        vec![
            (10, "dictionary", "==English==\n===Noun===\n# A reference work.\n".to_string()),
            (19, "free", free_text()),
        ],
        vec![
            (42, "AT&T", "==English==\n===Proper noun===\n# A company.\n".to_string()),
            (57, "Appendix:Glossary", "Terms used in entries.\n".to_string()),
        ],
    ];

    let mut archive = compress(HEADER);
    let mut lines = Vec::new();
    for pages in &streams {
        let offset = archive.len() as u64;
        let xml: String = pages.iter().map(|(id, title, text)| page(*id, title, text)).collect();
        archive.extend(compress(&xml));
        for (id, title, _) in pages {
            lines.push(format!("{offset}:{id}:{title}"));
        }
    }
    let trailer_offset = archive.len() as u64;
    archive.extend(compress(TRAILER));

    let dir = TempDir::new().unwrap();
    let archive_path = dir.path().join("pages-articles-multistream.xml.bz2");
    fs::write(&archive_path, &archive).unwrap();

    // The real index is multistream too; split it in two
    let (first, rest) = lines.split_at(2);
    let mut index = compress(&format!("{}\n", first.join("\n")));
    index.extend(compress(&format!("{}\n", rest.join("\n"))));
    let index_path = dir.path().join("pages-articles-multistream-index.txt.bz2");
    fs::write(&index_path, &index).unwrap();

    Dump {
        dir,
        archive: archive_path,
        index: index_path,
        lines,
        trailer_offset,
    }
}
