//! Splitting article wikitext into language sections and heading tags.
//!
//! Neither function can fail: markup that does not look like a heading is
//! simply not reported.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    // A language heading: ==English== followed by a line break. Numeric or
    // symbol-only level-2 headings are not languages.
    static ref LANGUAGE_HEADING: Regex = Regex::new(r"==[A-Za-z]+==\n").unwrap();
    static ref LANGUAGE_NAME: Regex = Regex::new(r"^==([A-Za-z]+)==").unwrap();

    // Level 3 and deeper: opening run, label, closing run
    static ref TAG_HEADING: Regex = Regex::new(r"(={3,})([^\n=]*)=+").unwrap();
    static ref CATEGORY_LINK: Regex = Regex::new(r"(?s)\[\[Category.*?\]\]").unwrap();
}

/// A run of three `=` ends a tag body, whether or not it forms a heading.
const BODY_STOP: &str = "===";

/// Iterator over the language sections of an article, in source order.
///
/// Cloning it restarts from the same position.
#[derive(Debug, Clone)]
pub struct LanguageSections<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for LanguageSections<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        while self.pos < self.text.len() {
            let start = self.pos;
            // Step past the first char so the boundary at `start` is not found again
            let from = start + self.text[start..].chars().next().map_or(0, char::len_utf8);
            let end = LANGUAGE_HEADING
                .find_at(self.text, from)
                .map_or(self.text.len(), |m| m.start());
            self.pos = end;

            let fragment = &self.text[start..end];
            if fragment.trim_start().starts_with("==") {
                return Some(fragment);
            }
        }
        None
    }
}

/// Split article text at every language heading.
///
/// The preamble before the first heading (page metadata, redirects) is
/// dropped, so an article without language headings yields nothing.
pub fn split_language_sections(article: &str) -> LanguageSections<'_> {
    LanguageSections {
        text: article,
        pos: 0,
    }
}

/// The language named by a section's opening heading.
pub fn language_name(section: &str) -> Option<&str> {
    LANGUAGE_NAME
        .captures(section.trim_start())
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

/// One level-3-or-deeper heading and the text under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionTag {
    pub label: String,
    pub body: String,
}

impl SectionTag {
    pub fn as_pair(&self) -> (&str, &str) {
        (&self.label, &self.body)
    }
}

/// A heading as found in the text, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawHeading<'a> {
    pub level: usize,
    pub label: &'a str,
    pub body: &'a str,
}

/// Every heading of level 3 or more, in order, with trimmed label and body.
///
/// A body runs to the next `===`, the next `[[Category...]]` link or the end
/// of the section. Scanning resumes where the body stopped, so headings that
/// follow a category link are still reported.
pub(crate) fn scan_headings(section: &str) -> Vec<RawHeading<'_>> {
    let mut headings = Vec::new();
    let mut pos = 0;

    while let Some(cap) = TAG_HEADING.captures_at(section, pos) {
        let (Some(heading), Some(opening), Some(label)) = (cap.get(0), cap.get(1), cap.get(2)) else {
            break;
        };
        let body_start = heading.end();
        let body_end = body_end(section, body_start);

        headings.push(RawHeading {
            level: opening.as_str().len(),
            label: label.as_str().trim(),
            body: section[body_start..body_end].trim(),
        });
        pos = body_end;
    }

    headings
}

fn body_end(section: &str, from: usize) -> usize {
    let next_heading = section[from..].find(BODY_STOP).map(|i| from + i);
    let next_category = CATEGORY_LINK.find_at(section, from).map(|m| m.start());

    match (next_heading, next_category) {
        (Some(h), Some(c)) => h.min(c),
        (Some(h), None) => h,
        (None, Some(c)) => c,
        (None, None) => section.len(),
    }
}

/// Flatten a language section into `(label, body)` tags.
///
/// Heading depth is not kept: `===Noun===` and `====Synonyms====` come out
/// side by side. Headings with an empty body are dropped; repeated labels
/// are kept as separate entries.
pub fn extract_tags(section: &str) -> Vec<SectionTag> {
    scan_headings(section)
        .into_iter()
        .filter(|h| !h.body.is_empty())
        .map(|h| SectionTag {
            label: h.label.to_string(),
            body: h.body.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOUN_SECTION: &str = "
    ==English==
    This is the English section.

    ===Noun===
    yes

    ====Synonyms====
    no

    =====Translations=====
    maybe
    ";

    const VERB_CONTINUATION: &str = "
    ===Verb===

    ====Synonyms====
    The above is purposefully empty

    [[Category:English lemmas]]
    ";

    fn pairs(tags: &[SectionTag]) -> Vec<(&str, &str)> {
        tags.iter().map(SectionTag::as_pair).collect()
    }

    #[test]
    fn flattens_nested_headings() {
        let tags = extract_tags(NOUN_SECTION);
        assert_eq!(
            pairs(&tags),
            vec![("Noun", "yes"), ("Synonyms", "no"), ("Translations", "maybe")]
        );
    }

    #[test]
    fn drops_empty_bodies_and_stops_at_category() {
        let section = format!("{NOUN_SECTION}{VERB_CONTINUATION}");
        let tags = extract_tags(&section);
        assert_eq!(
            pairs(&tags),
            vec![
                ("Noun", "yes"),
                ("Synonyms", "no"),
                ("Translations", "maybe"),
                ("Synonyms", "The above is purposefully empty"),
            ]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        assert_eq!(extract_tags(NOUN_SECTION), extract_tags(NOUN_SECTION));
    }

    #[test]
    fn multi_line_bodies_are_kept() {
        let section = "===Etymology===\nFrom {{inh|en|enm|fre}}.\n\nCompare [[frei]].\n===Noun===\n# gratis\n";
        let tags = extract_tags(section);
        assert_eq!(tags[0].label, "Etymology");
        assert_eq!(tags[0].body, "From {{inh|en|enm|fre}}.\n\nCompare [[frei]].");
        assert_eq!(tags[1].as_pair(), ("Noun", "# gratis"));
    }

    #[test]
    fn labels_are_trimmed() {
        let tags = extract_tags("=== Pronunciation ===\n* {{IPA|en|/fɹiː/}}\n");
        assert_eq!(tags[0].label, "Pronunciation");
    }

    #[test]
    fn headings_after_category_are_still_found() {
        let section = "===Noun===\nyes\n[[Category:English nouns]]\n===Verb===\nto free\n";
        let tags = extract_tags(section);
        assert_eq!(pairs(&tags), vec![("Noun", "yes"), ("Verb", "to free")]);
    }

    #[test]
    fn plain_text_has_no_tags() {
        assert!(extract_tags("==English==\nno subsections here").is_empty());
        assert!(extract_tags("").is_empty());
    }

    #[test]
    fn scan_reports_levels() {
        let levels: Vec<usize> = scan_headings(NOUN_SECTION).iter().map(|h| h.level).collect();
        assert_eq!(levels, vec![3, 4, 5]);
    }

    const ARTICLE: &str = "<page>\n    <title>free</title>\n    <text>{{also|Free}}\n==English==\n===Adjective===\nnot bound\n\n----\n\n==Old French==\n===Adjective===\nnoble\n\n==Latin==\n===Adjective===\nfree\n==123==\nnot a language\n</text>\n  </page>";

    #[test]
    fn splits_on_language_headings_only() {
        let sections: Vec<&str> = split_language_sections(ARTICLE).collect();
        assert_eq!(sections.len(), 2);
        assert!(sections.iter().all(|s| s.starts_with("==")));
        assert!(sections[0].starts_with("==English==\n"));
        // "Old French" contains a space, so it is not a boundary of its own
        assert!(sections[0].contains("==Old French=="));
        assert!(sections[1].starts_with("==Latin==\n"));
        assert!(sections[1].contains("==123=="));
    }

    #[test]
    fn preamble_is_dropped() {
        let sections: Vec<&str> = split_language_sections("#REDIRECT [[free]]\n").collect();
        assert!(sections.is_empty());
    }

    #[test]
    fn sections_are_restartable() {
        let article = "==English==\nfree\n==French==\nlibre\n";
        let iter = split_language_sections(article);
        let first: Vec<&str> = iter.clone().collect();
        let second: Vec<&str> = iter.collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["==English==\nfree\n", "==French==\nlibre\n"]);
    }

    #[test]
    fn non_ascii_preamble_is_skipped_safely() {
        let article = "é\n==Latin==\nliber\n";
        let sections: Vec<&str> = split_language_sections(article).collect();
        assert_eq!(sections, vec!["==Latin==\nliber\n"]);
    }

    #[test]
    fn reads_language_name() {
        assert_eq!(language_name("==English==\nfree"), Some("English"));
        assert_eq!(language_name("  ==Latin==\n"), Some("Latin"));
        assert_eq!(language_name("===Noun===\n"), None);
    }
}
