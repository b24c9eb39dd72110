//! Heading hierarchy of a language section as a tree.
//!
//! [`crate::sections::extract_tags`] flattens `===Noun===` and its
//! `====Synonyms====` child into one list. This keeps the nesting for callers
//! that need to know which part of speech a synonym list belongs to.

use serde::Serialize;

use crate::sections::scan_headings;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagNode {
    /// Number of `=` in the opening run (3 for `===Noun===`).
    pub level: usize,
    pub label: String,
    pub body: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TagNode>,
}

/// Build the heading tree of a language section.
///
/// A heading becomes the child of the closest preceding heading with a
/// smaller level. Headings with no body and no children are dropped, while an
/// empty heading that has children (a bare `===Verb===` over its
/// `====Synonyms====`) is kept so the children have somewhere to hang.
pub fn build_tag_tree(section: &str) -> Vec<TagNode> {
    let mut roots = Vec::new();
    let mut open: Vec<TagNode> = Vec::new();

    for heading in scan_headings(section) {
        while open.last().is_some_and(|top| top.level >= heading.level) {
            if let Some(done) = open.pop() {
                close(done, &mut open, &mut roots);
            }
        }
        open.push(TagNode {
            level: heading.level,
            label: heading.label.to_string(),
            body: heading.body.to_string(),
            children: Vec::new(),
        });
    }
    while let Some(done) = open.pop() {
        close(done, &mut open, &mut roots);
    }

    roots
}

fn close(node: TagNode, open: &mut [TagNode], roots: &mut Vec<TagNode>) {
    if node.body.is_empty() && node.children.is_empty() {
        return;
    }
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}
