//! Flat, numbered navigation structure derived from the chapter tree.

use crate::book::Chapter;

/// Play order reserved for the book root (the table of contents page).
pub const ROOT_PLAY_ORDER: usize = 1;

/// A navigation entry for one chapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub title: String,
    /// 1-based reading position; chapters start at 2.
    pub play_order: usize,
    pub file_name: String,
    pub children: Vec<Heading>,
}

/// Number the chapter tree in pre-order.
///
/// Top-level chapters and their sub-chapters share one continuous counter,
/// so a parent always precedes its children and numbering never resets.
pub fn build_headings(chapters: &[Chapter]) -> Vec<Heading> {
    let mut order = ROOT_PLAY_ORDER;
    chapters
        .iter()
        .map(|chapter| number(chapter, &mut order))
        .collect()
}

fn number(chapter: &Chapter, order: &mut usize) -> Heading {
    *order += 1;
    let play_order = *order;
    let children = chapter
        .sub_chapters()
        .iter()
        .map(|sub| number(sub, order))
        .collect();
    Heading {
        title: chapter.title().to_string(),
        play_order,
        file_name: chapter.file_name(),
        children,
    }
}

/// Deepest nesting in the heading tree (0 when empty).
pub fn depth(headings: &[Heading]) -> usize {
    headings
        .iter()
        .map(|h| 1 + depth(&h.children))
        .max()
        .unwrap_or(0)
}
