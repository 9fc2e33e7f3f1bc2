//! Building a book from a directory with a `toc.md` index.
//!
//! The directory holds:
//! - `toc.md`: the first non-blank line is the book title, `# ` lines are
//!   chapter titles and `## ` lines are sub-chapter titles of the chapter
//!   above them;
//! - `<title>.html` for every chapter and sub-chapter;
//! - optionally `cover.jpg`;
//! - any other files, which are staged verbatim.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::book::Book;
use crate::error::{Error, Result};
use crate::export::Format;

pub const TOC_FILE: &str = "toc.md";
pub const COVER_FILE: &str = "cover.jpg";

/// A chapter title from `toc.md` and the sub-chapter titles under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocHeading {
    pub title: String,
    pub sub_headings: Vec<String>,
}

/// Parse a `toc.md` index into the book title and its headings.
pub fn parse_toc(text: &str) -> Result<(String, Vec<TocHeading>)> {
    let mut lines = text.lines().skip_while(|l| l.trim().is_empty());
    let title = lines
        .next()
        .map(|l| l.trim().to_string())
        .ok_or_else(|| Error::InvalidToc("title is empty".to_string()))?;

    let mut headings: Vec<TocHeading> = Vec::new();
    for line in lines {
        if let Some(title) = line.strip_prefix("# ") {
            headings.push(TocHeading {
                title: title.trim().to_string(),
                sub_headings: Vec::new(),
            });
        } else if let Some(title) = line.strip_prefix("## ") {
            let Some(parent) = headings.last_mut() else {
                return Err(Error::InvalidToc(format!(
                    "sub-heading before any heading: {}",
                    title.trim()
                )));
            };
            parent.sub_headings.push(title.trim().to_string());
        }
    }
    if headings.is_empty() {
        return Err(Error::InvalidToc("headings are empty".to_string()));
    }
    Ok((title, headings))
}

/// Build a book from `source_dir` and save it into `output_dir`; returns the
/// path of the saved book.
#[deprecated(note = "build a `Book` directly")]
pub fn make_ebook(source_dir: &Path, output_dir: &Path, format: Format) -> Result<PathBuf> {
    warn!("`make_ebook` is deprecated, build a `Book` directly instead");
    let mut book = book_from_dir(source_dir, format)?;
    let dest = output_dir.join(book.file_name());
    book.save(&dest)?;
    Ok(dest)
}

/// Assemble (but do not build) a book from a `toc.md` directory.
pub fn book_from_dir(source_dir: &Path, format: Format) -> Result<Book> {
    let toc_path = source_dir.join(TOC_FILE);
    if !toc_path.is_file() {
        return Err(Error::InvalidToc(format!(
            "{} does not exist",
            toc_path.display()
        )));
    }
    let (title, headings) = parse_toc(&fs::read_to_string(&toc_path)?)?;

    let mut book = Book::new(title, format)?;
    let cover = source_dir.join(COVER_FILE);
    if cover.is_file() {
        book.set_cover_path(&cover)?;
    }

    for heading in &headings {
        let chapter = book.create_chapter(&heading.title)?;
        chapter.set_content(read_chapter(source_dir, &heading.title)?);
        for sub in &heading.sub_headings {
            chapter
                .create_subchapter(sub)?
                .set_content(read_chapter(source_dir, sub)?);
        }
    }

    let mut extra: Vec<PathBuf> = fs::read_dir(source_dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && !is_html(p) && !is_reserved(p))
        .collect();
    extra.sort();
    book.add_static_files(extra)?;
    Ok(book)
}

fn read_chapter(dir: &Path, title: &str) -> Result<String> {
    let path = dir.join(format!("{title}.html"));
    if !path.is_file() {
        return Err(Error::MissingFile(path));
    }
    Ok(fs::read_to_string(path)?)
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html"))
}

fn is_reserved(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == TOC_FILE || n == COVER_FILE)
}
