use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::util::format_file_name;

/// Deepest level a chapter may sit at (1 = top-level, 2 = sub-chapter).
pub const MAX_LEVEL: u8 = 2;

/// A chapter of the book: a title, its HTML content, any static files the
/// content references, and (for top-level chapters) its sub-chapters.
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    title: String,
    level: u8,
    content: String,
    static_files: Vec<PathBuf>,
    sub_chapters: Vec<Chapter>,
}

impl Chapter {
    /// Create a top-level chapter.
    pub fn new(title: impl Into<String>) -> Result<Self> {
        Self::with_level(title, 1)
    }

    /// Create a chapter at an explicit level.
    ///
    /// Fails with [`Error::InvalidLevel`] for levels outside `1..=MAX_LEVEL`.
    pub fn with_level(title: impl Into<String>, level: u8) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }
        if level == 0 || level > MAX_LEVEL {
            return Err(Error::InvalidLevel(level));
        }
        Ok(Self {
            title,
            level,
            content: String::new(),
            static_files: Vec::new(),
            sub_chapters: Vec::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn is_top_chapter(&self) -> bool {
        self.level == 1
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn static_files(&self) -> &[PathBuf] {
        &self.static_files
    }

    pub fn sub_chapters(&self) -> &[Chapter] {
        &self.sub_chapters
    }

    /// Name of the staged HTML file, derived from the title.
    pub fn file_name(&self) -> String {
        format!("{}.html", format_file_name(&self.title))
    }

    /// Replace the chapter's HTML content.
    pub fn set_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content = content.into();
        self
    }

    /// Attach files to be copied next to the chapter when the book is staged.
    ///
    /// Every path must reference an existing file; nothing is attached if any
    /// of them does not.
    pub fn add_static_files<I, P>(&mut self, paths: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths = checked_files(paths)?;
        self.static_files.extend(paths);
        Ok(self)
    }

    /// Create a sub-chapter, append it, and return it.
    pub fn create_subchapter(&mut self, title: impl Into<String>) -> Result<&mut Chapter> {
        self.check_capacity()?;
        let chapter = Chapter::with_level(title, self.level + 1)?;
        let index = self.sub_chapters.len();
        self.sub_chapters.push(chapter);
        Ok(&mut self.sub_chapters[index])
    }

    /// Append an already built chapter one level below this one.
    pub fn add_subchapter(&mut self, chapter: Chapter) -> Result<&mut Self> {
        self.check_capacity()?;
        if chapter.level != self.level + 1 {
            return Err(Error::InvalidLevel(chapter.level));
        }
        self.sub_chapters.push(chapter);
        Ok(self)
    }

    fn check_capacity(&self) -> Result<()> {
        if self.level >= MAX_LEVEL {
            return Err(Error::DepthExceeded {
                title: self.title.clone(),
                max: MAX_LEVEL,
            });
        }
        Ok(())
    }

    /// Visit this chapter and then its sub-chapters, in order.
    pub(crate) fn walk<'a>(&'a self, out: &mut Vec<&'a Chapter>) {
        out.push(self);
        for sub in &self.sub_chapters {
            sub.walk(out);
        }
    }
}

/// Resolve paths, failing on the first one that is not a regular file.
pub(crate) fn checked_files<I, P>(paths: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    paths
        .into_iter()
        .map(|p| {
            let p = p.as_ref();
            if fs::metadata(p).map(|m| m.is_file()).unwrap_or(false) {
                Ok(p.to_path_buf())
            } else {
                Err(Error::MissingFile(p.to_path_buf()))
            }
        })
        .collect()
}
