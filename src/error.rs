//! Error types for ebook assembly.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building or packaging an ebook.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("HTTP error: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("chapter list is empty")]
    EmptyChapterList,

    #[error("only chapters with level 1 are accepted, `{title}` has level {level}")]
    NotTopLevel { title: String, level: u8 },

    #[error("chapter `{title}` is already at the max level {max}")]
    DepthExceeded { title: String, max: u8 },

    #[error("invalid chapter level: {0}")]
    InvalidLevel(u8),

    #[error("{} is not a file", .0.display())]
    MissingFile(PathBuf),

    #[error("invalid toc file: {0}")]
    InvalidToc(String),

    #[error("cover path and cover content are both empty")]
    EmptyCover,

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("failed to run {tool}: {source}")]
    ExternalTool {
        tool: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
