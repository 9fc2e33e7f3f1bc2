//! # ebookmaker
//!
//! Assemble EPUB and Kindle (MOBI) ebooks from HTML chapter fragments.
//!
//! A [`Book`] collects a title, an optional author, a cover, and a tree of
//! [`Chapter`]s (top-level chapters with one level of sub-chapters). Building
//! the book stages the navigation map (`toc.ncx`), an HTML table of contents,
//! the OPF package manifest, the cover, and one HTML file per chapter in a
//! private directory, then packages it:
//!
//! - EPUB: the staging directory is zipped.
//! - MOBI: an external converter (kindlegen) is run on the manifest.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ebookmaker::{Book, Format};
//!
//! let mut book = Book::new("My Book", Format::Epub)?;
//! book.set_author("Author Name");
//!
//! let chapter = book.create_chapter("Chapter 1")?;
//! chapter.set_content("<h1>Chapter 1</h1><p>Hello.</p>");
//! chapter
//!     .create_subchapter("Section 1.1")?
//!     .set_content("<p>More.</p>");
//!
//! book.save("my-book.epub")?;
//! # Ok::<(), ebookmaker::Error>(())
//! ```
//!
//! ## Remote images
//!
//! With [`Book::enable_image_download`], `<img src="http://...">` references
//! are fetched, shrunk, and staged next to the chapters, and the chapter HTML
//! is rewritten to point at the local copies.

pub mod book;
pub mod error;
pub mod export;
pub mod images;
pub mod legacy;
pub mod render;
pub mod toc;
mod util;

pub use book::{Book, Chapter, Cover, MAX_LEVEL, StagingDir};
pub use error::{Error, Result};
pub use export::{BuildState, EpubConfig, Format, MobiConfig, PackageConfig};
pub use images::{ImageConfig, ImageLocalizer, RemoteImageLocalizer};
pub use toc::{Heading, build_headings};
pub use util::format_file_name;
