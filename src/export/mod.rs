//! Packaging a staged book into its final artifact.
//!
//! A build moves through [`BuildState`]: the staging directory is populated
//! (`Empty` to `Staged`), then a format-specific [`Packager`] produces the
//! artifact (`Staged` to `Packaged`).
//!
//! # Example
//!
//! ```no_run
//! use ebookmaker::export::{EpubPackager, Packager};
//! use std::path::Path;
//!
//! let staging = Path::new("/tmp/staged-book");
//! EpubPackager::new().package(staging, "MyBook.opf", &staging.join("MyBook.epub"))?;
//! # Ok::<(), ebookmaker::Error>(())
//! ```

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::{Error, Result};

mod epub;
mod mobi;

pub use epub::{EpubConfig, EpubPackager};
pub use mobi::{MobiConfig, MobiPackager};

/// Trait for turning a staged directory into a final ebook file.
pub trait Packager {
    /// Package the files in `staging` into `artifact`.
    ///
    /// `manifest` is the file name of the package manifest inside `staging`.
    fn package(&self, staging: &Path, manifest: &str, artifact: &Path) -> Result<()>;
}

/// Output format of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Format {
    Epub,
    #[default]
    Mobi,
}

impl Format {
    /// File extension of the packaged artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Epub => "epub",
            Format::Mobi => "mobi",
        }
    }
}

impl std::str::FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "epub" => Ok(Format::Epub),
            "mobi" => Ok(Format::Mobi),
            other => Err(Error::Unsupported(format!("format `{other}`"))),
        }
    }
}

/// Settings for every packager; only the one matching the book's format is
/// used.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PackageConfig {
    pub epub: EpubConfig,
    pub mobi: MobiConfig,
}

impl PackageConfig {
    /// The packager for `format`.
    pub fn packager(&self, format: Format) -> Box<dyn Packager> {
        match format {
            Format::Epub => Box::new(EpubPackager::new().with_config(self.epub.clone())),
            Format::Mobi => Box::new(MobiPackager::new().with_config(self.mobi.clone())),
        }
    }
}

/// Where a book is in its build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BuildState {
    /// Nothing generated yet (or a build failed part way).
    #[default]
    Empty,
    /// Control documents, cover and chapters are in the staging directory.
    Staged { manifest: String },
    /// The artifact has been produced.
    Packaged { artifact: PathBuf },
}

/// Open `path` with the host's default application.
pub fn open_with_default_viewer(path: &Path) -> Result<ExitStatus> {
    let mut command = viewer_command(path);
    let tool = format!("{command:?}");
    command
        .status()
        .map_err(|source| Error::ExternalTool { tool, source })
}

#[cfg(target_os = "macos")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("open");
    command.arg(path);
    command
}

#[cfg(target_os = "windows")]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", ""]).arg(path);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer_command(path: &Path) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(path);
    command
}
