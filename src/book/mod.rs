//! The [`Book`] aggregate: metadata, cover, chapter tree, and the staging
//! directory the book is assembled in.

mod chapter;
mod cover;
mod staging;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::export::{self, BuildState, Format, PackageConfig};
use crate::images::{ImageConfig, ImageLocalizer, RemoteImageLocalizer};
use crate::render::{self, BookInfo, Renderer};
use crate::toc::{self, Heading};
use crate::util::format_file_name;

pub use chapter::{Chapter, MAX_LEVEL};
pub use cover::Cover;
pub use staging::StagingDir;

/// An ebook under construction.
///
/// Chapters are added incrementally; [`save`](Book::save) and
/// [`show`](Book::show) run a full build each time they are called: the
/// staging directory is repopulated and the artifact packaged again.
///
/// # Example
///
/// ```no_run
/// use ebookmaker::{Book, Format};
///
/// let mut book = Book::new("My Book", Format::Epub)?;
/// book.set_author("Me");
/// book.create_chapter("Chapter 1")?.set_content("<p>Hello</p>");
/// book.save("My Book.epub")?;
/// # Ok::<(), ebookmaker::Error>(())
/// ```
pub struct Book {
    title: String,
    author: Option<String>,
    language: String,
    format: Format,
    cover: Cover,
    chapters: Vec<Chapter>,
    static_files: Vec<PathBuf>,
    localizer: Option<Box<dyn ImageLocalizer>>,
    config: PackageConfig,
    state: BuildState,
    staging: StagingDir,
}

impl Book {
    /// Create a book staged in a fresh directory under the system temp dir.
    pub fn new(title: impl Into<String>, format: Format) -> Result<Self> {
        Self::with_staging(title, format, StagingDir::new()?)
    }

    /// Create a book staged in `staging`.
    pub fn with_staging(
        title: impl Into<String>,
        format: Format,
        staging: StagingDir,
    ) -> Result<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }
        Ok(Self {
            title,
            author: None,
            language: "en".to_string(),
            format,
            cover: Cover::Default,
            chapters: Vec::new(),
            static_files: Vec::new(),
            localizer: None,
            config: PackageConfig::default(),
            state: BuildState::Empty,
            staging,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn cover(&self) -> &Cover {
        &self.cover
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn state(&self) -> &BuildState {
        &self.state
    }

    pub fn staging_dir(&self) -> &Path {
        self.staging.path()
    }

    pub fn set_author(&mut self, author: impl Into<String>) -> &mut Self {
        self.author = Some(author.into());
        self
    }

    pub fn set_language(&mut self, language: impl Into<String>) -> &mut Self {
        self.language = language.into();
        self
    }

    pub fn set_package_config(&mut self, config: PackageConfig) -> &mut Self {
        self.config = config;
        self
    }

    /// Download remote images referenced by chapters while staging.
    pub fn enable_image_download(&mut self, config: ImageConfig) -> &mut Self {
        self.set_image_localizer(RemoteImageLocalizer::with_config(config))
    }

    /// Pass chapter content through `localizer` while staging.
    pub fn set_image_localizer(&mut self, localizer: impl ImageLocalizer + 'static) -> &mut Self {
        self.localizer = Some(Box::new(localizer));
        self
    }

    pub fn auto_download_images(&self) -> bool {
        self.localizer.is_some()
    }

    /// Use the image at `path` as the cover, replacing any earlier cover.
    pub fn set_cover_path(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyCover);
        }
        let path = chapter::checked_files([path])?.remove(0);
        self.cover = Cover::Path(path);
        Ok(self)
    }

    /// Use raw image bytes as the cover, replacing any earlier cover.
    pub fn set_cover_content(&mut self, content: impl Into<Vec<u8>>) -> Result<&mut Self> {
        let content = content.into();
        if content.is_empty() {
            return Err(Error::EmptyCover);
        }
        self.cover = Cover::Content(content);
        Ok(self)
    }

    /// Append a top-level chapter.
    pub fn add_chapter(&mut self, chapter: Chapter) -> Result<&mut Self> {
        if !chapter.is_top_chapter() {
            return Err(Error::NotTopLevel {
                title: chapter.title().to_string(),
                level: chapter.level(),
            });
        }
        self.chapters.push(chapter);
        Ok(self)
    }

    /// Create a top-level chapter, append it, and return it.
    pub fn create_chapter(&mut self, title: impl Into<String>) -> Result<&mut Chapter> {
        let index = self.chapters.len();
        self.add_chapter(Chapter::new(title)?)?;
        Ok(&mut self.chapters[index])
    }

    /// Attach files that are staged verbatim next to the chapters.
    pub fn add_static_files<I, P>(&mut self, paths: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let paths = chapter::checked_files(paths)?;
        self.static_files.extend(paths);
        Ok(self)
    }

    /// File name of the packaged book.
    pub fn file_name(&self) -> String {
        format!("{}.{}", format_file_name(&self.title), self.format.extension())
    }

    /// Where the packaged book is written inside the staging directory.
    pub fn artifact_path(&self) -> PathBuf {
        self.staging.path().join(self.file_name())
    }

    /// Numbered navigation entries for the current chapter tree.
    pub fn headings(&self) -> Vec<Heading> {
        toc::build_headings(&self.chapters)
    }

    /// Stage and package the book; returns the artifact path.
    pub fn build(&mut self) -> Result<PathBuf> {
        if self.chapters.is_empty() {
            return Err(Error::EmptyChapterList);
        }
        self.state = BuildState::Empty;

        let manifest = self.generate_all_files()?;
        self.state = BuildState::Staged {
            manifest: manifest.clone(),
        };

        let artifact = self.artifact_path();
        self.config
            .packager(self.format)
            .package(self.staging.path(), &manifest, &artifact)?;
        self.state = BuildState::Packaged {
            artifact: artifact.clone(),
        };
        info!("built {}", artifact.display());
        Ok(artifact)
    }

    /// Build the book and copy it to `dest`.
    pub fn save(&mut self, dest: impl AsRef<Path>) -> Result<()> {
        let artifact = self.build()?;
        let dest = dest.as_ref();
        if is_same_file(dest, &artifact)? {
            return Ok(());
        }
        fs::copy(&artifact, dest)?;
        info!("saved {}", dest.display());
        Ok(())
    }

    /// Build the book and open it with the default viewer; returns the
    /// viewer's exit status.
    pub fn show(&mut self) -> Result<ExitStatus> {
        let artifact = self.build()?;
        export::open_with_default_viewer(&artifact)
    }

    /// Populate the staging directory; returns the manifest file name.
    fn generate_all_files(&self) -> Result<String> {
        let dir = self.staging.path();
        let headings = self.headings();
        // Only files written by this build are listed as assets.
        self.staging.clear()?;

        let cover = self.cover.stage(dir)?;
        let mut staged: HashSet<String> = HashSet::from([
            cover.clone(),
            render::NCX_FILE.to_string(),
            render::TOC_FILE.to_string(),
            render::manifest_file_name(&self.title),
            self.file_name(),
        ]);

        let mut chapters = Vec::new();
        for c in &self.chapters {
            c.walk(&mut chapters);
        }
        for c in chapters {
            staged.insert(self.save_chapter(c)?);
        }
        copy_files(&self.static_files, dir)?;

        let mut assets: Vec<String> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|name| !staged.contains(name))
            .collect();
        assets.sort();

        let info = BookInfo {
            title: &self.title,
            author: self.author.as_deref(),
            language: &self.language,
            cover: Some(&cover),
            assets: &assets,
        };
        let renderer = Renderer::new(dir);
        renderer.render_toc_ncx(&headings, &info)?;
        renderer.render_toc_html(&headings)?;
        renderer.render_opf(&headings, &info)
    }

    /// Write one chapter and its static files; returns the chapter file name.
    fn save_chapter(&self, chapter: &Chapter) -> Result<String> {
        let dir = self.staging.path();
        let content = match &self.localizer {
            Some(localizer) => localizer.localize(chapter.content(), dir)?,
            None => chapter.content().to_string(),
        };
        let file_name = chapter.file_name();
        fs::write(dir.join(&file_name), content)?;
        copy_files(chapter.static_files(), dir)?;
        debug!("staged chapter {file_name}");
        Ok(file_name)
    }
}

/// Whether `a` and `b` name the same file, however they are spelled.
fn is_same_file(a: &Path, b: &Path) -> Result<bool> {
    if a == b {
        return Ok(true);
    }
    if !a.exists() {
        return Ok(false);
    }
    Ok(fs::canonicalize(a)? == fs::canonicalize(b)?)
}

fn copy_files(files: &[PathBuf], dir: &Path) -> Result<()> {
    for f in files {
        let name = f
            .file_name()
            .ok_or_else(|| Error::MissingFile(f.clone()))?;
        fs::copy(f, dir.join(name))?;
    }
    Ok(())
}
