//! EPUB packager.
//!
//! Zips a staged book directory into an EPUB container.

use std::fs::{self, File};
use std::io::{Seek, Write};
use std::path::Path;

use log::info;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use super::Packager;
use crate::error::Result;

/// Configuration for EPUB packaging.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EpubConfig {
    /// Compression level for deflate (0-9, default 6).
    pub compression_level: Option<u32>,
}

/// EPUB format packager.
///
/// Every file in the staging directory lands in the archive under its path
/// relative to the directory, after the `mimetype` and `container.xml`
/// entries the EPUB container requires. Entries are written in sorted path
/// order with a fixed timestamp, so the same staged files always produce the
/// same bytes.
#[derive(Debug, Clone, Default)]
pub struct EpubPackager {
    config: EpubConfig,
}

impl EpubPackager {
    /// Create a new packager with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the packager with custom settings.
    pub fn with_config(mut self, config: EpubConfig) -> Self {
        self.config = config;
        self
    }

    /// Write the staged tree under `staging` to `writer`, skipping `exclude`.
    pub fn write_to<W: Write + Seek>(
        &self,
        staging: &Path,
        manifest: &str,
        exclude: Option<&Path>,
        writer: W,
    ) -> Result<()> {
        let mut zip = ZipWriter::new(writer);

        let compression_level = self.config.compression_level.unwrap_or(6);
        let stored = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(DateTime::default());
        let deflated = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(compression_level as i64))
            .last_modified_time(DateTime::default());

        // 1. Write mimetype (must be first, uncompressed)
        zip.start_file("mimetype", stored)?;
        zip.write_all(b"application/epub+zip")?;

        // 2. Write container.xml
        zip.start_file("META-INF/container.xml", deflated)?;
        zip.write_all(container_xml(manifest).as_bytes())?;

        // 3. Write the staged files
        for entry in WalkDir::new(staging).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() || Some(entry.path()) == exclude {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(staging) else {
                continue;
            };
            let name = zip_path(relative);
            zip.start_file(name.as_str(), deflated)?;
            zip.write_all(&fs::read(entry.path())?)?;
            info!("zip file {name}");
        }

        zip.finish()?;
        Ok(())
    }
}

impl Packager for EpubPackager {
    fn package(&self, staging: &Path, manifest: &str, artifact: &Path) -> Result<()> {
        let file = File::create(artifact)?;
        self.write_to(staging, manifest, Some(artifact), file)
    }
}

/// Container.xml pointing at the manifest.
fn container_xml(manifest: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#,
        quick_xml::escape::escape(manifest)
    )
}

/// Relative path with forward slashes, as ZIP entries expect.
fn zip_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    #[test]
    fn test_zip_path() {
        assert_eq!(zip_path(Path::new("a/b/c.html")), "a/b/c.html");
        assert_eq!(zip_path(Path::new("c.html")), "c.html");
    }

    #[test]
    fn test_container_xml_points_at_manifest() {
        let xml = container_xml("My&Book.opf");
        assert!(xml.contains("full-path=\"My&amp;Book.opf\""));
    }

    #[test]
    fn test_write_to_preserves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.html"), "<p>b</p>").unwrap();
        fs::create_dir(dir.path().join("img")).unwrap();
        fs::write(dir.path().join("img/a.png"), b"png").unwrap();
        fs::write(dir.path().join("skip.epub"), b"old").unwrap();

        let mut out = Cursor::new(Vec::new());
        EpubPackager::new()
            .write_to(
                dir.path(),
                "T.opf",
                Some(dir.path().join("skip.epub").as_path()),
                &mut out,
            )
            .unwrap();

        let mut archive = ZipArchive::new(out).unwrap();
        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        assert_eq!(names[0], "mimetype");
        assert!(names.contains(&"META-INF/container.xml".to_string()));
        assert!(names.contains(&"img/a.png".to_string()));
        assert!(!names.iter().any(|n| n.ends_with(".epub")));

        let mut body = String::new();
        archive
            .by_name("b.html")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "<p>b</p>");

        let mimetype = archive.by_name("mimetype").unwrap();
        assert_eq!(mimetype.compression(), CompressionMethod::Stored);
    }
}
