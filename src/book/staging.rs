use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use tempfile::TempDir;

const PREFIX: &str = "ebookmaker-";

/// Working directory where a book's files are assembled before packaging.
///
/// The directory is exclusively owned and is removed, recursively, when the
/// value is dropped.
#[derive(Debug)]
pub struct StagingDir {
    dir: TempDir,
}

impl StagingDir {
    /// Allocate a uniquely named directory under the system temp dir.
    pub fn new() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(PREFIX).tempdir()?;
        debug!("allocated staging directory {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Allocate a uniquely named directory under `parent`.
    pub fn new_in<P: AsRef<Path>>(parent: P) -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix(PREFIX).tempdir_in(parent)?;
        debug!("allocated staging directory {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove everything inside the directory, keeping the directory itself.
    pub(crate) fn clear(&self) -> io::Result<()> {
        for entry in fs::read_dir(self.path())? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        debug!("removing staging directory {}", self.dir.path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_staging_dirs_are_unique() {
        let a = StagingDir::new().unwrap();
        let b = StagingDir::new().unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().is_dir());
    }

    #[test]
    fn test_staging_dir_removed_on_drop() {
        let parent = tempfile::tempdir().unwrap();
        let staging = StagingDir::new_in(parent.path()).unwrap();
        let path = staging.path().to_path_buf();
        std::fs::create_dir(path.join("nested")).unwrap();
        std::fs::write(path.join("nested/file.txt"), b"x").unwrap();

        drop(staging);
        assert!(!path.exists());
    }

    #[test]
    fn test_clear_keeps_directory() {
        let staging = StagingDir::new().unwrap();
        let path = staging.path();
        std::fs::create_dir(path.join("nested")).unwrap();
        std::fs::write(path.join("nested/file.txt"), b"x").unwrap();
        std::fs::write(path.join("top.html"), b"x").unwrap();

        staging.clear().unwrap();
        assert!(path.is_dir());
        assert_eq!(std::fs::read_dir(path).unwrap().count(), 0);
    }
}
