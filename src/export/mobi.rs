//! MOBI packager.
//!
//! Kindle books are produced by an external converter (kindlegen) run against
//! the staged manifest; the converter writes `<manifest stem>.mobi` next to it.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use log::{info, warn};

use super::Packager;
use crate::error::{Error, Result};

/// Configuration for MOBI packaging.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MobiConfig {
    /// Converter executable, resolved through `PATH` when not absolute.
    pub converter: PathBuf,
}

impl Default for MobiConfig {
    fn default() -> Self {
        Self {
            converter: PathBuf::from("kindlegen"),
        }
    }
}

/// MOBI format packager.
#[derive(Debug, Clone, Default)]
pub struct MobiPackager {
    config: MobiConfig,
}

impl MobiPackager {
    /// Create a new packager with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the packager with custom settings.
    pub fn with_config(mut self, config: MobiConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the converter on `manifest` and return its exit status.
    ///
    /// Fails only when the converter cannot be started.
    pub fn convert(&self, manifest: &Path) -> Result<ExitStatus> {
        let tool = self.config.converter.display().to_string();
        info!("running {tool} on {}", manifest.display());
        Command::new(&self.config.converter)
            .arg("-dont_append_source")
            .arg(manifest)
            .status()
            .map_err(|source| Error::ExternalTool { tool, source })
    }
}

impl Packager for MobiPackager {
    fn package(&self, staging: &Path, manifest: &str, artifact: &Path) -> Result<()> {
        let status = self.convert(&staging.join(manifest))?;
        // kindlegen also exits non-zero on warnings.
        // TODO: return an error once warnings and errors can be told apart.
        if !status.success() {
            warn!(
                "{} exited with {status}; {} may be missing or incomplete",
                self.config.converter.display(),
                artifact.display()
            );
        }
        Ok(())
    }
}
