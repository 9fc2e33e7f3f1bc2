use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::error::{Error, Result};

const DEFAULT_COVER_SIZE: (u32, u32) = (600, 800);
const DEFAULT_COVER_COLOR: Rgb<u8> = Rgb([0x3b, 0x4a, 0x5c]);

/// Source of the cover image.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cover {
    /// Generated plain cover.
    #[default]
    Default,
    /// Image file on disk.
    Path(PathBuf),
    /// Raw image bytes. Not supported by the build yet.
    Content(Vec<u8>),
}

impl Cover {
    /// Write the cover into `dir`; returns the staged file name.
    pub(crate) fn stage(&self, dir: &Path) -> Result<String> {
        match self {
            Cover::Path(path) => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("jpg")
                    .to_lowercase();
                let name = format!("cover.{ext}");
                fs::copy(path, dir.join(&name))?;
                Ok(name)
            }
            Cover::Content(_) => Err(Error::Unsupported("cover from raw content".to_string())),
            Cover::Default => {
                let name = "cover.jpg".to_string();
                fs::write(dir.join(&name), default_cover()?)?;
                Ok(name)
            }
        }
    }
}

/// A plain JPEG cover, identical on every call.
fn default_cover() -> Result<Vec<u8>> {
    let (width, height) = DEFAULT_COVER_SIZE;
    let img = RgbImage::from_pixel(width, height, DEFAULT_COVER_COLOR);
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img).write_to(&mut out, ImageFormat::Jpeg)?;
    Ok(out.into_inner())
}
