//! Remote image localization.
//!
//! Chapter HTML may reference images by `http(s)` URL. When auto-download is
//! enabled the book passes each chapter through an [`ImageLocalizer`] before
//! staging it: images are fetched, shrunk, saved next to the chapter, and the
//! HTML is rewritten to point at the local copy.

use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use image::{DynamicImage, ImageFormat};
use log::info;
use regex::Regex;

use crate::error::Result;
use crate::util::format_file_name;

static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img\b[^>]*?\bsrc\s*=\s*"(https?://[^"]+)""#).expect("valid img pattern")
});

/// Rewrites chapter HTML so that it references local copies of its images.
pub trait ImageLocalizer {
    /// Save any referenced images into `dest_dir` and return the rewritten
    /// HTML.
    fn localize(&self, content: &str, dest_dir: &Path) -> Result<String>;
}

/// Image download and resize settings.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ImageConfig {
    /// Images at or below this width are kept at their original size.
    pub min_width: u32,
    /// Images at or below this height are kept at their original size.
    pub min_height: u32,
    /// Scale applied to larger images, clamped so they stay above the minimums.
    pub ratio: f64,
    /// Per-request network timeout.
    #[cfg_attr(feature = "serde", serde(with = "secs"))]
    pub timeout: Duration,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            min_width: 500,
            min_height: 500,
            ratio: 1.0,
            timeout: Duration::from_secs(20),
        }
    }
}

impl ImageConfig {
    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_width = width;
        self.min_height = height;
        self
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(feature = "serde")]
mod secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

/// Bounding box to shrink a `width` x `height` image into, or `None` to keep
/// it as is.
///
/// Images already at or below either minimum are left alone. Otherwise both
/// sides are scaled by `ratio`, then pushed back up so neither drops below
/// its minimum.
pub fn fit_dimensions(width: u32, height: u32, config: &ImageConfig) -> Option<(u32, u32)> {
    if width <= config.min_width || height <= config.min_height {
        return None;
    }

    let mut w = (f64::from(width) * config.ratio) as u32;
    let mut h = (f64::from(height) * config.ratio) as u32;
    if w < config.min_width {
        h = (f64::from(h) * f64::from(config.min_width) / f64::from(w.max(1))) as u32;
        w = config.min_width;
    }
    if h < config.min_height {
        w = (f64::from(w) * f64::from(config.min_height) / f64::from(h.max(1))) as u32;
        h = config.min_height;
    }
    Some((w, h))
}

/// Remote `img` sources in `content`, in document order.
pub fn image_urls(content: &str) -> Vec<&str> {
    IMG_SRC
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Fetches images over HTTP.
pub struct RemoteImageLocalizer {
    config: ImageConfig,
    agent: ureq::Agent,
}

impl RemoteImageLocalizer {
    pub fn new() -> Self {
        Self::with_config(ImageConfig::default())
    }

    pub fn with_config(config: ImageConfig) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Self { config, agent }
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.agent.get(url).call().map_err(Box::new)?;
        let mut bytes = Vec::new();
        response.into_reader().read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl Default for RemoteImageLocalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLocalizer for RemoteImageLocalizer {
    fn localize(&self, content: &str, dest_dir: &Path) -> Result<String> {
        let mut rewritten = content.to_string();
        for url in image_urls(content) {
            let bytes = self.fetch(url)?;
            let file_name = save_image(&bytes, url, dest_dir, &self.config)?;
            info!("download image {url}");
            rewritten = rewritten.replace(url, &format!("./{file_name}"));
        }
        Ok(rewritten)
    }
}

/// Decode `bytes`, shrink per `config`, and save under a name derived from
/// `url`, keeping the original format. Returns the file name.
pub fn save_image(bytes: &[u8], url: &str, dest_dir: &Path, config: &ImageConfig) -> Result<String> {
    let format = image::guess_format(bytes)?;
    let img = image::load_from_memory_with_format(bytes, format)?;
    let file_name = local_file_name(url, format);

    let img = match fit_dimensions(img.width(), img.height(), config) {
        Some((w, h)) => img.thumbnail(w, h),
        None => img,
    };
    write_image(&img, &dest_dir.join(&file_name), format)?;
    Ok(file_name)
}

fn write_image(img: &DynamicImage, path: &Path, format: ImageFormat) -> Result<()> {
    // JPEG has no alpha channel.
    if format == ImageFormat::Jpeg {
        DynamicImage::ImageRgb8(img.to_rgb8()).save_with_format(path, format)?;
    } else {
        img.save_with_format(path, format)?;
    }
    Ok(())
}

fn local_file_name(url: &str, format: ImageFormat) -> String {
    let ext = format.extensions_str().first().copied().unwrap_or("png");
    format!("{}.{ext}", format_file_name(url))
}
