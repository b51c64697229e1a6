use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Well-known source locations
// ---------------------------------------------------------------------------

pub const MNIST_IMAGES_URL: &str =
    "https://storage.googleapis.com/learnjs-data/model-builder/mnist_images.png";
pub const MNIST_LABELS_URL: &str =
    "https://storage.googleapis.com/learnjs-data/model-builder/mnist_labels_uint8";

/// Number of digit classes, i.e. the width of one one-hot label group.
pub const NUM_CLASSES: usize = 10;

// ---------------------------------------------------------------------------
// Dataset geometry
// ---------------------------------------------------------------------------

/// Geometry of the packed dataset: how many images and how big each one is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MnistShape {
    pub count: usize,
    pub image_width: usize,
    pub image_height: usize,
}

impl Default for MnistShape {
    fn default() -> Self {
        Self {
            count: 65_000,
            image_width: 28,
            image_height: 28,
        }
    }
}

impl MnistShape {
    /// Pixels in one image, `None` on overflow.
    pub fn image_size(&self) -> Option<usize> {
        self.image_width.checked_mul(self.image_height)
    }

    /// Pixels in the whole sprite sheet, `None` on overflow.
    pub fn total_pixels(&self) -> Option<usize> {
        self.count.checked_mul(self.image_size()?)
    }
}

// ---------------------------------------------------------------------------
// Loader configuration
// ---------------------------------------------------------------------------

/// Everything the loader needs, passed in explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MnistConfig {
    pub images_url: String,
    pub labels_url: String,
    pub shape: MnistShape,
    /// Height of one decode band, in sprite-sheet pixel rows.
    pub window_height: u32,
    /// Raw byte cache location. `None` disables caching.
    pub cache_dir: Option<PathBuf>,
}

impl Default for MnistConfig {
    fn default() -> Self {
        Self {
            images_url: MNIST_IMAGES_URL.to_string(),
            labels_url: MNIST_LABELS_URL.to_string(),
            shape: MnistShape::default(),
            window_height: 5_000,
            cache_dir: Some(std::env::temp_dir().join("mnist-gallery")),
        }
    }
}

impl MnistConfig {
    /// Defaults overridden by `MNIST_*` environment variables.
    ///
    /// * `MNIST_IMAGES_URL`, `MNIST_LABELS_URL` – source locations
    /// * `MNIST_COUNT` – number of images in the sheet
    /// * `MNIST_WINDOW_HEIGHT` – decode band height
    /// * `MNIST_CACHE_DIR` – cache directory, or `off` to disable caching
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("MNIST_IMAGES_URL") {
            config.images_url = url;
        }
        if let Some(url) = lookup("MNIST_LABELS_URL") {
            config.labels_url = url;
        }
        if let Some(count) = parse_var(&lookup, "MNIST_COUNT") {
            config.shape.count = count;
        }
        if let Some(height) = parse_var(&lookup, "MNIST_WINDOW_HEIGHT") {
            config.window_height = height;
        }
        match lookup("MNIST_CACHE_DIR").as_deref() {
            Some("off") | Some("") => config.cache_dir = None,
            Some(dir) => config.cache_dir = Some(PathBuf::from(dir)),
            None => {}
        }

        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("Ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}
