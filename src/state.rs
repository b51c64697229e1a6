use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};

use anyhow::Context;

use crate::color::DigitPalette;
use crate::config::MnistConfig;
use crate::data::fetch::{CachedFetcher, DirectoryFetcher, Fetch, HttpFetcher};
use crate::data::loader;
use crate::data::model::MnistDataset;
use crate::data::slice::clamp_range;

pub const DEFAULT_GALLERY_START: usize = 1_000;
pub const DEFAULT_GALLERY_SIZE: usize = 50;

// ---------------------------------------------------------------------------
// Where a load reads from
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum LoadSource {
    /// The configured URLs, through the byte cache when one is configured.
    Remote,
    /// A local folder holding `mnist_images.png` and `mnist_labels_uint8`.
    Folder(PathBuf),
}

impl LoadSource {
    fn fetcher(&self, config: &MnistConfig) -> Box<dyn Fetch + Send> {
        match (self, &config.cache_dir) {
            (LoadSource::Folder(dir), _) => Box::new(DirectoryFetcher::new(dir.clone())),
            (LoadSource::Remote, Some(cache)) => {
                Box::new(CachedFetcher::new(HttpFetcher::default(), cache.clone()))
            }
            (LoadSource::Remote, None) => Box::new(HttpFetcher::default()),
        }
    }

    fn describe(&self, config: &MnistConfig) -> String {
        match self {
            LoadSource::Remote => config.images_url.clone(),
            LoadSource::Folder(dir) => dir.display().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: MnistConfig,

    /// Full dataset (None until the first load finishes).
    pub dataset: Option<Arc<MnistDataset>>,

    /// The slice currently shown in the gallery.
    pub gallery: Option<MnistDataset>,

    /// First sample of the gallery slice.
    pub start: usize,

    /// Number of samples in the gallery slice.
    pub size: usize,

    /// Bumped every time `gallery` is replaced.
    pub gallery_version: u64,

    pub palette: DigitPalette,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a load is in progress.
    pub loading: bool,

    pending: Option<Receiver<anyhow::Result<MnistDataset>>>,
}

impl AppState {
    pub fn new(config: MnistConfig) -> Self {
        Self {
            config,
            dataset: None,
            gallery: None,
            start: DEFAULT_GALLERY_START,
            size: DEFAULT_GALLERY_SIZE,
            gallery_version: 0,
            palette: DigitPalette::default(),
            status_message: None,
            loading: false,
            pending: None,
        }
    }

    /// Load the dataset on a worker thread. The result is picked up by
    /// [`poll_load`](Self::poll_load). A load already in flight is
    /// abandoned.
    pub fn start_load(&mut self, source: LoadSource) {
        let (tx, rx) = mpsc::channel();
        let config = self.config.clone();

        std::thread::spawn(move || {
            let fetcher = source.fetcher(&config);
            let result = loader::load(&config, &fetcher)
                .with_context(|| format!("loading MNIST from {}", source.describe(&config)));
            // The receiver is gone if a newer load replaced this one.
            let _ = tx.send(result);
        });

        self.pending = Some(rx);
        self.loading = true;
        self.status_message = None;
    }

    /// Collect a finished background load, if any. Returns `true` when the
    /// state changed.
    pub fn poll_load(&mut self) -> bool {
        let Some(rx) = &self.pending else {
            return false;
        };

        let outcome = match rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(anyhow::anyhow!("loader thread exited")),
        };
        self.pending = None;
        self.loading = false;

        match outcome {
            Ok(dataset) => {
                log::info!("MNIST dataset loaded: {} samples", dataset.len());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
        true
    }

    /// Ingest a newly loaded dataset and rebuild the gallery slice.
    pub fn set_dataset(&mut self, dataset: MnistDataset) {
        self.dataset = Some(Arc::new(dataset));
        self.status_message = None;
        self.reslice();
    }

    /// Move the gallery window; out-of-range values are clamped.
    pub fn set_range(&mut self, start: usize, size: usize) {
        self.start = start;
        self.size = size;
        self.reslice();
    }

    fn reslice(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };

        let (start, size) = clamp_range(dataset.len(), self.start, self.size);
        self.start = start;
        self.size = size;

        match dataset.slice(start, size) {
            Ok(gallery) => {
                log::debug!("Gallery shows samples {start}..{}", start + size);
                self.gallery = Some(gallery);
            }
            Err(e) => {
                log::error!("Failed to slice dataset: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.gallery = None;
            }
        }
        self.gallery_version += 1;
    }
}
