use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{MnistError, Result};

// ---------------------------------------------------------------------------
// Fetch – where the raw bytes come from
// ---------------------------------------------------------------------------

/// Produces the raw bytes behind a location (URL or file name).
///
/// Implementations must be `Sync`: the loader fetches both source files
/// from two threads at once.
pub trait Fetch: Sync {
    fn fetch(&self, location: &str) -> Result<Vec<u8>>;
}

impl<F: Fetch + ?Sized> Fetch for &F {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        (**self).fetch(location)
    }
}

impl<F: Fetch + ?Sized> Fetch for Box<F> {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        (**self).fetch(location)
    }
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Plain blocking HTTP GET. No retries.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(Duration::from_secs(15))
                .timeout_read(Duration::from_secs(120))
                .build(),
        }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        log::info!("Downloading {location}");
        let response = self
            .agent
            .get(location)
            .call()
            .map_err(|e| MnistError::fetch(location, e))?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| MnistError::fetch(location, e))?;

        log::debug!("Downloaded {} bytes from {location}", bytes.len());
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Local directory
// ---------------------------------------------------------------------------

/// Serves each location from `dir/<last path segment>`, so the well-known
/// URLs resolve to `mnist_images.png` and `mnist_labels_uint8` on disk.
pub struct DirectoryFetcher {
    dir: PathBuf,
}

impl DirectoryFetcher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        let without_query = location.split(['?', '#']).next().unwrap_or(location);
        let file_name = without_query.rsplit('/').next().unwrap_or(without_query);
        self.dir.join(file_name)
    }
}

impl Fetch for DirectoryFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let path = self.resolve(location);
        log::info!("Reading {}", path.display());
        std::fs::read(&path).map_err(|e| MnistError::fetch(&path.display().to_string(), e))
    }
}

// ---------------------------------------------------------------------------
// Byte cache keyed by location
// ---------------------------------------------------------------------------

const INDEX_FILE: &str = "index.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheIndex {
    entries: BTreeMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    file: String,
    len: u64,
}

/// Transparent on-disk cache in front of another fetcher.
///
/// Entries are listed in `index.json`; an entry whose file is missing or has
/// the wrong length is treated as a miss. Failing to write the cache never
/// fails the fetch.
pub struct CachedFetcher<F> {
    inner: F,
    dir: PathBuf,
    index: Mutex<CacheIndex>,
}

impl<F: Fetch> CachedFetcher<F> {
    pub fn new(inner: F, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let index = read_index(&dir).unwrap_or_default();
        Self {
            inner,
            dir,
            index: Mutex::new(index),
        }
    }

    fn lookup(&self, location: &str) -> Option<Vec<u8>> {
        let entry = self.index.lock().ok()?.entries.get(location).cloned()?;
        let bytes = std::fs::read(self.dir.join(&entry.file)).ok()?;
        (bytes.len() as u64 == entry.len).then_some(bytes)
    }

    fn store(&self, location: &str, bytes: &[u8]) -> Result<()> {
        let mut index = self
            .index
            .lock()
            .map_err(|_| std::io::Error::other("cache index lock poisoned"))?;
        std::fs::create_dir_all(&self.dir)?;

        let file = match index.entries.get(location) {
            Some(entry) => entry.file.clone(),
            None => format!("entry-{}.bin", index.entries.len()),
        };
        std::fs::write(self.dir.join(&file), bytes)?;
        index.entries.insert(
            location.to_string(),
            CacheEntry {
                file,
                len: bytes.len() as u64,
            },
        );

        let text = serde_json::to_vec_pretty(&*index).map_err(std::io::Error::from)?;
        std::fs::write(self.dir.join(INDEX_FILE), text)?;
        Ok(())
    }
}

fn read_index(dir: &Path) -> Option<CacheIndex> {
    let text = std::fs::read(dir.join(INDEX_FILE)).ok()?;
    match serde_json::from_slice(&text) {
        Ok(index) => Some(index),
        Err(e) => {
            log::warn!("Ignoring unreadable cache index in {}: {e}", dir.display());
            None
        }
    }
}

impl<F: Fetch> Fetch for CachedFetcher<F> {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        if let Some(bytes) = self.lookup(location) {
            log::debug!("Cache hit for {location} ({} bytes)", bytes.len());
            return Ok(bytes);
        }
        log::debug!("Cache miss for {location}");

        let bytes = self.inner.fetch(location)?;
        if let Err(e) = self.store(location, &bytes) {
            log::warn!("Could not cache {location} in {}: {e}", self.dir.display());
        }
        Ok(bytes)
    }
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) struct MemoryFetcher {
    files: std::collections::HashMap<String, Vec<u8>>,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemoryFetcher {
    pub fn new(files: &[(&str, Vec<u8>)]) -> Self {
        Self {
            files: files
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            calls: Default::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl Fetch for MemoryFetcher {
    fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| MnistError::fetch(location, "404 not found"))
    }
}
