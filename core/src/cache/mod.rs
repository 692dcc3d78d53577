//! Named on-disk asset cache
//!
//! Assets are stored under `<root>/<name>/`, one file per request path, named
//! by the SHA-256 hex digest of the exact path string. Lookups are exact: no
//! query stripping, no versioning, no expiry.
//!
//! [`OfflineCache::install`] is all-or-nothing: every asset is fetched before
//! anything is written, and a failed write removes the entries written so
//! far. [`OfflineCache::fetch`] is cache-first and does not
//! store what it fetches on a miss.

mod network;


use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

pub use network::{DirNetwork, FetchError, HttpNetwork, Network};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl CacheError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Cache file name for a request path
pub fn cache_key(request_path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request_path.as_bytes());
    hex::encode(hasher.finalize())
}

/// Default cache root (`<data dir>/cache`)
pub fn default_root() -> Option<PathBuf> {
    crate::config::data_dir().map(|dir| dir.join("cache"))
}

/// Write through a staging file so a reader never sees a partial entry
fn write_entry(entry: &Path, body: &[u8]) -> Result<(), CacheError> {
    let staging = entry.with_extension("partial");
    std::fs::write(&staging, body).map_err(|e| CacheError::io(&staging, e))?;
    std::fs::rename(&staging, entry).map_err(|e| {
        let _ = std::fs::remove_file(&staging);
        CacheError::io(entry, e)
    })
}

#[derive(Debug, Clone)]
pub struct OfflineCache {
    name: String,
    dir: PathBuf,
}

impl OfflineCache {
    /// Address the cache `name` under `root`; nothing is created until install
    pub fn open(root: &Path, name: &str) -> Self {
        let dir_name: String = name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        Self {
            name: name.to_string(),
            dir: root.join(dir_name),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, request_path: &str) -> PathBuf {
        self.dir.join(cache_key(request_path))
    }

    /// Fetch every asset and store them, or store nothing
    ///
    /// Returns the number of assets written.
    pub fn install<N: Network + ?Sized>(
        &self,
        assets: &[String],
        network: &N,
    ) -> Result<usize, CacheError> {
        let bodies = assets
            .iter()
            .map(|path| network.fetch(path).map(|body| (path, body)))
            .collect::<Result<Vec<_>, _>>()?;

        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::io(&self.dir, e))?;

        let mut written = Vec::with_capacity(bodies.len());
        for (path, body) in &bodies {
            let entry = self.entry_path(path);
            if let Err(e) = write_entry(&entry, body) {
                // Roll back this install's entries
                for entry in &written {
                    let _ = std::fs::remove_file(entry);
                }
                tracing::warn!("Install into cache '{}' failed: {}", self.name, e);
                return Err(e);
            }
            tracing::debug!("Cached {} ({} bytes)", path, body.len());
            written.push(entry);
        }

        tracing::info!("Installed {} assets into cache '{}'", bodies.len(), self.name);
        Ok(bodies.len())
    }

    /// Cached body for an exact request path
    pub fn lookup(&self, request_path: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entry = self.entry_path(request_path);
        match std::fs::read(&entry) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(&entry, e)),
        }
    }

    pub fn contains(&self, request_path: &str) -> bool {
        self.entry_path(request_path).is_file()
    }

    /// Serve from the cache, falling through to the network on a miss
    pub fn fetch<N: Network + ?Sized>(
        &self,
        request_path: &str,
        network: &N,
    ) -> Result<Vec<u8>, CacheError> {
        if let Some(body) = self.lookup(request_path)? {
            tracing::debug!("Cache hit: {}", request_path);
            return Ok(body);
        }
        tracing::debug!("Cache miss: {}", request_path);
        Ok(network.fetch(request_path)?)
    }
}
