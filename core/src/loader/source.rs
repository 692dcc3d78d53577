//! Where module bytes come from

use std::fmt;
use std::path::{Path, PathBuf};

use futures_util::{Stream, TryStreamExt};

use super::LoadError;

/// Byte source of a computation module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSource {
    Path(PathBuf),
    Url(String),
    Bytes(Vec<u8>),
}

impl ModuleSource {
    /// Interpret a manifest `module` entry
    ///
    /// `http://` and `https://` locations are fetched over the network;
    /// anything else is a path relative to `base_dir`.
    pub fn resolve(location: &str, base_dir: &Path) -> Self {
        if is_url(location) {
            Self::Url(location.to_string())
        } else {
            Self::Path(base_dir.join(location))
        }
    }
}

impl fmt::Display for ModuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
            Self::Bytes(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

pub(crate) fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Start an HTTP download and return its body as a chunk stream
///
/// A non-success status is a network error; the body is not read.
pub async fn fetch_module_stream(
    url: &str,
) -> Result<impl Stream<Item = Result<impl AsRef<[u8]>, LoadError>>, LoadError> {
    let network = |message: String| LoadError::Network {
        location: url.to_string(),
        message,
    };

    let response = reqwest::get(url).await.map_err(|e| network(e.to_string()))?;
    if !response.status().is_success() {
        return Err(network(format!("HTTP {}", response.status())));
    }

    let location = url.to_string();
    Ok(response.bytes_stream().map_err(move |e| LoadError::Network {
        location: location.clone(),
        message: e.to_string(),
    }))
}
