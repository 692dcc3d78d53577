//! Where cache misses are fetched from

use std::path::PathBuf;
use std::time::Duration;

/// Timeout for a single asset request
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("{path}: network unreachable: {message}")]
    Unreachable { path: String, message: String },
    #[error("{path}: HTTP {status}")]
    Status { path: String, status: u16 },
    #[error("{0}: not found")]
    NotFound(String),
}

/// A source of asset bodies keyed by request path
pub trait Network {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

/// Fetches request paths relative to an http(s) origin
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    base_url: String,
}

impl HttpNetwork {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn fetch_async(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let unreachable = |e: reqwest::Error| FetchError::Unreachable {
            path: path.to_string(),
            message: e.to_string(),
        };

        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(unreachable)?;
        let response = client
            .get(self.url_for(path))
            .send()
            .await
            .map_err(unreachable)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(unreachable)?;
        Ok(body.to_vec())
    }
}

impl Network for HttpNetwork {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        // Create a runtime for this single async operation
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| FetchError::Unreachable {
                path: path.to_string(),
                message: format!("failed to create runtime: {}", e),
            })?;

        rt.block_on(self.fetch_async(path))
    }
}

/// Serves request paths from a local directory, e.g. a checkout of the site
///
/// Paths ending in `/` serve that directory's `index.html`.
#[derive(Debug, Clone)]
pub struct DirNetwork {
    root: PathBuf,
}

impl DirNetwork {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Network for DirNetwork {
    fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let mut file = self.root.join(path.trim_start_matches('/'));
        if path.is_empty() || path.ends_with('/') {
            file.push("index.html");
        }
        std::fs::read(&file).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound(path.to_string()),
            _ => FetchError::Unreachable {
                path: path.to_string(),
                message: e.to_string(),
            },
        })
    }
}
