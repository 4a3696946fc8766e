//! Object stores the knowledge base document can be read from

use crate::error::RouterError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

/// Read-only access to a keyed document store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Human-readable location, used in logs
    fn location(&self) -> String;
    async fn fetch(&self, key: &str) -> Result<String>;
}

/// Pick a backend from a location string.
///
/// `http://` and `https://` locations are fetched over HTTP; anything else
/// (optionally prefixed with `file://`) is a directory on disk.
pub fn open_store(location: &str, timeout: Duration) -> Result<Box<dyn ObjectStore>> {
    let location = location.trim();
    if location.is_empty() {
        return Err(RouterError::Config("KB_BUCKET not set.".to_string()));
    }

    if location.starts_with("http://") || location.starts_with("https://") {
        return Ok(Box::new(HttpObjectStore::new(location, timeout)?));
    }

    let dir = location.strip_prefix("file://").unwrap_or(location);
    Ok(Box::new(FsObjectStore::new(dir)))
}

//
// ================= HTTP =================
//

pub struct HttpObjectStore {
    client: Client,
    base_url: String,
}

impl HttpObjectStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(4)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    fn location(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch(&self, key: &str) -> Result<String> {
        let url = self.object_url(key);
        debug!(%url, "Fetching knowledge base object");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RouterError::service(
                "object store",
                format!("{} returned {}", url, status),
            ));
        }

        let bytes = response.bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| RouterError::service("object store", format!("{} is not UTF-8: {}", url, e)))
    }
}

//
// ================= Filesystem =================
//

pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    fn location(&self) -> String {
        self.root.display().to_string()
    }

    async fn fetch(&self, key: &str) -> Result<String> {
        let path = self.root.join(key.trim_start_matches('/'));
        debug!(path = %path.display(), "Reading knowledge base object");
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}
