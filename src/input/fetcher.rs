//! Document retrieval over HTTP or from the local filesystem

use crate::config::FetchConfig;
use crate::error::{CvMatcherError, Result};
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Raw bytes of a CV plus whatever the source declared about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub location: String,
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Retrieves a document by location.
pub trait DocumentFetcher: Send + Sync {
    fn fetch(&self, location: &str) -> impl Future<Output = Result<FetchedDocument>> + Send;
}

fn fetch_error(location: &str, reason: impl Into<String>) -> CvMatcherError {
    CvMatcherError::Fetch {
        location: location.to_string(),
        reason: reason.into(),
    }
}

fn is_http(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// ---------------------------------------------------------------------------
// HTTP
// ---------------------------------------------------------------------------

/// Plain GET with no auth headers. Timeout and size cap come from config.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
    max_bytes: Option<u64>,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CvMatcherError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout_secs,
            max_bytes: config.size_limit(),
        })
    }

    fn too_large(&self, location: &str, limit: u64) -> CvMatcherError {
        CvMatcherError::DocumentTooLarge {
            location: location.to_string(),
            limit,
        }
    }
}

impl DocumentFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<FetchedDocument> {
        let url = Url::parse(location).map_err(|e| fetch_error(location, format!("invalid URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(fetch_error(
                location,
                format!("URL scheme '{}' is not supported", url.scheme()),
            ));
        }

        debug!("Downloading CV from {}", location);
        let map_send_error = |e: reqwest::Error| {
            if e.is_timeout() {
                CvMatcherError::FetchTimeout {
                    location: location.to_string(),
                    secs: self.timeout_secs,
                }
            } else {
                fetch_error(location, e.to_string())
            }
        };

        let mut response = self.client.get(url).send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(location, format!("status {}", status.as_u16())));
        }

        if let (Some(limit), Some(declared)) = (self.max_bytes, response.content_length()) {
            if declared > limit {
                return Err(self.too_large(location, limit));
            }
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(map_send_error)? {
            bytes.extend_from_slice(&chunk);
            if let Some(limit) = self.max_bytes {
                if bytes.len() as u64 > limit {
                    return Err(self.too_large(location, limit));
                }
            }
        }

        info!("Downloaded {} bytes from {}", bytes.len(), location);
        Ok(FetchedDocument {
            location: location.to_string(),
            bytes,
            content_type,
        })
    }
}

// ---------------------------------------------------------------------------
// Local files
// ---------------------------------------------------------------------------

/// Reads CVs from disk; accepts bare paths and `file://` URLs.
#[derive(Debug, Clone, Default)]
pub struct LocalFileFetcher {
    max_bytes: Option<u64>,
}

impl LocalFileFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            max_bytes: config.size_limit(),
        }
    }

    fn resolve(location: &str) -> Result<PathBuf> {
        if location.starts_with("file://") {
            let url = Url::parse(location).map_err(|e| fetch_error(location, format!("invalid file URL: {}", e)))?;
            url.to_file_path()
                .map_err(|_| fetch_error(location, "file URL does not name a local path"))
        } else {
            Ok(PathBuf::from(location))
        }
    }
}

impl DocumentFetcher for LocalFileFetcher {
    async fn fetch(&self, location: &str) -> Result<FetchedDocument> {
        let path = Self::resolve(location)?;

        if let Some(limit) = self.max_bytes {
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|e| fetch_error(location, e.to_string()))?;
            if metadata.len() > limit {
                return Err(CvMatcherError::DocumentTooLarge {
                    location: location.to_string(),
                    limit,
                });
            }
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| fetch_error(location, e.to_string()))?;

        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(FetchedDocument {
            location: location.to_string(),
            bytes,
            content_type: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// Sends `http(s)://` locations to [`HttpFetcher`] and everything else to disk.
#[derive(Clone)]
pub struct SourceFetcher {
    http: HttpFetcher,
    local: LocalFileFetcher,
}

impl SourceFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            http: HttpFetcher::new(config)?,
            local: LocalFileFetcher::new(config),
        })
    }
}

impl DocumentFetcher for SourceFetcher {
    async fn fetch(&self, location: &str) -> Result<FetchedDocument> {
        if is_http(location) {
            self.http.fetch(location).await
        } else {
            self.local.fetch(location).await
        }
    }
}
