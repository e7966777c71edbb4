use async_trait::async_trait;
use crate::input::LoadError;
use std::path::PathBuf;
use std::time::Duration;

/// Timeout for a single journey request
const HTTP_TIMEOUT: Duration = Duration::from_secs(20);

/// Where the journey document comes from
///
/// Implementations:
/// - HTTP(S) endpoints
/// - Local files
/// - Scripted sources for testing
#[async_trait]
pub trait JourneySource: Send + Sync {
    /// Human-readable location, used in logs and error messages
    fn describe(&self) -> String;

    /// Fetch the raw document
    async fn fetch(&self) -> Result<Vec<u8>, LoadError>;
}

/// Journey served over HTTP(S)
pub struct HttpSource {
    url: String,
}

impl HttpSource {
    pub fn new(url: &str) -> Self {
        Self { url: url.to_string() }
    }
}

#[async_trait]
impl JourneySource for HttpSource {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        let http_error = |source| LoadError::Http {
            location: self.url.clone(),
            source,
        };

        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(http_error)?;

        tracing::debug!(url = %self.url, "fetching journey");
        let response = client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(http_error)?;

        if !response.status().is_success() {
            return Err(LoadError::Status {
                location: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(http_error)?;
        Ok(bytes.to_vec())
    }
}

/// Journey stored on disk
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl JourneySource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, LoadError> {
        tokio::fs::read(&self.path).await.map_err(|source| LoadError::Io {
            location: self.describe(),
            source,
        })
    }
}

/// Pick a source from a location string
pub fn source_for(location: &str) -> Box<dyn JourneySource> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpSource::new(location))
    } else {
        Box::new(FileSource::new(location))
    }
}
