// buildrelay-cli/src/source.rs
// ============================================================================
// Module: Config Sources
// Description: Scheme-keyed fetchers for configuration bytes.
// Purpose: Resolve a config location into raw YAML bytes at startup.
// Dependencies: reqwest, url, std
// ============================================================================

//! ## Overview
//! Configuration can live on local disk or behind an HTTP(S) object URL.
//! The location string is dispatched on its scheme: `http://` and
//! `https://` go to [`HttpSource`], `file://` and bare paths go to
//! [`FileSource`]. Fetching happens once at startup, before the async
//! runtime exists, so the HTTP path uses the blocking client.
//! Invariants:
//! - Redirects are refused; a moved config object fails closed.
//! - Payloads above the size cap fail closed before parsing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum configuration document size accepted from any source.
pub const MAX_SOURCE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Source Errors
// ============================================================================

/// Errors emitted while fetching configuration bytes.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The location has a scheme no source handles.
    #[error("unsupported config location scheme: {0}")]
    UnsupportedScheme(String),
    /// The location failed to parse or resolve.
    #[error("invalid config location: {0}")]
    InvalidLocation(String),
    /// The local file could not be read.
    #[error("config file read failed: {0}")]
    Io(String),
    /// The HTTP fetch failed.
    #[error("config http fetch failed: {0}")]
    Http(String),
    /// The document exceeded the size cap.
    #[error("config document exceeds size limit: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual document size in bytes.
        actual_bytes: usize,
    },
}

/// Returns an error when a document exceeds the size cap.
fn enforce_max_bytes(actual_bytes: usize) -> Result<(), SourceError> {
    if actual_bytes > MAX_SOURCE_BYTES {
        return Err(SourceError::TooLarge {
            max_bytes: MAX_SOURCE_BYTES,
            actual_bytes,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Source Trait
// ============================================================================

/// Resolves a configuration location into raw document bytes.
pub trait ConfigSource: Send + Sync {
    /// Fetches the document stored at the location.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the location cannot be resolved.
    fn fetch(&self, location: &str) -> Result<Vec<u8>, SourceError>;
}

/// Dispatches a location to the source that handles its scheme.
///
/// # Errors
///
/// Returns [`SourceError`] when no source handles the scheme or the fetch
/// fails.
pub fn fetch_config(location: &str) -> Result<Vec<u8>, SourceError> {
    match Url::parse(location) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            HttpSource::new()?.fetch(location)
        }
        Ok(url) if url.scheme() == "file" => FileSource.fetch(location),
        // Single-letter schemes are Windows drive prefixes, not URLs.
        Ok(url) if url.scheme().len() > 1 => {
            Err(SourceError::UnsupportedScheme(url.scheme().to_string()))
        }
        _ => FileSource.fetch(location),
    }
}

// ============================================================================
// SECTION: File Source
// ============================================================================

/// File-backed configuration source for bare paths and `file://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl ConfigSource for FileSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, SourceError> {
        let path = match Url::parse(location) {
            Ok(url) if url.scheme() == "file" => url.to_file_path().map_err(|()| {
                SourceError::InvalidLocation("failed to map file url to path".to_string())
            })?,
            _ => Path::new(location).to_path_buf(),
        };
        let metadata = std::fs::metadata(&path).map_err(|err| SourceError::Io(err.to_string()))?;
        enforce_max_bytes(usize::try_from(metadata.len()).unwrap_or(usize::MAX))?;
        std::fs::read(&path).map_err(|err| SourceError::Io(err.to_string()))
    }
}

// ============================================================================
// SECTION: HTTP Source
// ============================================================================

/// HTTP-backed configuration source for `http://` and `https://` URLs.
#[derive(Debug, Clone)]
pub struct HttpSource {
    /// Blocking client used for the startup fetch.
    client: Client,
}

impl HttpSource {
    /// Builds an HTTP source with a default client.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Http`] when the client cannot be constructed.
    pub fn new() -> Result<Self, SourceError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| SourceError::Http(err.to_string()))?;
        Ok(Self {
            client,
        })
    }
}

impl ConfigSource for HttpSource {
    fn fetch(&self, location: &str) -> Result<Vec<u8>, SourceError> {
        let url =
            Url::parse(location).map_err(|err| SourceError::InvalidLocation(err.to_string()))?;
        match url.scheme() {
            "http" | "https" => {}
            scheme => return Err(SourceError::UnsupportedScheme(scheme.to_string())),
        }
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(|err| SourceError::Http(err.to_string()))?;
        if !response.status().is_success() {
            return Err(SourceError::Http(format!("http status {}", response.status())));
        }
        if let Some(length) = response.content_length() {
            enforce_max_bytes(usize::try_from(length).unwrap_or(usize::MAX))?;
        }
        let mut bytes = Vec::new();
        response
            .take(MAX_SOURCE_BYTES as u64 + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| SourceError::Http(err.to_string()))?;
        enforce_max_bytes(bytes.len())?;
        Ok(bytes)
    }
}
