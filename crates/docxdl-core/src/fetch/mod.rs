//! Network fetch of a whole resource into memory.
//!
//! The `Fetcher` trait is the seam the interceptor depends on; `CurlFetcher`
//! is the libcurl-backed implementation. Fetchers are blocking; the
//! interceptor calls them from `spawn_blocking`.

mod parse;

pub use parse::ResponseHeaders;

use crate::config::DocxdlConfig;
use crate::error::{DownloadError, FailureKind};
use std::collections::HashMap;
use std::str;
use std::time::Duration;

/// Body and headers of a successful (2xx) response.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    pub status: u32,
    pub body: Vec<u8>,
    pub headers: ResponseHeaders,
}

/// Fetches a resource in full. Implementations must not alter the body bytes.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<FetchedResource, DownloadError>;
}

/// GET via a fresh libcurl easy handle per call.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    connect_timeout: Duration,
    timeout: Duration,
    headers: HashMap<String, String>,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::from_config(&DocxdlConfig::default())
    }
}

impl CurlFetcher {
    pub fn from_config(cfg: &DocxdlConfig) -> Self {
        Self {
            connect_timeout: cfg.connect_timeout(),
            timeout: cfg.timeout(),
            headers: cfg.headers.clone(),
        }
    }

    /// Adds a request header sent with every fetch (e.g. a session cookie).
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    fn perform(&self, url: &str) -> Result<(u32, Vec<u8>, Vec<String>), curl::Error> {
        let mut body: Vec<u8> = Vec::new();
        let mut header_lines: Vec<String> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        if !self.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in &self.headers {
                list.append(&format!("{}: {}", k.trim(), v.trim()))?;
            }
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        Ok((code, body, header_lines))
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, url: &str) -> Result<FetchedResource, DownloadError> {
        let (status, body, lines) = self
            .perform(url)
            .map_err(|e| DownloadError::failed(url, FailureKind::Network, e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(DownloadError::failed(
                url,
                FailureKind::Http(status),
                format!("GET returned HTTP {}", status),
            ));
        }

        let headers = parse::parse_headers(&lines);
        tracing::debug!(
            url,
            status,
            bytes = body.len(),
            content_type = headers.content_type.as_deref().unwrap_or("-"),
            "fetched"
        );
        Ok(FetchedResource {
            status,
            body,
            headers,
        })
    }
}
