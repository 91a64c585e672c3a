//! Error type surfaced by the interceptor to its callers and observers.

use std::fmt;

/// Why an intercepted download did not produce a saved file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// Curl reported a transport error (DNS, connect, timeout, reset).
    Network,
    /// The server answered with a non-2xx status.
    Http(u32),
    /// The payload could not be written by the file saver.
    Storage,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network"),
            FailureKind::Http(code) => write!(f, "HTTP {}", code),
            FailureKind::Storage => write!(f, "storage"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// The request could not be turned into a fetchable URL. Raised before any fetch.
    #[error("invalid download request: {0}")]
    InvalidRequest(String),

    /// Fetch or save failed for `url`. Recoverable; the caller may try again.
    #[error("download of {url} failed ({kind}): {message}")]
    DownloadFailed {
        url: String,
        kind: FailureKind,
        message: String,
    },

    /// The host cannot save files or run async work at all. Raised at construction.
    #[error("download environment unavailable: {0}")]
    Environment(String),

    /// Interceptor settings contradict each other. Raised at construction.
    #[error("invalid interceptor configuration: {0}")]
    Config(String),
}

impl DownloadError {
    pub fn failed(url: &str, kind: FailureKind, message: impl Into<String>) -> Self {
        DownloadError::DownloadFailed {
            url: url.to_string(),
            kind,
            message: message.into(),
        }
    }

    /// Failure kind for `DownloadFailed`, `None` for the other variants.
    pub fn failure_kind(&self) -> Option<&FailureKind> {
        match self {
            DownloadError::DownloadFailed { kind, .. } => Some(kind),
            _ => None,
        }
    }
}
