//! Capabilities the host injects into the interceptor.

use super::SavedDownload;
use crate::error::DownloadError;
use crate::request::DownloadRequest;

/// The host's own download routine, used for everything that is not intercepted.
pub trait DefaultHandler: Send + Sync {
    fn download(&self, request: DownloadRequest);
}

impl<F> DefaultHandler for F
where
    F: Fn(DownloadRequest) + Send + Sync,
{
    fn download(&self, request: DownloadRequest) {
        self(request)
    }
}

/// Notified once per intercepted download, from the runtime task that ran it.
/// Also told about requests rejected before any fetch.
pub trait DownloadObserver: Send + Sync {
    fn on_saved(&self, _saved: &SavedDownload) {}
    fn on_failed(&self, _error: &DownloadError) {}
}
