//! Outcome types of `DownloadInterceptor::handle_download`.

use crate::error::{DownloadError, FailureKind};
use std::any::Any;
use std::path::PathBuf;
use tokio::task::{JoinError, JoinHandle};

/// A completed intercepted download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    /// Locator as given in the request.
    pub url: String,
    /// Derived target name (before any `name (n).ext` disambiguation).
    pub filename: String,
    /// Where the saver put the file.
    pub path: PathBuf,
    pub bytes: usize,
}

/// Which way a request was routed.
#[derive(Debug)]
pub enum Dispatch {
    /// Handed to the default handler unchanged.
    Delegated,
    /// Being fetched and saved in the background.
    Intercepted(DownloadHandle),
}

impl Dispatch {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Dispatch::Intercepted(_))
    }

    pub fn into_handle(self) -> Option<DownloadHandle> {
        match self {
            Dispatch::Intercepted(h) => Some(h),
            Dispatch::Delegated => None,
        }
    }
}

/// Background fetch-and-save of one request. Dropping the handle does not stop
/// the download; the observer still hears about it.
#[derive(Debug)]
pub struct DownloadHandle {
    url: String,
    join: JoinHandle<Result<SavedDownload, DownloadError>>,
}

impl DownloadHandle {
    pub(crate) fn new(url: String, join: JoinHandle<Result<SavedDownload, DownloadError>>) -> Self {
        Self { url, join }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for the download to be saved or to fail. Panics inside the task
    /// come back as `DownloadFailed`.
    pub async fn wait(self) -> Result<SavedDownload, DownloadError> {
        let url = self.url;
        // Fetch and save panics are already mapped inside the task; what is left
        // is an observer panicking after the save.
        join_result(self.join.await, &url, FailureKind::Storage)?
    }
}

/// Unwraps a task join. A panicked task becomes `DownloadFailed` of `kind`
/// (the stage it was running); cancellation means the runtime went away.
pub(crate) fn join_result<T>(
    res: Result<T, JoinError>,
    url: &str,
    kind: FailureKind,
) -> Result<T, DownloadError> {
    match res {
        Ok(v) => Ok(v),
        Err(e) if e.is_panic() => {
            let message = panic_message(e.into_panic());
            tracing::error!("task for {} panicked: {}", url, message);
            Err(DownloadError::failed(url, kind, format!("task panicked: {}", message)))
        }
        Err(_) => Err(DownloadError::Environment(format!(
            "runtime shut down while handling {}",
            url
        ))),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
