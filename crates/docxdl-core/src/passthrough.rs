//! Plain download used as the default handler when the host has none of its own.
//!
//! Saves the resource under its own name (Content-Disposition, then URL path)
//! with no renaming. Each call spawns a task; `wait_all` collects them.

use crate::error::{DownloadError, FailureKind};
use crate::fetch::Fetcher;
use crate::filename::passthrough_filename;
use crate::interceptor::join_result;
use crate::interceptor::DefaultHandler;
use crate::request::{resolve_url, DownloadRequest};
use crate::saver::FileSaver;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Pending = JoinHandle<Result<PathBuf, DownloadError>>;

pub struct PassthroughHandler {
    base_url: Option<String>,
    fetcher: Arc<dyn Fetcher>,
    saver: Arc<dyn FileSaver>,
    runtime: Handle,
    pending: Mutex<Vec<(String, Pending)>>,
}

impl PassthroughHandler {
    pub fn new(
        base_url: Option<String>,
        fetcher: Arc<dyn Fetcher>,
        saver: Arc<dyn FileSaver>,
        runtime: Handle,
    ) -> Self {
        Self {
            base_url,
            fetcher,
            saver,
            runtime,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Waits for every download started so far, in start order.
    pub async fn wait_all(&self) -> Vec<Result<PathBuf, DownloadError>> {
        let pending: Vec<_> = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(|p| p.into_inner()),
        );
        let mut out = Vec::with_capacity(pending.len());
        for (url, join) in pending {
            out.push(join_result(join.await, &url, FailureKind::Storage).and_then(|r| r));
        }
        out
    }

    fn push(&self, url: String, job: Pending) {
        self.pending
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((url, job));
    }
}

impl DefaultHandler for PassthroughHandler {
    fn download(&self, request: DownloadRequest) {
        let locator = request.url;
        let url = match resolve_url(&locator, self.base_url.as_deref()) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("passthrough download skipped: {}", e);
                let failed: Pending = self.runtime.spawn(async move { Err(e) });
                self.push(locator, failed);
                return;
            }
        };

        let fetcher = Arc::clone(&self.fetcher);
        let saver = Arc::clone(&self.saver);
        let task_locator = locator.clone();
        let job = self.runtime.spawn_blocking(move || -> Result<PathBuf, DownloadError> {
            let fetched = fetcher.fetch(url.as_str())?;
            let name = passthrough_filename(&url, fetched.headers.content_disposition.as_deref());
            let path = saver.save(&fetched.body, &name).map_err(|e| {
                DownloadError::failed(&task_locator, FailureKind::Storage, format!("{:#}", e))
            })?;
            tracing::info!("saved {} to {}", task_locator, path.display());
            Ok(path)
        });
        self.push(locator, job);
    }
}
