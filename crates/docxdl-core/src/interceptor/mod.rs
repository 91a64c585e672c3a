//! Renaming download interceptor.
//!
//! Routes each download request one of two ways. Locators containing the
//! marker are fetched in the background, renamed (`report.pdf` →
//! `report.docx`) and handed to the file saver; everything else goes to the
//! injected default handler untouched. The call itself never blocks on the
//! network and never raises fetch or save failures into the caller; those go
//! to the returned handle and the observer.

mod handle;
mod hooks;

pub use handle::{DownloadHandle, Dispatch, SavedDownload};
pub use hooks::{DefaultHandler, DownloadObserver};

use crate::config::DocxdlConfig;
use crate::error::{DownloadError, FailureKind};
use crate::fetch::{CurlFetcher, Fetcher};
use crate::filename::{preserve_filename, RenameRules, NAME_MAX};
use crate::request::{resolve_url, DownloadRequest};
use crate::saver::{DirectorySaver, FileSaver};
pub(crate) use handle::join_result;
use std::sync::Arc;
use tokio::runtime::Handle;

pub struct DownloadInterceptor {
    marker: String,
    rules: RenameRules,
    base_url: Option<String>,
    fetcher: Arc<dyn Fetcher>,
    saver: Arc<dyn FileSaver>,
    default_handler: Arc<dyn DefaultHandler>,
    observer: Option<Arc<dyn DownloadObserver>>,
    runtime: Handle,
}

impl std::fmt::Debug for DownloadInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadInterceptor")
            .field("marker", &self.marker)
            .field("rules", &self.rules)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DownloadInterceptor {
    pub fn builder(default_handler: Arc<dyn DefaultHandler>) -> DownloadInterceptorBuilder {
        DownloadInterceptorBuilder {
            cfg: DocxdlConfig::default(),
            default_handler,
            fetcher: None,
            saver: None,
            observer: None,
            runtime: None,
        }
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Routes `request`.
    ///
    /// Without the marker the default handler is called exactly once with the
    /// request as given and no fetch happens. With the marker a background task
    /// fetches, renames and saves; this returns as soon as the task is spawned.
    ///
    /// Errors only with `InvalidRequest`, before any fetch, when the locator of
    /// an intercepted request cannot be resolved to a URL.
    pub fn handle_download(&self, request: DownloadRequest) -> Result<Dispatch, DownloadError> {
        if !request.matches_marker(&self.marker) {
            tracing::debug!(url = %request.url, "no marker, delegating to default handler");
            self.default_handler.download(request);
            return Ok(Dispatch::Delegated);
        }

        let url = match resolve_url(&request.url, self.base_url.as_deref()) {
            Ok(u) => u,
            Err(e) => {
                tracing::warn!("rejected download request: {}", e);
                self.notify_failed(&e);
                return Err(e);
            }
        };

        tracing::info!(url = %url, "intercepting download for rename");
        let job = InterceptJob {
            locator: request.url.clone(),
            url,
            rules: self.rules.clone(),
            fetcher: Arc::clone(&self.fetcher),
            saver: Arc::clone(&self.saver),
        };
        let observer = self.observer.clone();
        let join = self.runtime.spawn(async move {
            let result = job.run().await;
            match &result {
                Ok(saved) => {
                    tracing::info!(
                        "saved {} ({} bytes) to {}",
                        saved.url,
                        saved.bytes,
                        saved.path.display()
                    );
                    if let Some(obs) = &observer {
                        obs.on_saved(saved);
                    }
                }
                Err(e) => {
                    tracing::warn!("intercepted download failed: {}", e);
                    if let Some(obs) = &observer {
                        obs.on_failed(e);
                    }
                }
            }
            result
        });

        Ok(Dispatch::Intercepted(DownloadHandle::new(request.url, join)))
    }

    /// Like `handle_download`, for hosts that pass an untyped options object
    /// (`{"url": ..., ...}`). A missing or non-string `url` is rejected here.
    pub fn handle_options(&self, options: serde_json::Value) -> Result<Dispatch, DownloadError> {
        let request = DownloadRequest::from_options(options).map_err(|e| {
            self.notify_failed(&e);
            e
        })?;
        self.handle_download(request)
    }

    fn notify_failed(&self, e: &DownloadError) {
        if let Some(obs) = &self.observer {
            obs.on_failed(e);
        }
    }
}

/// Everything one background fetch-rename-save needs, owned.
struct InterceptJob {
    locator: String,
    url: url::Url,
    rules: RenameRules,
    fetcher: Arc<dyn Fetcher>,
    saver: Arc<dyn FileSaver>,
}

impl InterceptJob {
    async fn run(self) -> Result<SavedDownload, DownloadError> {
        let InterceptJob {
            locator,
            url,
            rules,
            fetcher,
            saver,
        } = self;

        let fetch_url = url.to_string();
        let fetched = join_result(
            tokio::task::spawn_blocking(move || fetcher.fetch(&fetch_url)).await,
            &locator,
            FailureKind::Network,
        )??;

        let filename = rules.target_filename(
            &locator,
            fetched.headers.content_disposition.as_deref(),
        );
        let bytes = fetched.body.len();
        tracing::debug!(url = %url, filename = %filename, bytes, "fetched, saving");

        let name = filename.clone();
        let path = join_result(
            tokio::task::spawn_blocking(move || saver.save(&fetched.body, &name)).await,
            &locator,
            FailureKind::Storage,
        )?
        .map_err(|e| DownloadError::failed(&locator, FailureKind::Storage, format!("{:#}", e)))?;

        Ok(SavedDownload {
            url: locator,
            filename,
            path,
            bytes,
        })
    }
}

pub struct DownloadInterceptorBuilder {
    cfg: DocxdlConfig,
    default_handler: Arc<dyn DefaultHandler>,
    fetcher: Option<Arc<dyn Fetcher>>,
    saver: Option<Arc<dyn FileSaver>>,
    observer: Option<Arc<dyn DownloadObserver>>,
    runtime: Option<Handle>,
}

impl DownloadInterceptorBuilder {
    /// Marker, rename rules, base URL, and the defaults for fetcher and saver.
    pub fn config(mut self, cfg: &DocxdlConfig) -> Self {
        self.cfg = cfg.clone();
        self
    }

    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    pub fn saver(mut self, saver: Arc<dyn FileSaver>) -> Self {
        self.saver = Some(saver);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn DownloadObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Runtime to spawn on. Defaults to the runtime `build` is called from.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Checks the environment up front: a tokio runtime must be reachable and,
    /// unless a saver was injected, the download directory must exist. The
    /// marker and rename rules are validated too.
    pub fn build(self) -> Result<DownloadInterceptor, DownloadError> {
        let runtime = match self.runtime {
            Some(h) => h,
            None => Handle::try_current().map_err(|e| {
                DownloadError::Environment(format!("no tokio runtime: {}", e))
            })?,
        };
        validate_rules(&self.cfg)?;

        let saver: Arc<dyn FileSaver> = match self.saver {
            Some(s) => s,
            None => {
                let dir = match &self.cfg.download_dir {
                    Some(d) => d.clone(),
                    None => std::env::current_dir().map_err(|e| {
                        DownloadError::Environment(format!("current directory: {}", e))
                    })?,
                };
                Arc::new(DirectorySaver::new(dir, self.cfg.overwrite)?)
            }
        };
        let fetcher: Arc<dyn Fetcher> = match self.fetcher {
            Some(f) => f,
            None => Arc::new(CurlFetcher::from_config(&self.cfg)),
        };

        Ok(DownloadInterceptor {
            marker: self.cfg.marker.clone(),
            rules: RenameRules::from(&self.cfg),
            base_url: self.cfg.base_url.clone(),
            fetcher,
            saver,
            default_handler: self.default_handler,
            observer: self.observer,
            runtime,
        })
    }
}

/// Every name the rename path can produce must end in `target_extension`.
fn validate_rules(cfg: &DocxdlConfig) -> Result<(), DownloadError> {
    if cfg.marker.is_empty() {
        return Err(DownloadError::Config("marker must not be empty".into()));
    }
    if cfg.source_extension.is_empty() || cfg.target_extension.is_empty() {
        return Err(DownloadError::Config(
            "source_extension and target_extension must not be empty".into(),
        ));
    }
    let fallback = &cfg.default_filename;
    let stem = fallback.strip_suffix(cfg.target_extension.as_str());
    if stem.map_or(true, |s| s.is_empty() || s == ".") {
        return Err(DownloadError::Config(format!(
            "default_filename {:?} must be a name ending in {:?}",
            fallback, cfg.target_extension
        )));
    }
    if preserve_filename(fallback, None) != *fallback || fallback.len() > NAME_MAX {
        return Err(DownloadError::Config(format!(
            "default_filename {:?} is not a storable file name",
            fallback
        )));
    }
    Ok(())
}
