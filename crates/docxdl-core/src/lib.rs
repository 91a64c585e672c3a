pub mod config;
pub mod error;
pub mod logging;

pub mod fetch;
pub mod filename;
pub mod interceptor;
pub mod passthrough;
pub mod report_action;
pub mod request;
pub mod saver;

pub use error::{DownloadError, FailureKind};
pub use interceptor::{
    DefaultHandler, Dispatch, DownloadHandle, DownloadInterceptor, DownloadObserver,
    SavedDownload,
};
pub use request::DownloadRequest;
