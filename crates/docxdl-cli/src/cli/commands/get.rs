//! `docxdl get <url>` – route one download through the interceptor and wait for it.

use anyhow::{Context, Result};
use docxdl_core::config::DocxdlConfig;
use docxdl_core::fetch::CurlFetcher;
use docxdl_core::passthrough::PassthroughHandler;
use docxdl_core::saver::DirectorySaver;
use docxdl_core::{Dispatch, DownloadInterceptor, DownloadRequest};
use std::sync::Arc;
use tokio::runtime::Handle;

use crate::cli::GetArgs;

pub async fn run_get(cfg: DocxdlConfig, args: GetArgs) -> Result<()> {
    let cfg = apply_overrides(cfg, &args);
    let dir = match &cfg.download_dir {
        Some(d) => d.clone(),
        None => std::env::current_dir().context("current directory")?,
    };

    let saver = Arc::new(DirectorySaver::new(dir, cfg.overwrite)?);
    let fetcher = Arc::new(CurlFetcher::from_config(&cfg));
    let passthrough = Arc::new(PassthroughHandler::new(
        cfg.base_url.clone(),
        fetcher.clone(),
        saver.clone(),
        Handle::current(),
    ));
    let interceptor = DownloadInterceptor::builder(passthrough.clone())
        .config(&cfg)
        .fetcher(fetcher)
        .saver(saver)
        .build()?;

    let request = build_request(&args);
    match interceptor.handle_download(request)? {
        Dispatch::Intercepted(handle) => {
            let saved = handle.wait().await?;
            println!(
                "Saved {} as {} ({} bytes)",
                saved.url,
                saved.path.display(),
                saved.bytes
            );
        }
        Dispatch::Delegated => {
            for result in passthrough.wait_all().await {
                let path = result?;
                println!("Saved {} as {}", args.url, path.display());
            }
        }
    }
    Ok(())
}

/// Command-line flags win over the config file.
fn apply_overrides(mut cfg: DocxdlConfig, args: &GetArgs) -> DocxdlConfig {
    if let Some(dir) = &args.dir {
        cfg.download_dir = Some(dir.clone());
    }
    if let Some(base) = &args.base_url {
        cfg.base_url = Some(base.clone());
    }
    if let Some(marker) = &args.marker {
        cfg.marker = marker.clone();
    }
    if args.overwrite {
        cfg.overwrite = true;
    }
    if args.prefer_content_disposition {
        cfg.prefer_content_disposition = true;
    }
    for (k, v) in &args.headers {
        cfg.headers.insert(k.clone(), v.clone());
    }
    cfg
}

fn build_request(args: &GetArgs) -> DownloadRequest {
    args.meta
        .iter()
        .fold(DownloadRequest::new(args.url.clone()), |req, (k, v)| {
            req.with_metadata(k.clone(), v.clone())
        })
}
