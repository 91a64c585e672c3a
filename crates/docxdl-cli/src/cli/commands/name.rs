//! `docxdl name <url>` – print the derived target filename.

use anyhow::Result;
use docxdl_core::config::DocxdlConfig;
use docxdl_core::filename::RenameRules;

pub fn run_name(cfg: &DocxdlConfig, url: &str, content_disposition: Option<&str>) -> Result<()> {
    println!("{}", derive_name(cfg, url, content_disposition));
    Ok(())
}

/// Passing a Content-Disposition value means it should be considered,
/// whatever the config file says.
fn derive_name(cfg: &DocxdlConfig, url: &str, content_disposition: Option<&str>) -> String {
    let mut rules = RenameRules::from(cfg);
    if content_disposition.is_some() {
        rules.prefer_content_disposition = true;
    }
    rules.target_filename(url, content_disposition)
}
