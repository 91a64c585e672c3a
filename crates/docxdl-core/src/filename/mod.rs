//! Target filename derivation.
//!
//! Renamed downloads take the last segment of the locator and swap the source
//! extension for the target one, falling back to a fixed default name.
//! Renamed names keep everything Linux can store; passthrough downloads keep
//! their own name (Content-Disposition first, then URL path) and are sanitized
//! more aggressively.

mod content_disposition;
mod sanitize;

pub use content_disposition::content_disposition_filename;
pub use sanitize::{preserve_filename, sanitize_filename, NAME_MAX};

use crate::config::DocxdlConfig;
use content_disposition::percent_decode;

/// Fallback for passthrough downloads whose URL and headers yield no name.
const PASSTHROUGH_DEFAULT: &str = "download.bin";

/// Extension swap applied on the interception path.
#[derive(Debug, Clone)]
pub struct RenameRules {
    pub source_extension: String,
    pub target_extension: String,
    pub default_filename: String,
    pub prefer_content_disposition: bool,
}

impl Default for RenameRules {
    fn default() -> Self {
        Self::from(&DocxdlConfig::default())
    }
}

impl From<&DocxdlConfig> for RenameRules {
    fn from(cfg: &DocxdlConfig) -> Self {
        Self {
            source_extension: cfg.source_extension.clone(),
            target_extension: cfg.target_extension.clone(),
            default_filename: cfg.default_filename.clone(),
            prefer_content_disposition: cfg.prefer_content_disposition,
        }
    }
}

impl RenameRules {
    /// Derives the name an intercepted download is saved under.
    ///
    /// The result always ends in `target_extension` provided `default_filename`
    /// does.
    ///
    /// - `".../report.pdf"` → `"report.docx"`
    /// - `".../export"` → `"document.docx"`
    pub fn target_filename(&self, locator: &str, content_disposition: Option<&str>) -> String {
        let from_header = content_disposition
            .filter(|_| self.prefer_content_disposition)
            .and_then(content_disposition_filename)
            .filter(|n| n.ends_with(&self.source_extension));

        let source = from_header.unwrap_or_else(|| percent_decode(last_segment(locator)));

        self.swap_extension(&source)
            .unwrap_or_else(|| self.default_filename.clone())
    }

    fn swap_extension(&self, name: &str) -> Option<String> {
        let stem = name.strip_suffix(&self.source_extension)?;
        if stem.is_empty() || stem == "." {
            return None;
        }
        let renamed = format!("{}{}", stem, self.target_extension);
        let safe = preserve_filename(&renamed, Some(self.target_extension.as_str()));
        (safe.len() > self.target_extension.len() && safe.ends_with(&self.target_extension))
            .then_some(safe)
    }
}

/// Last `/`-separated segment of a locator, ignoring query and fragment.
/// May be empty (e.g. for `"/report/"`).
pub fn last_segment(locator: &str) -> &str {
    let end = locator
        .find(|c: char| c == '?' || c == '#')
        .unwrap_or(locator.len());
    let path = &locator[..end];
    path.rsplit('/').next().unwrap_or(path)
}

/// Derives the name a passthrough (non-intercepted) download is saved under.
pub fn passthrough_filename(url: &url::Url, content_disposition: Option<&str>) -> String {
    let candidate = content_disposition
        .and_then(content_disposition_filename)
        .or_else(|| {
            url.path_segments()
                .and_then(|mut s| s.next_back())
                .filter(|s| !s.is_empty())
                .map(percent_decode)
        });

    match candidate.map(|c| sanitize_filename(&c, None)) {
        Some(name) if !name.is_empty() => name,
        _ => PASSTHROUGH_DEFAULT.to_string(),
    }
}
