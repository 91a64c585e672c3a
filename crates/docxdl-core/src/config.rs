use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration loaded from `~/.config/docxdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocxdlConfig {
    /// Substring that routes a URL to the renaming path (case-sensitive).
    pub marker: String,
    /// Extension replaced on the last URL segment, including the dot.
    pub source_extension: String,
    /// Extension written in its place, including the dot.
    pub target_extension: String,
    /// Filename used when the URL does not end in `source_extension`.
    pub default_filename: String,
    /// Base used to resolve relative locators such as `/report/pdf/...`.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Where saved files go (None = current directory).
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    /// Replace an existing file instead of picking `name (1).ext`.
    #[serde(default)]
    pub overwrite: bool,
    /// Use the response's Content-Disposition filename as the source name when it is a PDF.
    #[serde(default)]
    pub prefer_content_disposition: bool,
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
    /// Extra request headers (e.g. `Cookie = "session_id=..."`).
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for DocxdlConfig {
    fn default() -> Self {
        Self {
            marker: "docx".to_string(),
            source_extension: ".pdf".to_string(),
            target_extension: ".docx".to_string(),
            default_filename: "document.docx".to_string(),
            base_url: None,
            download_dir: None,
            overwrite: false,
            prefer_content_disposition: false,
            connect_timeout_secs: 15,
            timeout_secs: 300,
            headers: HashMap::new(),
        }
    }
}

impl DocxdlConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("docxdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<DocxdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = DocxdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("read {}", path.display()))?;
    let cfg: DocxdlConfig =
        toml::from_str(&data).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = DocxdlConfig::default();
        assert_eq!(cfg.marker, "docx");
        assert_eq!(cfg.source_extension, ".pdf");
        assert_eq!(cfg.target_extension, ".docx");
        assert_eq!(cfg.default_filename, "document.docx");
        assert!(cfg.base_url.is_none());
        assert!(!cfg.overwrite);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = DocxdlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: DocxdlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.marker, cfg.marker);
        assert_eq!(parsed.default_filename, cfg.default_filename);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            marker = "word"
            source_extension = ".pdf"
            target_extension = ".docx"
            default_filename = "report.docx"
            base_url = "https://erp.example.com"
            overwrite = true
            connect_timeout_secs = 5
            timeout_secs = 60

            [headers]
            Cookie = "session_id=abc"
        "#;
        let cfg: DocxdlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.marker, "word");
        assert_eq!(cfg.default_filename, "report.docx");
        assert_eq!(cfg.base_url.as_deref(), Some("https://erp.example.com"));
        assert!(cfg.overwrite);
        assert!(!cfg.prefer_content_disposition);
        assert!(cfg.download_dir.is_none());
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.headers.get("Cookie").unwrap(), "session_id=abc");
    }
}
