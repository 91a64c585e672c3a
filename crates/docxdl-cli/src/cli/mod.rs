//! CLI for docxdl.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use docxdl_core::config;
use std::path::PathBuf;

use commands::{run_get, run_name};

/// Top-level CLI for docxdl.
#[derive(Debug, Parser)]
#[command(name = "docxdl")]
#[command(about = "docxdl: fetch report downloads and save PDF-named files as .docx", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download a URL; URLs containing the marker are saved under a .docx name.
    Get(GetArgs),

    /// Print the name an intercepted download of URL would be saved under.
    Name {
        /// Resource locator (absolute or relative).
        url: String,
        /// Content-Disposition value to name the file from (implies
        /// --prefer-content-disposition).
        #[arg(long, value_name = "VALUE")]
        content_disposition: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct GetArgs {
    /// Resource locator (absolute, or relative to --base-url).
    pub url: String,

    /// Extra request metadata passed through to the default download.
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub meta: Vec<(String, String)>,

    /// Directory to save into (default: config download_dir, else current dir).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Base URL for relative locators (overrides config).
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Extra request header, e.g. "Cookie: session_id=...". Repeatable.
    #[arg(long = "header", value_name = "NAME: VALUE", value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Replace an existing file instead of saving as "name (1).ext".
    #[arg(long)]
    pub overwrite: bool,

    /// Marker substring that triggers renaming (overrides config).
    #[arg(long)]
    pub marker: Option<String>,

    /// Name intercepted files from the server's Content-Disposition when it is a PDF.
    #[arg(long)]
    pub prefer_content_disposition: bool,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", s))?;
    if k.trim().is_empty() {
        return Err(format!("empty key in {:?}", s));
    }
    Ok((k.trim().to_string(), v.to_string()))
}

fn parse_header(s: &str) -> Result<(String, String), String> {
    let (k, v) = s
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got {:?}", s))?;
    if k.trim().is_empty() {
        return Err(format!("empty header name in {:?}", s));
    }
    Ok((k.trim().to_string(), v.trim().to_string()))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get(args) => run_get(cfg, args).await?,
            CliCommand::Name {
                url,
                content_disposition,
            } => run_name(&cfg, &url, content_disposition.as_deref())?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
