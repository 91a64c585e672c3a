//! Save-as capability: presents a payload to the user as a file with a chosen name.
//!
//! `DirectorySaver` stages the payload next to its destination, publishes it
//! atomically and always releases the staged copy, so no transient file
//! outlives a save.

mod staged;

pub use staged::STAGING_SUFFIX;

use crate::error::DownloadError;
use crate::filename::preserve_filename;
use anyhow::{bail, Result};
use staged::StagedFile;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

/// Highest `name (n).ext` suffix tried before giving up.
const MAX_UNIQUE_SUFFIX: u32 = 999;

/// Saves `payload` under `filename` and returns where it ended up.
///
/// Implementations must store the bytes unmodified and must not keep any
/// transient resource alive after returning, on success or failure.
pub trait FileSaver: Send + Sync {
    fn save(&self, payload: &[u8], filename: &str) -> Result<PathBuf>;
}

/// Saves into a fixed directory.
#[derive(Debug)]
pub struct DirectorySaver {
    dir: PathBuf,
    overwrite: bool,
    seq: AtomicU64,
    outstanding: Arc<AtomicUsize>,
}

impl DirectorySaver {
    /// Fails with `DownloadError::Environment` when `dir` is not an existing directory.
    pub fn new(dir: impl Into<PathBuf>, overwrite: bool) -> Result<Self, DownloadError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(DownloadError::Environment(format!(
                "download directory {} does not exist or is not a directory",
                dir.display()
            )));
        }
        Ok(Self {
            dir,
            overwrite,
            seq: AtomicU64::new(0),
            outstanding: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of staged files currently alive. Zero whenever no save is in flight.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// `.docxdl-<pid>-<seq>.part`, short whatever the target name's length.
    fn staging_path(&self) -> PathBuf {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        self.dir.join(format!(
            ".docxdl-{}-{}{}",
            std::process::id(),
            n,
            STAGING_SUFFIX
        ))
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, payload: &[u8], filename: &str) -> Result<PathBuf> {
        if filename.is_empty() || filename == "." || filename == ".." || filename.contains('/') {
            bail!("refusing to save under unsafe name {:?}", filename);
        }

        let mut staged = StagedFile::write(
            self.staging_path(),
            payload,
            Arc::clone(&self.outstanding),
        )?;
        tracing::trace!("staged {} bytes at {}", payload.len(), staged.path().display());

        if self.overwrite {
            let dest = self.dir.join(filename);
            staged.publish_replace(&dest)?;
            return Ok(dest);
        }

        for n in 0..=MAX_UNIQUE_SUFFIX {
            let dest = self.dir.join(numbered_name(filename, n));
            if staged.publish_new(&dest)? {
                return Ok(dest);
            }
        }
        bail!(
            "no free name for {} in {} after {} attempts",
            filename,
            self.dir.display(),
            MAX_UNIQUE_SUFFIX
        )
    }
}

/// `report.docx` → `report (n).docx`; `n == 0` returns the name unchanged.
/// The stem is shortened when the result would exceed NAME_MAX.
pub fn numbered_name(filename: &str, n: u32) -> String {
    if n == 0 {
        return filename.to_string();
    }
    let (stem, ext) = match filename.rfind('.') {
        Some(dot) if dot > 0 => filename.split_at(dot),
        _ => (filename, ""),
    };
    let tail = format!(" ({}){}", n, ext);
    preserve_filename(&format!("{}{}", stem, tail), Some(tail.as_str()))
}
