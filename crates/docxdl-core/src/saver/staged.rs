//! Transient on-disk copy of a payload, released on drop.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Suffix of staged files before they are published under their final name.
pub const STAGING_SUFFIX: &str = ".part";

/// A payload written to a hidden `.part` file. Until `publish` succeeds the file
/// is removed when the guard drops; the owning saver's outstanding counter is
/// decremented either way.
pub(crate) struct StagedFile {
    path: PathBuf,
    published: bool,
    outstanding: Arc<AtomicUsize>,
}

impl StagedFile {
    /// Writes `payload` to `path` and syncs it.
    pub(crate) fn write(path: PathBuf, payload: &[u8], outstanding: Arc<AtomicUsize>) -> Result<Self> {
        let mut f = File::options()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("failed to create staged file: {}", path.display()))?;
        outstanding.fetch_add(1, Ordering::SeqCst);
        // We own the file now; Drop cleans up, including after a failed write below.
        let staged = StagedFile {
            path,
            published: false,
            outstanding,
        };
        f.write_all(payload)
            .with_context(|| format!("write {}", staged.path.display()))?;
        f.sync_all().context("fsync staged file")?;
        Ok(staged)
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Moves the staged file to `dest`, replacing it if present.
    pub(crate) fn publish_replace(mut self, dest: &Path) -> Result<()> {
        std::fs::rename(&self.path, dest).with_context(|| {
            format!("failed to rename {} to {}", self.path.display(), dest.display())
        })?;
        self.published = true;
        Ok(())
    }

    /// Links the staged file to `dest` only if `dest` does not exist yet.
    /// Returns `Ok(false)` when `dest` is taken; the guard stays staged.
    pub(crate) fn publish_new(&mut self, dest: &Path) -> Result<bool> {
        match std::fs::hard_link(&self.path, dest) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => {
                // Filesystems without hard links: check then rename.
                tracing::debug!(error = %e, "hard_link failed, falling back to rename");
                if dest.exists() {
                    return Ok(false);
                }
                std::fs::rename(&self.path, dest).with_context(|| {
                    format!("failed to rename {} to {}", self.path.display(), dest.display())
                })?;
                self.published = true;
                return Ok(true);
            }
        }
        self.published = true;
        if let Err(e) = std::fs::remove_file(&self.path) {
            tracing::warn!("could not remove staged file {}: {}", self.path.display(), e);
        }
        Ok(true)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if !self.published {
            if let Err(e) = std::fs::remove_file(&self.path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("could not remove staged file {}: {}", self.path.display(), e);
                }
            }
        }
        self.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_unpublished_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let p = dir.path().join("a.docx.0.part");
        let staged = StagedFile::write(p.clone(), b"abc", Arc::clone(&counter)).unwrap();
        assert!(p.exists());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        drop(staged);
        assert!(!p.exists());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn publish_new_refuses_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let dest = dir.path().join("a.docx");
        std::fs::write(&dest, b"old").unwrap();
        let mut staged =
            StagedFile::write(dir.path().join("a.docx.1.part"), b"new", Arc::clone(&counter))
                .unwrap();
        assert!(!staged.publish_new(&dest).unwrap());
        assert_eq!(std::fs::read(&dest).unwrap(), b"old");
        let other = dir.path().join("a (1).docx");
        assert!(staged.publish_new(&other).unwrap());
        drop(staged);
        assert_eq!(std::fs::read(&other).unwrap(), b"new");
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn failed_create_still_balances_counter() {
        let dir = tempfile::tempdir().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let missing = dir.path().join("nope").join("x.part");
        assert!(StagedFile::write(missing, b"x", Arc::clone(&counter)).is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
