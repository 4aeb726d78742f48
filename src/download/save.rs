//! Scoped save handles.
//!
//! Bytes are first staged into a hidden temporary file next to their final
//! location. [`SaveHandle::trigger`] moves the staged file into place. On any
//! other exit path the handle is dropped and the staged file is removed.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::trace;

use super::naming::unique_path;

/// A staged file waiting to be saved under its final name
#[derive(Debug)]
pub struct SaveHandle {
    staged: Option<NamedTempFile>,
    dir: PathBuf,
    name: String,
}

impl SaveHandle {
    /// Stage `bytes` in `dir`, to be saved as `name`
    pub fn stage(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut staged = tempfile::Builder::new()
            .prefix(".picture-prompt-")
            .suffix(".part")
            .tempfile_in(dir)?;
        staged.write_all(bytes)?;
        staged.flush()?;
        trace!(path = %staged.path().display(), "staged save handle");

        Ok(Self {
            staged: Some(staged),
            dir: dir.to_path_buf(),
            name: name.to_string(),
        })
    }

    /// Path of the staged file, while it exists
    pub fn staged_path(&self) -> Option<&Path> {
        self.staged.as_ref().map(|f| f.path())
    }

    /// Move the staged bytes to their final, non-clobbering path
    pub fn trigger(mut self) -> std::io::Result<PathBuf> {
        let staged = self
            .staged
            .take()
            .ok_or_else(|| std::io::Error::other("save handle already released"))?;
        let target = unique_path(&self.dir, &self.name);
        staged.persist_noclobber(&target).map_err(|e| e.error)?;
        Ok(target)
    }
}

impl Drop for SaveHandle {
    fn drop(&mut self) {
        if let Some(staged) = self.staged.take() {
            trace!(path = %staged.path().display(), "releasing unsaved handle");
            // NamedTempFile removes itself; close() surfaces the error for the log
            if let Err(e) = staged.close() {
                trace!("failed to remove staged file: {}", e);
            }
        }
    }
}
