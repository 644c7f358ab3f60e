//! Ephemeral working directory holding a run's intermediate files.
//!
//! [`WorkingDirectory`] is a guard: the directory is removed when the guard is
//! released or dropped, whichever happens first, so every exit path out of the
//! stage loop (success, `?` on a failed stage, or unwinding) cleans up.

use crate::error::{PipelineError, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::TempDir;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct WorkingDirectory {
    dir: Option<TempDir>,
    path: PathBuf,
    keep: bool,
}

impl WorkingDirectory {
    /// Creates a uniquely named directory under `root` (system temp dir when
    /// `None`).
    ///
    /// The name carries the process id and a millisecond timestamp, followed
    /// by a random suffix, so concurrent runs never share a directory.
    pub fn acquire(root: Option<&Path>) -> Result<Self> {
        let root = root.map(Path::to_path_buf).unwrap_or_else(std::env::temp_dir);
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let dir = tempfile::Builder::new()
            .prefix(&format!("ra_{}_{stamp}_", std::process::id()))
            .tempdir_in(&root)
            .map_err(|source| PipelineError::Resource {
                path: root.clone(),
                source,
            })?;

        let path = dir.path().to_path_buf();
        debug!(path = %path.display(), "created working directory");

        Ok(Self {
            dir: Some(dir),
            path,
            keep: false,
        })
    }

    /// Retain the directory on release instead of removing it.
    pub fn keep_on_release(mut self, keep: bool) -> Self {
        self.keep = keep;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the directory now. Failures are logged, never returned.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        if self.keep {
            #[allow(deprecated)]
            let kept = dir.into_path();
            info!(path = %kept.display(), "keeping working directory");
            return;
        }

        match dir.close() {
            Ok(()) => debug!(path = %self.path.display(), "removed working directory"),
            // Something else already removed it
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove working directory"
            ),
        }
    }
}

impl Drop for WorkingDirectory {
    fn drop(&mut self) {
        self.release_inner();
    }
}
