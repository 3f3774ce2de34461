//! Marker file telling other applications a sync session owns the project.

use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::PROJECT_EXTENSION;
use crate::{SyncError, SyncResult};

/// Held for the duration of a session; the marker file is removed on drop,
/// including when the session fails or unwinds.
#[derive(Debug)]
pub struct LockMarker {
    path: PathBuf,
}

impl LockMarker {
    /// `<project_dir>/<project_name>.fwdata.lock`
    pub fn lock_path(project_dir: &Path, project_name: &str) -> PathBuf {
        project_dir.join(format!("{project_name}.{PROJECT_EXTENSION}.lock"))
    }

    /// Creates the marker.
    ///
    /// # Errors
    ///
    /// [`SyncError::Locked`] when the marker already exists.
    pub fn acquire(project_dir: &Path, project_name: &str) -> SyncResult<Self> {
        let path = Self::lock_path(project_dir, project_name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                debug!("Acquired {}", path.display());
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(SyncError::Locked { path }),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockMarker {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Released {}", self.path.display()),
            Err(e) => warn!("Failed to remove {}: {}", self.path.display(), e),
        }
    }
}
