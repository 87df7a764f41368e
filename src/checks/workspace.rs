use std::io;
use std::path::Path;

use tempfile::TempDir;

/// Exclusively-owned scratch directory for one check run.
///
/// The directory is removed when the workspace is closed or dropped, so every
/// exit path (including cancellation of the owning future) cleans up.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn create() -> io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("pr-sentinel-").tempdir()?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the directory now, logging instead of failing.
    pub fn close(self) {
        let path = self.dir.path().to_path_buf();
        if let Err(e) = self.dir.close() {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove check workspace");
        }
    }
}
