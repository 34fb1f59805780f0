//! Host filesystem access for the build pipeline.
//!
//! Only the four operations the pipeline actually needs: existence checks
//! (source validation, mount-point polling), idempotent file removal (stale
//! and temporary images), directory creation and file copies (the hidden
//! background directory on the mounted volume).

use crate::error::Result;
use std::io;
use std::path::Path;
use tokio::fs;

/// Filesystem capability used by the build pipeline.
#[allow(async_fn_in_trait)]
pub trait HostFs {
    /// Whether `path` currently exists.
    async fn exists(&self, path: &Path) -> bool;

    /// Removes a file, treating an already-missing file as success.
    async fn remove_file(&self, path: &Path) -> Result<()>;

    /// Creates `path` and any missing parent directories.
    async fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Copies a regular file, creating the destination's parents as needed.
    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;
}

/// [`HostFs`] backed by the real filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemFs;

impl HostFs for SystemFs {
    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn remove_file(&self, path: &Path) -> Result<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).await?;
        Ok(())
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::copy(from, to).await?;
        Ok(())
    }
}
