//! Termbase-owned image storage
//!
//! Image-kind property values store a path to a copy owned by the
//! termbase, not the user's original file. Imports land under one
//! subdirectory per termbase; removal never reaches outside the root.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::records::TermbaseId;
use crate::CoreError;

/// Filesystem store for imported media files
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    /// Create a store rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The store's root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a stored value points into this store
    pub fn owns(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }

    /// Copy `source` into the termbase's media directory
    ///
    /// The copy gets a fresh name, keeping the source extension. Callers
    /// fall back to storing the original source path when this fails.
    pub async fn import(
        &self,
        termbase: TermbaseId,
        source: &Path,
    ) -> Result<PathBuf, CoreError> {
        let dir = self.root.join(termbase.0.to_string());
        fs::create_dir_all(&dir).await?;

        let name = match source.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
            None => Uuid::new_v4().to_string(),
        };
        let dest = dir.join(name);
        fs::copy(source, &dest).await?;

        debug!(source = %source.display(), dest = %dest.display(), "imported media file");
        Ok(dest)
    }

    /// Best-effort removal of a previously imported file
    ///
    /// Paths outside the store root are left alone; a failed removal is
    /// logged and swallowed, it never blocks the value mutation that
    /// triggered it.
    pub async fn remove(&self, path: &Path) {
        if !self.owns(path) {
            debug!(path = %path.display(), "skipping removal of foreign path");
            return;
        }
        if let Err(err) = fs::remove_file(path).await {
            warn!(path = %path.display(), error = %err, "failed to remove media file");
        }
    }
}
