//! Marker files recording when each account last created a session.
//!
//! One plain-text file per wallet under the sessions directory, holding
//! the creation time in epoch milliseconds. The marker is informational:
//! it is logged as a freshness hint and never gates session creation.

use std::io;
use std::path::{Path, PathBuf};

/// Reads and writes per-account session markers.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: Option<PathBuf>,
}

impl SessionStore {
    /// A store writing markers under `dir` (created on first write).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// A store that remembers nothing.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Where the marker for `owner` lives, if persistence is enabled.
    pub fn marker_path(&self, owner: &str) -> Option<PathBuf> {
        self.dir
            .as_deref()
            .map(|dir| dir.join(owner.to_ascii_lowercase()))
    }

    /// Persists `created_at_ms` as the owner's latest session.
    pub async fn record(&self, owner: &str, created_at_ms: u64) -> io::Result<()> {
        let Some(path) = self.marker_path(owner) else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, created_at_ms.to_string()).await
    }

    /// The last recorded creation time, `None` when there is no marker.
    ///
    /// # Errors
    /// I/O errors other than "not found", and markers that are not a
    /// number (`InvalidData`).
    pub async fn last_created(&self, owner: &str) -> io::Result<Option<u64>> {
        let Some(path) = self.marker_path(owner) else {
            return Ok(None);
        };
        read_marker(&path).await
    }
}

async fn read_marker(path: &Path) -> io::Result<Option<u64>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}
