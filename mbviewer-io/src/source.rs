//! Sources that deliver the bytes of a point cloud file

use crate::lod::display_name;
use mbviewer_core::{Error, Result};
use std::path::PathBuf;

/// Bytes received so far for one transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub loaded: u64,
    /// Total size in bytes, 0 when the server did not announce it
    pub total: u64,
}

impl TransferProgress {
    /// Percentage of the transfer completed, 0 when the total is unknown
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.loaded as f64 / self.total as f64 * 100.0
        }
    }
}

/// Callback invoked for every received chunk
pub type ProgressCallback<'a> = &'a (dyn Fn(TransferProgress) + Send + Sync);

/// Something that can fetch the raw bytes of a point cloud file by URL
#[allow(async_fn_in_trait)]
pub trait PointCloudSource {
    /// Fetch the complete file, reporting progress as bytes arrive
    async fn fetch(&self, url: &str, on_progress: ProgressCallback<'_>) -> Result<Vec<u8>>;
}

/// Serves LOD files from a local directory, keyed by the URL's final segment
#[derive(Debug, Clone)]
pub struct FileSystemSource {
    root: PathBuf,
}

impl FileSystemSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl PointCloudSource for FileSystemSource {
    async fn fetch(&self, url: &str, on_progress: ProgressCallback<'_>) -> Result<Vec<u8>> {
        let path = self.root.join(display_name(url));
        log::debug!("Reading {} from {}", url, path.display());

        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            Error::InvalidData(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let size = bytes.len() as u64;
        on_progress(TransferProgress { loaded: size, total: size });

        Ok(bytes)
    }
}
