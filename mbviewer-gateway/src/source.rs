//! HTTP download of LOD files with progress reporting

use crate::http_error;
use mbviewer_core::Result;
use mbviewer_io::{PointCloudSource, ProgressCallback, TransferProgress};

/// Most bytes reserved up front from an announced `Content-Length`
const MAX_PREALLOCATION: u64 = 64 << 20;

fn initial_capacity(content_length: u64) -> usize {
    content_length.min(MAX_PREALLOCATION) as usize
}

/// Fetches point cloud files from the file server
#[derive(Debug, Clone, Default)]
pub struct HttpPointCloudSource {
    client: reqwest::Client,
}

impl HttpPointCloudSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl PointCloudSource for HttpPointCloudSource {
    async fn fetch(&self, url: &str, on_progress: ProgressCallback<'_>) -> Result<Vec<u8>> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(http_error)?;

        let total = response.content_length().unwrap_or(0);
        let mut body = Vec::with_capacity(initial_capacity(total));

        while let Some(chunk) = response.chunk().await.map_err(http_error)? {
            body.extend_from_slice(&chunk);
            on_progress(TransferProgress {
                loaded: body.len() as u64,
                total,
            });
        }

        Ok(body)
    }
}
