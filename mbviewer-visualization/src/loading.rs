//! Concurrent loading of LOD variants with per-file progress

use crate::render_prep::{prepare_point_cloud, RenderablePointCloud};
use futures::future::join_all;
use mbviewer_core::Result;
use mbviewer_io::{display_name, PcdReader, PointCloudSource, TransferProgress};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loading,
    Ready,
    Error,
}

/// Progress of one file shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileLoadingEntry {
    pub filename: String,
    pub status: LoadStatus,
    /// Total size in bytes as announced by the server
    pub size: u64,
    pub percentage: f64,
}

/// Identifies one registration on a [`LoadingStatusBoard`].
///
/// Updates made with the ticket of a replaced registration are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
struct BoardState {
    next_ticket: u64,
    entries: Vec<(LoadTicket, FileLoadingEntry)>,
}

impl BoardState {
    fn entry_mut(&mut self, ticket: LoadTicket) -> Option<&mut FileLoadingEntry> {
        self.entries
            .iter_mut()
            .find(|(t, _)| *t == ticket)
            .map(|(_, entry)| entry)
    }
}

/// Shared list of loading entries, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct LoadingStatusBoard {
    state: Arc<Mutex<BoardState>>,
}

impl LoadingStatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `filename`, replacing any earlier entry for it
    pub fn register(&self, filename: &str) -> LoadTicket {
        let mut state = self.state.lock();
        state.next_ticket += 1;
        let ticket = LoadTicket(state.next_ticket);

        state.entries.retain(|(_, entry)| entry.filename != filename);
        state.entries.push((
            ticket,
            FileLoadingEntry {
                filename: filename.to_string(),
                status: LoadStatus::Loading,
                size: 0,
                percentage: 0.0,
            },
        ));
        ticket
    }

    /// Returns false when the registration has since been replaced
    pub fn record_progress(&self, ticket: LoadTicket, progress: TransferProgress) -> bool {
        match self.state.lock().entry_mut(ticket) {
            Some(entry) => {
                entry.status = LoadStatus::Loading;
                entry.size = progress.total;
                entry.percentage = progress.percentage();
                true
            }
            None => false,
        }
    }

    /// Returns false when the registration has since been replaced
    pub fn set_status(&self, ticket: LoadTicket, status: LoadStatus) -> bool {
        match self.state.lock().entry_mut(ticket) {
            Some(entry) => {
                entry.status = status;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, filename: &str) -> Option<FileLoadingEntry> {
        self.state
            .lock()
            .entries
            .iter()
            .find(|(_, entry)| entry.filename == filename)
            .map(|(_, entry)| entry.clone())
    }

    /// Copy of all entries in registration order
    pub fn snapshot(&self) -> Vec<FileLoadingEntry> {
        self.state.lock().entries.iter().map(|(_, entry)| entry.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }
}

/// Fetches, decodes and prepares LOD variants
pub struct LodLoader<S> {
    source: S,
    statuses: LoadingStatusBoard,
}

impl<S: PointCloudSource> LodLoader<S> {
    pub fn new(source: S, statuses: LoadingStatusBoard) -> Self {
        Self { source, statuses }
    }

    pub fn statuses(&self) -> &LoadingStatusBoard {
        &self.statuses
    }

    /// Load one variant. The returned object is named after the URL's last segment.
    pub async fn load(&self, url: &str) -> Result<RenderablePointCloud> {
        let name = display_name(url).to_string();
        log::debug!("Loading LOD variant {} from {}", name, url);
        let ticket = self.statuses.register(&name);

        match self.fetch_and_prepare(url, &name, ticket).await {
            Ok(object) => {
                if !self.statuses.set_status(ticket, LoadStatus::Ready) {
                    log::debug!("{} was registered again while loading", name);
                }
                log::info!("Loaded {} ({} points)", name, object.len());
                Ok(object)
            }
            Err(err) => {
                self.statuses.set_status(ticket, LoadStatus::Error);
                log::error!("Failed to load {}: {}", url, err);
                Err(err)
            }
        }
    }

    async fn fetch_and_prepare(&self, url: &str, name: &str, ticket: LoadTicket) -> Result<RenderablePointCloud> {
        let statuses = &self.statuses;
        let bytes = self
            .source
            .fetch(url, &|progress: TransferProgress| {
                statuses.record_progress(ticket, progress);
            })
            .await?;
        let cloud = PcdReader::read_bytes(&bytes)?;
        Ok(prepare_point_cloud(&cloud, name))
    }

    /// Load every variant concurrently. Fails if any variant fails, after
    /// all of them have settled so no entry is left in `Loading`.
    pub async fn load_all(&self, urls: &[String]) -> Result<Vec<RenderablePointCloud>> {
        join_all(urls.iter().map(|url| self.load(url)))
            .await
            .into_iter()
            .collect()
    }
}
